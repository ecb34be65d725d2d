//! Fire-and-forget audit delivery to a messaging webhook.

use idlookup_core::gateway::{AuditSink, Session};
use reqwest::Client;
use serde_json::json;
use tokio::runtime::Handle;
use tracing::warn;

/// Posts each audit line as `{"content": "<line>"}` on a detached task.
///
/// Delivery failures are logged and otherwise swallowed. Without a webhook
/// URL the sink does nothing; the coordinator already logs every line.
#[derive(Clone)]
pub struct WebhookAudit {
  client: Client,
  url:    Option<String>,
}

impl WebhookAudit {
  pub fn new(client: Client, url: Option<String>) -> Self {
    Self {
      client,
      url: url.filter(|u| !u.trim().is_empty()),
    }
  }

  pub fn is_enabled(&self) -> bool { self.url.is_some() }
}

impl AuditSink for WebhookAudit {
  fn notify(&self, session: &Session, message: &str) {
    let Some(url) = self.url.clone() else {
      return;
    };
    let Ok(runtime) = Handle::try_current() else {
      warn!("audit line dropped: no async runtime");
      return;
    };

    let client = self.client.clone();
    let body = json!({ "content": session.audit_line(message) });
    runtime.spawn(async move {
      match client.post(&url).json(&body).send().await {
        Ok(resp) if !resp.status().is_success() => {
          warn!(status = %resp.status(), "audit webhook refused line");
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "audit webhook unreachable"),
      }
    });
  }
}

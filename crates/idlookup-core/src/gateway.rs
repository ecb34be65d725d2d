//! The seams to the outside world: the record service, the audit channel, and
//! the per-session context both of them need.
//!
//! Implementations live in the console binary. Higher layers depend on these
//! traits, not on any HTTP client.

use std::future::Future;

use uuid::Uuid;

use crate::{error::GatewayError, outcome::SearchOutcome, query::Query};

/// Used when the client IP cannot be resolved.
pub const UNKNOWN_IP: &str = "unknown";

// ─── Session ─────────────────────────────────────────────────────────────────

/// Per-session context, created once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  /// Short pseudo-random identifier.
  pub id:        String,
  /// Best-effort public IP of this client.
  pub client_ip: String,
}

impl Session {
  pub fn new(client_ip: Option<String>) -> Self {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    Self {
      id,
      client_ip: client_ip.unwrap_or_else(|| UNKNOWN_IP.to_owned()),
    }
  }

  /// Render an audit line: `<ip> (<id>) - <message>`.
  pub fn audit_line(&self, message: &str) -> String {
    format!("{} ({}) - {}", self.client_ip, self.id, message)
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// The record search service.
///
/// One attempt per call, no internal retry. Non-success statuses and
/// transport failures surface as [`GatewayError`]; an empty result set is an
/// empty [`SearchOutcome`], not an error.
pub trait SearchGateway: Send + Sync {
  /// Identity queries take the authority-aware lookup path; name queries
  /// search local records only.
  fn execute<'a>(
    &'a self,
    query: &'a Query,
    session: &'a Session,
  ) -> impl Future<Output = Result<SearchOutcome, GatewayError>> + Send + 'a;
}

/// One-way audit channel.
///
/// `notify` returns immediately. Delivery happens elsewhere, and its failure
/// is never observable by the caller.
pub trait AuditSink: Send + Sync {
  fn notify(&self, session: &Session, message: &str);
}

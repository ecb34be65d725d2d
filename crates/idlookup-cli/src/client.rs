//! Async HTTP client for the record service JSON API.

use std::{future::Future, time::Duration};

use anyhow::{Context, Result, anyhow};
use idlookup_core::{
  GatewayError,
  gateway::{SearchGateway, Session},
  outcome::{SearchOutcome, SourcedRecord},
  query::Query,
  record::Record,
};
use reqwest::{
  Client,
  header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::settings::ConsoleConfig;

// ─── Wire types ───────────────────────────────────────────────────────────────

/// `POST /search` body. Fields of the inactive shape are sent empty.
#[derive(Serialize)]
struct SearchBody<'a> {
  ci:         &'a str,
  nombre:     &'a str,
  apellido:   &'a str,
  #[serde(rename = "sessionId")]
  session_id: &'a str,
  #[serde(rename = "userIp")]
  user_ip:    &'a str,
}

/// `POST /dgrec_lookup` body.
#[derive(Serialize)]
struct LookupBody<'a> {
  ci:         &'a str,
  #[serde(rename = "sessionId")]
  session_id: &'a str,
  #[serde(rename = "userIp")]
  user_ip:    &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
  #[serde(default)]
  search_type: Option<String>,
  #[serde(default)]
  results:     Vec<WireRecord>,
}

#[derive(Deserialize)]
struct WireRecord {
  #[serde(flatten)]
  record: Record,
  #[serde(default)]
  source: Option<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
  /// Absent or null when neither the local store nor the Authority Source
  /// knows the identity.
  #[serde(default)]
  result: Option<Record>,
  #[serde(default)]
  source: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
  status:  String,
  #[serde(default)]
  message: String,
}

#[derive(Deserialize)]
struct IpResponse {
  ip: String,
}

/// Backend readiness as reported by `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
  pub ready:   bool,
  pub message: String,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the record service.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(config: &ConsoleConfig) -> Result<Self> {
    let mut headers = HeaderMap::new();
    if !config.bypass_header_name.is_empty() {
      let name = HeaderName::from_bytes(config.bypass_header_name.as_bytes())
        .context("invalid bypass header name")?;
      let value = HeaderValue::from_str(&config.bypass_header_value)
        .context("invalid bypass header value")?;
      headers.insert(name, value);
    }

    let client = Client::builder()
      .timeout(config.request_timeout())
      .default_headers(headers)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: config.api_url.trim_end_matches('/').to_owned(),
    })
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
  where
    B: Serialize,
    T: DeserializeOwned,
  {
    let resp = self
      .client
      .post(self.url(path))
      .json(body)
      .send()
      .await
      .map_err(|e| GatewayError::Transport(e.to_string()))?;

    if !resp.status().is_success() {
      return Err(GatewayError::Status(resp.status().as_u16()));
    }
    resp
      .json()
      .await
      .map_err(|e| GatewayError::Decode(e.to_string()))
  }

  // ── Status ────────────────────────────────────────────────────────────────

  /// `GET /status`
  pub async fn status(&self) -> Result<BackendStatus> {
    let resp = self
      .client
      .get(self.url("/status"))
      .send()
      .await
      .context("GET /status failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /status → {}", resp.status()));
    }
    let body: StatusResponse = resp.json().await.context("deserialising status")?;
    Ok(BackendStatus {
      ready:   body.status == "ready",
      message: body.message,
    })
  }

  // ── Search ────────────────────────────────────────────────────────────────

  /// `POST /search`: local records only.
  pub async fn search_local(
    &self,
    given: &str,
    surname: &str,
    session: &Session,
  ) -> Result<SearchOutcome, GatewayError> {
    let body = SearchBody {
      ci:         "",
      nombre:     given,
      apellido:   surname,
      session_id: &session.id,
      user_ip:    &session.client_ip,
    };
    let resp: SearchResponse = self.post_json("/search", &body).await?;
    debug!(
      search_type = resp.search_type.as_deref().unwrap_or("-"),
      count = resp.results.len(),
      "local search answered"
    );
    Ok(SearchOutcome {
      entries: resp
        .results
        .into_iter()
        .map(|w| SourcedRecord::new(w.record, w.source.as_deref()))
        .collect(),
    })
  }

  /// `POST /dgrec_lookup`: local record, upgraded from the Authority Source
  /// when incomplete.
  pub async fn deep_lookup(
    &self,
    identity: &str,
    session: &Session,
  ) -> Result<SearchOutcome, GatewayError> {
    let body = LookupBody {
      ci:         identity,
      session_id: &session.id,
      user_ip:    &session.client_ip,
    };
    let resp: LookupResponse = self.post_json("/dgrec_lookup", &body).await?;
    debug!(
      identity,
      source = resp.source.as_deref().unwrap_or("-"),
      found = resp.result.is_some(),
      "deep lookup answered"
    );
    Ok(match resp.result {
      Some(record) => {
        SearchOutcome::single(SourcedRecord::new(record, resp.source.as_deref()))
      }
      None => SearchOutcome::empty(),
    })
  }
}

impl SearchGateway for ApiClient {
  fn execute<'a>(
    &'a self,
    query: &'a Query,
    session: &'a Session,
  ) -> impl Future<Output = Result<SearchOutcome, GatewayError>> + Send + 'a {
    async move {
      match query {
        Query::ByIdentity { identity } => self.deep_lookup(identity, session).await,
        Query::ByName { given, surname } => {
          self.search_local(given, surname, session).await
        }
      }
    }
  }
}

/// Ask a public IP echo service for this client's address.
///
/// Best effort: any failure yields `None`.
pub async fn resolve_client_ip(client: &Client, url: &str, timeout: Duration) -> Option<String> {
  let resp = match client.get(url).timeout(timeout).send().await {
    Ok(resp) if resp.status().is_success() => resp,
    Ok(resp) => {
      debug!(status = %resp.status(), "IP lookup refused");
      return None;
    }
    Err(e) => {
      debug!(error = %e, "IP lookup failed");
      return None;
    }
  };
  match resp.json::<IpResponse>().await {
    Ok(body) if !body.ip.trim().is_empty() => Some(body.ip.trim().to_owned()),
    Ok(_) => None,
    Err(e) => {
      debug!(error = %e, "IP lookup answered garbage");
      None
    }
  }
}

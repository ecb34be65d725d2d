//! Error types for `idlookup-core`.

use thiserror::Error;

/// A query could not be built from the form input. No request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("enter an identity number to search")]
  EmptyIdentity,

  #[error("enter at least a given name or a surname to search")]
  EmptyNameQuery,
}

/// The backend could not be reached or answered with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
  #[error("backend returned HTTP {0}")]
  Status(u16),

  #[error("transport error: {0}")]
  Transport(String),

  #[error("malformed response: {0}")]
  Decode(String),

  #[error("request task aborted: {0}")]
  Aborted(String),
}

/// Why the coordinator refused to start a search or an enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchRejected {
  #[error("a search is already in flight")]
  Busy,

  #[error("the backend is not ready yet")]
  NotReady,

  #[error("record {0} cannot be enriched from the current view")]
  NotEnrichable(String),

  #[error(transparent)]
  Invalid(#[from] ValidationError),
}

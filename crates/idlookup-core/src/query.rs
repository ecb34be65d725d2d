//! Query shapes and the builder that validates raw form input.

use std::fmt;

use crate::error::ValidationError;

// ─── Mode ────────────────────────────────────────────────────────────────────

/// Which of the two mutually exclusive query shapes the form is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  #[default]
  Identity,
  Name,
}

impl Mode {
  pub fn toggled(self) -> Self {
    match self {
      Self::Identity => Self::Name,
      Self::Name => Self::Identity,
    }
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Identity => f.write_str("identity"),
      Self::Name => f.write_str("name"),
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// A validated search request. Created per submission and consumed
/// immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
  ByIdentity { identity: String },
  /// Either field may be empty, never both. Empty fields are still sent to
  /// the backend, which expects both keys.
  ByName { given: String, surname: String },
}

impl Query {
  pub fn mode(&self) -> Mode {
    match self {
      Self::ByIdentity { .. } => Mode::Identity,
      Self::ByName { .. } => Mode::Name,
    }
  }

  /// One-line description for audit notifications.
  pub fn describe(&self) -> String {
    match self {
      Self::ByIdentity { identity } => format!("identity {identity}"),
      Self::ByName { given, surname } => format!(
        "given name {} surname {}",
        or_dash(given),
        or_dash(surname)
      ),
    }
  }
}

fn or_dash(s: &str) -> &str { if s.is_empty() { "-" } else { s } }

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Normalise raw form input into a [`Query`] for `mode`.
///
/// All inputs are trimmed. Inputs belonging to the inactive shape are
/// ignored.
pub fn build(
  mode: Mode,
  raw_identity: &str,
  raw_given: &str,
  raw_surname: &str,
) -> Result<Query, ValidationError> {
  match mode {
    Mode::Identity => {
      let identity = raw_identity.trim();
      if identity.is_empty() {
        return Err(ValidationError::EmptyIdentity);
      }
      Ok(Query::ByIdentity {
        identity: identity.to_owned(),
      })
    }
    Mode::Name => {
      let given = raw_given.trim();
      let surname = raw_surname.trim();
      if given.is_empty() && surname.is_empty() {
        return Err(ValidationError::EmptyNameQuery);
      }
      Ok(Query::ByName {
        given:   given.to_owned(),
        surname: surname.to_owned(),
      })
    }
  }
}

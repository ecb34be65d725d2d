//! Record: one person entry from the identity record service.
//!
//! Field names on the wire follow the backend's JSON contract; the Rust names
//! describe what the field holds.

use serde::{Deserialize, Serialize};

/// Number of fields a record carries when fully populated.
pub const FIELD_COUNT: usize = 5;

// ─── Record ──────────────────────────────────────────────────────────────────

/// A person entry keyed by its national identity number.
///
/// `identity` is the unique key within a result list. Every other field may
/// be missing when the local store only holds a partial entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  #[serde(rename = "ci")]
  pub identity:    String,
  #[serde(rename = "nombres", default)]
  pub given:       Option<String>,
  #[serde(rename = "apellidos", default)]
  pub surname:     Option<String>,
  #[serde(
    rename = "fecha_nacimiento",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub birth_date:  Option<String>,
  #[serde(
    rename = "lugar_nacimiento",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub birth_place: Option<String>,
}

impl Record {
  /// A record holding only identity and names, as the local store usually
  /// returns for name searches.
  pub fn partial(
    identity: impl Into<String>,
    given: impl Into<String>,
    surname: impl Into<String>,
  ) -> Self {
    Self {
      identity:    identity.into(),
      given:       Some(given.into()),
      surname:     Some(surname.into()),
      birth_date:  None,
      birth_place: None,
    }
  }

  /// Extend a record with birth details.
  pub fn with_birth(
    mut self,
    date: impl Into<String>,
    place: impl Into<String>,
  ) -> Self {
    self.birth_date = Some(date.into());
    self.birth_place = Some(place.into());
    self
  }

  /// How many of the five fields hold a non-blank value.
  pub fn populated_field_count(&self) -> usize {
    let identity = usize::from(!self.identity.trim().is_empty());
    identity
      + [
        &self.given,
        &self.surname,
        &self.birth_date,
        &self.birth_place,
      ]
      .into_iter()
      .filter(|f| is_populated(f))
      .count()
  }

  pub fn is_complete(&self) -> bool {
    self.populated_field_count() == FIELD_COUNT
  }
}

fn is_populated(field: &Option<String>) -> bool {
  field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

// ─── Provenance ──────────────────────────────────────────────────────────────

/// Where a search result came from.
///
/// Informational only: it shapes audit notifications, never the enrichment
/// decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
  LocalComplete,
  LocalPartial,
  /// Freshly fetched from the Authority Source.
  AuthoritySourced,
}

/// Source tag the backend attaches when it fetched from the Authority Source.
pub const SOURCE_AUTHORITY: &str = "dgrec_success";
/// Source tag the backend attaches to entries it already held complete.
pub const SOURCE_LOCAL_COMPLETE: &str = "local_complete";

impl Provenance {
  /// Classify a record from the backend-supplied source tag.
  ///
  /// The backend labels every locally held entry `local_complete`, partial
  /// ones included, so locally sourced records are classified by their
  /// actual completeness.
  pub fn classify(record: &Record, source: Option<&str>) -> Self {
    match source {
      Some(SOURCE_AUTHORITY) => Self::AuthoritySourced,
      _ if record.is_complete() => Self::LocalComplete,
      _ => Self::LocalPartial,
    }
  }
}

//! Search outcomes as classified by the gateway.

use crate::record::{Provenance, Record};

/// A record bundled with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedRecord {
  pub record:     Record,
  pub provenance: Provenance,
}

impl SourcedRecord {
  pub fn new(record: Record, source: Option<&str>) -> Self {
    let provenance = Provenance::classify(&record, source);
    Self { record, provenance }
  }
}

/// Coarse classification of a whole outcome, used for audit content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
  Empty,
  PartialLocal,
  CompleteLocal,
  AuthoritySourced,
}

/// Ordered results of one gateway call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
  pub entries: Vec<SourcedRecord>,
}

impl SearchOutcome {
  pub fn empty() -> Self { Self::default() }

  pub fn single(entry: SourcedRecord) -> Self {
    Self {
      entries: vec![entry],
    }
  }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Authority sourcing dominates, then any partial record.
  pub fn class(&self) -> OutcomeClass {
    if self.entries.is_empty() {
      OutcomeClass::Empty
    } else if self
      .entries
      .iter()
      .any(|e| e.provenance == Provenance::AuthoritySourced)
    {
      OutcomeClass::AuthoritySourced
    } else if self
      .entries
      .iter()
      .any(|e| e.provenance == Provenance::LocalPartial)
    {
      OutcomeClass::PartialLocal
    } else {
      OutcomeClass::CompleteLocal
    }
  }

  /// The entry for `identity`, if the outcome holds one.
  pub fn find(&self, identity: &str) -> Option<&SourcedRecord> {
    self.entries.iter().find(|e| e.record.identity == identity)
  }

  pub fn partial_count(&self) -> usize {
    self
      .entries
      .iter()
      .filter(|e| !e.record.is_complete())
      .count()
  }

  pub fn into_records(self) -> Vec<Record> {
    self.entries.into_iter().map(|e| e.record).collect()
  }
}

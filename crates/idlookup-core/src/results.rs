//! The displayed result list.

use crate::record::Record;

/// Ordered records currently on screen.
///
/// Replaced wholesale by every primary search. The only in-place mutation is
/// [`ResultList::replace`], used by enrichment; entries are never reordered
/// or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultList {
  records: Vec<Record>,
}

impl ResultList {
  pub fn new(records: Vec<Record>) -> Self { Self { records } }

  pub fn set(&mut self, records: Vec<Record>) { self.records = records; }

  pub fn clear(&mut self) { self.records.clear(); }

  /// Swap in `record` for the first entry sharing its identity.
  ///
  /// Returns `false` and leaves the list untouched when no entry matches.
  pub fn replace(&mut self, record: Record) -> bool {
    match self
      .records
      .iter_mut()
      .find(|r| r.identity == record.identity)
    {
      Some(slot) => {
        *slot = record;
        true
      }
      None => false,
    }
  }

  pub fn get(&self, identity: &str) -> Option<&Record> {
    self.records.iter().find(|r| r.identity == identity)
  }

  pub fn records(&self) -> &[Record] { &self.records }

  pub fn iter(&self) -> impl Iterator<Item = &Record> { self.records.iter() }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

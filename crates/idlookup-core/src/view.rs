//! ResultView: pure projection from the result list to renderable cards.
//!
//! Never owns network state; rendering the same list twice yields the same
//! cards.

use crate::{
  query::Mode,
  record::{FIELD_COUNT, Record},
  results::ResultList,
};

/// Shown in place of a missing field.
pub const PLACEHOLDER: &str = "N/A";

/// One record prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
  pub identity:    String,
  pub given:       String,
  pub surname:     String,
  pub birth_date:  String,
  pub birth_place: String,
  /// Identity bound to the enrichment action, when the card offers one.
  pub enrich:      Option<String>,
}

impl Card {
  pub fn is_enrichable(&self) -> bool { self.enrich.is_some() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
  NoResults,
  Cards(Vec<Card>),
}

/// A record offers enrichment only in name mode and only while partial.
pub fn is_enrichable(record: &Record, mode: Mode) -> bool {
  mode == Mode::Name && record.populated_field_count() < FIELD_COUNT
}

pub fn card(record: &Record, mode: Mode) -> Card {
  Card {
    identity:    record.identity.clone(),
    given:       or_placeholder(&record.given),
    surname:     or_placeholder(&record.surname),
    birth_date:  or_placeholder(&record.birth_date),
    birth_place: or_placeholder(&record.birth_place),
    enrich:      is_enrichable(record, mode).then(|| record.identity.clone()),
  }
}

pub fn render(list: &ResultList, mode: Mode) -> View {
  if list.is_empty() {
    return View::NoResults;
  }
  View::Cards(list.iter().map(|r| card(r, mode)).collect())
}

fn or_placeholder(field: &Option<String>) -> String {
  match field.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => v.to_owned(),
    _ => PLACEHOLDER.to_owned(),
  }
}

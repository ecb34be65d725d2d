//! ModeController: owns the active query shape and the form inputs.

use crate::{error::ValidationError, query::{self, Mode, Query}};

/// Raw, untrimmed form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
  pub identity: String,
  pub given:    String,
  pub surname:  String,
}

impl SearchForm {
  pub fn clear(&mut self) {
    self.identity.clear();
    self.given.clear();
    self.surname.clear();
  }
}

#[derive(Debug, Clone, Default)]
pub struct ModeController {
  mode: Mode,
  form: SearchForm,
}

impl ModeController {
  pub fn new(mode: Mode) -> Self {
    Self {
      mode,
      form: SearchForm::default(),
    }
  }

  pub fn mode(&self) -> Mode { self.mode }

  pub fn form(&self) -> &SearchForm { &self.form }

  pub fn form_mut(&mut self) -> &mut SearchForm { &mut self.form }

  /// Activate `mode` and clear every input, even when `mode` is already
  /// active.
  pub fn switch(&mut self, mode: Mode) {
    self.mode = mode;
    self.form.clear();
  }

  /// Jump to identity mode with `identity` pre-filled. Used by enrichment,
  /// which must not go through the clearing path of [`Self::switch`] for the
  /// result list.
  pub fn focus_identity(&mut self, identity: &str) {
    self.switch(Mode::Identity);
    self.form.identity = identity.to_owned();
  }

  /// Build a query from the current inputs.
  pub fn build_query(&self) -> Result<Query, ValidationError> {
    query::build(
      self.mode,
      &self.form.identity,
      &self.form.given,
      &self.form.surname,
    )
  }
}

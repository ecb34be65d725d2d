//! Application state and event dispatcher.
//!
//! Key events edit the form or drive the coordinator. Gateway calls run on
//! spawned tasks and come back as [`AppEvent::Completed`], so the terminal
//! keeps redrawing (and showing the loading line) while a request is out.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use idlookup_core::{
  SearchRejected,
  coordinator::{Completed, Completion, Coordinator, Dispatch},
  query::Mode,
  view::{Card, View},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::{audit::WebhookAudit, client::ApiClient};

pub type Console = Coordinator<ApiClient, WebhookAudit>;

/// Delay before asking `/status` again while the backend is loading.
pub const NOT_READY_RETRY: Duration = Duration::from_secs(2);
/// Delay before asking `/status` again after a failed request.
pub const UNREACHABLE_RETRY: Duration = Duration::from_secs(5);

// ─── Focus ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Identity,
  Given,
  Surname,
  Results,
}

fn focus_order(mode: Mode) -> &'static [Focus] {
  match mode {
    Mode::Identity => &[Focus::Identity, Focus::Results],
    Mode::Name => &[Focus::Given, Focus::Surname, Focus::Results],
  }
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// Backend readiness as last observed by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
  Checking,
  Ready(String),
  NotReady(String),
  Unreachable(String),
}

impl Readiness {
  pub fn is_ready(&self) -> bool { matches!(self, Self::Ready(_)) }

  fn same_kind(&self, other: &Self) -> bool {
    std::mem::discriminant(self) == std::mem::discriminant(other)
  }
}

#[derive(Debug)]
pub enum AppEvent {
  Completed(Completed),
  Readiness(Readiness),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub coordinator: Console,

  /// Which input (or the result list) receives keys.
  pub focus: Focus,

  /// Card under the cursor in the result list.
  pub cursor: usize,

  pub readiness: Readiness,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  events: UnboundedSender<AppEvent>,
}

impl App {
  pub fn new(coordinator: Console, events: UnboundedSender<AppEvent>) -> Self {
    let focus = focus_order(coordinator.mode())[0];
    Self {
      coordinator,
      focus,
      cursor: 0,
      readiness: Readiness::Checking,
      status_msg: String::new(),
      events,
    }
  }

  // ── Background events ─────────────────────────────────────────────────────

  pub fn handle_event(&mut self, event: AppEvent) {
    match event {
      AppEvent::Completed(done) => self.on_completed(done),
      AppEvent::Readiness(readiness) => self.on_readiness(readiness),
    }
  }

  fn on_completed(&mut self, done: Completed) {
    let enrichment = done.ticket.is_enrichment();
    let completion = self.coordinator.complete(done);
    debug!(?completion, enrichment, "search completed");

    match completion {
      Completion::Rendered if !enrichment => {
        self.cursor = 0;
        self.focus = Focus::Results;
      }
      Completion::Enriched => self.status_msg = "Record completed.".into(),
      _ => {}
    }
    self.clamp_cursor();
  }

  fn on_readiness(&mut self, readiness: Readiness) {
    if !readiness.same_kind(&self.readiness) {
      let line = match &readiness {
        Readiness::Checking => None,
        Readiness::Ready(msg) => Some(format!("backend ready: {msg}")),
        Readiness::NotReady(msg) => Some(format!("backend not ready: {msg}")),
        Readiness::Unreachable(err) => Some(format!("backend unreachable: {err}")),
      };
      if let Some(line) = line {
        self.coordinator.audit(&line);
      }
    }
    self.readiness = readiness;
  }

  // ── Commands ──────────────────────────────────────────────────────────────

  /// Start a primary search from the form.
  pub fn submit_search(&mut self) {
    self.status_msg.clear();
    if !self.readiness.is_ready() {
      self.reject(SearchRejected::NotReady);
      return;
    }
    match self.coordinator.begin_search() {
      Ok(dispatch) => {
        self.cursor = 0;
        self.spawn(dispatch);
      }
      Err(SearchRejected::Invalid(_)) => {} // shown by the indicator
      Err(e) => self.reject(e),
    }
  }

  /// Enrich the card under the cursor.
  pub fn submit_enrichment(&mut self) {
    self.status_msg.clear();
    if !self.readiness.is_ready() {
      self.reject(SearchRejected::NotReady);
      return;
    }
    let Some(identity) = self.cursor_card().and_then(|c| c.enrich) else {
      self.status_msg = "Nothing to complete for this record.".into();
      return;
    };
    match self.coordinator.begin_enrichment(&identity) {
      Ok(dispatch) => {
        self.focus = Focus::Results;
        self.spawn(dispatch);
      }
      Err(e) => self.reject(e),
    }
  }

  pub fn switch_mode(&mut self, mode: Mode) {
    self.coordinator.switch_mode(mode);
    self.focus = focus_order(mode)[0];
    self.cursor = 0;
    self.status_msg.clear();
  }

  pub fn clear(&mut self) {
    self.coordinator.clear();
    self.focus = focus_order(self.coordinator.mode())[0];
    self.cursor = 0;
    self.status_msg.clear();
  }

  fn reject(&mut self, reason: SearchRejected) {
    debug!(%reason, "request rejected");
    self.status_msg = reason.to_string();
  }

  /// Run the gateway call on its own task and report back through the event
  /// channel. A panicking call still produces a completion.
  fn spawn(&self, dispatch: Dispatch<ApiClient>) {
    let ticket = dispatch.ticket().clone();
    let events = self.events.clone();
    tokio::spawn(async move {
      let done = match tokio::spawn(dispatch.run()).await {
        Ok(done) => done,
        Err(e) => {
          warn!(error = %e, "search task died");
          Completed::aborted(ticket, e.to_string())
        }
      };
      if events.send(AppEvent::Completed(done)).is_err() {
        debug!("event loop gone, dropping completion");
      }
    });
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  pub fn cards(&self) -> Vec<Card> {
    match self.coordinator.view() {
      View::Cards(cards) => cards,
      View::NoResults => Vec::new(),
    }
  }

  pub fn cursor_card(&self) -> Option<Card> { self.cards().into_iter().nth(self.cursor) }

  fn clamp_cursor(&mut self) {
    let len = self.coordinator.results().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
    if !focus_order(self.coordinator.mode()).contains(&self.focus) {
      self.focus = Focus::Results;
    }
  }

  fn field_mut(&mut self) -> Option<&mut String> {
    let form = self.coordinator.form_mut();
    match self.focus {
      Focus::Identity => Some(&mut form.identity),
      Focus::Given => Some(&mut form.given),
      Focus::Surname => Some(&mut form.surname),
      Focus::Results => None,
    }
  }

  fn cycle_focus(&mut self, forward: bool) {
    let order = focus_order(self.coordinator.mode());
    let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
    let next = if forward {
      (pos + 1) % order.len()
    } else {
      (pos + order.len() - 1) % order.len()
    };
    self.focus = order[next];
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys.
    match key.code {
      KeyCode::Char('c') if ctrl => return false,
      KeyCode::Char('l') if ctrl => {
        self.clear();
        return true;
      }
      KeyCode::F(2) => {
        self.switch_mode(self.coordinator.mode().toggled());
        return true;
      }
      KeyCode::Tab => {
        self.cycle_focus(true);
        return true;
      }
      KeyCode::BackTab => {
        self.cycle_focus(false);
        return true;
      }
      _ => {}
    }

    if self.focus == Focus::Results {
      return self.handle_results_key(key);
    }
    self.handle_field_key(key, ctrl);
    true
  }

  fn handle_field_key(&mut self, key: KeyEvent, ctrl: bool) {
    match key.code {
      KeyCode::Enter => self.submit_search(),
      KeyCode::Esc => self.focus = Focus::Results,
      KeyCode::Backspace => {
        if let Some(field) = self.field_mut() {
          field.pop();
        }
      }
      KeyCode::Char(c) if !ctrl => {
        if let Some(field) = self.field_mut() {
          field.push(c);
        }
      }
      _ => {}
    }
  }

  fn handle_results_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.coordinator.results().len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Char('e') => self.submit_enrichment(),

      KeyCode::Char('i') => self.focus = focus_order(self.coordinator.mode())[0],

      _ => {}
    }
    true
  }
}

// ─── Readiness poller ─────────────────────────────────────────────────────────

/// Poll `GET /status` until the backend reports ready.
pub async fn poll_readiness(client: ApiClient, events: UnboundedSender<AppEvent>) {
  loop {
    let (readiness, retry) = match client.status().await {
      Ok(status) if status.ready => (Readiness::Ready(status.message), None),
      Ok(status) => (Readiness::NotReady(status.message), Some(NOT_READY_RETRY)),
      Err(e) => (Readiness::Unreachable(format!("{e:#}")), Some(UNREACHABLE_RETRY)),
    };
    if events.send(AppEvent::Readiness(readiness)).is_err() {
      return;
    }
    match retry {
      Some(delay) => tokio::time::sleep(delay).await,
      None => return,
    }
  }
}

//! EnrichmentCoordinator: the search/enrichment state machine.
//!
//! ```text
//! Idle ──begin_search──▶ Searching ─────────┐
//!   ▲                                         ├──complete──▶ Idle
//!   └──begin_enrichment──▶ EnrichmentPending ─┘
//! ```
//!
//! A search is split in three steps so the caller decides where the network
//! round trip runs:
//!
//! 1. [`Coordinator::begin_search`] / [`Coordinator::begin_enrichment`]
//!    validate, mark the coordinator busy and hand back a [`Dispatch`].
//! 2. [`Dispatch::run`] performs the gateway call. It owns everything it
//!    needs and can be spawned.
//! 3. [`Coordinator::complete`] releases the busy state on every path and
//!    reconciles the outcome into the result list.
//!
//! Every begin, mode switch and clear bumps a generation counter; a
//! completion carrying an older generation is dropped without touching the
//! result list.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
  error::{GatewayError, SearchRejected, ValidationError},
  gateway::{AuditSink, SearchGateway, Session},
  mode::{ModeController, SearchForm},
  outcome::{OutcomeClass, SearchOutcome},
  query::{Mode, Query},
  results::ResultList,
  view::{self, View},
};

/// Shown for any gateway failure on a primary search.
pub const GENERIC_ERROR: &str =
  "The search failed. Make sure the record service is running and try again.";

/// Shown for any gateway failure during enrichment.
pub const ENRICHMENT_ERROR: &str =
  "The authority source lookup failed. Try again later.";

// ─── State ───────────────────────────────────────────────────────────────────

/// Which loading message to show while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loading {
  /// Name search against local records.
  Local,
  /// Identity lookup that may reach the Authority Source.
  Authority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Searching(Loading),
  EnrichmentPending { identity: String },
}

impl Phase {
  pub fn loading(&self) -> Option<Loading> {
    match self {
      Self::Idle => None,
      Self::Searching(loading) => Some(*loading),
      Self::EnrichmentPending { .. } => Some(Loading::Authority),
    }
  }
}

/// The single status indicator under the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Indicator {
  #[default]
  Hidden,
  /// Empty result set, or an enrichment that produced nothing usable.
  NoResults,
  Error(String),
  Invalid(ValidationError),
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Purpose {
  Primary,
  Enrichment { identity: String },
}

/// Identifies one in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
  generation: u64,
  query:      Query,
  purpose:    Purpose,
}

impl Ticket {
  pub fn is_enrichment(&self) -> bool {
    matches!(self.purpose, Purpose::Enrichment { .. })
  }
}

/// A gateway call ready to run, detached from the coordinator.
pub struct Dispatch<G> {
  gateway: Arc<G>,
  session: Arc<Session>,
  ticket:  Ticket,
}

impl<G: SearchGateway> Dispatch<G> {
  pub fn ticket(&self) -> &Ticket { &self.ticket }

  pub async fn run(self) -> Completed {
    let result = self
      .gateway
      .execute(&self.ticket.query, &self.session)
      .await;
    Completed {
      ticket: self.ticket,
      result,
    }
  }
}

/// The answer to a [`Dispatch`], fed back through [`Coordinator::complete`].
#[derive(Debug)]
pub struct Completed {
  pub ticket: Ticket,
  pub result: Result<SearchOutcome, GatewayError>,
}

impl Completed {
  /// Stand-in for a request whose task died before answering.
  pub fn aborted(ticket: Ticket, reason: impl Into<String>) -> Self {
    Self {
      ticket,
      result: Err(GatewayError::Aborted(reason.into())),
    }
  }
}

/// What [`Coordinator::complete`] did with an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
  /// A primary search produced at least one record.
  Rendered,
  /// Nothing to show; the no-results indicator is up.
  NotFound,
  /// One entry was replaced in place.
  Enriched,
  /// Gateway failure; the error indicator is up.
  Failed,
  /// The answer belonged to a superseded generation.
  Discarded,
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct Coordinator<G, A> {
  gateway:    Arc<G>,
  audit:      Arc<A>,
  session:    Arc<Session>,
  modes:      ModeController,
  results:    ResultList,
  indicator:  Indicator,
  phase:      Phase,
  generation: u64,
  in_flight:  Option<u64>,
}

impl<G, A> Coordinator<G, A>
where
  G: SearchGateway,
  A: AuditSink,
{
  pub fn new(gateway: G, audit: A, session: Session) -> Self {
    Self::with_shared(Arc::new(gateway), Arc::new(audit), Arc::new(session))
  }

  pub fn with_shared(gateway: Arc<G>, audit: Arc<A>, session: Arc<Session>) -> Self {
    Self {
      gateway,
      audit,
      session,
      modes: ModeController::default(),
      results: ResultList::default(),
      indicator: Indicator::Hidden,
      phase: Phase::Idle,
      generation: 0,
      in_flight: None,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────

  pub fn mode(&self) -> Mode { self.modes.mode() }

  pub fn form(&self) -> &SearchForm { self.modes.form() }

  pub fn form_mut(&mut self) -> &mut SearchForm { self.modes.form_mut() }

  pub fn results(&self) -> &ResultList { &self.results }

  pub fn indicator(&self) -> &Indicator { &self.indicator }

  pub fn phase(&self) -> &Phase { &self.phase }

  pub fn session(&self) -> &Session { &self.session }

  /// While busy the search affordance is disabled.
  pub fn is_busy(&self) -> bool { self.in_flight.is_some() }

  pub fn view(&self) -> View { view::render(&self.results, self.modes.mode()) }

  /// Send a line on the audit channel, prefixed with the session context.
  pub fn audit(&self, message: &str) {
    info!(target: "audit", "{}", self.session.audit_line(message));
    self.audit.notify(&self.session, message);
  }

  // ── Mode and form ─────────────────────────────────────────────────────

  /// Switch query shape: clears inputs, results and indicator. An in-flight
  /// request keeps the coordinator busy but its answer will be dropped.
  pub fn switch_mode(&mut self, mode: Mode) {
    self.modes.switch(mode);
    self.reset_view();
  }

  /// Empty the inputs, the results and the indicator without changing mode.
  pub fn clear(&mut self) {
    self.modes.form_mut().clear();
    self.reset_view();
  }

  fn reset_view(&mut self) {
    self.results.clear();
    self.indicator = Indicator::Hidden;
    self.generation += 1;
  }

  // ── Begin ─────────────────────────────────────────────────────────────

  /// Start a primary search from the current form.
  ///
  /// The result list is cleared first. A validation failure raises the
  /// field-level indicator and issues no request.
  pub fn begin_search(&mut self) -> Result<Dispatch<G>, SearchRejected> {
    if self.is_busy() {
      return Err(SearchRejected::Busy);
    }
    self.results.clear();
    self.indicator = Indicator::Hidden;

    let query = match self.modes.build_query() {
      Ok(query) => query,
      Err(e) => {
        self.indicator = Indicator::Invalid(e.clone());
        return Err(e.into());
      }
    };

    self.audit(&format!("search: {}", query.describe()));
    self.phase = Phase::Searching(match query.mode() {
      Mode::Identity => Loading::Authority,
      Mode::Name => Loading::Local,
    });
    Ok(self.issue(query, Purpose::Primary))
  }

  /// Start enriching the displayed partial record `identity`.
  ///
  /// Moves the form to identity mode with `identity` filled in but keeps the
  /// result list so the answer can replace the entry in place.
  pub fn begin_enrichment(
    &mut self,
    identity: &str,
  ) -> Result<Dispatch<G>, SearchRejected> {
    if self.is_busy() {
      return Err(SearchRejected::Busy);
    }
    let enrichable = self
      .results
      .get(identity)
      .is_some_and(|r| view::is_enrichable(r, self.modes.mode()));
    if !enrichable {
      return Err(SearchRejected::NotEnrichable(identity.to_owned()));
    }

    self.modes.focus_identity(identity);
    self.indicator = Indicator::Hidden;
    self.audit(&format!(
      "identity {identity} incomplete, querying the authority source"
    ));
    self.phase = Phase::EnrichmentPending {
      identity: identity.to_owned(),
    };
    let query = Query::ByIdentity {
      identity: identity.to_owned(),
    };
    Ok(self.issue(query, Purpose::Enrichment {
      identity: identity.to_owned(),
    }))
  }

  fn issue(&mut self, query: Query, purpose: Purpose) -> Dispatch<G> {
    self.generation += 1;
    self.in_flight = Some(self.generation);
    Dispatch {
      gateway: Arc::clone(&self.gateway),
      session: Arc::clone(&self.session),
      ticket:  Ticket {
        generation: self.generation,
        query,
        purpose,
      },
    }
  }

  // ── Complete ──────────────────────────────────────────────────────────

  /// Apply the answer to an earlier [`Dispatch`].
  ///
  /// Busy state and loading are released first, whatever the answer.
  pub fn complete(&mut self, done: Completed) -> Completion {
    let Completed { ticket, result } = done;

    if self.in_flight != Some(ticket.generation) {
      debug!(generation = ticket.generation, "ignoring unknown ticket");
      return Completion::Discarded;
    }
    self.in_flight = None;
    self.phase = Phase::Idle;

    if ticket.generation != self.generation {
      debug!(
        generation = ticket.generation,
        current = self.generation,
        "discarding superseded answer"
      );
      return Completion::Discarded;
    }

    match ticket.purpose {
      Purpose::Primary => self.apply_primary(&ticket.query, result),
      Purpose::Enrichment { identity } => self.apply_enrichment(&identity, result),
    }
  }

  fn apply_primary(
    &mut self,
    query: &Query,
    result: Result<SearchOutcome, GatewayError>,
  ) -> Completion {
    match result {
      Ok(outcome) => {
        self.audit(&outcome_line(query, &outcome));
        if outcome.is_empty() {
          self.results.clear();
          self.indicator = Indicator::NoResults;
          Completion::NotFound
        } else {
          self.results.set(outcome.into_records());
          Completion::Rendered
        }
      }
      Err(e) => {
        self.indicator = Indicator::Error(GENERIC_ERROR.to_owned());
        self.audit(&format!("search for {} failed: {e}", query.describe()));
        Completion::Failed
      }
    }
  }

  fn apply_enrichment(
    &mut self,
    identity: &str,
    result: Result<SearchOutcome, GatewayError>,
  ) -> Completion {
    let outcome = match result {
      Ok(outcome) => outcome,
      Err(e) => {
        self.indicator = Indicator::Error(ENRICHMENT_ERROR.to_owned());
        self.audit(&format!(
          "authority source lookup for identity {identity} failed: {e}"
        ));
        return Completion::Failed;
      }
    };

    let query = Query::ByIdentity {
      identity: identity.to_owned(),
    };
    self.audit(&outcome_line(&query, &outcome));

    match outcome.find(identity) {
      Some(entry) if entry.record.is_complete() => {
        if self.results.replace(entry.record.clone()) {
          Completion::Enriched
        } else {
          self.indicator = Indicator::NoResults;
          Completion::NotFound
        }
      }
      _ => {
        self.indicator = Indicator::NoResults;
        Completion::NotFound
      }
    }
  }
}

impl<G, A> Coordinator<G, A>
where
  G: SearchGateway,
  A: AuditSink,
{
  /// Begin, run and complete a primary search in place.
  pub async fn search(&mut self) -> Result<Completion, SearchRejected> {
    let dispatch = self.begin_search()?;
    let done = dispatch.run().await;
    Ok(self.complete(done))
  }

  /// Begin, run and complete an enrichment in place.
  pub async fn enrich(&mut self, identity: &str) -> Result<Completion, SearchRejected> {
    let dispatch = self.begin_enrichment(identity)?;
    let done = dispatch.run().await;
    Ok(self.complete(done))
  }
}

/// Audit text describing the class of an outcome.
fn outcome_line(query: &Query, outcome: &SearchOutcome) -> String {
  match (query, outcome.class()) {
    (Query::ByIdentity { identity }, OutcomeClass::Empty) => {
      format!("identity {identity} not found")
    }
    (Query::ByIdentity { identity }, OutcomeClass::AuthoritySourced) => {
      format!("identity {identity} added for future searches via the authority source")
    }
    (Query::ByIdentity { identity }, OutcomeClass::CompleteLocal) => {
      format!("identity {identity} already complete locally")
    }
    (Query::ByIdentity { identity }, OutcomeClass::PartialLocal) => {
      format!("identity {identity} only partially known")
    }
    (Query::ByName { .. }, OutcomeClass::Empty) => {
      format!("no records for {}", query.describe())
    }
    (Query::ByName { .. }, _) => format!(
      "{} record(s) for {}, {} partial",
      outcome.entries.len(),
      query.describe(),
      outcome.partial_count()
    ),
  }
}

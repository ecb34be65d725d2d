//! Protocol tests for the coordinator against a scripted gateway.

use std::{
  collections::VecDeque,
  future::{Future, ready},
  sync::{Arc, Mutex},
};

use crate::{
  coordinator::{
    Completed, Completion, Coordinator, ENRICHMENT_ERROR, GENERIC_ERROR,
    Indicator, Loading, Phase,
  },
  error::{GatewayError, SearchRejected, ValidationError},
  gateway::{AuditSink, SearchGateway, Session},
  outcome::{SearchOutcome, SourcedRecord},
  query::{Mode, Query},
  record::{Record, SOURCE_AUTHORITY, SOURCE_LOCAL_COMPLETE},
  view::View,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

type Answer = Result<SearchOutcome, GatewayError>;

/// Replays queued answers in order and records every query it receives.
#[derive(Default)]
struct ScriptedGateway {
  answers: Mutex<VecDeque<Answer>>,
  calls:   Mutex<Vec<Query>>,
}

impl ScriptedGateway {
  fn push(&self, answer: Answer) { self.answers.lock().unwrap().push_back(answer); }

  fn calls(&self) -> Vec<Query> { self.calls.lock().unwrap().clone() }
}

impl SearchGateway for ScriptedGateway {
  fn execute<'a>(
    &'a self,
    query: &'a Query,
    _session: &'a Session,
  ) -> impl Future<Output = Answer> + Send + 'a {
    self.calls.lock().unwrap().push(query.clone());
    let answer = self
      .answers
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Ok(SearchOutcome::empty()));
    ready(answer)
  }
}

#[derive(Default)]
struct RecordingAudit {
  lines: Mutex<Vec<String>>,
}

impl RecordingAudit {
  fn lines(&self) -> Vec<String> { self.lines.lock().unwrap().clone() }
}

impl AuditSink for RecordingAudit {
  fn notify(&self, session: &Session, message: &str) {
    self.lines.lock().unwrap().push(session.audit_line(message));
  }
}

struct Harness {
  gateway:     Arc<ScriptedGateway>,
  audit:       Arc<RecordingAudit>,
  coordinator: Coordinator<ScriptedGateway, RecordingAudit>,
}

fn harness() -> Harness {
  let gateway = Arc::new(ScriptedGateway::default());
  let audit = Arc::new(RecordingAudit::default());
  let session = Arc::new(Session {
    id:        "5e551011".into(),
    client_ip: "203.0.113.7".into(),
  });
  let coordinator =
    Coordinator::with_shared(Arc::clone(&gateway), Arc::clone(&audit), session);
  Harness {
    gateway,
    audit,
    coordinator,
  }
}

fn local(records: Vec<Record>) -> Answer {
  Ok(SearchOutcome {
    entries: records
      .into_iter()
      .map(|r| SourcedRecord::new(r, Some(SOURCE_LOCAL_COMPLETE)))
      .collect(),
  })
}

fn fetched(record: Record) -> Answer {
  Ok(SearchOutcome::single(SourcedRecord::new(record, Some(SOURCE_AUTHORITY))))
}

fn complete(id: &str) -> Record {
  Record::partial(id, "Juan", "Perez").with_birth("01/02/1990", "Asuncion")
}

fn name_search(h: &mut Harness, given: &str, surname: &str) {
  h.coordinator.switch_mode(Mode::Name);
  h.coordinator.form_mut().given = given.into();
  h.coordinator.form_mut().surname = surname.into();
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_identity_issues_no_request() {
  let mut h = harness();
  h.coordinator.form_mut().identity = "   ".into();

  let err = h.coordinator.search().await.unwrap_err();
  assert_eq!(err, SearchRejected::Invalid(ValidationError::EmptyIdentity));
  assert_eq!(
    h.coordinator.indicator(),
    &Indicator::Invalid(ValidationError::EmptyIdentity)
  );
  assert!(h.gateway.calls().is_empty());
  assert!(h.audit.lines().is_empty());
  assert!(!h.coordinator.is_busy());
}

#[tokio::test]
async fn empty_name_query_issues_no_request() {
  let mut h = harness();
  name_search(&mut h, " ", "");

  let err = h.coordinator.search().await.unwrap_err();
  assert_eq!(err, SearchRejected::Invalid(ValidationError::EmptyNameQuery));
  assert!(h.gateway.calls().is_empty());
}

// ─── Scenario A ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn partial_name_result_is_enriched_in_place() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![
    Record::partial("77", "Juana", "Rios").with_birth("x", "y"),
    Record::partial("123", "Juan", "Perez"),
    Record::partial("88", "Juan", "Diaz"),
  ]));

  assert_eq!(h.coordinator.search().await.unwrap(), Completion::Rendered);
  assert_eq!(h.gateway.calls()[0], Query::ByName {
    given:   "Juan".into(),
    surname: String::new(),
  });

  let View::Cards(cards) = h.coordinator.view() else {
    panic!("expected cards");
  };
  assert!(!cards[0].is_enrichable());
  assert_eq!(cards[1].enrich.as_deref(), Some("123"));

  let before = h.coordinator.results().clone();
  h.gateway.push(fetched(complete("123")));
  assert_eq!(h.coordinator.enrich("123").await.unwrap(), Completion::Enriched);

  assert_eq!(h.gateway.calls()[1], Query::ByIdentity {
    identity: "123".into()
  });
  assert_eq!(h.coordinator.mode(), Mode::Identity);
  assert_eq!(h.coordinator.form().identity, "123");

  let after = h.coordinator.results();
  assert_eq!(after.len(), 3);
  assert_eq!(after.records()[1], complete("123"));
  let others = |l: &crate::results::ResultList| {
    l.iter()
      .filter(|r| r.identity != "123")
      .cloned()
      .collect::<Vec<_>>()
  };
  assert_eq!(others(after), others(&before));
  assert_eq!(h.coordinator.indicator(), &Indicator::Hidden);

  // Identity mode never offers enrichment.
  let View::Cards(cards) = h.coordinator.view() else {
    panic!("expected cards");
  };
  assert!(cards.iter().all(|c| !c.is_enrichable()));

  let lines = h.audit.lines();
  assert!(lines.iter().any(|l| l.contains("incomplete, querying")));
  assert!(lines.iter().any(|l| l.contains("added for future searches")));
  assert!(lines.iter().all(|l| l.starts_with("203.0.113.7 (5e551011) - ")));
}

#[tokio::test]
async fn enrichment_with_incomplete_answer_is_not_found() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));
  h.coordinator.search().await.unwrap();

  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));
  assert_eq!(h.coordinator.enrich("123").await.unwrap(), Completion::NotFound);
  assert_eq!(h.coordinator.indicator(), &Indicator::NoResults);
  assert_eq!(h.coordinator.results().records(), &[Record::partial(
    "123", "Juan", "Perez"
  )]);
}

#[tokio::test]
async fn enrichment_with_no_record_is_not_found() {
  let mut h = harness();
  name_search(&mut h, "", "Perez");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));
  h.coordinator.search().await.unwrap();

  h.gateway.push(Ok(SearchOutcome::empty()));
  assert_eq!(h.coordinator.enrich("123").await.unwrap(), Completion::NotFound);
  assert_eq!(h.coordinator.results().len(), 1);
  assert!(h.audit.lines().iter().any(|l| l.ends_with("identity 123 not found")));
}

#[tokio::test]
async fn enrichment_failure_keeps_list_and_reports() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));
  h.coordinator.search().await.unwrap();
  let before = h.coordinator.results().clone();

  h.gateway.push(Err(GatewayError::Status(502)));
  assert_eq!(h.coordinator.enrich("123").await.unwrap(), Completion::Failed);
  assert_eq!(
    h.coordinator.indicator(),
    &Indicator::Error(ENRICHMENT_ERROR.into())
  );
  assert_eq!(h.coordinator.results(), &before);
  assert!(!h.coordinator.is_busy());
  assert!(h.audit.lines().iter().any(|l| l.contains("HTTP 502")));
}

#[tokio::test]
async fn complete_records_are_not_enrichable() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![complete("5")]));
  h.coordinator.search().await.unwrap();

  let err = h.coordinator.enrich("5").await.unwrap_err();
  assert_eq!(err, SearchRejected::NotEnrichable("5".into()));
  let err = h.coordinator.enrich("404").await.unwrap_err();
  assert_eq!(err, SearchRejected::NotEnrichable("404".into()));
  assert_eq!(h.gateway.calls().len(), 1);
}

// ─── Scenario B ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn identity_not_found_shows_empty_state() {
  let mut h = harness();
  h.coordinator.form_mut().identity = "999".into();
  h.gateway.push(Ok(SearchOutcome::empty()));

  assert_eq!(h.coordinator.search().await.unwrap(), Completion::NotFound);
  assert_eq!(h.coordinator.indicator(), &Indicator::NoResults);
  assert_eq!(h.coordinator.view(), View::NoResults);
  assert_eq!(h.gateway.calls(), vec![Query::ByIdentity {
    identity: "999".into()
  }]);
}

// ─── Scenario C ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_error_shows_generic_message_and_releases() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(Err(GatewayError::Status(500)));

  assert_eq!(h.coordinator.search().await.unwrap(), Completion::Failed);
  assert_eq!(h.coordinator.indicator(), &Indicator::Error(GENERIC_ERROR.into()));
  assert!(h.coordinator.results().is_empty());
  assert!(!h.coordinator.is_busy());
  assert_eq!(h.coordinator.phase(), &Phase::Idle);

  let lines = h.audit.lines();
  assert_eq!(lines.len(), 2);
  assert!(lines[0].ends_with("search: given name Juan surname -"));
  assert!(lines[1].contains("failed: backend returned HTTP 500"));
}

#[tokio::test]
async fn aborted_request_still_releases() {
  let mut h = harness();
  h.coordinator.form_mut().identity = "1".into();
  let dispatch = h.coordinator.begin_search().unwrap();
  assert!(h.coordinator.is_busy());
  assert_eq!(h.coordinator.phase().loading(), Some(Loading::Authority));

  let ticket = dispatch.ticket().clone();
  let done = Completed::aborted(ticket, "task panicked");
  assert_eq!(h.coordinator.complete(done), Completion::Failed);
  assert!(!h.coordinator.is_busy());
}

// ─── Scenario D ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn mode_switch_clears_inputs_and_results() {
  let mut h = harness();
  name_search(&mut h, "Juan", "Perez");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));
  h.coordinator.search().await.unwrap();
  h.coordinator.form_mut().identity = "leftover".into();

  h.coordinator.switch_mode(Mode::Identity);
  assert_eq!(h.coordinator.mode(), Mode::Identity);
  assert!(h.coordinator.form().identity.is_empty());
  assert!(h.coordinator.form().given.is_empty());
  assert!(h.coordinator.form().surname.is_empty());
  assert!(h.coordinator.results().is_empty());
  assert_eq!(h.coordinator.indicator(), &Indicator::Hidden);
}

#[tokio::test]
async fn mode_switch_mid_flight_drops_the_stale_answer() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));

  let dispatch = h.coordinator.begin_search().unwrap();
  assert_eq!(h.coordinator.phase(), &Phase::Searching(Loading::Local));

  h.coordinator.switch_mode(Mode::Identity);
  assert!(h.coordinator.results().is_empty());
  assert!(h.coordinator.is_busy());

  let done = dispatch.run().await;
  assert_eq!(h.coordinator.complete(done), Completion::Discarded);
  assert!(h.coordinator.results().is_empty());
  assert!(!h.coordinator.is_busy());
  assert_eq!(h.coordinator.phase(), &Phase::Idle);
}

#[tokio::test]
async fn mode_switch_mid_enrichment_drops_the_stale_answer() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));
  h.coordinator.search().await.unwrap();

  h.gateway.push(fetched(complete("123")));
  let dispatch = h.coordinator.begin_enrichment("123").unwrap();
  h.coordinator.switch_mode(Mode::Name);
  assert!(h.coordinator.results().is_empty());

  let done = dispatch.run().await;
  assert_eq!(h.coordinator.complete(done), Completion::Discarded);
  assert!(h.coordinator.results().is_empty());
  assert_eq!(h.coordinator.indicator(), &Indicator::Hidden);
  assert!(!h.coordinator.is_busy());
  assert_eq!(h.coordinator.phase(), &Phase::Idle);
}

#[tokio::test]
async fn clear_mid_flight_drops_the_stale_answer() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));

  let dispatch = h.coordinator.begin_search().unwrap();
  h.coordinator.clear();
  assert!(h.coordinator.is_busy());

  let done = dispatch.run().await;
  assert_eq!(h.coordinator.complete(done), Completion::Discarded);
  assert!(h.coordinator.results().is_empty());
  assert_eq!(h.coordinator.mode(), Mode::Name);
  assert!(!h.coordinator.is_busy());
}

#[tokio::test]
async fn clear_mid_enrichment_keeps_the_list_empty() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));
  h.coordinator.search().await.unwrap();

  h.gateway.push(fetched(complete("123")));
  let dispatch = h.coordinator.begin_enrichment("123").unwrap();
  h.coordinator.clear();

  let done = dispatch.run().await;
  assert_eq!(h.coordinator.complete(done), Completion::Discarded);
  assert!(h.coordinator.results().is_empty());
  assert!(h.coordinator.form().identity.is_empty());
  assert!(!h.coordinator.is_busy());
}

#[tokio::test]
async fn second_search_while_busy_is_rejected() {
  let mut h = harness();
  h.coordinator.form_mut().identity = "1".into();
  let _pending = h.coordinator.begin_search().unwrap();
  assert!(matches!(
    h.coordinator.begin_search(),
    Err(SearchRejected::Busy)
  ));
  assert!(matches!(
    h.coordinator.begin_enrichment("1"),
    Err(SearchRejected::Busy)
  ));
}

#[tokio::test]
async fn clear_resets_without_changing_mode() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![Record::partial("123", "Juan", "Perez")]));
  h.coordinator.search().await.unwrap();

  h.coordinator.clear();
  assert_eq!(h.coordinator.mode(), Mode::Name);
  assert!(h.coordinator.form().given.is_empty());
  assert!(h.coordinator.results().is_empty());
}

// ─── Scenario E ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn locally_complete_identity_is_rendered_once() {
  let mut h = harness();
  h.coordinator.form_mut().identity = " 456 ".into();
  h.gateway.push(local(vec![complete("456")]));

  assert_eq!(h.coordinator.search().await.unwrap(), Completion::Rendered);
  assert_eq!(h.coordinator.results().records(), &[complete("456")]);
  assert_eq!(h.gateway.calls().len(), 1);

  let lines = h.audit.lines();
  assert!(lines.iter().any(|l| l.ends_with("identity 456 already complete locally")));
  assert!(!lines.iter().any(|l| l.contains("added for future searches")));
}

#[tokio::test]
async fn authority_sourced_identity_is_audited_distinctly() {
  let mut h = harness();
  h.coordinator.form_mut().identity = "456".into();
  h.gateway.push(fetched(complete("456")));

  assert_eq!(h.coordinator.search().await.unwrap(), Completion::Rendered);
  let lines = h.audit.lines();
  assert!(lines.iter().any(|l| {
    l.ends_with("identity 456 added for future searches via the authority source")
  }));
  assert!(!lines.iter().any(|l| l.contains("already complete")));
}

#[tokio::test]
async fn new_search_replaces_list_wholesale() {
  let mut h = harness();
  name_search(&mut h, "Juan", "");
  h.gateway.push(local(vec![
    Record::partial("1", "Juan", "A"),
    Record::partial("2", "Juan", "B"),
  ]));
  h.coordinator.search().await.unwrap();
  assert_eq!(h.coordinator.results().len(), 2);

  h.coordinator.form_mut().given = "Ana".into();
  h.gateway.push(local(vec![Record::partial("3", "Ana", "C")]));
  h.coordinator.search().await.unwrap();
  let ids: Vec<_> = h
    .coordinator
    .results()
    .iter()
    .map(|r| r.identity.as_str())
    .collect();
  assert_eq!(ids, vec!["3"]);
}

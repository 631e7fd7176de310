use async_trait::async_trait;
use ecomonitor_core::{
    ApiKey, ChannelSink, ConfigStore, FetchError, FetchState, Notification, NotificationKind,
    PLACEHOLDER_CITY, Phase, RefreshWorkflow, WeatherFetcher, WeatherReport,
    notify::drain,
    provider::stub::StubProvider,
    workflow::{FETCH_FAILED_TITLE, KEY_UPDATED_TITLE},
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc::UnboundedReceiver;

/// Fetcher that records calls and replays queued results.
/// Falls back to the placeholder report when the queue is empty.
#[derive(Default)]
struct ScriptedFetcher {
    calls: Mutex<Vec<(String, ApiKey)>>,
    results: Mutex<VecDeque<Result<WeatherReport, FetchError>>>,
}

impl ScriptedFetcher {
    fn push(&self, result: Result<WeatherReport, FetchError>) {
        self.results.lock().unwrap().push_back(result);
    }

    fn calls(&self) -> Vec<(String, ApiKey)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherFetcher for ScriptedFetcher {
    async fn fetch(&self, city: &str, key: &ApiKey) -> Result<WeatherReport, FetchError> {
        self.calls.lock().unwrap().push((city.to_string(), key.clone()));
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(StubProvider::placeholder_report()))
    }
}

type Workflow = RefreshWorkflow<Arc<ScriptedFetcher>, ChannelSink>;

struct Harness {
    _dir: tempfile::TempDir,
    store: ConfigStore,
    fetcher: Arc<ScriptedFetcher>,
    workflow: Workflow,
    notes: UnboundedReceiver<Notification>,
}

fn harness(stored_key: Option<&str>) -> Harness {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = ConfigStore::at(dir.path().join("config.toml"));
    if let Some(key) = stored_key {
        store.save(&ApiKey::new(key));
    }

    let fetcher = Arc::new(ScriptedFetcher::default());
    let (sink, notes) = ChannelSink::channel();
    let workflow = RefreshWorkflow::new(store.clone(), fetcher.clone(), sink);

    Harness { _dir: dir, store, fetcher, workflow, notes }
}

fn report(city: &str, temperature_c: f64, humidity_pct: f64, conditions: &str) -> WeatherReport {
    WeatherReport {
        city: city.to_string(),
        temperature_c,
        humidity_pct,
        conditions: conditions.to_string(),
    }
}

#[tokio::test]
async fn no_stored_key_shows_nothing_and_does_not_fetch() {
    let mut h = harness(None);

    assert!(h.workflow.mount().await.is_none());

    assert_eq!(h.workflow.phase(), Phase::Idle);
    assert!(h.workflow.current_report().is_none());
    assert!(h.fetcher.calls().is_empty());
    assert!(drain(&mut h.notes).is_empty());
}

#[tokio::test]
async fn stored_key_triggers_exactly_one_fetch_on_mount() {
    let mut h = harness(Some("abc123"));
    let expected = report("CityName", 22.5, 57.0, "Clear sky");
    h.fetcher.push(Ok(expected.clone()));

    h.workflow.mount().await;

    assert_eq!(
        h.fetcher.calls(),
        vec![(PLACEHOLDER_CITY.to_string(), ApiKey::new("abc123"))]
    );
    assert_eq!(h.workflow.current_report(), Some(expected));
    assert!(drain(&mut h.notes).is_empty());
}

#[tokio::test]
async fn submitting_a_key_persists_it_and_fetches() {
    let mut h = harness(None);
    h.workflow.mount().await;

    h.workflow.edit_key("xyz");
    h.workflow.submit().await;

    assert_eq!(h.store.load().as_str(), "xyz");
    assert_eq!(h.fetcher.calls().len(), 1);
    assert_eq!(h.fetcher.calls()[0].1.as_str(), "xyz");

    let notes = drain(&mut h.notes);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Success);
    assert_eq!(notes[0].title, KEY_UPDATED_TITLE);
}

#[tokio::test]
async fn fetch_failure_is_notified_and_contained() {
    let mut h = harness(Some("abc123"));
    h.fetcher.push(Err(FetchError::new("connection reset")));

    let outcome = h.workflow.mount().await.expect("fetch attempted");

    assert!(matches!(outcome.state, FetchState::Failure(_)));
    assert_eq!(h.workflow.phase(), Phase::Idle);
    assert!(h.workflow.current_report().is_none());

    let notes = drain(&mut h.notes);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Failure);
    assert_eq!(notes[0].title, FETCH_FAILED_TITLE);
}

#[tokio::test]
async fn each_submission_fetches_and_notifies_in_order() {
    let mut h = harness(None);
    h.workflow.mount().await;

    // Second submission fails, so each note can be tied to its own fetch.
    h.fetcher.push(Ok(StubProvider::placeholder_report()));
    h.fetcher.push(Err(FetchError::new("invalid key")));

    let mut timeline = Vec::new();
    for key in ["K1", "K2"] {
        h.workflow.submit_key(key).await;
        let call = h.fetcher.calls().last().map(|(_, k)| k.clone());
        let notes: Vec<_> = drain(&mut h.notes).into_iter().map(|n| n.title).collect();
        timeline.push((call, notes));
    }

    assert_eq!(
        timeline,
        vec![
            (Some(ApiKey::new("K1")), vec![KEY_UPDATED_TITLE.to_string()]),
            (
                Some(ApiKey::new("K2")),
                vec![KEY_UPDATED_TITLE.to_string(), FETCH_FAILED_TITLE.to_string()]
            ),
        ]
    );
    assert_eq!(h.fetcher.calls().len(), 2);
}

#[tokio::test]
async fn resubmitting_the_same_key_fetches_again() {
    let h = harness(Some("same"));
    h.workflow.mount().await;

    h.workflow.submit().await;
    h.workflow.submit().await;

    assert_eq!(h.fetcher.calls().len(), 3);
    assert_eq!(h.store.load().as_str(), "same");
}

#[tokio::test]
async fn failure_keeps_previous_report() {
    let mut h = harness(Some("abc123"));
    let first = report("CityName", 22.5, 57.0, "Clear sky");
    h.fetcher.push(Ok(first.clone()));
    h.workflow.mount().await;

    h.fetcher.push(Err(FetchError::new("invalid key")));
    h.workflow.refresh().await;

    assert_eq!(h.workflow.current_report(), Some(first));
    let failures = drain(&mut h.notes).into_iter().filter(|n| n.is_failure()).count();
    assert_eq!(failures, 1);
}

#[tokio::test]
async fn success_replaces_report_entirely() {
    let h = harness(Some("abc123"));
    h.fetcher.push(Ok(report("CityName", 22.5, 57.0, "Clear sky")));
    h.workflow.mount().await;

    let second = report("Elsewhere", -4.0, 90.0, "Snow");
    h.fetcher.push(Ok(second.clone()));
    h.workflow.refresh().await;

    assert_eq!(h.workflow.current_report(), Some(second));
}

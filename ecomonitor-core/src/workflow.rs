//! Refresh workflow: keeps the held API key, the displayed weather report and
//! the notification stream consistent with each other.
//!
//! All mutable session state lives in one [`RefreshWorkflow`]; callers read it
//! through accessors. Fetches are numbered in issue order and a successful
//! result is only displayed if no newer result has been displayed already, so
//! a slow response can never overwrite a fresher one.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

use crate::{
    config::ConfigStore,
    error::FetchError,
    model::{ApiKey, PLACEHOLDER_CITY, WeatherReport},
    notify::{Notification, NotificationSink},
    provider::WeatherFetcher,
};

pub const KEY_UPDATED_TITLE: &str = "API Key Updated";
pub const KEY_UPDATED_DETAIL: &str = "Your API key has been updated successfully.";
pub const FETCH_FAILED_TITLE: &str = "Failed to fetch weather data";
pub const FETCH_FAILED_DETAIL: &str = "Please check your API key and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Key not loaded yet.
    Uninitialized,
    Idle,
    /// At least one fetch in flight.
    Fetching,
}

/// State of a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Pending,
    Success(WeatherReport),
    Failure(FetchError),
}

/// Handle for an issued fetch. Resolve it with [`RefreshWorkflow::resolve`].
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
    key: ApiKey,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn key(&self) -> &ApiKey {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub seq: u64,
    pub state: FetchState,
    /// Whether the result replaced the displayed report.
    pub applied: bool,
}

#[derive(Debug, Default)]
struct Session {
    mounted: bool,
    key: ApiKey,
    report: Option<WeatherReport>,
    next_seq: u64,
    applied_seq: u64,
    in_flight: usize,
    latest: Option<(u64, FetchState)>,
}

pub struct RefreshWorkflow<F, N> {
    store: ConfigStore,
    fetcher: F,
    sink: N,
    city: String,
    session: Mutex<Session>,
}

impl<F, N> RefreshWorkflow<F, N>
where
    F: WeatherFetcher,
    N: NotificationSink,
{
    pub fn new(store: ConfigStore, fetcher: F, sink: N) -> Self {
        Self {
            store,
            fetcher,
            sink,
            city: PLACEHOLDER_CITY.to_string(),
            session: Mutex::new(Session::default()),
        }
    }

    /// City passed to the fetcher; defaults to [`PLACEHOLDER_CITY`].
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Load the stored key and, if there is one, fetch once.
    ///
    /// Only the first call does anything.
    pub async fn mount(&self) -> Option<FetchOutcome> {
        let key = {
            // Check and mark under one guard so concurrent mounts fetch once.
            let mut session = self.session();
            if session.mounted {
                debug!("Workflow already mounted");
                return None;
            }
            session.mounted = true;
            session.key = self.store.load();
            session.key.clone()
        };

        if key.is_empty() {
            debug!("No stored API key; skipping initial fetch");
            return None;
        }

        debug!(key = %key.redacted(), "Loaded stored API key");
        Some(self.run(key).await)
    }

    /// Change the held key without saving or fetching.
    pub fn edit_key(&self, key: impl Into<ApiKey>) {
        self.session().key = key.into();
    }

    /// Save the held key, then fetch with it.
    ///
    /// Emits the "key updated" notification as soon as the fetch has been
    /// issued, independent of how the fetch ends.
    pub async fn submit(&self) -> FetchOutcome {
        let key = self.api_key();
        self.store.save(&key);

        let ticket = self.issue(key);
        self.sink
            .notify(Notification::success(KEY_UPDATED_TITLE, KEY_UPDATED_DETAIL));

        self.complete(ticket).await
    }

    pub async fn submit_key(&self, key: impl Into<ApiKey>) -> FetchOutcome {
        self.edit_key(key);
        self.submit().await
    }

    /// Fetch again with the held key.
    pub async fn refresh(&self) -> FetchOutcome {
        let key = self.api_key();
        self.run(key).await
    }

    /// Start a fetch with `key` and return its ticket.
    pub fn issue(&self, key: ApiKey) -> FetchTicket {
        let mut session = self.session();
        session.next_seq += 1;
        session.in_flight += 1;

        let seq = session.next_seq;
        session.latest = Some((seq, FetchState::Pending));
        debug!(seq, in_flight = session.in_flight, "Fetch issued");

        FetchTicket { seq, key }
    }

    /// Apply the result of the fetch identified by `ticket`.
    pub fn resolve(
        &self,
        ticket: FetchTicket,
        result: Result<WeatherReport, FetchError>,
    ) -> FetchOutcome {
        let seq = ticket.seq;
        let mut session = self.session();
        session.in_flight = session.in_flight.saturating_sub(1);

        let (state, applied) = match result {
            Ok(report) => {
                let applied = seq > session.applied_seq;
                if applied {
                    session.applied_seq = seq;
                    session.report = Some(report.clone());
                    debug!(seq, city = %report.city, "Weather report updated");
                } else {
                    debug!(seq, newest = session.applied_seq, "Discarding stale weather report");
                }
                (FetchState::Success(report), applied)
            }
            Err(err) => {
                error!(seq, error = %err, "Failed to fetch weather data");
                (FetchState::Failure(err), false)
            }
        };

        if matches!(session.latest, Some((latest, _)) if latest == seq) {
            session.latest = Some((seq, state.clone()));
        }
        drop(session);

        if matches!(state, FetchState::Failure(_)) {
            self.sink
                .notify(Notification::failure(FETCH_FAILED_TITLE, FETCH_FAILED_DETAIL));
        }

        FetchOutcome { seq, state, applied }
    }

    pub fn phase(&self) -> Phase {
        let session = self.session();
        if session.in_flight > 0 {
            Phase::Fetching
        } else if session.mounted {
            Phase::Idle
        } else {
            Phase::Uninitialized
        }
    }

    pub fn api_key(&self) -> ApiKey {
        self.session().key.clone()
    }

    /// Report currently on display, if any.
    pub fn current_report(&self) -> Option<WeatherReport> {
        self.session().report.clone()
    }

    pub fn in_flight(&self) -> usize {
        self.session().in_flight
    }

    /// State of the most recently issued fetch.
    pub fn latest_fetch(&self) -> Option<FetchState> {
        self.session().latest.as_ref().map(|(_, state)| state.clone())
    }

    async fn run(&self, key: ApiKey) -> FetchOutcome {
        let ticket = self.issue(key);
        self.complete(ticket).await
    }

    async fn complete(&self, ticket: FetchTicket) -> FetchOutcome {
        // No session lock across this await.
        let result = self.fetcher.fetch(&self.city, &ticket.key).await;
        self.resolve(ticket, result)
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Core library for the EcoMonitor dashboard.
//!
//! This crate defines:
//! - Persistence of the weather API key
//! - Abstraction over weather providers, plus the local sensor client
//! - The refresh workflow tying key changes to fetches and notifications
//! - Shared domain models and their text rendering
//!
//! It is used by `ecomonitor-cli`, but can also be reused by other front-ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod notify;
pub mod provider;
pub mod sensor;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use config::{API_KEY_STORAGE_NAME, ConfigStore};
pub use dashboard::Dashboard;
pub use error::FetchError;
pub use model::{ApiKey, BuzzerTimer, PLACEHOLDER_CITY, SensorReading, WeatherReport};
pub use notify::{ChannelSink, Notification, NotificationKind, NotificationSink};
pub use provider::{ProviderId, WeatherFetcher, provider_from_id};
pub use sensor::LocalDataClient;
pub use workflow::{FetchOutcome, FetchState, FetchTicket, Phase, RefreshWorkflow};

//! Client for the local sensor server.
//!
//! Not wired into the refresh workflow; the dashboard asks for a reading
//! explicitly and shows "N/A" when none is available.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::error;

use crate::model::SensorReading;

pub const DEFAULT_LOCAL_URL: &str = "http://localhost:3001";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct LocalDataClient {
    base_url: String,
    http: Client,
}

impl Default for LocalDataClient {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_URL)
    }
}

impl LocalDataClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/data", self.base_url.trim_end_matches('/'))
    }

    /// Latest reading, or `None` if the server could not be reached or
    /// answered with something unusable.
    pub async fn fetch(&self) -> Option<SensorReading> {
        match self.try_fetch().await {
            Ok(reading) => Some(reading),
            Err(err) => {
                let error = format!("{err:#}");
                error!(%error, "Error fetching local data");
                None
            }
        }
    }

    async fn try_fetch(&self) -> Result<SensorReading> {
        let url = self.endpoint();

        let res = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?
            .error_for_status()
            .context("Local server returned an error status")?;

        res.json::<SensorReading>()
            .await
            .context("Failed to parse local sensor JSON")
    }
}

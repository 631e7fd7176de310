use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::FetchError,
    model::{ApiKey, PLACEHOLDER_CITY, WeatherReport},
};

use super::WeatherFetcher;

/// Offline provider returning a fixed report.
///
/// Neither the requested city nor the key are looked at; an empty key still
/// yields a report.
#[derive(Debug, Clone, Default)]
pub struct StubProvider;

impl StubProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn placeholder_report() -> WeatherReport {
        WeatherReport {
            city: PLACEHOLDER_CITY.to_string(),
            temperature_c: 22.5,
            humidity_pct: 57.0,
            conditions: "Clear sky".to_string(),
        }
    }
}

#[async_trait]
impl WeatherFetcher for StubProvider {
    async fn fetch(&self, city: &str, key: &ApiKey) -> Result<WeatherReport, FetchError> {
        debug!(requested_city = city, key = %key.redacted(), "Serving placeholder weather");
        Ok(Self::placeholder_report())
    }
}

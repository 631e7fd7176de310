use crate::{
    error::FetchError,
    model::{ApiKey, WeatherReport},
    provider::{openweather::OpenWeatherProvider, stub::StubProvider},
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod openweather;
pub mod stub;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderId {
    #[default]
    Stub,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Stub => "stub",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Stub, ProviderId::OpenWeather]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "stub" => Ok(ProviderId::Stub),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: stub, openweather."
            )),
        }
    }
}

/// Source of weather reports.
///
/// Every failure, whatever its cause, is reported as a [`FetchError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch(&self, city: &str, key: &ApiKey) -> Result<WeatherReport, FetchError>;
}

#[async_trait]
impl<T: WeatherFetcher + ?Sized> WeatherFetcher for Box<T> {
    async fn fetch(&self, city: &str, key: &ApiKey) -> Result<WeatherReport, FetchError> {
        (**self).fetch(city, key).await
    }
}

#[async_trait]
impl<T: WeatherFetcher + ?Sized> WeatherFetcher for Arc<T> {
    async fn fetch(&self, city: &str, key: &ApiKey) -> Result<WeatherReport, FetchError> {
        (**self).fetch(city, key).await
    }
}

/// Construct a provider from its id.
pub fn provider_from_id(id: ProviderId) -> Box<dyn WeatherFetcher> {
    match id {
        ProviderId::Stub => Box::new(StubProvider::new()),
        ProviderId::OpenWeather => Box::new(OpenWeatherProvider::new()),
    }
}

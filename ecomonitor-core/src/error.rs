use thiserror::Error;

/// The one failure kind surfaced by a weather fetch.
///
/// Invalid keys, rate limits, network errors and malformed bodies all collapse
/// into this error; `reason` is kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch weather data: {reason}")]
pub struct FetchError {
    reason: String,
}

impl FetchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        // Alternate format keeps the whole context chain on one line.
        Self::new(format!("{err:#}"))
    }
}

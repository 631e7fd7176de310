use serde::{Deserialize, Serialize};
use std::fmt;

/// City requested by the dashboard; the location picker never made it into the UI.
pub const PLACEHOLDER_CITY: &str = "CityName";

/// Opaque credential for the weather provider. Empty means "not configured".
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short form safe to print or log.
    pub fn redacted(&self) -> String {
        if self.0.is_empty() {
            return "<empty>".to_string();
        }

        let visible: String = self.0.chars().take(3).collect();
        if self.0.chars().count() > 6 {
            format!("{visible}***")
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.redacted()).finish()
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Snapshot returned by a successful fetch. Replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub conditions: String,
}

/// Reading served by the local sensor endpoint (`/api/data`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "temperature")]
    pub temperature_c: f64,
    #[serde(rename = "humidity")]
    pub humidity_pct: f64,
    pub city: String,
    pub conditions: String,
    pub buzzer: bool,
}

/// Buzzer timer as minutes since midnight, clamped to `0..=1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BuzzerTimer(u16);

impl BuzzerTimer {
    pub const MAX_MINUTES: u16 = 1440;

    pub fn new(minutes: i64) -> Self {
        Self(minutes.clamp(0, i64::from(Self::MAX_MINUTES)) as u16)
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for BuzzerTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

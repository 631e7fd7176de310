//! Plain-text rendering of the dashboard cards.

use std::fmt;

use crate::model::{BuzzerTimer, SensorReading, WeatherReport};

pub const NOT_AVAILABLE: &str = "N/A";
pub const LOADING_WEATHER: &str = "Loading weather data...";

pub fn sensor_card(reading: Option<&SensorReading>) -> Vec<String> {
    match reading {
        Some(r) => vec![
            format!("Temperature: {}°C", r.temperature_c),
            format!("Humidity: {}%", r.humidity_pct),
            format!("Buzzer: {}", if r.buzzer { "on" } else { "off" }),
        ],
        None => vec![
            format!("Temperature: {NOT_AVAILABLE}"),
            format!("Humidity: {NOT_AVAILABLE}"),
        ],
    }
}

pub fn weather_card(report: Option<&WeatherReport>) -> Vec<String> {
    match report {
        Some(r) => vec![
            format!("City: {}", r.city),
            format!("Temperature: {}°C", r.temperature_c),
            format!("Humidity: {}%", r.humidity_pct),
            format!("Conditions: {}", r.conditions),
        ],
        None => vec![LOADING_WEATHER.to_string()],
    }
}

pub fn timer_card(timer: BuzzerTimer) -> Vec<String> {
    vec![format!("Timer: {timer}")]
}

/// Everything shown on one screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dashboard<'a> {
    pub sensor: Option<&'a SensorReading>,
    pub weather: Option<&'a WeatherReport>,
    pub timer: BuzzerTimer,
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards = [
            ("Sensor Data", sensor_card(self.sensor)),
            ("Weather Forecast", weather_card(self.weather)),
            ("Buzzer Timer Setting", timer_card(self.timer)),
        ];

        for (idx, (title, lines)) in cards.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{title}")?;
            for line in lines {
                writeln!(f, "  {line}")?;
            }
        }

        Ok(())
    }
}

//! Reading types shared by every analysis stage.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Physical quantities recorded by the station sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorType {
    /// Air temperature in °C
    Temperature,
    /// Relative humidity in %
    Humidity,
}

impl SensorType {
    /// Get the display unit for this sensor
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
        }
    }

    /// Get the display label for this sensor
    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
        }
    }
}

/// A reading exactly as supplied by the feed.
///
/// `datetime` uses the short `"MM/DD HH:MM"` form with no year, e.g. `"12/23 18:30"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub datetime: String,
    pub temperature: f64,
    pub humidity: f64,
}

impl RawRecord {
    pub fn new(datetime: impl Into<String>, temperature: f64, humidity: f64) -> Self {
        Self {
            datetime: datetime.into(),
            temperature,
            humidity,
        }
    }
}

/// A parsed, typed reading in station-local time.
///
/// Samples are created by the ingester and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: f64,
    pub humidity: f64,
}

impl Sample {
    pub const fn new(timestamp: DateTime<FixedOffset>, temperature: f64, humidity: f64) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
        }
    }

    /// Get the value recorded for a given sensor
    pub const fn value(&self, sensor: SensorType) -> f64 {
        match sensor {
            SensorType::Temperature => self.temperature,
            SensorType::Humidity => self.humidity,
        }
    }
}

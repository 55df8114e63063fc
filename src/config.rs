//! Station configuration passed explicitly into every analysis entry point.

use core::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Environment variable overriding [`AnalysisConfig::utc_offset_hours`]
pub const ENV_UTC_OFFSET_HOURS: &str = "THERMO_UTC_OFFSET_HOURS";
/// Environment variable overriding [`Location::latitude`]
pub const ENV_LATITUDE: &str = "THERMO_LATITUDE";
/// Environment variable overriding [`Location::longitude`]
pub const ENV_LONGITUDE: &str = "THERMO_LONGITUDE";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("UTC offset out of range: {0} hours")]
    OffsetOutOfRange(i32),
    #[error("Failed to load .env file: {0}")]
    DotEnv(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        // Katsushika, Tokyo
        Self {
            latitude: 35.7727,
            longitude: 139.8680,
        }
    }
}

/// Tunable limits used by the analysis stages.
///
/// Lags and horizons are expressed in sample positions, which equal minutes
/// only while the feed keeps its nominal one-sample-per-minute cadence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Positions between the two samples compared by the rapid-change scan
    pub rapid_change_lag: usize,
    /// Minimum absolute change (°C) that counts as a rapid change
    pub rapid_change_min_delta: f64,
    /// Number of most recent rapid-change events to report
    pub rapid_change_retained: usize,
    /// Minimum samples in the trailing hour before acceleration is computed
    pub acceleration_min_samples: usize,
    /// Acceleration magnitude (°C) separating "stable" from accelerating
    pub acceleration_threshold: f64,
    /// Minimum samples in the trailing hour before a forecast is computed
    pub forecast_min_samples: usize,
    /// Positions past the end of the trailing hour the forecast extrapolates
    pub forecast_horizon: usize,
    /// Half-width of the day-over-day lookup window in minutes
    pub yesterday_tolerance_minutes: i64,
    /// Number of most recent calendar days kept in the daily rollup
    pub daily_retained: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rapid_change_lag: 30,
            rapid_change_min_delta: 2.0,
            rapid_change_retained: 3,
            acceleration_min_samples: 30,
            acceleration_threshold: 0.3,
            forecast_min_samples: 10,
            forecast_horizon: 60,
            yesterday_tolerance_minutes: 30,
            daily_retained: 7,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    /// Offset of station-local time from UTC, in whole hours
    pub utc_offset_hours: i32,
    pub location: Location,
    pub thresholds: Thresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 9,
            location: Location::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Build a configuration from the process environment, honouring a `.env` file.
    ///
    /// Unset variables keep their defaults. A variable that is set but cannot be
    /// parsed is reported rather than ignored, and so is a `.env` file that
    /// exists but cannot be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        check_dotenv(dotenvy::dotenv())?;

        let mut config = Self::default();
        if let Some(hours) = read_var::<i32>(ENV_UTC_OFFSET_HOURS)? {
            config.utc_offset_hours = hours;
        }
        if let Some(latitude) = read_var::<f64>(ENV_LATITUDE)? {
            config.location.latitude = latitude;
        }
        if let Some(longitude) = read_var::<f64>(ENV_LONGITUDE)? {
            config.location.longitude = longitude;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configured offset maps to a real timezone offset
    pub fn validate(&self) -> Result<(), ConfigError> {
        offset_from_hours(self.utc_offset_hours)
            .map(|_| ())
            .ok_or(ConfigError::OffsetOutOfRange(self.utc_offset_hours))
    }

    /// Station-local timezone.
    ///
    /// Falls back to UTC when the configured offset is out of range.
    pub fn timezone(&self) -> FixedOffset {
        offset_from_hours(self.utc_offset_hours).unwrap_or_else(|| {
            log::warn!(
                "UTC offset {}h out of range, using UTC",
                self.utc_offset_hours
            );
            Utc.fix()
        })
    }
}

fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
}

/// Accept a missing `.env` file, reject one that exists but cannot be loaded
fn check_dotenv<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e.to_string())),
    }
}

fn read_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => parse_value(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().local_minus_utc(), 9 * 3600);
        assert_eq!(config.thresholds.rapid_change_lag, 30);
    }

    #[test]
    fn test_out_of_range_offset() {
        let config = AnalysisConfig {
            utc_offset_hours: 30,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::OffsetOutOfRange(30)));
        assert_eq!(config.timezone().local_minus_utc(), 0);
    }

    #[test]
    fn test_missing_dotenv_is_accepted() {
        let result = dotenvy::from_filename("thermo-rs-no-such-file.env");
        assert_eq!(check_dotenv(result), Ok(()));
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let result = dotenvy::from_read("'unterminated\nTHERMO_TEST_UNUSED=5\n".as_bytes());
        assert!(matches!(check_dotenv(result), Err(ConfigError::DotEnv(_))));
        assert!(std::env::var("THERMO_TEST_UNUSED").is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<f64>(ENV_LATITUDE, " 35.5 "), Ok(35.5));
        assert_eq!(
            parse_value::<i32>(ENV_UTC_OFFSET_HOURS, "nine"),
            Err(ConfigError::InvalidValue {
                name: ENV_UTC_OFFSET_HOURS,
                value: "nine".into(),
            })
        );
    }
}

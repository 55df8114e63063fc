//! Desktop harness for the thermo-rs analysis core.
//!
//! Generates a synthetic, feed-formatted temperature/humidity history ending
//! at the current time, runs the full analysis over it, computes feels-like
//! values for the latest reading and a mock forecast reading, and prints the
//! result as JSON on stdout.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info thermo-simulator [minutes]
//! ```
//!
//! `minutes` is the history length at one record per minute (default: one
//! week). Station settings are read from `THERMO_*` environment variables or a
//! `.env` file.

use std::process::ExitCode;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use log::{error, info, warn};
use serde::Serialize;

use thermo_rs::config::AnalysisConfig;
use thermo_rs::{Analysis, ComfortReading, RawRecord, analyze};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default history length: one week of per-minute records
const DEFAULT_HISTORY_MINUTES: usize = 7 * 24 * 60;

/// Largest history the feed is known to deliver
const MAX_HISTORY_MINUTES: usize = 12_000;

/// Every this many records, emit one the feed garbled
const GARBLED_EVERY: usize = 997;

/// Mock 10 m wind speed for the current reading (m/s)
const MOCK_WIND_SPEED_10M: f64 = 3.5;

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Generates synthetic feed records that vary over time.
struct MockFeedGenerator {
    end: DateTime<FixedOffset>,
}

impl MockFeedGenerator {
    fn new(end: DateTime<FixedOffset>) -> Self {
        Self { end }
    }

    /// Temperature: 10 °C ± 4 daily cycle, a slower weather swing and a
    /// short ripple
    fn temperature(minute: f64) -> f64 {
        let day = core::f64::consts::TAU * minute / 1440.0;
        10.0 - 4.0 * (day - 0.6).cos() + 1.5 * (minute / 2900.0).sin() + 0.3 * (minute / 17.0).cos()
    }

    /// Humidity: 60 % moving against temperature
    fn humidity(minute: f64) -> f64 {
        let day = core::f64::consts::TAU * minute / 1440.0;
        (60.0 + 15.0 * (day - 0.6).cos() + 3.0 * (minute / 23.0).sin()).clamp(5.0, 100.0)
    }

    /// Generate `count` records one minute apart, ending at the generator's end time.
    fn generate_history(&self, count: usize) -> Vec<RawRecord> {
        (0..count)
            .map(|i| {
                let minutes_back = (count - 1 - i) as i64;
                let ts = self.end - TimeDelta::minutes(minutes_back);
                let minute = (ts.timestamp() / 60) as f64;

                let datetime = if i > 0 && i % GARBLED_EVERY == 0 {
                    "--/-- --:--".to_string()
                } else {
                    ts.format("%m/%d %H:%M").to_string()
                };

                RawRecord::new(datetime, Self::temperature(minute), Self::humidity(minute))
            })
            .collect()
    }
}

/// Everything printed on stdout
#[derive(Serialize)]
struct Report<'a> {
    analysis: &'a Analysis,
    feels_like: f64,
    surface_wind_speed: f64,
}

/// History length from the first argument, or the offending argument if it is not a number
fn history_minutes(arg: Option<String>) -> Result<usize, String> {
    let Some(arg) = arg else {
        return Ok(DEFAULT_HISTORY_MINUTES);
    };
    let Ok(minutes) = arg.parse::<usize>() else {
        return Err(arg);
    };
    if minutes > MAX_HISTORY_MINUTES {
        warn!("History of {} minutes capped at {}", minutes, MAX_HISTORY_MINUTES);
    }
    Ok(minutes.min(MAX_HISTORY_MINUTES))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::init();
    info!("Starting thermo-rs simulator");

    let config = match AnalysisConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Station at {:.4}, {:.4} (UTC{:+})",
        config.location.latitude, config.location.longitude, config.utc_offset_hours
    );

    let now = Utc::now().with_timezone(&config.timezone());
    let minutes = match history_minutes(std::env::args().nth(1)) {
        Ok(minutes) => minutes,
        Err(arg) => {
            error!("Invalid history length {:?}, expected a number of minutes", arg);
            return ExitCode::FAILURE;
        }
    };
    let records = MockFeedGenerator::new(now).generate_history(minutes);
    info!("Generated {} records", records.len());

    let analysis = analyze(&records, now, &config);

    let Analysis::Ready(result) = &analysis else {
        error!("No analysis produced: {:?}", analysis);
        return ExitCode::FAILURE;
    };

    let current = ComfortReading::new(
        result.current.temperature,
        result.current.humidity,
        MOCK_WIND_SPEED_10M,
    );
    info!(
        "Current {:.1}°C / {:.0}% with {:.1} m/s surface wind feels like {:.1}°C",
        current.temperature,
        current.humidity,
        current.surface_wind_speed(),
        current.apparent_temperature()
    );

    if let Some(forecast) = result.trends.forecast {
        let reading =
            ComfortReading::new(forecast.predicted_temp, current.humidity, MOCK_WIND_SPEED_10M);
        info!(
            "Forecast {:.1}°C ({:+.1}) feels like {:.1}°C",
            forecast.predicted_temp,
            forecast.predicted_change,
            reading.apparent_temperature()
        );
    }

    let report = Report {
        analysis: &analysis,
        feels_like: current.apparent_temperature(),
        surface_wind_speed: current.surface_wind_speed(),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            info!("Simulator exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize analysis: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! Host-side analysis core for thermo-rs
//!
//! This crate turns a snapshot of timestamped temperature/humidity readings
//! into a statistical and pattern summary (statistics, trends, time-of-day
//! patterns, rapid-change anomalies, daily rollups), and provides the
//! segmented apparent-temperature model used for individual readings.
//!
//! Every entry point is a pure function of its inputs plus an explicit
//! [`config::AnalysisConfig`]. Nothing is cached between calls.

pub mod analysis;
pub mod comfort;
pub mod config;
pub mod history;
pub mod metrics;
pub mod sensors;

pub use analysis::{Analysis, AnalysisResult, NoDataReason, analyze};
pub use comfort::{ComfortReading, apparent_temperature};
pub use config::AnalysisConfig;
pub use sensors::{RawRecord, Sample};

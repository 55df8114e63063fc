//! Whole-history analysis pipeline
//!
//! Raw records are ingested once, then every stage reads the same ordered,
//! immutable sample slice. The result is a pure function of the records, the
//! reference time and the configuration.

pub mod anomaly;
pub mod pattern;
pub mod stats;
pub mod trend;

pub use anomaly::{Anomalies, RapidChange};
pub use pattern::{Patterns, SlotAverage, WeekdayAverage};
pub use stats::Statistics;
pub use trend::{Acceleration, Forecast, Trends};

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::history::{
    DailySummary, Last24Hours, TierSamples, WeeklyTrend, daily_rollups, ingest,
};
use crate::sensors::{RawRecord, Sample};

/// Why an analysis produced no result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataReason {
    /// No records were supplied
    EmptyInput,
    /// Records were supplied but none had a usable timestamp and values
    NoValidTimestamps,
}

impl NoDataReason {
    /// Get the display label for this reason
    pub const fn label(self) -> &'static str {
        match self {
            Self::EmptyInput => "No data available",
            Self::NoValidTimestamps => "No valid timestamped data",
        }
    }
}

/// Counts describing the ingested history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_records: usize,
    pub dropped_records: usize,
    /// Samples in the 0-6h tier before capping
    pub recent_count: usize,
    /// Samples kept from the 6-24h tier after striding
    pub intraday_count: usize,
    /// Samples kept from the 1-7d tier after striding
    pub week_count: usize,
}

/// Everything derived from one snapshot of the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Reference time the analysis was computed against, in station time
    pub generated_at: DateTime<FixedOffset>,
    /// The most recent sample
    pub current: Sample,
    pub summary: DataSummary,
    pub statistics: Statistics,
    pub trends: Trends,
    pub patterns: Patterns,
    pub anomalies: Anomalies,
    /// Up to the configured number of most recent days, oldest first
    pub daily_summary: Vec<DailySummary>,
    pub weekly_trend: Option<WeeklyTrend>,
    /// Extremes and net changes over the trailing 24 hours
    pub last_24h: Option<Last24Hours>,
    pub tiers: TierSamples,
}

/// Outcome of [`analyze`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Analysis {
    NoData { reason: NoDataReason },
    Ready(Box<AnalysisResult>),
}

impl Analysis {
    /// Get the result, if there was enough data to produce one
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Ready(result) => Some(result),
            Self::NoData { .. } => None,
        }
    }
}

/// Run the full pipeline over a snapshot of raw records.
///
/// `now` may be in any timezone; it is converted to station time first. This
/// never fails: stages that lack enough data leave their fields empty, and an
/// input with no usable record yields [`Analysis::NoData`].
pub fn analyze<Tz: TimeZone>(
    records: &[RawRecord],
    now: DateTime<Tz>,
    config: &AnalysisConfig,
) -> Analysis {
    if records.is_empty() {
        warn!("Analysis skipped: {}", NoDataReason::EmptyInput.label());
        return Analysis::NoData {
            reason: NoDataReason::EmptyInput,
        };
    }

    let now = now.with_timezone(&config.timezone());
    let history = ingest(records, now);
    let samples = history.samples.as_slice();

    let (Some(current), Some(statistics)) =
        (samples.last().copied(), Statistics::from_samples(samples))
    else {
        warn!(
            "Analysis skipped: {} ({} records dropped)",
            NoDataReason::NoValidTimestamps.label(),
            history.dropped
        );
        return Analysis::NoData {
            reason: NoDataReason::NoValidTimestamps,
        };
    };

    let thresholds = &config.thresholds;
    let tiers = TierSamples::partition(samples, now);
    let trends = Trends::from_samples(samples, now, thresholds);
    let patterns = Patterns::from_samples(
        samples,
        now,
        TimeDelta::minutes(thresholds.yesterday_tolerance_minutes),
    );
    let anomalies = Anomalies::detect(samples, statistics.current_z_score, thresholds);
    let daily_summary = daily_rollups(samples, thresholds.daily_retained);
    let weekly_trend = WeeklyTrend::from_days(&daily_summary);
    let last_24h = Last24Hours::from_samples(samples, now);

    let summary = DataSummary {
        total_records: samples.len(),
        dropped_records: history.dropped,
        recent_count: tiers.recent_total,
        intraday_count: tiers.intraday.len(),
        week_count: tiers.week.len(),
    };

    info!(
        "Analyzed {} samples: current {:.1}°C, z={:.2} ({}), {} rapid changes, {} days",
        summary.total_records,
        current.temperature,
        statistics.current_z_score,
        anomalies.current_status.label(),
        anomalies.rapid_changes.len(),
        daily_summary.len()
    );

    Analysis::Ready(Box::new(AnalysisResult {
        generated_at: now,
        current,
        summary,
        statistics,
        trends,
        patterns,
        anomalies,
        daily_summary,
        weekly_trend,
        last_24h,
        tiers,
    }))
}

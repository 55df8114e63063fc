//! Per-calendar-day rollups, the week-over-week view built from them, and a
//! summary of the trailing 24 hours.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::analysis::stats::mean;
use crate::analysis::trend::trailing_window;
use crate::sensors::{Sample, SensorType};

/// Aggregated temperature for one local calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub avg: f64,
    /// `high - low`
    pub range: f64,
    /// Number of samples recorded that day
    pub count: usize,
}

impl DailySummary {
    /// Calculates a rollup from the samples of a single day.
    ///
    /// Returns None if the samples slice is empty.
    pub fn from_samples(date: NaiveDate, samples: &[Sample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sum = 0.0;
        let mut low = f64::INFINITY;
        let mut high = f64::NEG_INFINITY;

        for sample in samples {
            sum += sample.temperature;
            low = low.min(sample.temperature);
            high = high.max(sample.temperature);
        }

        Some(Self {
            date,
            high,
            low,
            avg: sum / samples.len() as f64,
            range: high - low,
            count: samples.len(),
        })
    }
}

/// Group samples by local calendar date and keep the `retain` most recent days.
///
/// The result is sorted ascending by date.
pub fn daily_rollups(samples: &[Sample], retain: usize) -> Vec<DailySummary> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Sample>> = BTreeMap::new();
    for sample in samples {
        by_date
            .entry(sample.timestamp.date_naive())
            .or_default()
            .push(*sample);
    }

    let skip = by_date.len().saturating_sub(retain);
    by_date
        .iter()
        .skip(skip)
        .filter_map(|(date, day)| DailySummary::from_samples(*date, day))
        .collect()
}

/// Week-level view over the daily rollups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTrend {
    pub week_high: f64,
    pub week_low: f64,
    pub avg_high: f64,
    pub avg_low: f64,
    pub avg_range: f64,
    /// Mean high of the last 3 days minus the mean high of the earlier days
    pub temp_trend: Option<f64>,
    /// Same comparison over the daily ranges
    pub range_trend: Option<f64>,
}

/// Minimum number of days before recent-vs-earlier trends are reported
const TREND_MIN_DAYS: usize = 5;

/// Number of trailing days treated as "recent" in the trend comparison
const TREND_RECENT_DAYS: usize = 3;

impl WeeklyTrend {
    /// Calculates the weekly view from ascending daily rollups.
    ///
    /// Returns None if there are no days.
    pub fn from_days(days: &[DailySummary]) -> Option<Self> {
        if days.is_empty() {
            return None;
        }

        let highs: Vec<f64> = days.iter().map(|d| d.high).collect();
        let lows: Vec<f64> = days.iter().map(|d| d.low).collect();
        let ranges: Vec<f64> = days.iter().map(|d| d.range).collect();

        Some(Self {
            week_high: highs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            week_low: lows.iter().copied().fold(f64::INFINITY, f64::min),
            avg_high: mean(&highs),
            avg_low: mean(&lows),
            avg_range: mean(&ranges),
            temp_trend: recent_vs_earlier(&highs),
            range_trend: recent_vs_earlier(&ranges),
        })
    }
}

fn recent_vs_earlier(values: &[f64]) -> Option<f64> {
    if values.len() < TREND_MIN_DAYS {
        return None;
    }
    let (earlier, recent) = values.split_at(values.len() - TREND_RECENT_DAYS);
    Some(mean(recent) - mean(earlier))
}

/// Extremes and net changes over the trailing 24 hours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Last24Hours {
    pub high: f64,
    /// Timestamp of the first sample reaching `high`
    pub high_time: DateTime<FixedOffset>,
    pub low: f64,
    /// Timestamp of the first sample reaching `low`
    pub low_time: DateTime<FixedOffset>,
    pub avg_temp: f64,
    pub avg_humidity: f64,
    /// `high - low`
    pub temp_range: f64,
    /// Last minus first temperature in the window, 0 for a single sample
    pub temp_change: f64,
    /// Last minus first humidity in the window, 0 for a single sample
    pub humidity_trend: f64,
    pub count: usize,
}

impl Last24Hours {
    /// Summarise ascending samples stamped within 24 hours of `now`.
    ///
    /// Returns None if no sample falls in the window.
    pub fn from_samples(samples: &[Sample], now: DateTime<FixedOffset>) -> Option<Self> {
        let window = trailing_window(samples, now, TimeDelta::hours(24));
        let (first, last) = (window.first()?, window.last()?);

        let mut high = first;
        let mut low = first;
        for sample in window {
            if sample.temperature > high.temperature {
                high = sample;
            }
            if sample.temperature < low.temperature {
                low = sample;
            }
        }

        let temps: Vec<f64> = window.iter().map(|s| s.value(SensorType::Temperature)).collect();
        let humidities: Vec<f64> = window.iter().map(|s| s.value(SensorType::Humidity)).collect();

        Some(Self {
            high: high.temperature,
            high_time: high.timestamp,
            low: low.temperature,
            low_time: low.timestamp,
            avg_temp: mean(&temps),
            avg_humidity: mean(&humidities),
            temp_range: high.temperature - low.temperature,
            temp_change: last.temperature - first.temperature,
            humidity_trend: last.humidity - first.humidity,
            count: window.len(),
        })
    }
}

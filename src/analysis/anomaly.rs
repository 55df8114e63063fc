//! Rapid-change scan and current-reading severity
//!
//! The scan compares each sample with the one `lag` positions earlier. At the
//! nominal one-sample-per-minute cadence a lag of 30 means "30 minutes ago";
//! with an irregular feed it does not.

use std::collections::VecDeque;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::metrics::{Direction, Severity};
use crate::sensors::Sample;

/// A large temperature change between two samples a fixed distance apart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RapidChange {
    /// Timestamp of the later sample
    pub time: DateTime<FixedOffset>,
    pub change: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomalies {
    /// Most recent rapid changes, oldest first
    pub rapid_changes: Vec<RapidChange>,
    pub current_status: Severity,
}

impl Anomalies {
    /// Scan ascending samples and grade the current reading by its z-score
    pub fn detect(samples: &[Sample], current_z_score: f64, thresholds: &Thresholds) -> Self {
        Self {
            rapid_changes: scan_rapid_changes(
                samples,
                thresholds.rapid_change_lag,
                thresholds.rapid_change_min_delta,
                thresholds.rapid_change_retained,
            ),
            current_status: Severity::from_z_score(current_z_score),
        }
    }
}

/// Find changes of at least `min_delta` between samples `lag` positions apart.
///
/// Only the `retain` most recent events are returned.
pub fn scan_rapid_changes(
    samples: &[Sample],
    lag: usize,
    min_delta: f64,
    retain: usize,
) -> Vec<RapidChange> {
    if retain == 0 || lag == 0 {
        return Vec::new();
    }

    let mut events = VecDeque::with_capacity(retain);

    for (earlier, later) in samples.iter().zip(samples.iter().skip(lag)) {
        let change = later.temperature - earlier.temperature;
        if change.abs() < min_delta {
            continue;
        }

        // Oldest is dropped when full
        if events.len() >= retain {
            events.pop_front();
        }
        events.push_back(RapidChange {
            time: later.timestamp,
            change,
            direction: Direction::of(change),
        });
    }

    events.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    const EPS: f64 = 1e-9;

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 12, 24, 6, 0, 0)
            .unwrap()
    }

    fn per_minute(temps: &[f64]) -> Vec<Sample> {
        temps
            .iter()
            .enumerate()
            .map(|(i, &t)| Sample::new(start() + TimeDelta::minutes(i as i64), t, 50.0))
            .collect()
    }

    #[test]
    fn test_single_rising_event() {
        let mut temps = vec![10.0; 31];
        temps[30] = 12.5;
        let samples = per_minute(&temps);

        let events = scan_rapid_changes(&samples, 30, 2.0, 3);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time, samples[30].timestamp);
        assert!((events[0].change - 2.5).abs() < EPS);
        assert_eq!(events[0].direction, Direction::Rising);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut temps = vec![10.0; 31];
        temps[30] = 8.0;
        let events = scan_rapid_changes(&per_minute(&temps), 30, 2.0, 3);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].direction, Direction::Falling);

        temps[30] = 11.9;
        assert!(scan_rapid_changes(&per_minute(&temps), 30, 2.0, 3).is_empty());
    }

    #[test]
    fn test_keeps_most_recent_three() {
        // Steady 0.1 °C/min climb: every index from 30 on is a 3.0 °C change
        let temps: Vec<f64> = (0..40).map(|i| 0.1 * i as f64).collect();
        let samples = per_minute(&temps);

        let events = scan_rapid_changes(&samples, 30, 2.0, 3);

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].time, samples[37].timestamp);
        assert_eq!(events[2].time, samples[39].timestamp);
    }

    #[test]
    fn test_short_series_has_no_events() {
        let samples = per_minute(&[0.0, 10.0, 20.0]);
        assert!(scan_rapid_changes(&samples, 30, 2.0, 3).is_empty());
    }

    #[test]
    fn test_detect_grades_current_reading() {
        let anomalies = Anomalies::detect(&per_minute(&[1.0]), -2.7, &Thresholds::default());
        assert!(anomalies.rapid_changes.is_empty());
        assert_eq!(anomalies.current_status, Severity::VeryAbnormal);
    }
}

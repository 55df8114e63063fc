//! Short-horizon rate of change, acceleration and forecast
//!
//! The forecast regresses temperature against sample position rather than
//! timestamp, so it is only meaningful while the feed delivers roughly one
//! sample per minute. Gaps or bursts in the feed skew both slope and horizon.

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::metrics::AccelerationStatus;
use crate::sensors::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    /// Second-half change minus first-half change over the last hour, in °C
    pub value: f64,
    pub status: AccelerationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Extrapolated temperature one horizon past the last hour
    pub predicted_temp: f64,
    /// `predicted_temp` minus the latest temperature
    pub predicted_change: f64,
}

/// Trend figures; each is None when its window holds too few samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    /// Last minus first temperature within the trailing hour
    pub change_1h: Option<f64>,
    /// Last minus first temperature within the trailing 3 hours
    pub total_change_3h: Option<f64>,
    /// `total_change_3h / 3`, in °C per hour
    pub change_rate_3h: Option<f64>,
    pub acceleration: Option<Acceleration>,
    pub forecast: Option<Forecast>,
}

impl Trends {
    /// Calculate trends for ascending samples relative to `now`
    pub fn from_samples(
        samples: &[Sample],
        now: DateTime<FixedOffset>,
        thresholds: &Thresholds,
    ) -> Self {
        let last_hour = trailing_window(samples, now, TimeDelta::hours(1));
        let last_3h = trailing_window(samples, now, TimeDelta::hours(3));

        let total_change_3h = net_change(last_3h);

        Self {
            change_1h: net_change(last_hour),
            total_change_3h,
            change_rate_3h: total_change_3h.map(|change| change / 3.0),
            acceleration: acceleration(last_hour, thresholds),
            forecast: forecast(last_hour, thresholds),
        }
    }
}

/// Samples stamped at or after `now - span`.
///
/// `samples` must be sorted ascending. Samples after `now` are included.
pub fn trailing_window(
    samples: &[Sample],
    now: DateTime<FixedOffset>,
    span: TimeDelta,
) -> &[Sample] {
    let start = now - span;
    let first = samples.partition_point(|s| s.timestamp < start);
    &samples[first..]
}

fn net_change(window: &[Sample]) -> Option<f64> {
    match window {
        [first, .., last] => Some(last.temperature - first.temperature),
        _ => None,
    }
}

fn acceleration(window: &[Sample], thresholds: &Thresholds) -> Option<Acceleration> {
    if window.len() < thresholds.acceleration_min_samples.max(2) {
        return None;
    }

    // Both halves share the midpoint sample
    let mid = window.len() / 2;
    let first_half = window[mid].temperature - window[0].temperature;
    let second_half = window[window.len() - 1].temperature - window[mid].temperature;
    let value = second_half - first_half;

    Some(Acceleration {
        value,
        status: AccelerationStatus::assess(value, thresholds.acceleration_threshold),
    })
}

fn forecast(window: &[Sample], thresholds: &Thresholds) -> Option<Forecast> {
    if window.len() < thresholds.forecast_min_samples.max(2) {
        return None;
    }

    let temps: Vec<f64> = window.iter().map(|s| s.temperature).collect();
    let (slope, intercept) = linear_fit(&temps)?;

    let n = temps.len();
    let predicted_temp = slope * (n + thresholds.forecast_horizon) as f64 + intercept;

    Some(Forecast {
        predicted_temp,
        predicted_change: predicted_temp - temps[n - 1],
    })
}

/// Ordinary least squares of `values` against their index.
///
/// Returns `(slope, intercept)`, or None when the fit is undefined.
pub(crate) fn linear_fit(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    if denominator <= 0.0 {
        return None;
    }

    let slope = numerator / denominator;
    Some((slope, y_mean - slope * x_mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EPS: f64 = 1e-9;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 12, 24, 12, 0, 0)
            .unwrap()
    }

    /// One sample per minute, the last one at `now`
    fn per_minute(temps: impl IntoIterator<Item = f64>) -> Vec<Sample> {
        let temps: Vec<f64> = temps.into_iter().collect();
        let n = temps.len() as i64;
        temps
            .into_iter()
            .enumerate()
            .map(|(i, t)| Sample::new(now() - TimeDelta::minutes(n - 1 - i as i64), t, 50.0))
            .collect()
    }

    #[test]
    fn test_trailing_window_includes_boundary() {
        let samples = per_minute((0..120).map(|i| i as f64));
        let window = trailing_window(&samples, now(), TimeDelta::hours(1));
        assert_eq!(window.len(), 61);
        assert_eq!(window[0].timestamp, now() - TimeDelta::hours(1));
    }

    #[test]
    fn test_monotonic_rise() {
        // 0.01 °C per minute for three hours
        let samples = per_minute((0..=180).map(|i| 10.0 + 0.01 * i as f64));
        let trends = Trends::from_samples(&samples, now(), &Thresholds::default());

        let change_1h = trends.change_1h.unwrap();
        assert!(change_1h > 0.0);
        assert!((change_1h - 0.6).abs() < EPS);
        assert!((trends.total_change_3h.unwrap() - 1.8).abs() < EPS);
        assert!((trends.change_rate_3h.unwrap() - 0.6).abs() < EPS);

        let acceleration = trends.acceleration.unwrap();
        assert!(acceleration.value.abs() < EPS);
        assert_ne!(acceleration.status, AccelerationStatus::AcceleratingDownward);
    }

    #[test]
    fn test_acceleration_upward() {
        // Flat for 30 minutes, then climbing 0.05 °C per minute
        let samples = per_minute((0..61).map(|i| {
            if i <= 30 {
                10.0
            } else {
                10.0 + 0.05 * (i - 30) as f64
            }
        }));
        let trends = Trends::from_samples(&samples, now(), &Thresholds::default());

        let acceleration = trends.acceleration.unwrap();
        assert!((acceleration.value - 1.5).abs() < EPS);
        assert_eq!(acceleration.status, AccelerationStatus::AcceleratingUpward);
    }

    #[test]
    fn test_minimum_sample_guards() {
        let single = per_minute([10.0]);
        let trends = Trends::from_samples(&single, now(), &Thresholds::default());
        assert_eq!(trends, Trends::default());

        // 20 samples: enough for a forecast but not for acceleration
        let samples = per_minute((0..20).map(|i| i as f64));
        let trends = Trends::from_samples(&samples, now(), &Thresholds::default());
        assert!(trends.change_1h.is_some());
        assert!(trends.acceleration.is_none());
        assert!(trends.forecast.is_some());

        // Nothing inside the last hour
        let stale: Vec<Sample> = per_minute([1.0, 2.0, 3.0])
            .into_iter()
            .map(|s| Sample::new(s.timestamp - TimeDelta::hours(2), s.temperature, s.humidity))
            .collect();
        let trends = Trends::from_samples(&stale, now(), &Thresholds::default());
        assert!(trends.change_1h.is_none());
        assert!(trends.total_change_3h.is_some());
    }

    #[test]
    fn test_linear_forecast() {
        // y = 2 + 0.1 i over 10 samples; forecast at i = 10 + 60
        let samples = per_minute((0..10).map(|i| 2.0 + 0.1 * i as f64));
        let forecast = Trends::from_samples(&samples, now(), &Thresholds::default())
            .forecast
            .unwrap();

        assert!((forecast.predicted_temp - 9.0).abs() < EPS);
        assert!((forecast.predicted_change - (9.0 - 2.9)).abs() < EPS);
    }

    #[test]
    fn test_linear_fit_degenerate() {
        assert!(linear_fit(&[]).is_none());
        assert!(linear_fit(&[1.0]).is_none());
        let (slope, intercept) = linear_fit(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(slope, 0.0);
        assert_eq!(intercept, 3.0);
    }
}

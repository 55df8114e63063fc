//! Descriptive statistics over the full sample history

use serde::{Deserialize, Serialize};

use crate::sensors::{Sample, SensorType};

/// Statistics for the whole history, plus where the latest reading sits in it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub temp_mean: f64,
    pub temp_median: f64,
    /// Sample standard deviation (n - 1), 0 for a single sample
    pub temp_stdev: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub temp_range: f64,
    /// `sorted[n / 4]`, no interpolation
    pub temp_p25: f64,
    /// `sorted[3n / 4]`, no interpolation
    pub temp_p75: f64,
    pub humidity_mean: f64,
    pub humidity_stdev: f64,
    /// Share of samples strictly colder than the latest one, in percent
    pub current_percentile: f64,
    /// Standard score of the latest temperature, 0 when the history has no spread
    pub current_z_score: f64,
    /// Number of samples
    pub count: usize,
}

impl Statistics {
    /// Calculate statistics for ascending samples.
    ///
    /// The last sample is treated as the current reading. Returns None if the
    /// samples slice is empty.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let current = samples.last()?.temperature;

        let temps = values(samples, SensorType::Temperature);
        let humidities = values(samples, SensorType::Humidity);

        let mut sorted = temps.clone();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();

        let temp_mean = mean(&temps);
        let temp_stdev = sample_stdev(&temps, temp_mean);
        let temp_min = sorted[0];
        let temp_max = sorted[n - 1];

        let below = temps.iter().filter(|&&t| t < current).count();
        let current_z_score = if temp_stdev > 0.0 {
            (current - temp_mean) / temp_stdev
        } else {
            0.0
        };

        let humidity_mean = mean(&humidities);

        Some(Self {
            temp_mean,
            temp_median: median(&sorted),
            temp_stdev,
            temp_min,
            temp_max,
            temp_range: temp_max - temp_min,
            temp_p25: sorted[n / 4],
            temp_p75: sorted[3 * n / 4],
            humidity_mean,
            humidity_stdev: sample_stdev(&humidities, humidity_mean),
            current_percentile: 100.0 * below as f64 / n as f64,
            current_z_score,
            count: n,
        })
    }
}

fn values(samples: &[Sample], sensor: SensorType) -> Vec<f64> {
    samples.iter().map(|s| s.value(sensor)).collect()
}

/// Arithmetic mean, 0 for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with the n - 1 denominator, 0 below two values
pub(crate) fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Median of an already sorted, non-empty slice
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

//! Classification labels for analysis results
//!
//! This module maps raw numbers (z-scores, accelerations, deltas) onto the
//! categorical labels reported to downstream consumers.

use serde::{Deserialize, Serialize};

/// How unusual the current reading is relative to the whole history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// |z| ≤ 1.5
    Normal,
    /// 1.5 < |z| ≤ 2.0
    SlightlyAbnormal,
    /// 2.0 < |z| ≤ 2.5
    Abnormal,
    /// |z| > 2.5
    VeryAbnormal,
}

impl Severity {
    /// Assess severity from the z-score of the current reading
    pub fn from_z_score(z: f64) -> Self {
        let z = z.abs();
        if z > 2.5 {
            Self::VeryAbnormal
        } else if z > 2.0 {
            Self::Abnormal
        } else if z > 1.5 {
            Self::SlightlyAbnormal
        } else {
            Self::Normal
        }
    }

    /// Get the display label for this severity
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal range",
            Self::SlightlyAbnormal => "slightly abnormal",
            Self::Abnormal => "abnormal",
            Self::VeryAbnormal => "very abnormal",
        }
    }
}

/// Whether the rate of change over the last hour is itself changing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelerationStatus {
    AcceleratingUpward,
    AcceleratingDownward,
    Stable,
}

impl AccelerationStatus {
    /// Classify an acceleration value against a symmetric threshold
    pub fn assess(acceleration: f64, threshold: f64) -> Self {
        if acceleration > threshold {
            Self::AcceleratingUpward
        } else if acceleration < -threshold {
            Self::AcceleratingDownward
        } else {
            Self::Stable
        }
    }

    /// Get the display label for this status
    pub const fn label(self) -> &'static str {
        match self {
            Self::AcceleratingUpward => "accelerating upward",
            Self::AcceleratingDownward => "accelerating downward",
            Self::Stable => "stable",
        }
    }
}

/// Sign of a temperature change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rising,
    Falling,
}

impl Direction {
    /// Strictly positive changes rise, everything else falls
    pub fn of(change: f64) -> Self {
        if change > 0.0 { Self::Rising } else { Self::Falling }
    }

    /// Get the display label for this direction
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
        }
    }
}

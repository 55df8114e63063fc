pub mod daily;
pub mod ingest;

pub use daily::*;
pub use ingest::*;

use chrono::TimeDelta;

/// Maximum number of samples retained at full resolution in the recent tier
pub const RECENT_TIER_CAPACITY: usize = 360;

/// Recency class of a sample relative to the reference time
///
/// Each tier keeps its samples at a different resolution. Thinning is done by
/// position stride, never by averaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecencyTier {
    /// Age up to 6 hours, full resolution
    Recent,
    /// Age over 6 and up to 24 hours, every 5th sample
    Intraday,
    /// Age over 24 hours and up to 7 days, every 30th sample
    Week,
}

impl RecencyTier {
    /// Get a short label for display
    pub const fn label(self) -> &'static str {
        match self {
            Self::Recent => "0-6h",
            Self::Intraday => "6-24h",
            Self::Week => "1-7d",
        }
    }

    /// Get the oldest age (inclusive) a sample may have to fall in this tier
    pub fn max_age(self) -> TimeDelta {
        match self {
            Self::Recent => TimeDelta::hours(6),
            Self::Intraday => TimeDelta::hours(24),
            Self::Week => TimeDelta::days(7),
        }
    }

    /// Get the position stride used when thinning this tier
    pub const fn stride(self) -> usize {
        match self {
            Self::Recent => 1,
            Self::Intraday => 5,
            Self::Week => 30,
        }
    }

    /// Determine which tier a sample of the given age belongs to.
    ///
    /// Samples stamped after the reference time count as recent. Samples older
    /// than a week belong to no tier.
    pub fn classify(age: TimeDelta) -> Option<Self> {
        [Self::Recent, Self::Intraday, Self::Week]
            .into_iter()
            .find(|tier| age <= tier.max_age())
    }
}

//! Parsing of raw feed records into ordered samples, and recency tiering.
//!
//! Feed timestamps look like `"12/23 18:30"` and carry no year. The year is
//! inferred from the reference time: a month later than the reference month
//! must belong to the previous year. This heuristic can misplace records when
//! the history has long gaps around a year boundary; it is kept as-is.

use core::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use super::{RECENT_TIER_CAPACITY, RecencyTier};
use crate::sensors::{RawRecord, Sample};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("Invalid timestamp: {0:?}")]
    InvalidDateTime(String),
}

impl FromStr for RawRecord {
    type Err = ParseError;

    /// Parse one CSV row of the form `datetime,temperature,humidity`.
    ///
    /// Double quotes are stripped before splitting, matching the feed export.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let cleaned = line.replace('"', "");
        let mut fields = cleaned.split(',').map(str::trim);

        let datetime = fields
            .next()
            .filter(|field| !field.is_empty())
            .ok_or(ParseError::MissingField("datetime"))?;
        let temperature = parse_number(fields.next(), "temperature")?;
        let humidity = parse_number(fields.next(), "humidity")?;

        Ok(RawRecord::new(datetime, temperature, humidity))
    }
}

fn parse_number(field: Option<&str>, name: &'static str) -> Result<f64, ParseError> {
    let raw = field.ok_or(ParseError::MissingField(name))?;
    raw.parse().map_err(|_| ParseError::InvalidNumber {
        field: name,
        value: raw.into(),
    })
}

/// Parse a year-less `"MM/DD HH:MM"` timestamp in the timezone of `now`.
pub fn parse_datetime(
    text: &str,
    now: DateTime<FixedOffset>,
) -> Result<DateTime<FixedOffset>, ParseError> {
    let invalid = || ParseError::InvalidDateTime(text.into());

    let mut parts = text.split_whitespace();
    let (date_part, time_part) = parts.next().zip(parts.next()).ok_or_else(invalid)?;

    let (month, day) = split_pair(date_part, '/').ok_or_else(invalid)?;
    let (hour, minute) = split_pair(time_part, ':').ok_or_else(invalid)?;

    let year = if month > now.month() {
        now.year() - 1
    } else {
        now.year()
    };

    now.offset()
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .ok_or_else(invalid)
}

fn split_pair(text: &str, separator: char) -> Option<(u32, u32)> {
    let (first, second) = text.split_once(separator)?;
    Some((first.parse().ok()?, second.parse().ok()?))
}

/// Convert one raw record into a sample
pub fn parse_record(record: &RawRecord, now: DateTime<FixedOffset>) -> Result<Sample, ParseError> {
    if !record.temperature.is_finite() {
        return Err(ParseError::NonFinite("temperature"));
    }
    if !record.humidity.is_finite() {
        return Err(ParseError::NonFinite("humidity"));
    }

    let timestamp = parse_datetime(&record.datetime, now)?;
    Ok(Sample::new(timestamp, record.temperature, record.humidity))
}

/// Valid samples in ascending timestamp order, plus how many records were dropped
#[derive(Debug, Clone, Default)]
pub struct IngestedHistory {
    pub samples: Vec<Sample>,
    pub dropped: usize,
}

/// Parse and order a batch of raw records.
///
/// Records that fail to parse are dropped silently. The sort is stable, so
/// duplicate timestamps keep their arrival order.
pub fn ingest(records: &[RawRecord], now: DateTime<FixedOffset>) -> IngestedHistory {
    let mut samples = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for record in records {
        match parse_record(record, now) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                debug!("Dropping record: {}", e);
                dropped += 1;
            }
        }
    }

    samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    debug!(
        "Ingested {} samples ({} dropped)",
        samples.len(),
        dropped
    );

    IngestedHistory { samples, dropped }
}

/// Samples retained per recency tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierSamples {
    /// Most recent samples of the 0-6h tier at full resolution
    pub recent: heapless::Vec<Sample, RECENT_TIER_CAPACITY>,
    /// Number of samples in the 0-6h tier before capping
    pub recent_total: usize,
    /// Every 5th sample of the 6-24h tier
    pub intraday: Vec<Sample>,
    /// Every 30th sample of the 1-7d tier
    pub week: Vec<Sample>,
}

impl TierSamples {
    /// Split sorted samples into recency tiers relative to `now`
    pub fn partition(samples: &[Sample], now: DateTime<FixedOffset>) -> Self {
        let mut recent = Vec::new();
        let mut intraday = Vec::new();
        let mut week = Vec::new();

        for sample in samples {
            match RecencyTier::classify(now - sample.timestamp) {
                Some(RecencyTier::Recent) => recent.push(*sample),
                Some(RecencyTier::Intraday) => intraday.push(*sample),
                Some(RecencyTier::Week) => week.push(*sample),
                None => {}
            }
        }

        let recent_total = recent.len();
        let kept = &recent[recent_total.saturating_sub(RECENT_TIER_CAPACITY)..];

        Self {
            recent: kept.iter().copied().collect(),
            recent_total,
            intraday: thin(&intraday, RecencyTier::Intraday.stride()),
            week: thin(&week, RecencyTier::Week.stride()),
        }
    }
}

fn thin(samples: &[Sample], stride: usize) -> Vec<Sample> {
    samples.iter().step_by(stride).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        jst().with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_parse_datetime_current_year() {
        let now = at(2025, 12, 24, 9, 0);
        let parsed = parse_datetime("12/23 18:30", now).unwrap();
        assert_eq!(parsed, at(2025, 12, 23, 18, 30));
    }

    #[test]
    fn test_parse_datetime_year_rollover() {
        let now = at(2026, 1, 2, 8, 0);
        let parsed = parse_datetime("12/30 10:00", now).unwrap();
        assert_eq!(parsed, at(2025, 12, 30, 10, 0));
    }

    #[test]
    fn test_parse_datetime_rejects_malformed() {
        let now = at(2025, 6, 1, 0, 0);
        let malformed = [
            "",
            "12/23",
            "12-23 18:30",
            "13/01 00:00",
            "02/30 10:00",
            "06/01 25:00",
            "a/b c:d",
        ];
        for text in malformed {
            assert!(parse_datetime(text, now).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn test_raw_record_from_csv_row() {
        let record: RawRecord = "\"12/23 18:30\",7.5,62".parse().unwrap();
        assert_eq!(record, RawRecord::new("12/23 18:30", 7.5, 62.0));

        assert_eq!(
            "12/23 18:30,warm,62".parse::<RawRecord>(),
            Err(ParseError::InvalidNumber {
                field: "temperature",
                value: "warm".into(),
            })
        );
        assert_eq!(
            "12/23 18:30,7.5".parse::<RawRecord>(),
            Err(ParseError::MissingField("humidity"))
        );
    }

    #[test]
    fn test_ingest_sorts_and_drops() {
        let now = at(2025, 12, 24, 12, 0);
        let records = [
            RawRecord::new("12/24 11:02", 3.0, 50.0),
            RawRecord::new("garbage", 9.9, 50.0),
            RawRecord::new("12/24 11:00", 1.0, 50.0),
            RawRecord::new("12/24 11:01", 2.0, 50.0),
            RawRecord::new("12/24 11:01", 2.5, 50.0),
            RawRecord::new("12/24 11:03", f64::NAN, 50.0),
        ];

        let history = ingest(&records, now);
        let temps: Vec<f64> = history.samples.iter().map(|s| s.temperature).collect();

        assert_eq!(temps, [1.0, 2.0, 2.5, 3.0]);
        assert_eq!(history.dropped, 2);
    }

    #[test]
    fn test_partition_strides_and_caps() {
        let now = at(2025, 12, 24, 12, 0);
        // One sample per minute for the last 30 hours, oldest first
        let samples: Vec<Sample> = (0..30 * 60)
            .rev()
            .map(|m| Sample::new(now - TimeDelta::minutes(m), m as f64, 50.0))
            .collect();

        let tiers = TierSamples::partition(&samples, now);

        // Ages 0..=360 minutes are recent
        assert_eq!(tiers.recent_total, 361);
        assert_eq!(tiers.recent.len(), RECENT_TIER_CAPACITY);
        assert_eq!(tiers.recent.last().unwrap().timestamp, now);

        // Ages 361..=1440 minutes, every 5th kept starting with the oldest
        assert_eq!(tiers.intraday.len(), 216);
        assert_eq!(tiers.intraday[0].temperature, 1440.0);
        assert_eq!(tiers.intraday[1].temperature, 1435.0);

        // Ages 1441..=1799 minutes, every 30th kept
        assert_eq!(tiers.week.len(), 12);
        assert_eq!(tiers.week[0].temperature, 1799.0);
    }
}

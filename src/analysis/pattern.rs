//! Time-of-day, day-of-week and day-over-day comparisons

use chrono::{DateTime, Datelike, FixedOffset, TimeDelta, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use super::stats::mean;
use crate::sensors::Sample;

/// Number of 3-hour slots in a day
pub const TIME_SLOTS: usize = 8;

/// Width of one time-of-day slot in hours
pub const SLOT_HOURS: u32 = 3;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Mean temperature of one 3-hour slot of the day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotAverage {
    /// First local hour covered by the slot (0, 3, ... 21)
    pub start_hour: u32,
    pub avg: f64,
    pub count: usize,
}

impl SlotAverage {
    /// Get a short label for display, e.g. `"06-09"`
    pub fn label(&self) -> String {
        format!("{:02}-{:02}", self.start_hour, self.start_hour + SLOT_HOURS)
    }
}

/// Mean temperature of one weekday
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    pub avg: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patterns {
    /// Averages for every slot that holds at least one sample, in slot order
    pub time_slots: Vec<SlotAverage>,
    /// Latest temperature minus the average of the slot `now` falls in
    pub vs_time_slot: Option<f64>,
    /// Averages for every weekday that holds at least one sample, Monday first
    pub weekdays: Vec<WeekdayAverage>,
    /// Latest temperature minus the reading closest to 24 hours before `now`
    pub vs_yesterday: Option<f64>,
}

impl Patterns {
    /// Calculate patterns for ascending samples relative to `now`.
    ///
    /// Hours and weekdays are taken in the timezone of each sample's timestamp.
    pub fn from_samples(
        samples: &[Sample],
        now: DateTime<FixedOffset>,
        yesterday_tolerance: TimeDelta,
    ) -> Self {
        let Some(current) = samples.last() else {
            return Self::default();
        };

        let mut by_slot: [Vec<f64>; TIME_SLOTS] = Default::default();
        let mut by_weekday: [Vec<f64>; 7] = Default::default();
        for sample in samples {
            by_slot[slot_index(sample.timestamp.hour())].push(sample.temperature);
            let weekday = sample.timestamp.weekday().num_days_from_monday() as usize;
            by_weekday[weekday].push(sample.temperature);
        }

        let current_slot = &by_slot[slot_index(now.hour())];
        let vs_time_slot =
            (!current_slot.is_empty()).then(|| current.temperature - mean(current_slot));

        let time_slots = by_slot
            .iter()
            .enumerate()
            .filter(|(_, temps)| !temps.is_empty())
            .map(|(i, temps)| SlotAverage {
                start_hour: i as u32 * SLOT_HOURS,
                avg: mean(temps),
                count: temps.len(),
            })
            .collect();

        let weekdays = WEEKDAYS
            .iter()
            .zip(by_weekday.iter())
            .filter(|(_, temps)| !temps.is_empty())
            .map(|(&weekday, temps)| WeekdayAverage {
                weekday,
                avg: mean(temps),
                count: temps.len(),
            })
            .collect();

        let vs_yesterday = same_time_yesterday(samples, now, yesterday_tolerance)
            .map(|yesterday| current.temperature - yesterday.temperature);

        Self {
            time_slots,
            vs_time_slot,
            weekdays,
            vs_yesterday,
        }
    }
}

fn slot_index(hour: u32) -> usize {
    (hour / SLOT_HOURS) as usize % TIME_SLOTS
}

/// Find the sample closest to exactly 24 hours before `now`.
///
/// Only samples strictly within `tolerance` of that instant qualify. On a tie
/// the later sample wins.
pub fn same_time_yesterday(
    samples: &[Sample],
    now: DateTime<FixedOffset>,
    tolerance: TimeDelta,
) -> Option<&Sample> {
    let target = now - TimeDelta::days(1);

    let mut best: Option<(&Sample, TimeDelta)> = None;
    for sample in samples {
        let distance = (sample.timestamp - target).abs();
        if distance >= tolerance {
            continue;
        }
        if best.is_none_or(|(_, closest)| distance <= closest) {
            best = Some((sample, distance));
        }
    }

    best.map(|(sample, _)| sample)
}

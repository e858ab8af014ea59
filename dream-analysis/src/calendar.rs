//! Calendar Aggregator
//!
//! Reduces per-dream analysis records to one labeled emotion summary per date.
//! Pure and synchronous; input is treated as a snapshot.
//!
//! **Label rules** (first match wins):
//! 1. `avg_positive >= 0.6 && avg_negative <= 0.4` → positive
//! 2. `avg_negative >= 0.6 && avg_positive <= 0.4` → negative
//! 3. `|avg_positive - avg_negative| < 0.15` → mixed
//! 4. otherwise → neutral

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::AnalysisProfile;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One stored analysis, reduced to what the calendar needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub date: NaiveDate,
    pub positive: f64,
    pub negative: f64,
}

impl AnalysisRecord {
    pub fn from_profile(date: NaiveDate, profile: &AnalysisProfile) -> Self {
        Self {
            date,
            positive: profile.valence.positive,
            negative: profile.valence.negative,
        }
    }
}

/// Categorical label for a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayLabel {
    Positive,
    Negative,
    Mixed,
    Neutral,
}

impl DayLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayLabel::Positive => "positive",
            DayLabel::Negative => "negative",
            DayLabel::Mixed => "mixed",
            DayLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotion summary for one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDayEmotion {
    pub date: NaiveDate,
    pub avg_positive: f64,
    pub avg_negative: f64,
    /// Color scale for the calendar cell (0 = negative, 1 = positive)
    pub score: f64,
    pub label: DayLabel,
    pub sample_count: usize,
}

/// Label thresholds (TOML `[calendar]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    /// Dominant side must reach this
    pub high: f64,
    /// ...while the other side stays at or below this
    pub low: f64,
    /// Averages closer than this are "mixed"
    pub mixed_margin: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            high: 0.6,
            low: 0.4,
            mixed_margin: 0.15,
        }
    }
}

/// Per-date reducer
#[derive(Debug, Clone, Default)]
pub struct CalendarAggregator {
    thresholds: LabelThresholds,
}

impl CalendarAggregator {
    pub fn new(thresholds: LabelThresholds) -> Self {
        Self { thresholds }
    }

    /// Label depends only on the two averages
    pub fn label_for(&self, avg_positive: f64, avg_negative: f64) -> DayLabel {
        let t = &self.thresholds;
        if avg_positive >= t.high && avg_negative <= t.low {
            DayLabel::Positive
        } else if avg_negative >= t.high && avg_positive <= t.low {
            DayLabel::Negative
        } else if (avg_positive - avg_negative).abs() < t.mixed_margin {
            DayLabel::Mixed
        } else {
            DayLabel::Neutral
        }
    }

    /// One row per distinct date in `records`, ascending by date
    pub fn aggregate(&self, records: &[AnalysisRecord]) -> Vec<CalendarDayEmotion> {
        let mut days: BTreeMap<NaiveDate, (f64, f64, usize)> = BTreeMap::new();
        for record in records {
            let day = days.entry(record.date).or_insert((0.0, 0.0, 0));
            day.0 += record.positive;
            day.1 += record.negative;
            day.2 += 1;
        }

        days.into_iter()
            .map(|(date, (sum_pos, sum_neg, count))| {
                let avg_positive = sum_pos / count as f64;
                let avg_negative = sum_neg / count as f64;
                CalendarDayEmotion {
                    date,
                    avg_positive,
                    avg_negative,
                    score: avg_positive,
                    label: self.label_for(avg_positive, avg_negative),
                    sample_count: count,
                }
            })
            .collect()
    }

    /// Aggregate only the records falling in `month` ("YYYY-MM")
    ///
    /// # Errors
    /// `AnalysisError::InvalidInput` if `month` is not a valid `YYYY-MM` string.
    pub fn aggregate_month(
        &self,
        records: &[AnalysisRecord],
        month: &str,
    ) -> AnalysisResult<Vec<CalendarDayEmotion>> {
        let first = parse_month(month)?;
        let in_month: Vec<AnalysisRecord> = records
            .iter()
            .filter(|r| r.date.year() == first.year() && r.date.month() == first.month())
            .copied()
            .collect();
        Ok(self.aggregate(&in_month))
    }
}

/// First day of a `YYYY-MM` month
pub fn parse_month(month: &str) -> AnalysisResult<NaiveDate> {
    let invalid = || AnalysisError::InvalidInput(format!("month must be YYYY-MM, got '{}'", month));

    let (year, mon) = month.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || mon.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let mon: u32 = mon.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, mon, 1).ok_or_else(invalid)
}

/// Aggregate with the default thresholds
pub fn aggregate(records: &[AnalysisRecord]) -> Vec<CalendarDayEmotion> {
    CalendarAggregator::default().aggregate(records)
}

/// Month-scoped aggregation with the default thresholds
pub fn aggregate_month(
    records: &[AnalysisRecord],
    month: &str,
) -> AnalysisResult<Vec<CalendarDayEmotion>> {
    CalendarAggregator::default().aggregate_month(records, month)
}

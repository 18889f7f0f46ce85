//! Calendar resampling (e.g. hourly rows into monthly totals).
//!
//! Rows are bucketed by the calendar period that contains them, in the table's
//! timezone. Each bucket becomes one row stamped at the period start, with every
//! measurement aggregated over its present values.

use crate::calendar::{CalendarFields, Frequency};
use crate::table::{FeatureTable, NumericColumn};
use chrono::{DateTime, Datelike, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// How values inside one bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

/// Resampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleConfig {
    pub frequency: Frequency,
    #[serde(default)]
    pub aggregation: Aggregation,
}

/// Period key in local time: (year, month, day, hour) truncated to the frequency.
type BucketKey = (i32, u32, u32, u32);

fn bucket_key(ts: &DateTime<Tz>, frequency: Frequency) -> BucketKey {
    match frequency {
        Frequency::Hourly => (ts.year(), ts.month(), ts.day(), ts.hour()),
        Frequency::Daily => (ts.year(), ts.month(), ts.day(), 0),
        Frequency::Monthly => (ts.year(), ts.month(), 1, 0),
    }
}

fn bucket_start(key: BucketKey, tz: Tz, fallback: DateTime<Tz>) -> DateTime<Tz> {
    let (year, month, day, hour) = key;
    tz.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .earliest()
        .unwrap_or(fallback)
}

fn aggregate(values: &[Option<f64>], aggregation: Aggregation) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    let sum: f64 = present.iter().sum();
    Some(match aggregation {
        Aggregation::Sum => sum,
        Aggregation::Mean => sum / present.len() as f64,
    })
}

/// Aggregates an ordered table to a coarser frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resampler {
    config: ResampleConfig,
}

impl Resampler {
    pub fn new(config: ResampleConfig) -> Self {
        Self { config }
    }

    /// Resample `table`, which must be sorted by timestamp. Derived feature
    /// columns are not carried; resampling happens before they are built.
    pub fn apply(&self, table: FeatureTable) -> FeatureTable {
        let frequency = self.config.frequency;
        let mut spans: Vec<(BucketKey, usize, usize)> = Vec::new();
        for (idx, ts) in table.timestamps().iter().enumerate() {
            let key = bucket_key(ts, frequency);
            match spans.last_mut() {
                Some((last, _, end)) if *last == key => *end = idx + 1,
                _ => spans.push((key, idx, idx + 1)),
            }
        }

        let mut timestamps = Vec::with_capacity(spans.len());
        let mut calendar = Vec::with_capacity(spans.len());
        for (key, start, _) in &spans {
            let first = table.timestamps()[*start];
            let ts = bucket_start(*key, first.timezone(), first);
            calendar.push(CalendarFields::from_timestamp(&ts, frequency));
            timestamps.push(ts);
        }

        let measurements = table
            .measurements()
            .iter()
            .map(|column| {
                let values = spans
                    .iter()
                    .map(|(_, start, end)| {
                        aggregate(&column.values[*start..*end], self.config.aggregation)
                    })
                    .collect();
                NumericColumn::new(column.name.clone(), values)
            })
            .collect();

        tracing::debug!(
            from = table.len(),
            to = timestamps.len(),
            frequency = %frequency,
            "Resampled table"
        );
        FeatureTable::from_parts(timestamps, calendar, measurements, frequency)
    }
}

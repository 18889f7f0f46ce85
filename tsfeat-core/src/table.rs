//! Columnar feature table.
//!
//! A [`FeatureTable`] is an ordered set of rows stored column by column:
//! timestamps, decomposed calendar fields, measurement columns (target first),
//! and derived feature columns in the order the stages appended them.
//! Stages never mutate a table in place; they consume it and return a new one.

use crate::calendar::{CalendarFields, Frequency};
use chrono::DateTime;
use chrono_tz::Tz;
use std::ops::Range;

/// A named numeric column where `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl NumericColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// Values of a derived feature column.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValues {
    Numeric(Vec<Option<f64>>),
    Flag(Vec<bool>),
}

impl FeatureValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Flag(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, keep: &[bool]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(select(v, keep)),
            Self::Flag(v) => Self::Flag(select(v, keep)),
        }
    }

    fn slice(&self, range: Range<usize>) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(v[range].to_vec()),
            Self::Flag(v) => Self::Flag(v[range].to_vec()),
        }
    }
}

/// A derived column appended by a pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub values: FeatureValues,
}

impl FeatureColumn {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: FeatureValues::Numeric(values),
        }
    }

    pub fn flag(name: impl Into<String>, values: Vec<bool>) -> Self {
        Self {
            name: name.into(),
            values: FeatureValues::Flag(values),
        }
    }
}

/// Ordered, columnar table of observations and derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    timestamps: Vec<DateTime<Tz>>,
    calendar: Vec<CalendarFields>,
    measurements: Vec<NumericColumn>,
    features: Vec<FeatureColumn>,
    frequency: Frequency,
}

impl FeatureTable {
    /// Assemble a table from aligned columns. The first measurement is the target.
    pub(crate) fn from_parts(
        timestamps: Vec<DateTime<Tz>>,
        calendar: Vec<CalendarFields>,
        measurements: Vec<NumericColumn>,
        frequency: Frequency,
    ) -> Self {
        debug_assert_eq!(timestamps.len(), calendar.len());
        debug_assert!(!measurements.is_empty(), "table needs a target column");
        debug_assert!(
            measurements
                .iter()
                .all(|c| c.values.len() == timestamps.len())
        );
        Self {
            timestamps,
            calendar,
            measurements,
            features: Vec::new(),
            frequency,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn timestamps(&self) -> &[DateTime<Tz>] {
        &self.timestamps
    }

    pub fn calendar(&self) -> &[CalendarFields] {
        &self.calendar
    }

    pub fn measurements(&self) -> &[NumericColumn] {
        &self.measurements
    }

    pub fn features(&self) -> &[FeatureColumn] {
        &self.features
    }

    /// The target measurement column.
    pub fn target(&self) -> &NumericColumn {
        &self.measurements[0]
    }

    /// Look up a numeric column (measurement or derived feature) by name.
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        if let Some(col) = self.measurements.iter().find(|c| c.name == name) {
            return Some(&col.values);
        }
        self.features.iter().find_map(|f| match &f.values {
            FeatureValues::Numeric(v) if f.name == name => Some(v.as_slice()),
            _ => None,
        })
    }

    /// Look up a flag column by name.
    pub fn flag(&self, name: &str) -> Option<&[bool]> {
        self.features.iter().find_map(|f| match &f.values {
            FeatureValues::Flag(v) if f.name == name => Some(v.as_slice()),
            _ => None,
        })
    }

    /// Names of the calendar columns, in export order.
    pub fn calendar_column_names(&self) -> Vec<&'static str> {
        let mut names = vec!["year", "month", "day_of_week"];
        if self.frequency.is_sub_daily() {
            names.push("hour");
        }
        names.extend(["day_of_year", "week_of_year", "quarter", "semester"]);
        names
    }

    /// Every column name in export order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec!["timestamp".to_string()];
        names.extend(self.calendar_column_names().into_iter().map(String::from));
        names.extend(self.measurements.iter().map(|c| c.name.clone()));
        names.extend(self.features.iter().map(|f| f.name.clone()));
        names
    }

    /// Return a new table with `column` appended.
    pub fn with_feature(mut self, column: FeatureColumn) -> Self {
        debug_assert_eq!(column.values.len(), self.len());
        debug_assert!(
            self.numeric(&column.name).is_none() && self.flag(&column.name).is_none(),
            "duplicate column {}",
            column.name
        );
        self.features.push(column);
        self
    }

    /// Keep only the rows whose mask entry is `true`.
    pub fn retain_rows(self, keep: &[bool]) -> Self {
        debug_assert_eq!(keep.len(), self.len());
        Self {
            timestamps: select(&self.timestamps, keep),
            calendar: select(&self.calendar, keep),
            measurements: self
                .measurements
                .iter()
                .map(|c| NumericColumn::new(c.name.clone(), select(&c.values, keep)))
                .collect(),
            features: self
                .features
                .iter()
                .map(|f| FeatureColumn {
                    name: f.name.clone(),
                    values: f.values.select(keep),
                })
                .collect(),
            frequency: self.frequency,
        }
    }

    /// Copy of the rows in `range`.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            timestamps: self.timestamps[range.clone()].to_vec(),
            calendar: self.calendar[range.clone()].to_vec(),
            measurements: self
                .measurements
                .iter()
                .map(|c| NumericColumn::new(c.name.clone(), c.values[range.clone()].to_vec()))
                .collect(),
            features: self
                .features
                .iter()
                .map(|f| FeatureColumn {
                    name: f.name.clone(),
                    values: f.values.slice(range.clone()),
                })
                .collect(),
            frequency: self.frequency,
        }
    }

    /// Whether every numeric value in row `idx` is present.
    pub fn row_is_complete(&self, idx: usize) -> bool {
        self.measurements.iter().all(|c| c.values[idx].is_some())
            && self.features.iter().all(|f| match &f.values {
                FeatureValues::Numeric(v) => v[idx].is_some(),
                FeatureValues::Flag(_) => true,
            })
    }
}

fn select<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(v, _)| v.clone())
        .collect()
}

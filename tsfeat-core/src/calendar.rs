//! Timestamp parsing and calendar decomposition.
//!
//! Raw timestamp strings are parsed under one configured chrono format in one
//! configured IANA timezone. Each parsed instant is decomposed into a fixed set
//! of calendar fields whose categorical vocabularies never change between runs,
//! so downstream one-hot encoders see the same label set every time.

use crate::error::ConfigError;
use crate::table::{FeatureTable, NumericColumn};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sampling frequency of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Hourly,
    Daily,
    Monthly,
}

impl Frequency {
    /// Whether rows of this frequency carry an hour-of-day field.
    pub fn is_sub_daily(self) -> bool {
        matches!(self, Self::Hourly)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hourly => write!(f, "hourly"),
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// Month of the year, labelled `Jan`..`Dec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// Fixed label order used for categorical encoding.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Month from its 1-based number.
    pub fn from_number(number: u32) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx as usize).copied())
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Jan => "Jan",
            Self::Feb => "Feb",
            Self::Mar => "Mar",
            Self::Apr => "Apr",
            Self::May => "May",
            Self::Jun => "Jun",
            Self::Jul => "Jul",
            Self::Aug => "Aug",
            Self::Sep => "Sep",
            Self::Oct => "Oct",
            Self::Nov => "Nov",
            Self::Dec => "Dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Day of the week, labelled `Sun`..`Sat` (Sunday first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayOfWeek {
    /// Fixed label order used for categorical encoding.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sun,
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        Self::ALL[day.num_days_from_sunday() as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calendar attributes derived from one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    pub month: Month,
    pub day_of_week: DayOfWeek,
    /// Hour of day, only present for sub-daily series.
    pub hour: Option<u32>,
    pub day_of_year: u32,
    /// ISO 8601 week number.
    pub week_of_year: u32,
    pub quarter: u8,
    pub semester: u8,
}

impl CalendarFields {
    pub fn from_timestamp(ts: &DateTime<Tz>, frequency: Frequency) -> Self {
        let month_number = ts.month();
        // chrono guarantees 1..=12
        let month = Month::from_number(month_number).unwrap_or(Month::Jan);
        Self {
            year: ts.year(),
            month,
            day_of_week: ts.weekday().into(),
            hour: frequency.is_sub_daily().then(|| ts.hour()),
            day_of_year: ts.ordinal(),
            week_of_year: ts.iso_week().week(),
            quarter: ((month_number - 1) / 3 + 1) as u8,
            semester: if month_number <= 6 { 1 } else { 2 },
        }
    }
}

/// Parses raw timestamp strings under a fixed format and timezone.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    format: String,
    tz: Tz,
    with_offset: bool,
}

impl TimestampParser {
    pub fn new(format: &str, timezone: &str) -> Result<Self, ConfigError> {
        if format.trim().is_empty() {
            return Err(ConfigError::EmptyTimestampFormat);
        }
        let tz = parse_timezone(timezone)?;
        let with_offset = ["%z", "%:z", "%::z", "%#z", "%+"]
            .iter()
            .any(|spec| format.contains(spec));
        Ok(Self {
            format: format.to_string(),
            tz,
            with_offset,
        })
    }

    /// Parse one raw value. Returns `None` when the value does not match the
    /// format or names a local time that does not exist in the zone.
    pub fn parse(&self, raw: &str) -> Option<DateTime<Tz>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if self.with_offset {
            return DateTime::parse_from_str(raw, &self.format)
                .ok()
                .map(|dt| dt.with_timezone(&self.tz));
        }
        let naive = self.parse_naive(raw)?;
        self.tz.from_local_datetime(&naive).earliest()
    }

    fn parse_naive(&self, raw: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, &self.format) {
            return Some(dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, &self.format) {
            return date.and_hms_opt(0, 0, 0);
        }
        // Month-only formats such as "%Y-%m" pin to the first of the month.
        let padded = format!("{raw}|01");
        let padded_format = format!("{}|%d", self.format);
        NaiveDate::parse_from_str(&padded, &padded_format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

pub(crate) fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone {
            name: name.to_string(),
        })
}

/// One observation before decomposition: the raw timestamp plus the configured
/// measurement values, target first.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub timestamp: String,
    pub values: Vec<Option<f64>>,
}

/// Result of the decomposition stage.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub table: FeatureTable,
    pub parse_failures: usize,
    pub duplicates_dropped: usize,
}

/// Parses, orders, and decomposes raw observations into a [`FeatureTable`].
#[derive(Debug, Clone)]
pub struct TimestampDecomposer {
    parser: TimestampParser,
    frequency: Frequency,
}

impl TimestampDecomposer {
    pub fn new(parser: TimestampParser, frequency: Frequency) -> Self {
        Self { parser, frequency }
    }

    /// Build the table from raw rows.
    ///
    /// Rows whose timestamp fails to parse are skipped and counted. The
    /// remaining rows are stably sorted by instant, and any row repeating an
    /// instant already seen is dropped, keeping the first in input order.
    pub fn decompose(
        &self,
        measurement_names: &[String],
        observations: &[RawObservation],
    ) -> Decomposition {
        let mut parsed: Vec<(DateTime<Tz>, &RawObservation)> =
            Vec::with_capacity(observations.len());
        let mut parse_failures = 0;

        for obs in observations {
            match self.parser.parse(&obs.timestamp) {
                Some(ts) => parsed.push((ts, obs)),
                None => {
                    parse_failures += 1;
                    tracing::debug!(timestamp = %obs.timestamp, "Dropping unparseable timestamp");
                }
            }
        }

        // Vec::sort_by is stable.
        parsed.sort_by(|a, b| a.0.cmp(&b.0));

        let before_dedup = parsed.len();
        parsed.dedup_by(|later, earlier| later.0 == earlier.0);
        let duplicates_dropped = before_dedup - parsed.len();

        let mut timestamps = Vec::with_capacity(parsed.len());
        let mut calendar = Vec::with_capacity(parsed.len());
        let mut columns: Vec<NumericColumn> = measurement_names
            .iter()
            .map(|name| NumericColumn::new(name.clone(), Vec::with_capacity(parsed.len())))
            .collect();

        for (ts, obs) in &parsed {
            calendar.push(CalendarFields::from_timestamp(ts, self.frequency));
            timestamps.push(*ts);
            for (idx, column) in columns.iter_mut().enumerate() {
                column.values.push(obs.values.get(idx).copied().flatten());
            }
        }

        Decomposition {
            table: FeatureTable::from_parts(timestamps, calendar, columns, self.frequency),
            parse_failures,
            duplicates_dropped,
        }
    }
}

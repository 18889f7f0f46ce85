//! Weekend and holiday indicator flags.
//!
//! Both flags are pure functions of the decomposed calendar fields. They are
//! two separate policies: weekends key on day of week, holidays on month.
//! The holiday flag is a coarse month-based placeholder and does not consult
//! any holiday calendar.

use crate::calendar::{CalendarFields, DayOfWeek, Month};
use crate::table::{FeatureColumn, FeatureTable};
use crate::transform::FeatureStage;
use std::collections::BTreeSet;

pub const WEEKEND_COLUMN: &str = "is_weekend";
pub const HOLIDAY_COLUMN: &str = "holiday";

pub fn default_weekend_days() -> BTreeSet<DayOfWeek> {
    BTreeSet::from([DayOfWeek::Sat, DayOfWeek::Sun])
}

pub fn default_holiday_months() -> BTreeSet<Month> {
    BTreeSet::from([Month::Dec, Month::Jan])
}

/// True iff the day of week is in the weekend set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekendPredicate {
    days: BTreeSet<DayOfWeek>,
}

impl Default for WeekendPredicate {
    fn default() -> Self {
        Self::new(default_weekend_days())
    }
}

impl WeekendPredicate {
    pub fn new(days: BTreeSet<DayOfWeek>) -> Self {
        Self { days }
    }

    pub fn test(&self, fields: &CalendarFields) -> bool {
        self.days.contains(&fields.day_of_week)
    }
}

/// True iff the month is in the holiday-month set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayPredicate {
    months: BTreeSet<Month>,
}

impl Default for HolidayPredicate {
    fn default() -> Self {
        Self::new(default_holiday_months())
    }
}

impl HolidayPredicate {
    pub fn new(months: BTreeSet<Month>) -> Self {
        Self { months }
    }

    pub fn test(&self, fields: &CalendarFields) -> bool {
        self.months.contains(&fields.month)
    }
}

/// Appends `is_weekend` and `holiday`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagDeriver {
    weekend: WeekendPredicate,
    holiday: HolidayPredicate,
}

impl FlagDeriver {
    pub fn new(weekend: WeekendPredicate, holiday: HolidayPredicate) -> Self {
        Self { weekend, holiday }
    }
}

impl FeatureStage for FlagDeriver {
    fn name(&self) -> &'static str {
        "flags"
    }

    fn output_columns(&self) -> Vec<String> {
        vec![WEEKEND_COLUMN.to_string(), HOLIDAY_COLUMN.to_string()]
    }

    fn apply(&self, table: FeatureTable) -> FeatureTable {
        let weekend = table.calendar().iter().map(|c| self.weekend.test(c)).collect();
        let holiday = table.calendar().iter().map(|c| self.holiday.test(c)).collect();
        table
            .with_feature(FeatureColumn::flag(WEEKEND_COLUMN, weekend))
            .with_feature(FeatureColumn::flag(HOLIDAY_COLUMN, holiday))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::hourly_table;
    use pretty_assertions::assert_eq;

    fn fields(day_of_week: DayOfWeek, month: Month) -> CalendarFields {
        CalendarFields {
            year: 2020,
            month,
            day_of_week,
            hour: None,
            day_of_year: 1,
            week_of_year: 1,
            quarter: 1,
            semester: 1,
        }
    }

    #[test]
    fn test_weekend_only_saturday_and_sunday() {
        let predicate = WeekendPredicate::default();
        for day in DayOfWeek::ALL {
            let expected = matches!(day, DayOfWeek::Sat | DayOfWeek::Sun);
            assert_eq!(predicate.test(&fields(day, Month::Jun)), expected, "{day}");
        }
    }

    #[test]
    fn test_holiday_default_months() {
        let predicate = HolidayPredicate::default();
        let flagged: Vec<_> = Month::ALL
            .into_iter()
            .filter(|m| predicate.test(&fields(DayOfWeek::Mon, *m)))
            .collect();
        assert_eq!(flagged, vec![Month::Jan, Month::Dec]);
    }

    #[test]
    fn test_predicates_are_independent() {
        let deriver = FlagDeriver::new(
            WeekendPredicate::new(BTreeSet::from([DayOfWeek::Fri])),
            HolidayPredicate::new(BTreeSet::from([Month::Jul])),
        );
        let f = fields(DayOfWeek::Fri, Month::Dec);
        assert!(deriver.weekend.test(&f));
        assert!(!deriver.holiday.test(&f));
    }

    #[test]
    fn test_stage_flags_rows() {
        // 2015-01-01 00:00 UTC is a Thursday; 48 hours reach Saturday.
        let values: Vec<_> = (0..49).map(|i| Some(i as f64)).collect();
        let out = FlagDeriver::default().apply(hourly_table(&values));
        let weekend = out.flag(WEEKEND_COLUMN).unwrap();
        assert!(!weekend[0]);
        assert!(!weekend[47]);
        assert!(weekend[48]);
        assert!(out.flag(HOLIDAY_COLUMN).unwrap().iter().all(|h| *h));
    }
}

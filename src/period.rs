use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        let range = DateRange { from, to };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.from > self.to {
            return Err(ReportError::InvalidRange {
                from: self.from,
                to: self.to,
            });
        }
        Ok(())
    }

    pub fn label(&self) -> String {
        format!("{} to {}", self.from, self.to)
    }

    /// First instant included in the range.
    pub fn start_bound(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    /// First instant after the range; the `to` day is fully included.
    pub fn end_bound(&self) -> NaiveDateTime {
        (self.to + Duration::days(1)).and_time(NaiveTime::MIN)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(month_start(date) + Duration::days(32)) - Duration::days(1)
}

pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let mut start = month_start(date);
    for _ in 0..(date.month0() % 3) {
        start = month_start(start - Duration::days(1));
    }
    start
}

pub fn quarter_end(date: NaiveDate) -> NaiveDate {
    let mut last_month = quarter_start(date);
    for _ in 0..2 {
        last_month = month_start(last_month + Duration::days(32));
    }
    month_end(last_month)
}

fn year_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.ordinal0() as i64)
}

/// Quick ranges offered when asking for a report interactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangePreset {
    Today,
    ThisWeek,
    ThisMonth,
    PreviousMonth,
    ThisQuarter,
    Custom,
}

impl DateRangePreset {
    pub fn resolve(
        self,
        today: NaiveDate,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DateRange> {
        match self {
            DateRangePreset::Today => DateRange::new(today, today),
            DateRangePreset::ThisWeek => {
                let monday =
                    today - Duration::days(today.weekday().num_days_from_monday() as i64);
                DateRange::new(monday, monday + Duration::days(6))
            }
            DateRangePreset::ThisMonth => DateRange::new(month_start(today), month_end(today)),
            DateRangePreset::PreviousMonth => {
                let last = month_start(today) - Duration::days(1);
                DateRange::new(month_start(last), last)
            }
            DateRangePreset::ThisQuarter => {
                DateRange::new(quarter_start(today), quarter_end(today))
            }
            DateRangePreset::Custom => match (from, to) {
                (Some(from), Some(to)) => DateRange::new(from, to),
                _ => Err(ReportError::MissingDateRange),
            },
        }
    }
}

impl FromStr for DateRangePreset {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "today" => Ok(DateRangePreset::Today),
            "this-week" => Ok(DateRangePreset::ThisWeek),
            "this-month" => Ok(DateRangePreset::ThisMonth),
            "previous-month" => Ok(DateRangePreset::PreviousMonth),
            "this-quarter" => Ok(DateRangePreset::ThisQuarter),
            "custom" => Ok(DateRangePreset::Custom),
            other => Err(ReportError::Validation(format!(
                "unknown date range '{other}'"
            ))),
        }
    }
}

/// Cadence of the automatic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl AutoPeriod {
    pub const ALL: &'static [AutoPeriod] =
        &[AutoPeriod::Monthly, AutoPeriod::Quarterly, AutoPeriod::Yearly];

    pub fn code(self) -> &'static str {
        match self {
            AutoPeriod::Monthly => "monthly",
            AutoPeriod::Quarterly => "quarterly",
            AutoPeriod::Yearly => "yearly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AutoPeriod::Monthly => "Monthly",
            AutoPeriod::Quarterly => "Quarterly",
            AutoPeriod::Yearly => "Yearly",
        }
    }

    /// The last complete calendar month, quarter or year before `today`.
    pub fn prior_range(self, today: NaiveDate) -> DateRange {
        let (from, to) = match self {
            AutoPeriod::Monthly => {
                let to = month_start(today) - Duration::days(1);
                (month_start(to), to)
            }
            AutoPeriod::Quarterly => {
                let to = quarter_start(today) - Duration::days(1);
                (quarter_start(to), to)
            }
            AutoPeriod::Yearly => {
                let to = year_start(today) - Duration::days(1);
                (year_start(to), to)
            }
        };
        DateRange { from, to }
    }
}

impl FromStr for AutoPeriod {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "monthly" => Ok(AutoPeriod::Monthly),
            "quarterly" => Ok(AutoPeriod::Quarterly),
            "yearly" => Ok(AutoPeriod::Yearly),
            other => Err(ReportError::Validation(format!("unknown period '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let err = DateRange::new(date(2026, 2, 1), date(2026, 1, 1)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = DateRange::new(date(2026, 3, 3), date(2026, 3, 3)).unwrap();
        assert_eq!(range.end_bound(), date(2026, 3, 4).and_time(NaiveTime::MIN));
    }

    #[test]
    fn month_bounds_handle_short_and_leap_months() {
        assert_eq!(month_end(date(2026, 2, 10)), date(2026, 2, 28));
        assert_eq!(month_end(date(2028, 2, 10)), date(2028, 2, 29));
        assert_eq!(month_end(date(2026, 12, 31)), date(2026, 12, 31));
        assert_eq!(month_start(date(2026, 7, 19)), date(2026, 7, 1));
    }

    #[test]
    fn quarter_bounds() {
        assert_eq!(quarter_start(date(2026, 5, 20)), date(2026, 4, 1));
        assert_eq!(quarter_end(date(2026, 5, 20)), date(2026, 6, 30));
        assert_eq!(quarter_end(date(2026, 11, 2)), date(2026, 12, 31));
    }

    #[test]
    fn presets_resolve_relative_to_today() {
        let today = date(2026, 10, 18); // a Sunday
        let week = DateRangePreset::ThisWeek.resolve(today, None, None).unwrap();
        assert_eq!(week, DateRange { from: date(2026, 10, 12), to: date(2026, 10, 18) });

        let previous = DateRangePreset::PreviousMonth.resolve(today, None, None).unwrap();
        assert_eq!(previous, DateRange { from: date(2026, 9, 1), to: date(2026, 9, 30) });

        let quarter = DateRangePreset::ThisQuarter.resolve(today, None, None).unwrap();
        assert_eq!(quarter, DateRange { from: date(2026, 10, 1), to: date(2026, 12, 31) });
    }

    #[test]
    fn custom_preset_requires_both_dates() {
        let err = DateRangePreset::Custom
            .resolve(date(2026, 1, 1), Some(date(2026, 1, 1)), None)
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingDateRange));
    }

    #[test]
    fn prior_month_is_the_previous_calendar_month() {
        let range = AutoPeriod::Monthly.prior_range(date(2026, 3, 15));
        assert_eq!(range, DateRange { from: date(2026, 2, 1), to: date(2026, 2, 28) });

        let january = AutoPeriod::Monthly.prior_range(date(2026, 1, 1));
        assert_eq!(january, DateRange { from: date(2025, 12, 1), to: date(2025, 12, 31) });
    }

    #[test]
    fn prior_quarter_rolls_over_the_year_from_q1() {
        let range = AutoPeriod::Quarterly.prior_range(date(2026, 2, 14));
        assert_eq!(range, DateRange { from: date(2025, 10, 1), to: date(2025, 12, 31) });

        let mid_year = AutoPeriod::Quarterly.prior_range(date(2026, 8, 1));
        assert_eq!(mid_year, DateRange { from: date(2026, 4, 1), to: date(2026, 6, 30) });
    }

    #[test]
    fn prior_year_is_the_previous_calendar_year() {
        let range = AutoPeriod::Yearly.prior_range(date(2026, 10, 18));
        assert_eq!(range, DateRange { from: date(2025, 1, 1), to: date(2025, 12, 31) });
    }
}

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution a time value is compared at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeGranularity::Year => "year",
            TimeGranularity::Quarter => "quarter",
            TimeGranularity::Month => "month",
            TimeGranularity::Week => "week",
            TimeGranularity::Day => "day",
            TimeGranularity::Hour => "hour",
            TimeGranularity::Minute => "minute",
            TimeGranularity::Second => "second",
        };
        write!(f, "{}", name)
    }
}

/// Unit of an "in the past N units" window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PastUnit {
    Years,
    Quarters,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl fmt::Display for PastUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PastUnit::Years => "years",
            PastUnit::Quarters => "quarters",
            PastUnit::Months => "months",
            PastUnit::Weeks => "weeks",
            PastUnit::Days => "days",
            PastUnit::Hours => "hours",
            PastUnit::Minutes => "minutes",
            PastUnit::Seconds => "seconds",
        };
        write!(f, "{}", name)
    }
}

/// A structured filter on a date or timestamp field
///
/// Times are taken as UTC wall-clock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeFilter {
    IsInThePast { amount: u32, unit: PastUnit },
    IsLast { period: TimeGranularity },
    IsThis { period: TimeGranularity },
    IsOn { granularity: TimeGranularity, date: NaiveDateTime },
    IsAfter { granularity: TimeGranularity, date: NaiveDateTime },
    IsBefore { granularity: TimeGranularity, date: NaiveDateTime },
    IsBetween {
        granularity: TimeGranularity,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    IsNull,
    IsNotNull,
    Custom { partial: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilterType {
    IsInThePast,
    IsLast,
    IsThis,
    IsOn,
    IsAfter,
    IsBefore,
    IsBetween,
    IsNull,
    IsNotNull,
    Custom,
}

impl TimeFilter {
    pub fn filter_type(&self) -> TimeFilterType {
        match self {
            TimeFilter::IsInThePast { .. } => TimeFilterType::IsInThePast,
            TimeFilter::IsLast { .. } => TimeFilterType::IsLast,
            TimeFilter::IsThis { .. } => TimeFilterType::IsThis,
            TimeFilter::IsOn { .. } => TimeFilterType::IsOn,
            TimeFilter::IsAfter { .. } => TimeFilterType::IsAfter,
            TimeFilter::IsBefore { .. } => TimeFilterType::IsBefore,
            TimeFilter::IsBetween { .. } => TimeFilterType::IsBetween,
            TimeFilter::IsNull => TimeFilterType::IsNull,
            TimeFilter::IsNotNull => TimeFilterType::IsNotNull,
            TimeFilter::Custom { .. } => TimeFilterType::Custom,
        }
    }

    fn granularity(&self) -> Option<TimeGranularity> {
        match self {
            TimeFilter::IsOn { granularity, .. }
            | TimeFilter::IsAfter { granularity, .. }
            | TimeFilter::IsBefore { granularity, .. }
            | TimeFilter::IsBetween { granularity, .. } => Some(*granularity),
            _ => None,
        }
    }

    fn date(&self) -> Option<NaiveDateTime> {
        match self {
            TimeFilter::IsOn { date, .. } | TimeFilter::IsAfter { date, .. } | TimeFilter::IsBefore { date, .. } => {
                Some(*date)
            }
            _ => None,
        }
    }
}

pub fn time_filter_code(field: &str, filter: &TimeFilter) -> String {
    match filter {
        TimeFilter::IsInThePast { amount, unit } => {
            format!("{field}: now - {amount} {unit} for {amount} {unit}")
        }
        TimeFilter::IsLast { period } => format!("{field}.{period} = now.{period} - 1 {period}"),
        TimeFilter::IsThis { period } => format!("{field}.{period} = now.{period}"),
        TimeFilter::IsOn { granularity, date } => {
            format!("{}.{} = {}", field, granularity, time_literal(date, *granularity))
        }
        TimeFilter::IsAfter { granularity, date } => {
            format!("{}.{} > {}", field, granularity, time_literal(date, *granularity))
        }
        TimeFilter::IsBefore { granularity, date } => {
            format!("{}.{} < {}", field, granularity, time_literal(date, *granularity))
        }
        TimeFilter::IsBetween { granularity, start, end } => format!(
            "{}.{}: {} to {}",
            field,
            granularity,
            time_literal(start, *granularity),
            time_literal(end, *granularity)
        ),
        TimeFilter::IsNull => format!("{} = null", field),
        TimeFilter::IsNotNull => format!("{} != null", field),
        TimeFilter::Custom { partial } => format!("{}: {}", field, partial),
    }
}

/// Time literal truncated to `granularity`, e.g. `@2021-Q3` or `@2021-07-04`
pub fn time_literal(time: &NaiveDateTime, granularity: TimeGranularity) -> String {
    match granularity {
        TimeGranularity::Year => time.format("@%Y").to_string(),
        TimeGranularity::Quarter => format!("@{:04}-Q{}", time.year(), time.month0() / 3 + 1),
        TimeGranularity::Month => time.format("@%Y-%m").to_string(),
        TimeGranularity::Week => time.format("@WK%Y-%m-%d").to_string(),
        TimeGranularity::Day => time.format("@%Y-%m-%d").to_string(),
        TimeGranularity::Hour => time.format("@%Y-%m-%d %H:00 for 1 hour").to_string(),
        TimeGranularity::Minute => time.format("@%Y-%m-%d %H:%M").to_string(),
        TimeGranularity::Second => time.format("@%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Switch operator, keeping granularity and dates where both sides have them
///
/// `now` fills in dates the old filter did not have.
pub fn time_filter_change_type(filter: &TimeFilter, filter_type: TimeFilterType, now: NaiveDateTime) -> TimeFilter {
    let granularity = filter.granularity().unwrap_or(TimeGranularity::Day);
    match filter_type {
        TimeFilterType::IsInThePast => TimeFilter::IsInThePast {
            amount: 7,
            unit: PastUnit::Days,
        },
        TimeFilterType::IsLast => TimeFilter::IsLast {
            period: TimeGranularity::Day,
        },
        TimeFilterType::IsThis => TimeFilter::IsThis {
            period: TimeGranularity::Day,
        },
        TimeFilterType::IsOn | TimeFilterType::IsAfter | TimeFilterType::IsBefore => {
            let date = match filter {
                TimeFilter::IsBetween { start, .. } => *start,
                other => other.date().unwrap_or(now),
            };
            match filter_type {
                TimeFilterType::IsOn => TimeFilter::IsOn { granularity, date },
                TimeFilterType::IsAfter => TimeFilter::IsAfter { granularity, date },
                _ => TimeFilter::IsBefore { granularity, date },
            }
        }
        TimeFilterType::IsBetween => TimeFilter::IsBetween {
            granularity,
            start: filter.date().unwrap_or(now),
            end: now,
        },
        TimeFilterType::IsNull => TimeFilter::IsNull,
        TimeFilterType::IsNotNull => TimeFilter::IsNotNull,
        TimeFilterType::Custom => TimeFilter::Custom { partial: String::new() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    // -- unit: literals -------------------------------------------------------

    #[test]
    fn test_time_literals() {
        let t = at(2021, 8, 4, 13, 5, 9);
        assert_eq!(time_literal(&t, TimeGranularity::Year), "@2021");
        assert_eq!(time_literal(&t, TimeGranularity::Quarter), "@2021-Q3");
        assert_eq!(time_literal(&t, TimeGranularity::Month), "@2021-08");
        assert_eq!(time_literal(&t, TimeGranularity::Week), "@WK2021-08-04");
        assert_eq!(time_literal(&t, TimeGranularity::Day), "@2021-08-04");
        assert_eq!(time_literal(&t, TimeGranularity::Hour), "@2021-08-04 13:00 for 1 hour");
        assert_eq!(time_literal(&t, TimeGranularity::Minute), "@2021-08-04 13:05");
        assert_eq!(time_literal(&t, TimeGranularity::Second), "@2021-08-04 13:05:09");
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(time_literal(&at(2020, 1, 1, 0, 0, 0), TimeGranularity::Quarter), "@2020-Q1");
        assert_eq!(time_literal(&at(2020, 12, 31, 0, 0, 0), TimeGranularity::Quarter), "@2020-Q4");
    }

    // -- unit: filter code ----------------------------------------------------

    #[test]
    fn test_relative_filters() {
        let past = TimeFilter::IsInThePast { amount: 3, unit: PastUnit::Weeks };
        assert_eq!(time_filter_code("dep_time", &past), "dep_time: now - 3 weeks for 3 weeks");

        let last = TimeFilter::IsLast { period: TimeGranularity::Month };
        assert_eq!(time_filter_code("dep_time", &last), "dep_time.month = now.month - 1 month");

        let this = TimeFilter::IsThis { period: TimeGranularity::Year };
        assert_eq!(time_filter_code("dep_time", &this), "dep_time.year = now.year");
    }

    #[test]
    fn test_absolute_filters() {
        let date = at(2021, 8, 4, 0, 0, 0);
        let before = TimeFilter::IsBefore { granularity: TimeGranularity::Day, date };
        assert_eq!(time_filter_code("dep_time", &before), "dep_time.day < @2021-08-04");

        let after = TimeFilter::IsAfter { granularity: TimeGranularity::Year, date };
        assert_eq!(time_filter_code("dep_time", &after), "dep_time.year > @2021");

        let between = TimeFilter::IsBetween {
            granularity: TimeGranularity::Month,
            start: date,
            end: at(2021, 10, 1, 0, 0, 0),
        };
        assert_eq!(time_filter_code("dep_time", &between), "dep_time.month: @2021-08 to @2021-10");
    }

    // -- unit: change type ----------------------------------------------------

    #[test]
    fn test_change_type_keeps_date() {
        let now = at(2022, 1, 1, 0, 0, 0);
        let date = at(2021, 8, 4, 0, 0, 0);
        let on = TimeFilter::IsOn { granularity: TimeGranularity::Month, date };

        assert_eq!(
            time_filter_change_type(&on, TimeFilterType::IsBefore, now),
            TimeFilter::IsBefore { granularity: TimeGranularity::Month, date }
        );
        assert_eq!(
            time_filter_change_type(&on, TimeFilterType::IsBetween, now),
            TimeFilter::IsBetween { granularity: TimeGranularity::Month, start: date, end: now }
        );

        let between = TimeFilter::IsBetween { granularity: TimeGranularity::Day, start: date, end: now };
        assert_eq!(
            time_filter_change_type(&between, TimeFilterType::IsOn, now),
            TimeFilter::IsOn { granularity: TimeGranularity::Day, date }
        );
    }

    #[test]
    fn test_change_type_defaults() {
        let now = at(2022, 1, 1, 0, 0, 0);
        assert_eq!(
            time_filter_change_type(&TimeFilter::IsNull, TimeFilterType::IsAfter, now),
            TimeFilter::IsAfter { granularity: TimeGranularity::Day, date: now }
        );
        assert_eq!(
            time_filter_change_type(&TimeFilter::IsNull, TimeFilterType::IsInThePast, now),
            TimeFilter::IsInThePast { amount: 7, unit: PastUnit::Days }
        );
    }
}

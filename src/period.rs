use crate::error::{Result, ValorizationError};
use crate::schema::IntakeRecord;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A calendar month/year window, used both for bonus-eligibility totals and
/// for report filtering. Both month boundaries are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ValorizationError::InvalidMonth(month));
        }
        Ok(Self { month, year })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated month")
    }

    pub fn last_day(&self) -> NaiveDate {
        last_day_of_month(self.year, self.month)
    }
}

/// Parses `"YYYY-MM"`, e.g. `"2021-03"`.
impl FromStr for Period {
    type Err = ValorizationError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ValorizationError::InvalidPeriod(s.to_string());
        let (year_str, month_str) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { month, year })
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}

/// An inclusive report window selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ValorizationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Sums normalized weight per depositor tax ID over one calendar month.
///
/// Depositors with no records in the period are absent from the result, not
/// present with a zero; callers must treat the two as equivalent. Records
/// whose date, tax ID or weight failed coercion cannot be attributed and are
/// skipped.
pub fn aggregate_period(records: &[IntakeRecord], period: Period) -> BTreeMap<u64, i64> {
    let mut totals: BTreeMap<u64, i64> = BTreeMap::new();

    for record in records {
        let (Some(date), Some(tax_id), Some(weight)) =
            (record.date, record.tax_id, record.weight_kg)
        else {
            continue;
        };

        if period.contains(date) {
            *totals.entry(tax_id).or_insert(0) += weight;
        }
    }

    totals
}

//! Calendar month targeted by an accrual run.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccrualPeriod {
    year: i32,
    month: u32,
}

impl AccrualPeriod {
    /// Creates a period, rejecting months outside 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(Error::InvalidPeriod {
                year,
                month: i32::try_from(month).unwrap_or(i32::MAX),
            });
        }
        Ok(Self { year, month })
    }

    /// Builds a period from the `effective_year`/`effective_month` columns.
    pub fn from_stored(year: i32, month: i32) -> Result<Self> {
        let month = u32::try_from(month).map_err(|_| Error::InvalidPeriod { year, month })?;
        Self::new(year, month)
    }

    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, 1-12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Month as stored in the `effective_month` column.
    #[must_use]
    pub fn stored_month(self) -> i32 {
        // 1..=12 always fits
        i32::try_from(self.month).unwrap_or_default()
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// The following month.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for AccrualPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

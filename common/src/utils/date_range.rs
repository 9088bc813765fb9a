//! Fiscal calendar date bounds.
//!
//! The fiscal year runs from April 1st to March 31st of the following
//! calendar year.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

use crate::errors::{AppError, AppResult};
use crate::models::query::DateFilter;

/// Resolved bounds of a date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Whether `end` itself is part of the range.
    pub end_inclusive: bool,
}

impl DateFilter {
    /// Resolves the filter into concrete bounds.
    ///
    /// `fiscal_years` limits the selectable fiscal years for MTD and YTD.
    pub fn bounds(&self, fiscal_years: &RangeInclusive<i32>) -> AppResult<DateBounds> {
        match *self {
            DateFilter::Custom { start, end } => {
                if start > end {
                    return Err(AppError::Validation(format!(
                        "start date {} is after end date {}",
                        start, end
                    )));
                }
                Ok(DateBounds {
                    start,
                    end,
                    end_inclusive: true,
                })
            }
            DateFilter::Mtd { month, fiscal_year } => {
                check_fiscal_year(fiscal_year, fiscal_years)?;
                let start = ymd(fiscal_year, month)?;
                let end = next_month(start)?;
                Ok(DateBounds {
                    start,
                    end,
                    end_inclusive: false,
                })
            }
            DateFilter::Ytd { fiscal_year } => {
                check_fiscal_year(fiscal_year, fiscal_years)?;
                let start = ymd(fiscal_year, 4)?;
                let end = NaiveDate::from_ymd_opt(fiscal_year + 1, 3, 31)
                    .ok_or_else(|| AppError::Validation(format!("invalid fiscal year {}", fiscal_year)))?;
                Ok(DateBounds {
                    start,
                    end,
                    end_inclusive: true,
                })
            }
        }
    }
}

fn check_fiscal_year(year: i32, allowed: &RangeInclusive<i32>) -> AppResult<()> {
    if allowed.contains(&year) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "fiscal year {} is outside {}..={}",
            year,
            allowed.start(),
            allowed.end()
        )))
    }
}

/// First day of the given month.
fn ymd(year: i32, month: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("invalid month {} of {}", month, year)))
}

/// First day of the month after `first`; December rolls into January.
fn next_month(first: NaiveDate) -> AppResult<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    ymd(year, month)
}

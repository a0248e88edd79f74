//! Fiscal periods
//!
//! A fiscal period is a bounded date range postings are attributed to.
//! At most one open period should contain any given date; closing a period
//! is part of the fiscal-year-close posting.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, FiscalPeriodId};

use crate::error::LedgerError;

/// A persisted fiscal period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub id: FiscalPeriodId,
    pub company_id: CompanyId,
    pub period_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_closed: bool,
}

impl FiscalPeriod {
    /// Returns true if the date falls inside the period (inclusive bounds)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns true if the period is open and contains the date
    pub fn is_open_at(&self, date: NaiveDate) -> bool {
        !self.is_closed && self.contains(date)
    }

    /// The calendar year entry numbers for this period are scoped to
    pub fn entry_year(&self) -> i32 {
        self.start_date.year()
    }
}

/// A fiscal period to be created by a fiscal-year-open posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFiscalPeriod {
    pub company_id: CompanyId,
    pub period_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewFiscalPeriod {
    /// Validates the date range
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.period_name.trim().is_empty() {
            return Err(LedgerError::InvalidPeriod(
                "period name must not be empty".to_string(),
            ));
        }
        if self.start_date >= self.end_date {
            return Err(LedgerError::InvalidPeriod(format!(
                "start date {} is not before end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

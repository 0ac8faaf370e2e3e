//! Inclusive date ranges used to scope cashbooks and reports

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Inclusive date range. The end is never before the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodBounds")]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct PeriodBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<PeriodBounds> for Period {
    type Error = LedgerError;

    fn try_from(bounds: PeriodBounds) -> Result<Self, Self::Error> {
        Period::new(bounds.start, bounds.end)
    }
}

impl Period {
    /// Create a period, rejecting an end before the start
    pub fn new(start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        if end < start {
            return Err(LedgerError::Validation(format!(
                "Period end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A single day
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// A calendar month, as used by the monthly cashbook
    pub fn month(year: i32, month: u32) -> LedgerResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| LedgerError::Validation(format!("Invalid month {year}-{month}")))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| LedgerError::Validation(format!("Invalid month {year}-{month}")))?;
        Ok(Self { start, end })
    }

    /// A calendar year, as used by the yearly statement
    pub fn year(year: i32) -> LedgerResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| LedgerError::Validation(format!("Invalid year {year}")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| LedgerError::Validation(format!("Invalid year {year}")))?;
        Ok(Self { start, end })
    }

    /// The month containing `date`
    pub fn month_of(date: NaiveDate) -> LedgerResult<Self> {
        Self::month(date.year(), date.month())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the period
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl TryFrom<&Term> for Period {
    type Error = LedgerError;

    fn try_from(term: &Term) -> Result<Self, Self::Error> {
        Period::new(term.start, term.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        let feb = Period::month(2024, 2).unwrap();
        assert_eq!(feb.start(), date(2024, 2, 1));
        assert_eq!(feb.end(), date(2024, 2, 29));

        let dec = Period::month(2023, 12).unwrap();
        assert_eq!(dec.end(), date(2023, 12, 31));

        assert!(Period::month(2024, 13).is_err());
    }

    #[test]
    fn test_year_and_contains() {
        let year = Period::year(2024).unwrap();
        assert!(year.contains(date(2024, 1, 1)));
        assert!(year.contains(date(2024, 12, 31)));
        assert!(!year.contains(date(2025, 1, 1)));
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(Period::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());
        assert!(Period::new(date(2024, 3, 1), date(2024, 3, 1)).is_ok());
    }

    #[test]
    fn test_deserialize_rejects_reversed_range() {
        let reversed = serde_json::from_str::<Period>(r#"{"start":"2024-03-31","end":"2024-03-01"}"#);
        assert!(reversed.is_err());

        let march: Period =
            serde_json::from_str(r#"{"start":"2024-03-01","end":"2024-03-31"}"#).unwrap();
        assert_eq!(march, Period::month(2024, 3).unwrap());
        assert_eq!(
            serde_json::to_string(&march).unwrap(),
            r#"{"start":"2024-03-01","end":"2024-03-31"}"#
        );
    }
}

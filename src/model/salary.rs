use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum_macros::Display;
use utoipa::ToSchema;

use crate::error::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SalaryStatus {
    Pending,
    Paid,
}

/// One line of a salary deduction breakdown. Warning-only violations appear
/// here with a zero amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DeductionDetail {
    #[schema(example = "Late Arrival Fine")]
    pub rule_name: String,

    #[schema(example = 500.0)]
    pub amount: f64,
}

/// A monthly salary record. At most one exists per teacher per month.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryTransaction {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub teacher_id: u64,

    #[schema(example = "Ayesha Rahman")]
    pub teacher_name: String,

    #[schema(example = "2026-08")]
    pub month: String,

    #[schema(example = 45000.0)]
    pub base_salary: f64,

    #[schema(example = 1500.0)]
    pub total_deductions: f64,

    #[schema(example = 43500.0)]
    pub net_salary: f64,

    #[schema(example = "pending")]
    pub status: SalaryStatus,

    #[schema(example = "2026-09-01T10:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub payment_date: Option<DateTime<Utc>>,

    #[schema(value_type = Vec<DeductionDetail>)]
    pub deduction_details: Json<Vec<DeductionDetail>>,
}

/// The singleton funds pool salaries are paid from.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct OrganizationBalance {
    #[schema(example = 1000000.0)]
    pub total_balance: f64,

    #[schema(example = "2026-08-25T12:00:00Z", value_type = String, format = "date-time")]
    pub last_updated: DateTime<Utc>,
}

/// A validated payroll month in `YYYY-MM` form, with its day bounds
/// precomputed. Construction is the only place month arithmetic happens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, derive_more::Display)]
#[display(fmt = "{:04}-{:02}", year, month)]
pub struct PayrollMonth {
    year: i32,
    month: u32,
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl PayrollMonth {
    pub fn from_parts(year: i32, month: u32) -> Option<Self> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }?;
        let last_day = next_first.pred_opt()?;
        Some(Self {
            year,
            month,
            first_day,
            last_day,
        })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }
}

fn parse_month_parts(raw: &str) -> Option<(i32, u32)> {
    let (year_part, month_part) = raw.split_once('-')?;
    if year_part.len() != 4 || month_part.len() != 2 {
        return None;
    }
    if !year_part.bytes().all(|b| b.is_ascii_digit())
        || !month_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((year_part.parse().ok()?, month_part.parse().ok()?))
}

impl FromStr for PayrollMonth {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_month_parts(raw)
            .and_then(|(year, month)| PayrollMonth::from_parts(year, month))
            .ok_or_else(|| Error::InvalidMonth(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_month_and_computes_bounds() {
        let month: PayrollMonth = "2026-03".parse().unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert_eq!(month.to_string(), "2026-03");
    }

    #[test]
    fn handles_leap_february_and_december() {
        let february: PayrollMonth = "2024-02".parse().unwrap();
        assert_eq!(february.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let december: PayrollMonth = "2023-12".parse().unwrap();
        assert_eq!(december.first_day(), NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(december.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn rejects_malformed_months() {
        for raw in [
            "2024-3",
            "24-03",
            "2024-13",
            "2024-00",
            "2024/03",
            "2024-03-01",
            "abcd-ef",
            "",
            "2024-",
        ] {
            assert!(
                raw.parse::<PayrollMonth>().is_err(),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[test]
    fn month_bounds_are_inclusive_day_range() {
        let month: PayrollMonth = "2026-08".parse().unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());
    }
}

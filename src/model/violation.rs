use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::rule::PenaltyType;

/// A recorded rule breach, keyed by (teacher, rule, calendar date).
///
/// `rule_name` is denormalized so the row stays meaningful after the rule
/// itself is deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Violation {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub teacher_id: u64,

    #[schema(example = "Ayesha Rahman")]
    pub teacher_name: String,

    #[schema(example = 3)]
    pub rule_id: u64,

    #[schema(example = "Late Arrival Fine")]
    pub rule_name: String,

    #[schema(example = "2026-08-25", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "salary_cut")]
    pub penalty_applied: PenaltyType,

    #[schema(example = 500.0)]
    pub salary_cut_amount: f64,

    #[schema(example = "Auto-enforced: late > 15", nullable = true)]
    pub notes: Option<String>,

    #[schema(example = "2026-08-25T12:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Insert shape produced by the rule engine.
#[derive(Debug, Clone)]
pub struct NewViolation {
    pub teacher_id: u64,
    pub teacher_name: String,
    pub rule_id: u64,
    pub rule_name: String,
    pub date: NaiveDate,
    pub penalty_applied: PenaltyType,
    pub salary_cut_amount: f64,
    pub notes: String,
}

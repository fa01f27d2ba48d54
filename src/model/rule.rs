use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::error::Error;
use crate::model::attendance::AttendanceStatus;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PenaltyType {
    Warning,
    SalaryCut,
    Suspension,
}

/// A conduct rule. `condition` is stored in canonical DSL form, so rows
/// written through the API always parse back.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Rule {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Late Arrival Fine")]
    pub rule_name: String,

    #[schema(example = "Deducts a fine when a teacher is more than 15 minutes late")]
    pub description: String,

    #[schema(example = "salary_cut")]
    pub penalty_type: PenaltyType,

    #[schema(example = 500.0)]
    pub penalty_value: f64,

    #[schema(example = true)]
    pub auto_enforce: bool,

    #[schema(example = "late > 15")]
    pub condition: String,
}

/// The rule condition DSL. Exactly two forms exist:
///
/// * `late > N` matches records with status `late` and more than N late minutes
/// * `absent` matches records with status `absent`
///
/// Anything else is rejected at rule creation time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RuleCondition {
    LateOver(i64),
    Absent,
}

impl RuleCondition {
    pub fn matches(&self, status: AttendanceStatus, late_minutes: i64) -> bool {
        match self {
            RuleCondition::LateOver(threshold) => {
                status == AttendanceStatus::Late && late_minutes > *threshold
            }
            RuleCondition::Absent => status == AttendanceStatus::Absent,
        }
    }
}

impl FromStr for RuleCondition {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("absent") {
            return Ok(RuleCondition::Absent);
        }

        let lowered = trimmed.to_ascii_lowercase();
        if let Some(rest) = lowered.strip_prefix("late") {
            if let Some(threshold) = rest.trim_start().strip_prefix('>') {
                if let Ok(minutes) = threshold.trim().parse::<i64>() {
                    if minutes >= 0 {
                        return Ok(RuleCondition::LateOver(minutes));
                    }
                }
            }
        }

        Err(Error::InvalidCondition(raw.to_string()))
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCondition::LateOver(minutes) => write!(f, "late > {}", minutes),
            RuleCondition::Absent => write!(f, "absent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_forms() {
        assert_eq!(
            "late > 15".parse::<RuleCondition>().unwrap(),
            RuleCondition::LateOver(15)
        );
        assert_eq!(
            "absent".parse::<RuleCondition>().unwrap(),
            RuleCondition::Absent
        );
    }

    #[test]
    fn parsing_tolerates_spacing_and_case() {
        assert_eq!(
            "late>30".parse::<RuleCondition>().unwrap(),
            RuleCondition::LateOver(30)
        );
        assert_eq!(
            "  LATE >  5 ".parse::<RuleCondition>().unwrap(),
            RuleCondition::LateOver(5)
        );
        assert_eq!(
            " Absent ".parse::<RuleCondition>().unwrap(),
            RuleCondition::Absent
        );
    }

    #[test]
    fn zero_threshold_is_valid() {
        assert_eq!(
            "late > 0".parse::<RuleCondition>().unwrap(),
            RuleCondition::LateOver(0)
        );
    }

    #[test]
    fn rejects_malformed_conditions() {
        for raw in [
            "",
            "absent today",
            "late < 15",
            "late = 15",
            "late > abc",
            "late > -3",
            "late > 15 today",
            "latest > 5",
            "present",
        ] {
            assert!(
                raw.parse::<RuleCondition>().is_err(),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(RuleCondition::LateOver(15).to_string(), "late > 15");
        assert_eq!(RuleCondition::Absent.to_string(), "absent");
        // round-trips through the parser
        let parsed = "late>007".parse::<RuleCondition>().unwrap();
        assert_eq!(parsed.to_string(), "late > 7");
    }

    #[test]
    fn late_over_requires_late_status_and_strict_excess() {
        let condition = RuleCondition::LateOver(15);
        assert!(condition.matches(AttendanceStatus::Late, 16));
        assert!(condition.matches(AttendanceStatus::Late, 120));
        assert!(!condition.matches(AttendanceStatus::Late, 15));
        assert!(!condition.matches(AttendanceStatus::Present, 30));
        assert!(!condition.matches(AttendanceStatus::Absent, 0));
    }

    #[test]
    fn absent_matches_only_absent_status() {
        let condition = RuleCondition::Absent;
        assert!(condition.matches(AttendanceStatus::Absent, 0));
        assert!(!condition.matches(AttendanceStatus::Late, 45));
        assert!(!condition.matches(AttendanceStatus::Leave, 0));
    }
}

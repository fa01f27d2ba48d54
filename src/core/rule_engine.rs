use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::core::attendance;
use crate::db;
use crate::error::Result;
use crate::model::attendance::DailyAttendanceEntry;
use crate::model::rule::{PenaltyType, Rule, RuleCondition};
use crate::model::violation::NewViolation;

/// Outcome of one enforcement sweep.
#[derive(Debug, Serialize, ToSchema)]
pub struct EngineReport {
    #[schema(example = 24)]
    pub records_evaluated: usize,

    #[schema(example = 3)]
    pub violations_created: u64,

    #[schema(example = 1)]
    pub duplicates_skipped: u64,
}

/// Evaluate one attendance entry against one rule.
///
/// Unparseable stored conditions are skipped with a warning rather than
/// failing the sweep. The salary cut amount is taken from the rule only for
/// `salary_cut` penalties; warnings and suspensions record zero.
pub(crate) fn violation_for(entry: &DailyAttendanceEntry, rule: &Rule) -> Option<NewViolation> {
    let condition = match rule.condition.parse::<RuleCondition>() {
        Ok(c) => c,
        Err(_) => {
            warn!(
                rule_id = rule.id,
                condition = %rule.condition,
                "Skipping rule with unparseable condition"
            );
            return None;
        }
    };

    if !condition.matches(entry.status, entry.late_minutes) {
        return None;
    }

    let salary_cut_amount = if rule.penalty_type == PenaltyType::SalaryCut {
        rule.penalty_value
    } else {
        0.0
    };

    Some(NewViolation {
        teacher_id: entry.teacher_id,
        teacher_name: entry.teacher_name.clone(),
        rule_id: rule.id,
        rule_name: rule.rule_name.clone(),
        date: entry.date,
        penalty_applied: rule.penalty_type,
        salary_cut_amount,
        notes: format!("Auto-enforced: {}", condition),
    })
}

/// Run every auto-enforced rule over today's attendance view.
///
/// Re-running is safe: the unique key on (teacher_id, rule_id, date) turns
/// repeat matches into skipped duplicates instead of double penalties.
pub async fn run(pool: &MySqlPool) -> Result<EngineReport> {
    let roster = attendance::today_roster(pool).await?;

    let rules = sqlx::query_as::<_, Rule>("SELECT * FROM rules WHERE auto_enforce = TRUE")
        .fetch_all(pool)
        .await?;

    let mut report = EngineReport {
        records_evaluated: roster.len(),
        violations_created: 0,
        duplicates_skipped: 0,
    };

    for entry in &roster {
        for rule in &rules {
            let Some(violation) = violation_for(entry, rule) else {
                continue;
            };

            if insert_violation(pool, &violation).await? {
                report.violations_created += 1;
            } else {
                report.duplicates_skipped += 1;
            }
        }
    }

    info!(
        records_evaluated = report.records_evaluated,
        violations_created = report.violations_created,
        duplicates_skipped = report.duplicates_skipped,
        "Rule engine sweep finished"
    );

    Ok(report)
}

/// Returns false when the (teacher, rule, date) violation already exists.
async fn insert_violation(pool: &MySqlPool, violation: &NewViolation) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO violations
            (teacher_id, teacher_name, rule_id, rule_name, date, penalty_applied, salary_cut_amount, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(violation.teacher_id)
    .bind(&violation.teacher_name)
    .bind(violation.rule_id)
    .bind(&violation.rule_name)
    .bind(violation.date)
    .bind(violation.penalty_applied)
    .bind(violation.salary_cut_amount)
    .bind(&violation.notes)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(true),
        Err(e) if db::is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use chrono::NaiveDate;

    fn entry(status: AttendanceStatus, late_minutes: i64) -> DailyAttendanceEntry {
        DailyAttendanceEntry {
            teacher_id: 7,
            teacher_name: "Ayesha Rahman".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            check_in: None,
            check_out: None,
            late_minutes,
            status,
        }
    }

    fn rule(condition: &str, penalty_type: PenaltyType, penalty_value: f64) -> Rule {
        Rule {
            id: 3,
            rule_name: "Late Arrival Fine".to_string(),
            description: "Fine for late arrival".to_string(),
            penalty_type,
            penalty_value,
            auto_enforce: true,
            condition: condition.to_string(),
        }
    }

    #[test]
    fn salary_cut_rule_yields_violation_with_amount() {
        let violation = violation_for(
            &entry(AttendanceStatus::Late, 20),
            &rule("late > 15", PenaltyType::SalaryCut, 500.0),
        )
        .unwrap();

        assert_eq!(violation.teacher_id, 7);
        assert_eq!(violation.rule_id, 3);
        assert_eq!(violation.penalty_applied, PenaltyType::SalaryCut);
        assert_eq!(violation.salary_cut_amount, 500.0);
        assert_eq!(violation.notes, "Auto-enforced: late > 15");
    }

    #[test]
    fn warning_rule_records_zero_amount() {
        let violation = violation_for(
            &entry(AttendanceStatus::Absent, 0),
            &rule("absent", PenaltyType::Warning, 250.0),
        )
        .unwrap();

        assert_eq!(violation.penalty_applied, PenaltyType::Warning);
        assert_eq!(violation.salary_cut_amount, 0.0);
        assert_eq!(violation.notes, "Auto-enforced: absent");
    }

    #[test]
    fn non_matching_entry_yields_nothing() {
        assert!(
            violation_for(
                &entry(AttendanceStatus::Late, 10),
                &rule("late > 15", PenaltyType::SalaryCut, 500.0),
            )
            .is_none()
        );
        assert!(
            violation_for(
                &entry(AttendanceStatus::Present, 0),
                &rule("absent", PenaltyType::Warning, 0.0),
            )
            .is_none()
        );
    }

    #[test]
    fn unparseable_stored_condition_is_skipped() {
        assert!(
            violation_for(
                &entry(AttendanceStatus::Late, 60),
                &rule("late within 15", PenaltyType::SalaryCut, 500.0),
            )
            .is_none()
        );
    }
}

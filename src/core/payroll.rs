use std::collections::HashSet;

use futures_util::TryStreamExt;
use sqlx::MySqlPool;
use sqlx::types::Json;
use tracing::{info, warn};

use crate::db;
use crate::error::Result;
use crate::model::salary::{DeductionDetail, PayrollMonth, SalaryStatus, SalaryTransaction};
use crate::model::violation::Violation;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PayrollTeacher {
    pub id: u64,
    pub full_name: String,
    pub salary_base: f64,
}

#[derive(Debug)]
pub(crate) struct SalaryDraft {
    pub base_salary: f64,
    pub total_deductions: f64,
    pub net_salary: f64,
    pub details: Vec<DeductionDetail>,
    pub capped: bool,
}

/// Aggregate a teacher's month of violations into a salary draft.
///
/// Every violation contributes a breakdown line, warning-only ones with a
/// zero amount. Deductions are capped at the base salary so net pay never
/// goes negative; the full breakdown is kept either way.
pub(crate) fn build_draft(base_salary: f64, violations: &[&Violation]) -> SalaryDraft {
    let details: Vec<DeductionDetail> = violations
        .iter()
        .map(|violation| DeductionDetail {
            rule_name: violation.rule_name.clone(),
            amount: violation.salary_cut_amount,
        })
        .collect();

    let raw_total: f64 = details.iter().map(|detail| detail.amount).sum();
    let total_deductions = raw_total.min(base_salary);

    SalaryDraft {
        base_salary,
        total_deductions,
        net_salary: base_salary - total_deductions,
        details,
        capped: raw_total > base_salary,
    }
}

/// Generate pending salary records for one month.
///
/// Covers every non-terminated teacher, skips those whose record for the
/// month already exists, and returns only the newly created rows. The unique
/// key on (teacher_id, month) absorbs races between concurrent runs.
pub async fn generate_monthly(
    pool: &MySqlPool,
    month: PayrollMonth,
) -> Result<Vec<SalaryTransaction>> {
    let month_key = month.to_string();

    let violations = sqlx::query_as::<_, Violation>(
        "SELECT * FROM violations WHERE date BETWEEN ? AND ? ORDER BY date, id",
    )
    .bind(month.first_day())
    .bind(month.last_day())
    .fetch_all(pool)
    .await?;

    let already_generated: HashSet<u64> =
        sqlx::query_scalar::<_, u64>("SELECT teacher_id FROM salary_transactions WHERE month = ?")
            .bind(&month_key)
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    let mut created = Vec::new();

    let mut teachers = sqlx::query_as::<_, PayrollTeacher>(
        "SELECT id, full_name, salary_base FROM teachers WHERE status <> 'terminated' ORDER BY id",
    )
    .fetch(pool);

    while let Some(teacher) = teachers.try_next().await? {
        if already_generated.contains(&teacher.id) {
            continue;
        }

        let teacher_violations: Vec<&Violation> = violations
            .iter()
            .filter(|violation| violation.teacher_id == teacher.id)
            .collect();

        let draft = build_draft(teacher.salary_base, &teacher_violations);
        if draft.capped {
            warn!(
                teacher_id = teacher.id,
                base_salary = draft.base_salary,
                "Deductions exceed base salary, capping at base"
            );
        }

        let result = sqlx::query(
            r#"
            INSERT INTO salary_transactions
                (teacher_id, teacher_name, month, base_salary, total_deductions, net_salary, status, deduction_details)
            VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(teacher.id)
        .bind(&teacher.full_name)
        .bind(&month_key)
        .bind(draft.base_salary)
        .bind(draft.total_deductions)
        .bind(draft.net_salary)
        .bind(Json(&draft.details))
        .execute(pool)
        .await;

        match result {
            Ok(done) => created.push(SalaryTransaction {
                id: done.last_insert_id(),
                teacher_id: teacher.id,
                teacher_name: teacher.full_name,
                month: month_key.clone(),
                base_salary: draft.base_salary,
                total_deductions: draft.total_deductions,
                net_salary: draft.net_salary,
                status: SalaryStatus::Pending,
                payment_date: None,
                deduction_details: Json(draft.details),
            }),
            // Lost the race against a concurrent generation run.
            Err(e) if db::is_unique_violation(&e) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    info!(month = %month_key, created = created.len(), "Monthly salary generation finished");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rule::PenaltyType;
    use chrono::{NaiveDate, Utc};

    fn violation(rule_name: &str, penalty: PenaltyType, amount: f64) -> Violation {
        Violation {
            id: 1,
            teacher_id: 7,
            teacher_name: "Ayesha Rahman".to_string(),
            rule_id: 3,
            rule_name: rule_name.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            penalty_applied: penalty,
            salary_cut_amount: amount,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn clean_month_pays_full_base() {
        let draft = build_draft(30000.0, &[]);

        assert_eq!(draft.base_salary, 30000.0);
        assert_eq!(draft.total_deductions, 0.0);
        assert_eq!(draft.net_salary, 30000.0);
        assert!(draft.details.is_empty());
        assert!(!draft.capped);
    }

    #[test]
    fn deductions_sum_in_violation_order() {
        let late = violation("Late Arrival Fine", PenaltyType::SalaryCut, 500.0);
        let absence = violation("Unexcused Absence", PenaltyType::SalaryCut, 1000.0);

        let draft = build_draft(30000.0, &[&late, &absence]);

        assert_eq!(draft.total_deductions, 1500.0);
        assert_eq!(draft.net_salary, 28500.0);
        assert_eq!(
            draft.details,
            vec![
                DeductionDetail {
                    rule_name: "Late Arrival Fine".to_string(),
                    amount: 500.0
                },
                DeductionDetail {
                    rule_name: "Unexcused Absence".to_string(),
                    amount: 1000.0
                },
            ]
        );
        assert!(!draft.capped);
    }

    #[test]
    fn warning_violations_appear_with_zero_amount() {
        let warning = violation("Absence Warning", PenaltyType::Warning, 0.0);
        let fine = violation("Late Arrival Fine", PenaltyType::SalaryCut, 500.0);

        let draft = build_draft(30000.0, &[&warning, &fine]);

        assert_eq!(draft.total_deductions, 500.0);
        assert_eq!(draft.details.len(), 2);
        assert_eq!(draft.details[0].amount, 0.0);
    }

    #[test]
    fn deductions_cap_at_base_salary() {
        let first = violation("Heavy Fine", PenaltyType::SalaryCut, 800.0);
        let second = violation("Another Fine", PenaltyType::SalaryCut, 500.0);

        let draft = build_draft(1000.0, &[&first, &second]);

        assert_eq!(draft.total_deductions, 1000.0);
        assert_eq!(draft.net_salary, 0.0);
        assert!(draft.capped);
        // breakdown keeps the uncapped amounts
        let breakdown_total: f64 = draft.details.iter().map(|d| d.amount).sum();
        assert_eq!(breakdown_total, 1300.0);
    }
}

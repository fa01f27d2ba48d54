use chrono::Utc;
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::db;
use crate::error::{Error, Result};
use crate::model::salary::{OrganizationBalance, SalaryStatus};

/// Tolerance for comparing a submitted payment amount against the stored net
/// salary, both of which travel as floats.
const AMOUNT_EPSILON: f64 = 1e-6;

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentReceipt {
    #[schema(example = 12)]
    pub transaction_id: u64,

    #[schema(example = 7)]
    pub teacher_id: u64,

    #[schema(example = "Ayesha Rahman")]
    pub teacher_name: String,

    #[schema(example = "2026-08")]
    pub month: String,

    #[schema(example = 43500.0)]
    pub amount: f64,
}

/// Settlement guard, checked while both rows are locked.
///
/// Order matters for the reported error: an already-paid transaction wins
/// over a mismatched amount, which wins over insufficient funds.
pub(crate) fn validate_settlement(
    status: SalaryStatus,
    net_salary: f64,
    amount: f64,
    balance: f64,
) -> Result<()> {
    if status == SalaryStatus::Paid {
        return Err(Error::AlreadyPaid);
    }
    if (amount - net_salary).abs() > AMOUNT_EPSILON {
        return Err(Error::AmountMismatch);
    }
    if balance < amount {
        return Err(Error::InsufficientFunds);
    }
    Ok(())
}

/// Pay one pending salary transaction.
///
/// The balance row and the transaction row are locked in one database
/// transaction, so the debit and the status flip land together or not at
/// all. Any guard failure rolls back and releases the locks.
pub async fn pay_salary(pool: &MySqlPool, transaction_id: u64, amount: f64) -> Result<PaymentReceipt> {
    let mut tx = pool.begin().await?;

    let balance = sqlx::query_scalar::<_, f64>(
        "SELECT total_balance FROM organization_balance WHERE id = 1 FOR UPDATE",
    )
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::BalanceMissing)?;

    let (teacher_id, teacher_name, month, net_salary, status) =
        sqlx::query_as::<_, (u64, String, String, f64, SalaryStatus)>(
            r#"
            SELECT teacher_id, teacher_name, month, net_salary, status
            FROM salary_transactions
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(Error::TransactionNotFound)?;

    validate_settlement(status, net_salary, amount, balance)?;

    let now = Utc::now();

    sqlx::query("UPDATE organization_balance SET total_balance = total_balance - ?, last_updated = ? WHERE id = 1")
        .bind(amount)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE salary_transactions SET status = 'paid', payment_date = ? WHERE id = ?")
        .bind(now)
        .bind(transaction_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(transaction_id, teacher_id, amount, "Salary payment settled");

    Ok(PaymentReceipt {
        transaction_id,
        teacher_id,
        teacher_name,
        month,
        amount,
    })
}

/// Current funds, seeding the singleton row on first access.
pub async fn organization_balance(pool: &MySqlPool, seed_amount: f64) -> Result<OrganizationBalance> {
    if let Some(balance) = fetch_balance(pool).await? {
        return Ok(balance);
    }

    let seeded = OrganizationBalance {
        total_balance: seed_amount,
        last_updated: Utc::now(),
    };

    let inserted =
        sqlx::query("INSERT INTO organization_balance (id, total_balance, last_updated) VALUES (1, ?, ?)")
            .bind(seeded.total_balance)
            .bind(seeded.last_updated)
            .execute(pool)
            .await;

    match inserted {
        Ok(_) => {
            info!(seed_amount, "Organization balance seeded");
            Ok(seeded)
        }
        // Another request seeded it first; read theirs.
        Err(e) if db::is_unique_violation(&e) => {
            fetch_balance(pool).await?.ok_or(Error::BalanceMissing)
        }
        Err(e) => Err(e.into()),
    }
}

async fn fetch_balance(pool: &MySqlPool) -> Result<Option<OrganizationBalance>> {
    let balance = sqlx::query_as::<_, OrganizationBalance>(
        "SELECT total_balance, last_updated FROM organization_balance WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_amount_with_funds_passes() {
        assert!(validate_settlement(SalaryStatus::Pending, 28500.0, 28500.0, 100000.0).is_ok());
    }

    #[test]
    fn tiny_float_drift_is_tolerated() {
        assert!(
            validate_settlement(SalaryStatus::Pending, 28500.0, 28500.0000000001, 100000.0).is_ok()
        );
    }

    #[test]
    fn paid_transaction_is_rejected_first() {
        // already paid wins even when the amount is also wrong
        assert!(matches!(
            validate_settlement(SalaryStatus::Paid, 28500.0, 99.0, 100000.0),
            Err(Error::AlreadyPaid)
        ));
    }

    #[test]
    fn wrong_amount_is_rejected() {
        assert!(matches!(
            validate_settlement(SalaryStatus::Pending, 28500.0, 28000.0, 100000.0),
            Err(Error::AmountMismatch)
        ));
    }

    #[test]
    fn insufficient_funds_is_rejected() {
        assert!(matches!(
            validate_settlement(SalaryStatus::Pending, 28500.0, 28500.0, 500.0),
            Err(Error::InsufficientFunds)
        ));
    }

    #[test]
    fn balance_equal_to_amount_is_enough() {
        assert!(validate_settlement(SalaryStatus::Pending, 28500.0, 28500.0, 28500.0).is_ok());
    }
}

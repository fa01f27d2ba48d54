use anyhow::Result;
use sqlx::MySqlPool;
use sqlx::types::Json;
use tracing::warn;

use crate::model::activity::NewActivity;

/// Queue an audit entry without blocking the caller.
///
/// Failures are logged and swallowed: a lost audit row must never fail the
/// request that produced it.
pub fn record(pool: &MySqlPool, activity: NewActivity) {
    let pool = pool.clone();
    actix_web::rt::spawn(async move {
        let action = activity.action_type;
        if let Err(e) = insert(&pool, activity).await {
            warn!(error = %e, action = %action, "Failed to write activity log entry");
        }
    });
}

async fn insert(pool: &MySqlPool, activity: NewActivity) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO activities
            (user_id, action_type, description, performed_by, performed_by_name, performed_by_role, metadata)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(activity.user_id)
    .bind(activity.action_type)
    .bind(activity.description)
    .bind(activity.performed_by)
    .bind(activity.performed_by_name)
    .bind(activity.performed_by_role)
    .bind(activity.metadata.map(Json))
    .execute(pool)
    .await?;

    Ok(())
}

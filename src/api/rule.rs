use crate::auth::auth::AuthUser;
use crate::core::rule_engine::{self, EngineReport};
use crate::error::Error;
use crate::model::activity::{ActivityType, NewActivity};
use crate::model::rule::{PenaltyType, Rule, RuleCondition};
use crate::model::salary::PayrollMonth;
use crate::model::violation::Violation;
use crate::utils::activity_log;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateRule {
    #[schema(example = "Late Arrival Fine")]
    pub rule_name: String,

    #[schema(example = "Deducts a fine when a teacher is more than 15 minutes late")]
    pub description: String,

    #[schema(example = "salary_cut")]
    pub penalty_type: PenaltyType,

    #[schema(example = 500.0)]
    pub penalty_value: Option<f64>,

    #[schema(example = true)]
    pub auto_enforce: Option<bool>,

    #[schema(example = "late > 15")]
    pub condition: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ViolationQuery {
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,

    #[schema(example = 20)]
    /// Pagination per page number
    pub per_page: Option<u32>,

    #[schema(example = 7)]
    /// Filter by teacher ID
    pub teacher_id: Option<u64>,

    #[schema(example = "2026-08")]
    /// Filter by month (YYYY-MM)
    pub month: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ViolationListResponse {
    pub data: Vec<Violation>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 9)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

/* =========================
Create rule
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/rules",
    request_body = CreateRule,
    responses(
        (status = 200, description = "Rule created successfully", body = Object, example = json!({
            "message": "Rule created successfully",
            "rule_id": 3
        })),
        (status = 400, description = "Invalid condition or penalty", body = Object, example = json!({
            "message": "Invalid rule condition: late within 15"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Rules"
)]
pub async fn create_rule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateRule>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let condition = payload.condition.parse::<RuleCondition>()?;

    let penalty_value = payload.penalty_value.unwrap_or(0.0);
    let penalty_value = match payload.penalty_type {
        PenaltyType::SalaryCut if penalty_value > 0.0 => penalty_value,
        PenaltyType::SalaryCut => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "penalty_value must be positive for salary_cut rules"
            })));
        }
        // warnings and suspensions carry no amount
        _ => 0.0,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO rules (rule_name, description, penalty_type, penalty_value, auto_enforce, `condition`)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.rule_name)
    .bind(&payload.description)
    .bind(payload.penalty_type)
    .bind(penalty_value)
    .bind(payload.auto_enforce.unwrap_or(true))
    .bind(condition.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create rule");
        Error::from(e)
    })?;

    let rule_id = result.last_insert_id();
    info!(rule_id, condition = %condition, "Rule created");

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            auth.user_id,
            ActivityType::RuleCreated,
            format!("Created rule '{}'", payload.rule_name),
            &auth,
        )
        .with_metadata(json!({ "rule_id": rule_id, "condition": condition.to_string() })),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Rule created successfully",
        "rule_id": rule_id
    })))
}

/* =========================
List rules
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/rules",
    responses(
        (status = 200, description = "All rules", body = [Rule]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Rules"
)]
pub async fn list_rules(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    let rules = sqlx::query_as::<_, Rule>("SELECT * FROM rules ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(Error::from)?;

    Ok(HttpResponse::Ok().json(rules))
}

/* =========================
Delete rule
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/rules/{rule_id}",
    params(
        ("rule_id" = u64, Path, description = "Rule ID")
    ),
    responses(
        (status = 200, description = "Rule deleted", body = Object, example = json!({
            "message": "Rule deleted"
        })),
        (status = 404, description = "Rule not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Rules"
)]
pub async fn delete_rule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let rule_id = path.into_inner();

    let affected = sqlx::query("DELETE FROM rules WHERE id = ?")
        .bind(rule_id)
        .execute(pool.get_ref())
        .await
        .map_err(Error::from)?
        .rows_affected();

    if affected == 0 {
        return Err(Error::RuleNotFound.into());
    }

    // Existing violations keep the denormalized rule_name.
    Ok(HttpResponse::Ok().json(json!({
        "message": "Rule deleted"
    })))
}

/* =========================
Run the enforcement sweep
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/rules/engine",
    responses(
        (status = 200, description = "Sweep finished", body = EngineReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Rules"
)]
pub async fn run_engine(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let report = rule_engine::run(pool.get_ref()).await?;

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            auth.user_id,
            ActivityType::ViolationRecorded,
            format!(
                "Rule engine sweep: {} violations created",
                report.violations_created
            ),
            &auth,
        )
        .with_metadata(json!({
            "records_evaluated": report.records_evaluated,
            "violations_created": report.violations_created,
            "duplicates_skipped": report.duplicates_skipped
        })),
    );

    Ok(HttpResponse::Ok().json(report))
}

/* =========================
List violations
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/violations",
    params(ViolationQuery),
    responses(
        (status = 200, description = "Paginated violation list", body = ViolationListResponse),
        (status = 400, description = "Invalid month filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Rules"
)]
pub async fn list_violations(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ViolationQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(teacher_id) = query.teacher_id {
        where_sql.push_str(" AND teacher_id = ?");
        args.push(FilterValue::U64(teacher_id));
    }

    if let Some(raw_month) = query.month.as_deref() {
        let month = raw_month.parse::<PayrollMonth>()?;
        where_sql.push_str(" AND date BETWEEN ? AND ?");
        args.push(FilterValue::Date(month.first_day()));
        args.push(FilterValue::Date(month.last_day()));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM violations{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(Error::from)?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "SELECT * FROM violations{} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Violation>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let violations = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(Error::from)?;

    Ok(HttpResponse::Ok().json(ViolationListResponse {
        data: violations,
        page,
        per_page,
        total,
    }))
}

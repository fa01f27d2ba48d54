use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::{payroll, settlement};
use crate::error::Error;
use crate::model::activity::{ActivityType, NewActivity};
use crate::model::salary::{PayrollMonth, SalaryStatus, SalaryTransaction};
use crate::utils::activity_log;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct GenerateSalariesRequest {
    #[schema(example = "2026-08")]
    pub month: String,
}

#[derive(Deserialize, ToSchema)]
pub struct PaySalaryRequest {
    #[schema(example = 43500.0)]
    pub amount: f64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SalaryQuery {
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,

    #[schema(example = 20)]
    /// Pagination per page number
    pub per_page: Option<u32>,

    #[schema(example = "2026-08")]
    /// Filter by month (YYYY-MM)
    pub month: Option<String>,

    #[schema(example = 7)]
    /// Filter by teacher ID
    pub teacher_id: Option<u64>,

    #[schema(example = "pending")]
    /// Filter by payment status
    pub status: Option<SalaryStatus>,
}

#[derive(Serialize, ToSchema)]
pub struct SalaryListResponse {
    pub data: Vec<SalaryTransaction>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

/* =========================
Generate monthly salaries
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/salary/generate",
    request_body = GenerateSalariesRequest,
    responses(
        (status = 200, description = "Generation finished", body = Object, example = json!({
            "message": "Salary generation complete",
            "created": 12,
            "transactions": []
        })),
        (status = 400, description = "Invalid month", body = Object, example = json!({
            "message": "Invalid month '2026-8', expected YYYY-MM"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn generate_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GenerateSalariesRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let month = payload.month.parse::<PayrollMonth>()?;

    let created = payroll::generate_monthly(pool.get_ref(), month).await?;

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            auth.user_id,
            ActivityType::SalaryProcessed,
            format!("Generated {} salary records for {}", created.len(), month),
            &auth,
        )
        .with_metadata(json!({ "month": month.to_string(), "created": created.len() })),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary generation complete",
        "created": created.len(),
        "transactions": created
    })))
}

/* =========================
Pay one salary transaction
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/salary/{transaction_id}/pay",
    params(
        ("transaction_id" = u64, Path, description = "Salary transaction ID")
    ),
    request_body = PaySalaryRequest,
    responses(
        (status = 200, description = "Salary paid", body = Object, example = json!({
            "message": "Salary paid successfully"
        })),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Already paid, amount mismatch, or insufficient funds", body = Object, example = json!({
            "message": "Insufficient funds"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn pay_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<PaySalaryRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let transaction_id = path.into_inner();

    let receipt = settlement::pay_salary(pool.get_ref(), transaction_id, payload.amount).await?;

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            receipt.teacher_id,
            ActivityType::SalaryProcessed,
            format!(
                "Paid {:.2} to {} for {}",
                receipt.amount, receipt.teacher_name, receipt.month
            ),
            &auth,
        )
        .with_metadata(json!({ "transaction_id": receipt.transaction_id })),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary paid successfully",
        "receipt": receipt
    })))
}

/* =========================
List salary transactions
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/salary",
    params(SalaryQuery),
    responses(
        (status = 200, description = "Paginated salary list", body = SalaryListResponse),
        (status = 400, description = "Invalid month filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SalaryQuery>,
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

    if let Some(raw_month) = query.month.as_deref() {
        // validate and canonicalize before comparing against stored keys
        let month = raw_month.parse::<PayrollMonth>()?;
        where_sql.push_str(" AND month = ?");
        args.push(FilterValue::Str(month.to_string()));
    }

    if let Some(teacher_id) = query.teacher_id {
        where_sql.push_str(" AND teacher_id = ?");
        args.push(FilterValue::U64(teacher_id));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.to_string()));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM salary_transactions{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.as_str()),
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
        "SELECT * FROM salary_transactions{} ORDER BY month DESC, id DESC LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, SalaryTransaction>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let transactions = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(Error::from)?;

    Ok(HttpResponse::Ok().json(SalaryListResponse {
        data: transactions,
        page,
        per_page,
        total,
    }))
}

/* =========================
Organization balance
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/salary/balance",
    responses(
        (status = 200, description = "Current funds", body = crate::model::salary::OrganizationBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn get_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    let balance = settlement::organization_balance(pool.get_ref(), config.seed_balance).await?;

    Ok(HttpResponse::Ok().json(balance))
}

use crate::{
    auth::auth::AuthUser,
    error::Error,
    model::activity::{ActivityType, NewActivity},
    model::attendance::AttendanceRecord,
    model::teacher::{ContractType, TeacherProfile, TeacherStatus},
    utils::activity_log,
    utils::db_utils::{SqlValue, build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateTeacher {
    #[schema(example = "Ayesha Rahman")]
    pub full_name: String,

    #[schema(example = "ayesha.rahman@school.edu", format = "email")]
    pub email: String,

    #[schema(example = "+8801712345678")]
    pub phone: Option<String>,

    #[schema(example = "Mathematics")]
    pub department: String,

    #[schema(example = "Senior Teacher")]
    pub designation: String,

    #[schema(example = "2023-01-15", value_type = String, format = "date")]
    pub joining_date: NaiveDate,

    #[schema(example = "permanent")]
    pub contract_type: ContractType,

    #[schema(example = 45000.0)]
    pub salary_base: f64,

    #[schema(example = "0123456789")]
    pub bank_account_number: Option<String>,

    #[schema(example = "City Bank")]
    pub bank_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTeacher {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,

    #[schema(example = "2023-01-15", value_type = String, format = "date")]
    pub joining_date: Option<NaiveDate>,

    pub contract_type: Option<ContractType>,

    #[schema(example = 48000.0)]
    pub salary_base: Option<f64>,

    pub bank_account_number: Option<String>,
    pub bank_name: Option<String>,

    #[schema(example = "suspended")]
    pub status: Option<TeacherStatus>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TeacherQuery {
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,

    #[schema(example = 20)]
    /// Pagination per page number
    pub per_page: Option<u32>,

    #[schema(example = "Mathematics")]
    /// Filter by department
    pub department: Option<String>,

    #[schema(example = "active")]
    /// Filter by profile status
    pub status: Option<TeacherStatus>,

    #[schema(example = "permanent")]
    /// Filter by contract type
    pub contract_type: Option<ContractType>,

    #[schema(example = "rahman")]
    /// Search by name or email
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct TeacherListResponse {
    pub data: Vec<TeacherProfile>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceHistoryQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceHistoryResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 180)]
    pub total: i64,
}

/* =========================
Create teacher profile
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/teachers",
    request_body = CreateTeacher,
    responses(
        (status = 200, description = "Teacher created successfully", body = Object, example = json!({
            "message": "Teacher created successfully",
            "teacher_id": 7
        })),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher"
)]
pub async fn create_teacher(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTeacher>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.salary_base <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "salary_base must be positive"
        })));
    }
    if payload.full_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "full_name must not be empty"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO teachers
            (full_name, email, phone, department, designation, joining_date,
             contract_type, salary_base, bank_account_number, bank_name)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.full_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.department)
    .bind(&payload.designation)
    .bind(payload.joining_date)
    .bind(payload.contract_type)
    .bind(payload.salary_base)
    .bind(&payload.bank_account_number)
    .bind(&payload.bank_name)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create teacher");
        Error::from(e)
    })?;

    let teacher_id = result.last_insert_id();

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            teacher_id,
            ActivityType::ProfileUpdate,
            format!("Created teacher profile for {}", payload.full_name),
            &auth,
        ),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Teacher created successfully",
        "teacher_id": teacher_id
    })))
}

/* =========================
List teachers
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/teachers",
    params(TeacherQuery),
    responses(
        (status = 200, description = "Paginated teacher directory", body = TeacherListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher"
)]
pub async fn list_teachers(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TeacherQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause (every filter here binds a string)
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<String> = Vec::new();

    if let Some(department) = query.department.as_deref() {
        where_sql.push_str(" AND department = ?");
        args.push(department.to_string());
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(status.to_string());
    }

    if let Some(contract_type) = query.contract_type {
        where_sql.push_str(" AND contract_type = ?");
        args.push(contract_type.to_string());
    }

    if let Some(search) = query.search.as_deref() {
        where_sql.push_str(" AND (full_name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        args.push(like.clone());
        args.push(like);
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM teachers{}", where_sql);
    debug!(sql = %count_sql, "Counting teachers");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = count_q.bind(arg.as_str());
    }

    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(Error::from)?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "SELECT * FROM teachers{} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_sql
    );
    debug!(sql = %data_sql, page, per_page, "Fetching teachers");

    let mut data_q = sqlx::query_as::<_, TeacherProfile>(&data_sql);
    for arg in args {
        data_q = data_q.bind(arg);
    }

    let teachers = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(Error::from)?;

    Ok(HttpResponse::Ok().json(TeacherListResponse {
        data: teachers,
        page,
        per_page,
        total,
    }))
}

/* =========================
Get teacher by ID
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}",
    params(
        ("teacher_id" = u64, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher found", body = TeacherProfile),
        (status = 404, description = "Teacher not found", body = Object, example = json!({
            "message": "Teacher not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher"
)]
pub async fn get_teacher(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    let teacher_id = path.into_inner();

    let teacher = sqlx::query_as::<_, TeacherProfile>("SELECT * FROM teachers WHERE id = ?")
        .bind(teacher_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(Error::from)?
        .ok_or(Error::TeacherNotFound)?;

    Ok(HttpResponse::Ok().json(teacher))
}

/* =========================
Update teacher profile
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/teachers/{teacher_id}",
    params(
        ("teacher_id" = u64, Path, description = "Teacher ID")
    ),
    request_body = UpdateTeacher,
    responses(
        (status = 200, description = "Teacher updated successfully", body = Object, example = json!({
            "message": "Teacher updated successfully"
        })),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Teacher not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher"
)]
pub async fn update_teacher(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateTeacher>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let teacher_id = path.into_inner();
    let body = body.into_inner();

    if let Some(salary_base) = body.salary_base {
        if salary_base <= 0.0 {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "salary_base must be positive"
            })));
        }
    }

    let salary_changed = body.salary_base.is_some();
    let contract_changed = body.contract_type.is_some() || body.status.is_some();

    let mut sets: Vec<(&str, SqlValue)> = Vec::new();
    let mut changed: Vec<&str> = Vec::new();

    if let Some(full_name) = body.full_name {
        sets.push(("full_name", SqlValue::String(full_name)));
        changed.push("full_name");
    }
    if let Some(email) = body.email {
        sets.push(("email", SqlValue::String(email)));
        changed.push("email");
    }
    if let Some(phone) = body.phone {
        sets.push(("phone", SqlValue::String(phone)));
        changed.push("phone");
    }
    if let Some(department) = body.department {
        sets.push(("department", SqlValue::String(department)));
        changed.push("department");
    }
    if let Some(designation) = body.designation {
        sets.push(("designation", SqlValue::String(designation)));
        changed.push("designation");
    }
    if let Some(joining_date) = body.joining_date {
        sets.push(("joining_date", SqlValue::Date(joining_date)));
        changed.push("joining_date");
    }
    if let Some(contract_type) = body.contract_type {
        sets.push(("contract_type", SqlValue::String(contract_type.to_string())));
        changed.push("contract_type");
    }
    if let Some(salary_base) = body.salary_base {
        sets.push(("salary_base", SqlValue::F64(salary_base)));
        changed.push("salary_base");
    }
    if let Some(bank_account_number) = body.bank_account_number {
        sets.push(("bank_account_number", SqlValue::String(bank_account_number)));
        changed.push("bank_account_number");
    }
    if let Some(bank_name) = body.bank_name {
        sets.push(("bank_name", SqlValue::String(bank_name)));
        changed.push("bank_name");
    }
    if let Some(status) = body.status {
        sets.push(("status", SqlValue::String(status.to_string())));
        changed.push("status");
    }

    let update = match build_update_sql("teachers", sets, "id", teacher_id) {
        Some(update) => update,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "No fields provided for update"
            })));
        }
    };

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(Error::from)?;

    if affected == 0 {
        return Err(Error::TeacherNotFound.into());
    }

    let action_type = if salary_changed {
        ActivityType::SalaryChange
    } else if contract_changed {
        ActivityType::ContractUpdate
    } else {
        ActivityType::ProfileUpdate
    };

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            teacher_id,
            action_type,
            format!("Updated teacher #{}", teacher_id),
            &auth,
        )
        .with_metadata(json!({ "fields": changed })),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Teacher updated successfully"
    })))
}

/* =========================
Terminate teacher (soft delete)
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/teachers/{teacher_id}",
    params(
        ("teacher_id" = u64, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher terminated", body = Object, example = json!({
            "message": "Teacher terminated"
        })),
        (status = 404, description = "Teacher not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher"
)]
pub async fn terminate_teacher(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let teacher_id = path.into_inner();

    let affected =
        sqlx::query("UPDATE teachers SET status = 'terminated' WHERE id = ? AND status <> 'terminated'")
            .bind(teacher_id)
            .execute(pool.get_ref())
            .await
            .map_err(Error::from)?
            .rows_affected();

    if affected == 0 {
        let exists =
            sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM teachers WHERE id = ?)")
                .bind(teacher_id)
                .fetch_one(pool.get_ref())
                .await
                .map_err(Error::from)?;

        if exists == 0 {
            return Err(Error::TeacherNotFound.into());
        }

        // Deleting again is a no-op, not an error.
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Teacher already terminated"
        })));
    }

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            teacher_id,
            ActivityType::ContractUpdate,
            format!("Terminated teacher #{}", teacher_id),
            &auth,
        ),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Teacher terminated"
    })))
}

/* =========================
Per-teacher attendance history
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}/attendance",
    params(
        ("teacher_id" = u64, Path, description = "Teacher ID"),
        AttendanceHistoryQuery
    ),
    responses(
        (status = 200, description = "Paginated attendance history", body = AttendanceHistoryResponse),
        (status = 404, description = "Teacher not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher"
)]
pub async fn attendance_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<AttendanceHistoryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    let teacher_id = path.into_inner();

    let exists = sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM teachers WHERE id = ?)")
        .bind(teacher_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(Error::from)?;

    if exists == 0 {
        return Err(Error::TeacherNotFound.into());
    }

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE teacher_id = ?")
        .bind(teacher_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(Error::from)?;

    let data = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance WHERE teacher_id = ? ORDER BY date DESC LIMIT ? OFFSET ?",
    )
    .bind(teacher_id)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(Error::from)?;

    Ok(HttpResponse::Ok().json(AttendanceHistoryResponse {
        data,
        page,
        per_page,
        total,
    }))
}

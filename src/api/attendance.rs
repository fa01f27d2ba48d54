use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::attendance;
use crate::model::activity::{ActivityType, NewActivity};
use crate::model::attendance::DailyAttendanceEntry;
use crate::utils::activity_log;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 7)]
    pub teacher_id: u64,

    #[schema(example = "Ayesha Rahman")]
    pub teacher_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    #[schema(example = 7)]
    pub teacher_id: u64,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "status": "late",
            "late_minutes": 22
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 404, description = "Teacher not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    let policy = config.attendance_policy();
    let outcome =
        attendance::check_in(pool.get_ref(), &policy, payload.teacher_id, &payload.teacher_name)
            .await?;

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            payload.teacher_id,
            ActivityType::AttendanceMarked,
            format!(
                "Marked {} as {} ({} min late)",
                payload.teacher_name, outcome.status, outcome.late_minutes
            ),
            &auth,
        ),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked in successfully",
        "status": outcome.status,
        "late_minutes": outcome.late_minutes
    })))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No check-in record found for today", body = Object, example = json!({
            "message": "No check-in record found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckOutRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    attendance::check_out(pool.get_ref(), payload.teacher_id).await?;

    activity_log::record(
        pool.get_ref(),
        NewActivity::new(
            payload.teacher_id,
            ActivityType::AttendanceEdited,
            format!("Recorded check-out for teacher #{}", payload.teacher_id),
            &auth,
        ),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully"
    })))
}

/// Today's attendance view
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Stored records plus derived absents for active teachers",
         body = [DailyAttendanceEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_principal_or_admin()?;

    let roster = attendance::today_roster(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(roster))
}

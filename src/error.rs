use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Domain errors surfaced by the API.
///
/// Business failures map to 4xx with a stable message body; anything from the
/// database maps to 500 with the detail kept out of the response.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Already checked in today")]
    AlreadyCheckedIn,

    #[error("Already checked out today")]
    AlreadyCheckedOut,

    #[error("No check-in record found for today")]
    NoCheckInFound,

    #[error("Teacher not found")]
    TeacherNotFound,

    #[error("Rule not found")]
    RuleNotFound,

    #[error("Salary transaction not found")]
    TransactionNotFound,

    #[error("Salary transaction already paid")]
    AlreadyPaid,

    #[error("Payment amount does not match net salary")]
    AmountMismatch,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Organization balance not initialized")]
    BalanceMissing,

    #[error("Invalid rule condition: {0}")]
    InvalidCondition(String),

    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::AlreadyCheckedIn
            | Error::AlreadyCheckedOut
            | Error::NoCheckInFound
            | Error::InvalidCondition(_)
            | Error::InvalidMonth(_) => StatusCode::BAD_REQUEST,

            Error::TeacherNotFound | Error::RuleNotFound | Error::TransactionNotFound => {
                StatusCode::NOT_FOUND
            }

            Error::AlreadyPaid | Error::AmountMismatch | Error::InsufficientFunds => {
                StatusCode::CONFLICT
            }

            Error::BalanceMissing | Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Error::Database(e) = self {
            tracing::error!(error = %e, "Database error");
            return HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }));
        }

        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

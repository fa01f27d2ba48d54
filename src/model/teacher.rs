use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ContractType {
    Permanent,
    Contract,
    Visiting,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TeacherStatus {
    Active,
    Suspended,
    Terminated,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "full_name": "Ayesha Rahman",
        "email": "ayesha.rahman@school.edu",
        "phone": "+8801712345678",
        "department": "Mathematics",
        "designation": "Senior Teacher",
        "joining_date": "2023-01-15",
        "contract_type": "permanent",
        "salary_base": 45000.0,
        "bank_account_number": "0123456789",
        "bank_name": "City Bank",
        "status": "active",
        "created_at": "2023-01-15T09:00:00Z"
    })
)]
pub struct TeacherProfile {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ayesha Rahman")]
    pub full_name: String,

    #[schema(example = "ayesha.rahman@school.edu", format = "email")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
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

    #[schema(example = "0123456789", nullable = true)]
    pub bank_account_number: Option<String>,

    #[schema(example = "City Bank", nullable = true)]
    pub bank_name: Option<String>,

    #[schema(example = "active")]
    pub status: TeacherStatus,

    #[schema(example = "2023-01-15T09:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    #[serde(rename = "half-day")]
    #[strum(serialize = "half-day")]
    #[sqlx(rename = "half-day")]
    HalfDay,
    Leave,
}

/// One stored attendance row. At most one exists per teacher per calendar day.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub teacher_id: u64,

    #[schema(example = "Ayesha Rahman")]
    pub teacher_name: String,

    #[schema(example = "2026-08-25", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-08-25T03:12:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_in: Option<DateTime<Utc>>,

    #[schema(example = "2026-08-25T11:02:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<DateTime<Utc>>,

    #[schema(example = 12)]
    pub late_minutes: i64,

    #[schema(example = "present")]
    pub status: AttendanceStatus,
}

/// Daily view entry: a stored record, or a derived `absent` placeholder for an
/// active teacher with no record yet. Derived entries are never persisted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyAttendanceEntry {
    #[schema(example = 1)]
    pub teacher_id: u64,

    #[schema(example = "Ayesha Rahman")]
    pub teacher_name: String,

    #[schema(example = "2026-08-25", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-08-25T03:12:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_in: Option<DateTime<Utc>>,

    #[schema(example = "2026-08-25T11:02:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<DateTime<Utc>>,

    #[schema(example = 0)]
    pub late_minutes: i64,

    #[schema(example = "present")]
    pub status: AttendanceStatus,
}

impl From<AttendanceRecord> for DailyAttendanceEntry {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            teacher_id: record.teacher_id,
            teacher_name: record.teacher_name,
            date: record.date,
            check_in: record.check_in,
            check_out: record.check_out,
            late_minutes: record.late_minutes,
            status: record.status,
        }
    }
}

impl DailyAttendanceEntry {
    pub fn absent(teacher_id: u64, teacher_name: String, date: NaiveDate) -> Self {
        Self {
            teacher_id,
            teacher_name,
            date,
            check_in: None,
            check_out: None,
            late_minutes: 0,
            status: AttendanceStatus::Absent,
        }
    }
}

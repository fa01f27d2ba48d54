use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::db;
use crate::error::{Error, Result};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, DailyAttendanceEntry};

/// Lateness policy. Check-ins within `grace_minutes` of `shift_start` still
/// count as present.
#[derive(Debug, Clone, Copy)]
pub struct AttendancePolicy {
    pub shift_start: NaiveTime,
    pub grace_minutes: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInOutcome {
    #[schema(example = "late")]
    pub status: AttendanceStatus,

    #[schema(example = 22)]
    pub late_minutes: i64,
}

/// Derive status and lateness from the wall-clock check-in moment.
///
/// Lateness is whole minutes past shift start, clamped at zero for early
/// arrivals. Within the grace window the teacher is still `present` but the
/// exact minutes are kept.
pub fn derive_check_in_status(
    checked_in_at: NaiveDateTime,
    policy: &AttendancePolicy,
) -> (AttendanceStatus, i64) {
    let shift_start = checked_in_at.date().and_time(policy.shift_start);
    let late_minutes = (checked_in_at - shift_start).num_minutes().max(0);

    let status = if late_minutes > policy.grace_minutes {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    };

    (status, late_minutes)
}

/// Record the check-in for today's local calendar date.
///
/// The unique key on (teacher_id, date) makes a second check-in fail cleanly,
/// the foreign key rejects unknown teachers.
pub async fn check_in(
    pool: &MySqlPool,
    policy: &AttendancePolicy,
    teacher_id: u64,
    teacher_name: &str,
) -> Result<CheckInOutcome> {
    let now = Local::now();
    let today = now.date_naive();
    let (status, late_minutes) = derive_check_in_status(now.naive_local(), policy);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (teacher_id, teacher_name, date, check_in, late_minutes, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(teacher_id)
    .bind(teacher_name)
    .bind(today)
    .bind(now.with_timezone(&Utc))
    .bind(late_minutes)
    .bind(status)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            info!(teacher_id, %status, late_minutes, "Check-in recorded");
            Ok(CheckInOutcome {
                status,
                late_minutes,
            })
        }
        Err(e) if db::is_unique_violation(&e) => Err(Error::AlreadyCheckedIn),
        Err(e) if db::is_foreign_key_violation(&e) => Err(Error::TeacherNotFound),
        Err(e) => Err(e.into()),
    }
}

/// Stamp the check-out on today's record. Requires a prior check-in and
/// rejects a second check-out.
pub async fn check_out(pool: &MySqlPool, teacher_id: u64) -> Result<()> {
    let today = Local::now().date_naive();

    let row = sqlx::query_as::<_, (u64, Option<DateTime<Utc>>)>(
        "SELECT id, check_out FROM attendance WHERE teacher_id = ? AND date = ?",
    )
    .bind(teacher_id)
    .bind(today)
    .fetch_optional(pool)
    .await?;

    let (record_id, checked_out) = row.ok_or(Error::NoCheckInFound)?;
    if checked_out.is_some() {
        return Err(Error::AlreadyCheckedOut);
    }

    let updated = sqlx::query("UPDATE attendance SET check_out = ? WHERE id = ? AND check_out IS NULL")
        .bind(Utc::now())
        .bind(record_id)
        .execute(pool)
        .await?;

    // Lost the race against a concurrent check-out.
    if updated.rows_affected() == 0 {
        return Err(Error::AlreadyCheckedOut);
    }

    info!(teacher_id, "Check-out recorded");
    Ok(())
}

/// Today's full attendance view: every stored record plus a derived `absent`
/// entry for each active teacher without one.
pub async fn today_roster(pool: &MySqlPool) -> Result<Vec<DailyAttendanceEntry>> {
    let today = Local::now().date_naive();

    let records = sqlx::query_as::<_, AttendanceRecord>("SELECT * FROM attendance WHERE date = ?")
        .bind(today)
        .fetch_all(pool)
        .await?;

    let active_teachers = sqlx::query_as::<_, (u64, String)>(
        "SELECT id, full_name FROM teachers WHERE status = 'active' ORDER BY full_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(merge_roster(active_teachers, records, today))
}

pub(crate) fn merge_roster(
    active_teachers: Vec<(u64, String)>,
    records: Vec<AttendanceRecord>,
    date: chrono::NaiveDate,
) -> Vec<DailyAttendanceEntry> {
    let mut entries: Vec<DailyAttendanceEntry> =
        records.into_iter().map(DailyAttendanceEntry::from).collect();

    let recorded: HashSet<u64> = entries.iter().map(|entry| entry.teacher_id).collect();

    for (teacher_id, full_name) in active_teachers {
        if !recorded.contains(&teacher_id) {
            entries.push(DailyAttendanceEntry::absent(teacher_id, full_name, date));
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn policy() -> AttendancePolicy {
        AttendancePolicy {
            shift_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            grace_minutes: 15,
        }
    }

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn on_time_is_present_with_zero_minutes() {
        assert_eq!(
            derive_check_in_status(at(9, 0, 0), &policy()),
            (AttendanceStatus::Present, 0)
        );
    }

    #[test]
    fn early_arrival_clamps_to_zero() {
        assert_eq!(
            derive_check_in_status(at(8, 17, 0), &policy()),
            (AttendanceStatus::Present, 0)
        );
    }

    #[test]
    fn grace_boundary_is_still_present() {
        assert_eq!(
            derive_check_in_status(at(9, 15, 0), &policy()),
            (AttendanceStatus::Present, 15)
        );
        // seconds past the boundary do not tip a whole minute
        assert_eq!(
            derive_check_in_status(at(9, 15, 59), &policy()),
            (AttendanceStatus::Present, 15)
        );
    }

    #[test]
    fn one_minute_past_grace_is_late() {
        assert_eq!(
            derive_check_in_status(at(9, 16, 0), &policy()),
            (AttendanceStatus::Late, 16)
        );
        assert_eq!(
            derive_check_in_status(at(11, 0, 30), &policy()),
            (AttendanceStatus::Late, 120)
        );
    }

    fn record(teacher_id: u64, name: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: teacher_id,
            teacher_id,
            teacher_name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            check_in: None,
            check_out: None,
            late_minutes: 0,
            status,
        }
    }

    #[test]
    fn roster_adds_derived_absents_for_unrecorded_teachers() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let stored = vec![record(1, "Ayesha", AttendanceStatus::Late)];
        let active = vec![(1, "Ayesha".to_string()), (2, "Karim".to_string())];

        let roster = merge_roster(active, stored, date);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].teacher_id, 1);
        assert_eq!(roster[0].status, AttendanceStatus::Late);
        assert_eq!(roster[1].teacher_id, 2);
        assert_eq!(roster[1].status, AttendanceStatus::Absent);
        assert_eq!(roster[1].late_minutes, 0);
        assert_eq!(roster[1].date, date);
    }

    #[test]
    fn roster_with_full_coverage_adds_nothing() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let stored = vec![
            record(1, "Ayesha", AttendanceStatus::Present),
            record(2, "Karim", AttendanceStatus::Leave),
        ];
        let active = vec![(1, "Ayesha".to_string()), (2, "Karim".to_string())];

        let roster = merge_roster(active, stored, date);

        assert_eq!(roster.len(), 2);
        assert!(roster.iter().all(|e| e.status != AttendanceStatus::Absent));
    }
}

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::auth::auth::AuthUser;

/// Audit event categories. The log is append-only and written best-effort;
/// nothing in the request path depends on it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ActivityType {
    ProfileUpdate,
    SalaryChange,
    ContractUpdate,
    AttendanceMarked,
    AttendanceEdited,
    ViolationRecorded,
    SalaryProcessed,
    DocumentUploaded,
    RuleCreated,
    PerformanceRemark,
}

/// One audit entry ready for insertion. `user_id` is the subject of the
/// action (usually a teacher), the `performed_by_*` fields identify the
/// caller taken from the verified token.
#[derive(Debug)]
pub struct NewActivity {
    pub user_id: u64,
    pub action_type: ActivityType,
    pub description: String,
    pub performed_by: u64,
    pub performed_by_name: String,
    pub performed_by_role: String,
    pub metadata: Option<serde_json::Value>,
}

impl NewActivity {
    pub fn new(
        subject_id: u64,
        action_type: ActivityType,
        description: impl Into<String>,
        performer: &AuthUser,
    ) -> Self {
        Self {
            user_id: subject_id,
            action_type,
            description: description.into(),
            performed_by: performer.user_id,
            performed_by_name: performer.username.clone(),
            performed_by_role: performer.role.to_string(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

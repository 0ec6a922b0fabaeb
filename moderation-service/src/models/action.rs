use super::ban::UserBan;
use super::report::Report;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable audit log entry. Never edited or deleted; corrections are made
/// by appending a new entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModerationAction {
    pub id: Uuid,
    pub report_id: Uuid,
    pub moderator_id: Uuid,
    pub action_type_id: Uuid,
    pub resulting_status_id: Uuid,
    pub notes: Option<String>,
    pub ban_duration_days: Option<i32>,
    /// Populated only when the report's type is USER
    pub target_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewModerationAction {
    pub report_id: Uuid,
    pub moderator_id: Uuid,
    pub action_type_id: Uuid,
    pub resulting_status_id: Uuid,
    pub notes: Option<String>,
    pub ban_duration_days: Option<i32>,
    pub target_user_id: Option<Uuid>,
}

/// A moderator's decision, as handed to the coordinator
#[derive(Debug, Clone)]
pub struct SubmitActionInput {
    pub report_id: Uuid,
    pub moderator_id: Uuid,
    pub action_type_id: Uuid,
    pub target_status_id: Uuid,
    pub expected_status_version: i64,
    pub notes: Option<String>,
    pub ban_duration_days: Option<i32>,
}

/// Result of a submitted action. `audit_logged = false` means the primary
/// mutations (ban and status) committed but the audit append failed after
/// retries and needs operator backfill.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub report: Report,
    pub ban: Option<UserBan>,
    pub action: Option<ModerationAction>,
    pub audit_logged: bool,
}

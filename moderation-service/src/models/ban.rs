use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User ban record. At most one row per user; re-banning overwrites the row
/// in place and revoking flips `active` off, so the audit history keeps the
/// latest decision without stacking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserBan {
    pub user_id: Uuid,
    pub reason: String,
    pub banned_by: Uuid,
    pub source_report_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

impl UserBan {
    /// A user is currently banned iff the row is active and the expiry, if
    /// any, has not passed. Expiry is lazy: no sweep is needed for this to
    /// evaluate correctly.
    pub fn is_banned_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map_or(true, |expires| expires > now)
    }
}

/// Input for applying (or overwriting) a ban. The expiry has already been
/// resolved from the action type's ban policy; `None` means permanent.
#[derive(Debug, Clone)]
pub struct ApplyBanInput {
    pub user_id: Uuid,
    pub reason: String,
    pub banned_by: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub source_report_id: Option<Uuid>,
}

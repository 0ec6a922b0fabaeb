//! Catalog reference data: report types, reasons, statuses, action types

use crate::error::{ModerationError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Report type name that makes a report's target a user account
pub const REPORT_TYPE_USER: &str = "USER";

/// Status every new report starts in
pub const INITIAL_STATUS: &str = "PENDING";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// A reason is only valid for reports of its owning type
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportReason {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub report_type_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportStatus {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModerationActionType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Ban policy derived from an action type's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanPolicy {
    /// No ban side effect (WARNING, CONTENT_REMOVAL, NO_ACTION, admin additions)
    None,
    /// Moderator-supplied duration in days
    Temporary,
    /// Fixed duration in days
    Fixed { days: i64 },
    /// Ban with no expiry
    Permanent,
    /// Short fixed cool-down window in hours
    ShortFixed { hours: i64 },
}

impl ModerationActionType {
    /// Resolve this action type's ban policy. Unknown names carry no policy,
    /// so admin-added action types never ban implicitly.
    pub fn ban_policy(&self, timeout_window_hours: i64) -> BanPolicy {
        match self.name.as_str() {
            "TEMPORARY_BAN" => BanPolicy::Temporary,
            "2_WEEK_BAN" => BanPolicy::Fixed { days: 14 },
            "PERMANENT_BAN" => BanPolicy::Permanent,
            "TIMEOUT" => BanPolicy::ShortFixed {
                hours: timeout_window_hours,
            },
            _ => BanPolicy::None,
        }
    }
}

impl BanPolicy {
    pub fn is_none(&self) -> bool {
        matches!(self, BanPolicy::None)
    }

    /// Resolve the policy to an expiry timestamp. `Ok(None)` means permanent.
    /// Temporary requires a positive moderator-supplied duration.
    pub fn resolve_expiry(
        &self,
        now: DateTime<Utc>,
        duration_days: Option<i32>,
    ) -> Result<Option<DateTime<Utc>>> {
        match self {
            BanPolicy::None => Err(ModerationError::Internal(
                "cannot resolve an expiry for a no-ban policy".into(),
            )),
            BanPolicy::Temporary => {
                let days = duration_days.ok_or_else(|| {
                    ModerationError::Validation(
                        "ban_duration_days is required for a temporary ban".into(),
                    )
                })?;
                if days <= 0 {
                    return Err(ModerationError::Validation(
                        "ban_duration_days must be positive".into(),
                    ));
                }
                Ok(Some(now + Duration::days(days as i64)))
            }
            BanPolicy::Fixed { days } => Ok(Some(now + Duration::days(*days))),
            BanPolicy::Permanent => Ok(None),
            BanPolicy::ShortFixed { hours } => Ok(Some(now + Duration::hours(*hours))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_type(name: &str) -> ModerationActionType {
        ModerationActionType {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn policy_derivation_by_name() {
        assert_eq!(action_type("WARNING").ban_policy(24), BanPolicy::None);
        assert_eq!(
            action_type("CONTENT_REMOVAL").ban_policy(24),
            BanPolicy::None
        );
        assert_eq!(action_type("NO_ACTION").ban_policy(24), BanPolicy::None);
        assert_eq!(
            action_type("TEMPORARY_BAN").ban_policy(24),
            BanPolicy::Temporary
        );
        assert_eq!(
            action_type("2_WEEK_BAN").ban_policy(24),
            BanPolicy::Fixed { days: 14 }
        );
        assert_eq!(
            action_type("PERMANENT_BAN").ban_policy(24),
            BanPolicy::Permanent
        );
        assert_eq!(
            action_type("TIMEOUT").ban_policy(12),
            BanPolicy::ShortFixed { hours: 12 }
        );
        // Admin-added names never ban implicitly
        assert_eq!(action_type("ESCALATE").ban_policy(24), BanPolicy::None);
    }

    #[test]
    fn temporary_expiry_uses_supplied_days() {
        let now = Utc::now();
        let expiry = BanPolicy::Temporary
            .resolve_expiry(now, Some(7))
            .unwrap()
            .unwrap();
        assert_eq!(expiry, now + Duration::days(7));
    }

    #[test]
    fn temporary_requires_positive_days() {
        let now = Utc::now();
        assert!(matches!(
            BanPolicy::Temporary.resolve_expiry(now, Some(0)),
            Err(ModerationError::Validation(_))
        ));
        assert!(matches!(
            BanPolicy::Temporary.resolve_expiry(now, Some(-3)),
            Err(ModerationError::Validation(_))
        ));
        assert!(matches!(
            BanPolicy::Temporary.resolve_expiry(now, None),
            Err(ModerationError::Validation(_))
        ));
    }

    #[test]
    fn fixed_permanent_and_timeout_expiries() {
        let now = Utc::now();
        assert_eq!(
            BanPolicy::Fixed { days: 14 }
                .resolve_expiry(now, None)
                .unwrap(),
            Some(now + Duration::days(14))
        );
        assert_eq!(BanPolicy::Permanent.resolve_expiry(now, None).unwrap(), None);
        assert_eq!(
            BanPolicy::ShortFixed { hours: 24 }
                .resolve_expiry(now, None)
                .unwrap(),
            Some(now + Duration::hours(24))
        );
    }
}

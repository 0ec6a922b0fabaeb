//! Store contracts and their Postgres and in-memory implementations.
//!
//! The coordinator and handlers depend on these traits; production wires the
//! Postgres stores, tests and local development use the in-memory ones.

pub mod bans;
pub mod catalog;
pub mod log;
pub mod memory;
pub mod reports;

pub use bans::PgBanStore;
pub use catalog::PgCatalogStore;
pub use log::PgModerationLog;
pub use memory::{MemoryBanStore, MemoryCatalogStore, MemoryModerationLog, MemoryReportStore};
pub use reports::PgReportStore;

use crate::error::Result;
use crate::models::{
    ApplyBanInput, CreateReportInput, ModerationAction, ModerationActionType, NewModerationAction,
    Page, Report, ReportReason, ReportStatus, ReportType, UserBan,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Reference enumerations: report types, reasons, statuses, action types.
/// Deletes fail with `ReferentialConflict` while live references exist.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_types(&self) -> Result<Vec<ReportType>>;
    async fn get_type(&self, id: Uuid) -> Result<ReportType>;
    async fn create_type(&self, name: &str, description: Option<&str>) -> Result<ReportType>;
    async fn update_type(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportType>;
    async fn delete_type(&self, id: Uuid) -> Result<()>;

    async fn list_reasons(&self, report_type_id: Uuid) -> Result<Vec<ReportReason>>;
    async fn get_reason(&self, id: Uuid) -> Result<ReportReason>;
    async fn create_reason(
        &self,
        report_type_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportReason>;
    async fn update_reason(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportReason>;
    async fn delete_reason(&self, id: Uuid) -> Result<()>;

    async fn list_statuses(&self) -> Result<Vec<ReportStatus>>;
    async fn get_status(&self, id: Uuid) -> Result<ReportStatus>;
    async fn get_status_by_name(&self, name: &str) -> Result<ReportStatus>;
    async fn create_status(&self, name: &str, description: Option<&str>) -> Result<ReportStatus>;
    async fn update_status(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportStatus>;
    async fn delete_status(&self, id: Uuid) -> Result<()>;

    async fn list_action_types(&self) -> Result<Vec<ModerationActionType>>;
    async fn get_action_type(&self, id: Uuid) -> Result<ModerationActionType>;
    async fn create_action_type(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ModerationActionType>;
    async fn update_action_type(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ModerationActionType>;
    async fn delete_action_type(&self, id: Uuid) -> Result<()>;
}

/// Report records. `compare_and_set_status` is the only status mutator and
/// carries the optimistic-concurrency guard.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create_report(&self, input: CreateReportInput) -> Result<Report>;
    async fn get_by_id(&self, id: Uuid) -> Result<Report>;
    async fn list_by_status(&self, status_name: &str, page: i64, size: i64)
        -> Result<Page<Report>>;
    async fn list_all(&self, page: i64, size: i64) -> Result<Page<Report>>;
    async fn compare_and_set_status(
        &self,
        report_id: Uuid,
        expected_status_version: i64,
        new_status_id: Uuid,
    ) -> Result<Report>;
}

/// User ban records, one row per user, overwrite-in-place semantics.
#[async_trait]
pub trait BanStore: Send + Sync {
    async fn apply_ban(&self, input: ApplyBanInput) -> Result<UserBan>;
    async fn revoke_ban(&self, user_id: Uuid) -> Result<()>;
    async fn is_banned(&self, user_id: Uuid) -> Result<bool>;
    async fn get_ban(&self, user_id: Uuid) -> Result<Option<UserBan>>;
    async fn list_banned_by_moderator(&self, moderator_id: Uuid) -> Result<Vec<UserBan>>;
    /// Housekeeping for expired rows; correctness never depends on it.
    async fn deactivate_expired(&self) -> Result<u64>;
}

/// Append-only audit trail of moderation decisions.
#[async_trait]
pub trait ModerationLog: Send + Sync {
    async fn append(&self, entry: NewModerationAction) -> Result<ModerationAction>;
    async fn list_by_report(
        &self,
        report_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<ModerationAction>>;
    async fn list_by_moderator(
        &self,
        moderator_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<ModerationAction>>;
}

/// Validate paging parameters and return the row offset. The multiplication
/// is checked so an absurd page number is a validation error, not an overflow.
pub(crate) fn page_offset(page: i64, size: i64) -> Result<i64> {
    if page < 0 {
        return Err(crate::error::ModerationError::Validation(
            "page must not be negative".into(),
        ));
    }
    if size <= 0 {
        return Err(crate::error::ModerationError::Validation(
            "size must be positive".into(),
        ));
    }
    page.checked_mul(size).ok_or_else(|| {
        crate::error::ModerationError::Validation(format!("page {} is out of range", page))
    })
}

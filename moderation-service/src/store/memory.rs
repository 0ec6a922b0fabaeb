//! In-memory store implementations.
//!
//! All four stores share one state table behind a mutex, so cross-store
//! referential checks (catalog deletes against live reports and log entries)
//! behave like the Postgres implementations. Used by the test suite and by
//! local development without a database.

use crate::error::{ModerationError, Result};
use crate::models::{
    ApplyBanInput, CreateReportInput, ModerationAction, ModerationActionType, NewModerationAction,
    Page, Report, ReportReason, ReportStatus, ReportType, UserBan, INITIAL_STATUS,
    MAX_DETAILS_LEN,
};
use crate::store::{page_offset, BanStore, CatalogStore, ModerationLog, ReportStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    types: Vec<ReportType>,
    reasons: Vec<ReportReason>,
    statuses: Vec<ReportStatus>,
    action_types: Vec<ModerationActionType>,
    reports: Vec<Report>,
    bans: HashMap<Uuid, UserBan>,
    actions: Vec<ModerationAction>,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<MemoryState>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.0.lock().expect("memory state lock poisoned")
    }
}

pub struct MemoryCatalogStore {
    state: Shared,
}

pub struct MemoryReportStore {
    state: Shared,
}

pub struct MemoryBanStore {
    state: Shared,
}

pub struct MemoryModerationLog {
    state: Shared,
}

/// Build the four stores over one shared state table
pub fn memory_stores() -> (
    Arc<MemoryCatalogStore>,
    Arc<MemoryReportStore>,
    Arc<MemoryBanStore>,
    Arc<MemoryModerationLog>,
) {
    let state = Shared::default();
    (
        Arc::new(MemoryCatalogStore {
            state: state.clone(),
        }),
        Arc::new(MemoryReportStore {
            state: state.clone(),
        }),
        Arc::new(MemoryBanStore {
            state: state.clone(),
        }),
        Arc::new(MemoryModerationLog { state }),
    )
}

/// The seeded catalog rows, for convenient wiring in tests and local dev
#[derive(Debug, Clone)]
pub struct SeededCatalog {
    pub types: HashMap<String, ReportType>,
    pub reasons: HashMap<String, ReportReason>,
    pub statuses: HashMap<String, ReportStatus>,
    pub action_types: HashMap<String, ModerationActionType>,
}

impl SeededCatalog {
    pub fn type_id(&self, name: &str) -> Uuid {
        self.types[name].id
    }
    pub fn reason_id(&self, name: &str) -> Uuid {
        self.reasons[name].id
    }
    pub fn status_id(&self, name: &str) -> Uuid {
        self.statuses[name].id
    }
    pub fn action_type_id(&self, name: &str) -> Uuid {
        self.action_types[name].id
    }
}

impl MemoryCatalogStore {
    /// Seed the same fixed catalog the schema migration installs, plus one
    /// reason per type.
    pub fn seed_defaults(&self) -> SeededCatalog {
        let mut state = self.state.lock();
        let mut types = HashMap::new();
        let mut reasons = HashMap::new();
        let mut statuses = HashMap::new();
        let mut action_types = HashMap::new();

        for name in ["QUESTION", "ANSWER", "COMMENT", "USER", "EVENT", "SHOWCASE"] {
            let report_type = ReportType {
                id: Uuid::new_v4(),
                name: name.to_string(),
                description: None,
            };
            state.types.push(report_type.clone());

            let reason = ReportReason {
                id: Uuid::new_v4(),
                name: format!("{}_SPAM", name),
                description: None,
                report_type_id: report_type.id,
            };
            state.reasons.push(reason.clone());

            types.insert(name.to_string(), report_type);
            reasons.insert(reason.name.clone(), reason);
        }

        for name in ["PENDING", "REVIEWED", "ACTION_TAKEN", "DISMISSED"] {
            let status = ReportStatus {
                id: Uuid::new_v4(),
                name: name.to_string(),
                description: None,
            };
            state.statuses.push(status.clone());
            statuses.insert(name.to_string(), status);
        }

        for name in [
            "WARNING",
            "TEMPORARY_BAN",
            "2_WEEK_BAN",
            "PERMANENT_BAN",
            "TIMEOUT",
            "CONTENT_REMOVAL",
            "NO_ACTION",
        ] {
            let action_type = ModerationActionType {
                id: Uuid::new_v4(),
                name: name.to_string(),
                description: None,
            };
            state.action_types.push(action_type.clone());
            action_types.insert(name.to_string(), action_type);
        }

        SeededCatalog {
            types,
            reasons,
            statuses,
            action_types,
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_types(&self) -> Result<Vec<ReportType>> {
        Ok(self.state.lock().types.clone())
    }

    async fn get_type(&self, id: Uuid) -> Result<ReportType> {
        self.state
            .lock()
            .types
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ModerationError::NotFound(format!("Report type {} not found", id)))
    }

    async fn create_type(&self, name: &str, description: Option<&str>) -> Result<ReportType> {
        let report_type = ReportType {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        self.state.lock().types.push(report_type.clone());
        Ok(report_type)
    }

    async fn update_type(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportType> {
        let mut state = self.state.lock();
        let report_type = state
            .types
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ModerationError::NotFound(format!("Report type {} not found", id)))?;
        report_type.name = name.to_string();
        report_type.description = description.map(str::to_string);
        Ok(report_type.clone())
    }

    async fn delete_type(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        if state.reports.iter().any(|r| r.report_type_id == id) {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report type {} is referenced by existing reports",
                id
            )));
        }
        if state.reasons.iter().any(|r| r.report_type_id == id) {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report type {} still owns report reasons",
                id
            )));
        }
        let before = state.types.len();
        state.types.retain(|t| t.id != id);
        if state.types.len() == before {
            return Err(ModerationError::NotFound(format!(
                "Report type {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn list_reasons(&self, report_type_id: Uuid) -> Result<Vec<ReportReason>> {
        Ok(self
            .state
            .lock()
            .reasons
            .iter()
            .filter(|r| r.report_type_id == report_type_id)
            .cloned()
            .collect())
    }

    async fn get_reason(&self, id: Uuid) -> Result<ReportReason> {
        self.state
            .lock()
            .reasons
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ModerationError::NotFound(format!("Report reason {} not found", id)))
    }

    async fn create_reason(
        &self,
        report_type_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportReason> {
        let mut state = self.state.lock();
        if !state.types.iter().any(|t| t.id == report_type_id) {
            return Err(ModerationError::NotFound(format!(
                "Report type {} not found",
                report_type_id
            )));
        }
        let reason = ReportReason {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            report_type_id,
        };
        state.reasons.push(reason.clone());
        Ok(reason)
    }

    async fn update_reason(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportReason> {
        let mut state = self.state.lock();
        let reason = state
            .reasons
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ModerationError::NotFound(format!("Report reason {} not found", id)))?;
        reason.name = name.to_string();
        reason.description = description.map(str::to_string);
        Ok(reason.clone())
    }

    async fn delete_reason(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        if state.reports.iter().any(|r| r.report_reason_id == id) {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report reason {} is referenced by existing reports",
                id
            )));
        }
        let before = state.reasons.len();
        state.reasons.retain(|r| r.id != id);
        if state.reasons.len() == before {
            return Err(ModerationError::NotFound(format!(
                "Report reason {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn list_statuses(&self) -> Result<Vec<ReportStatus>> {
        Ok(self.state.lock().statuses.clone())
    }

    async fn get_status(&self, id: Uuid) -> Result<ReportStatus> {
        self.state
            .lock()
            .statuses
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ModerationError::NotFound(format!("Report status {} not found", id)))
    }

    async fn get_status_by_name(&self, name: &str) -> Result<ReportStatus> {
        self.state
            .lock()
            .statuses
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| {
                ModerationError::NotFound(format!("Report status '{}' not found", name))
            })
    }

    async fn create_status(&self, name: &str, description: Option<&str>) -> Result<ReportStatus> {
        let status = ReportStatus {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        self.state.lock().statuses.push(status.clone());
        Ok(status)
    }

    async fn update_status(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportStatus> {
        let mut state = self.state.lock();
        let status = state
            .statuses
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ModerationError::NotFound(format!("Report status {} not found", id)))?;
        status.name = name.to_string();
        status.description = description.map(str::to_string);
        Ok(status.clone())
    }

    async fn delete_status(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        if state.reports.iter().any(|r| r.status_id == id) {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report status {} is referenced by existing reports",
                id
            )));
        }
        if state.actions.iter().any(|a| a.resulting_status_id == id) {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report status {} is referenced by the moderation log",
                id
            )));
        }
        let before = state.statuses.len();
        state.statuses.retain(|s| s.id != id);
        if state.statuses.len() == before {
            return Err(ModerationError::NotFound(format!(
                "Report status {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn list_action_types(&self) -> Result<Vec<ModerationActionType>> {
        Ok(self.state.lock().action_types.clone())
    }

    async fn get_action_type(&self, id: Uuid) -> Result<ModerationActionType> {
        self.state
            .lock()
            .action_types
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| ModerationError::NotFound(format!("Action type {} not found", id)))
    }

    async fn create_action_type(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ModerationActionType> {
        let action_type = ModerationActionType {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        self.state.lock().action_types.push(action_type.clone());
        Ok(action_type)
    }

    async fn update_action_type(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ModerationActionType> {
        let mut state = self.state.lock();
        let action_type = state
            .action_types
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ModerationError::NotFound(format!("Action type {} not found", id)))?;
        action_type.name = name.to_string();
        action_type.description = description.map(str::to_string);
        Ok(action_type.clone())
    }

    async fn delete_action_type(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        if state.actions.iter().any(|a| a.action_type_id == id) {
            return Err(ModerationError::ReferentialConflict(format!(
                "Action type {} is referenced by the moderation log",
                id
            )));
        }
        let before = state.action_types.len();
        state.action_types.retain(|a| a.id != id);
        if state.action_types.len() == before {
            return Err(ModerationError::NotFound(format!(
                "Action type {} not found",
                id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create_report(&self, input: CreateReportInput) -> Result<Report> {
        if let Some(details) = &input.details {
            if details.chars().count() > MAX_DETAILS_LEN {
                return Err(ModerationError::Validation(format!(
                    "details exceeds the maximum length of {} characters",
                    MAX_DETAILS_LEN
                )));
            }
        }

        let mut state = self.state.lock();
        let reason = state
            .reasons
            .iter()
            .find(|r| r.id == input.report_reason_id)
            .ok_or_else(|| {
                ModerationError::Validation(format!(
                    "Unknown report reason {}",
                    input.report_reason_id
                ))
            })?;
        if reason.report_type_id != input.report_type_id {
            return Err(ModerationError::Validation(format!(
                "Reason {} does not belong to report type {}",
                input.report_reason_id, input.report_type_id
            )));
        }

        let initial_status = state
            .statuses
            .iter()
            .find(|s| s.name == INITIAL_STATUS)
            .ok_or_else(|| {
                ModerationError::Internal(format!("Initial status '{}' missing", INITIAL_STATUS))
            })?
            .id;

        let now = Utc::now();
        let report = Report {
            id: Uuid::new_v4(),
            report_type_id: input.report_type_id,
            target_id: input.target_id,
            reporter_id: input.reporter_id,
            report_reason_id: input.report_reason_id,
            status_id: initial_status,
            details: input.details,
            status_version: 1,
            created_at: now,
            updated_at: now,
        };
        state.reports.push(report.clone());
        Ok(report)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        self.state
            .lock()
            .reports
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ModerationError::NotFound(format!("Report {} not found", id)))
    }

    async fn list_by_status(
        &self,
        status_name: &str,
        page: i64,
        size: i64,
    ) -> Result<Page<Report>> {
        let offset = page_offset(page, size)?;
        let state = self.state.lock();
        let status_id = state
            .statuses
            .iter()
            .find(|s| s.name == status_name)
            .ok_or_else(|| {
                ModerationError::Validation(format!("Unknown report status '{}'", status_name))
            })?
            .id;

        let matching: Vec<Report> = state
            .reports
            .iter()
            .filter(|r| r.status_id == status_id)
            .cloned()
            .collect();
        Ok(paginate(matching, offset, page, size))
    }

    async fn list_all(&self, page: i64, size: i64) -> Result<Page<Report>> {
        let offset = page_offset(page, size)?;
        let reports = self.state.lock().reports.clone();
        Ok(paginate(reports, offset, page, size))
    }

    async fn compare_and_set_status(
        &self,
        report_id: Uuid,
        expected_status_version: i64,
        new_status_id: Uuid,
    ) -> Result<Report> {
        let mut state = self.state.lock();
        if !state.statuses.iter().any(|s| s.id == new_status_id) {
            return Err(ModerationError::Validation(format!(
                "Unknown report status {}",
                new_status_id
            )));
        }
        let report = state
            .reports
            .iter_mut()
            .find(|r| r.id == report_id)
            .ok_or_else(|| ModerationError::NotFound(format!("Report {} not found", report_id)))?;
        if report.status_version != expected_status_version {
            return Err(ModerationError::Conflict(format!(
                "Report {} is at status version {}, expected {}",
                report_id, report.status_version, expected_status_version
            )));
        }
        report.status_id = new_status_id;
        report.status_version += 1;
        report.updated_at = Utc::now();
        Ok(report.clone())
    }
}

#[async_trait]
impl BanStore for MemoryBanStore {
    async fn apply_ban(&self, input: ApplyBanInput) -> Result<UserBan> {
        let mut state = self.state.lock();
        let now = Utc::now();
        let ban = UserBan {
            user_id: input.user_id,
            reason: input.reason,
            banned_by: input.banned_by,
            source_report_id: input.source_report_id,
            starts_at: now,
            expires_at: input.expires_at,
            active: true,
            updated_at: now,
        };
        state.bans.insert(input.user_id, ban.clone());
        Ok(ban)
    }

    async fn revoke_ban(&self, user_id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(ban) = state.bans.get_mut(&user_id) {
            ban.active = false;
            ban.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn is_banned(&self, user_id: Uuid) -> Result<bool> {
        let state = self.state.lock();
        Ok(state
            .bans
            .get(&user_id)
            .map_or(false, |ban| ban.is_banned_at(Utc::now())))
    }

    async fn get_ban(&self, user_id: Uuid) -> Result<Option<UserBan>> {
        Ok(self.state.lock().bans.get(&user_id).cloned())
    }

    async fn list_banned_by_moderator(&self, moderator_id: Uuid) -> Result<Vec<UserBan>> {
        Ok(self
            .state
            .lock()
            .bans
            .values()
            .filter(|b| b.banned_by == moderator_id && b.active)
            .cloned()
            .collect())
    }

    async fn deactivate_expired(&self) -> Result<u64> {
        let mut state = self.state.lock();
        let now = Utc::now();
        let mut flipped = 0;
        for ban in state.bans.values_mut() {
            if ban.active && ban.expires_at.map_or(false, |e| e <= now) {
                ban.active = false;
                ban.updated_at = now;
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

#[async_trait]
impl ModerationLog for MemoryModerationLog {
    async fn append(&self, entry: NewModerationAction) -> Result<ModerationAction> {
        let mut state = self.state.lock();
        let action = ModerationAction {
            id: Uuid::new_v4(),
            report_id: entry.report_id,
            moderator_id: entry.moderator_id,
            action_type_id: entry.action_type_id,
            resulting_status_id: entry.resulting_status_id,
            notes: entry.notes,
            ban_duration_days: entry.ban_duration_days,
            target_user_id: entry.target_user_id,
            created_at: Utc::now(),
        };
        state.actions.push(action.clone());
        Ok(action)
    }

    async fn list_by_report(
        &self,
        report_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<ModerationAction>> {
        let offset = page_offset(page, size)?;
        let matching: Vec<ModerationAction> = self
            .state
            .lock()
            .actions
            .iter()
            .filter(|a| a.report_id == report_id)
            .cloned()
            .collect();
        Ok(paginate(matching, offset, page, size))
    }

    async fn list_by_moderator(
        &self,
        moderator_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<ModerationAction>> {
        let offset = page_offset(page, size)?;
        let matching: Vec<ModerationAction> = self
            .state
            .lock()
            .actions
            .iter()
            .filter(|a| a.moderator_id == moderator_id)
            .cloned()
            .collect();
        Ok(paginate(matching, offset, page, size))
    }
}

fn paginate<T: Clone>(items: Vec<T>, offset: i64, page: i64, size: i64) -> Page<T> {
    let total = items.len() as i64;
    let start = offset.min(total) as usize;
    let end = offset.saturating_add(size).min(total) as usize;
    Page::new(items[start..end].to_vec(), total, page, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn report_input(catalog: &SeededCatalog, type_name: &str) -> CreateReportInput {
        CreateReportInput {
            report_type_id: catalog.type_id(type_name),
            target_id: Uuid::new_v4(),
            reporter_id: Uuid::new_v4(),
            report_reason_id: catalog.reason_id(&format!("{}_SPAM", type_name)),
            details: Some("spam in the first answer".into()),
        }
    }

    #[tokio::test]
    async fn create_report_starts_pending_at_version_one() {
        let (catalog, reports, _, _) = memory_stores();
        let seeded = catalog.seed_defaults();

        let report = reports
            .create_report(report_input(&seeded, "QUESTION"))
            .await
            .unwrap();
        assert_eq!(report.status_id, seeded.status_id("PENDING"));
        assert_eq!(report.status_version, 1);
    }

    #[tokio::test]
    async fn create_report_rejects_mismatched_reason() {
        let (catalog, reports, _, _) = memory_stores();
        let seeded = catalog.seed_defaults();

        let mut input = report_input(&seeded, "QUESTION");
        input.report_reason_id = seeded.reason_id("USER_SPAM");
        let err = reports.create_report(input).await.unwrap_err();
        assert!(matches!(err, ModerationError::Validation(_)));
    }

    #[tokio::test]
    async fn create_report_rejects_oversized_details() {
        let (catalog, reports, _, _) = memory_stores();
        let seeded = catalog.seed_defaults();

        let mut input = report_input(&seeded, "QUESTION");
        input.details = Some("x".repeat(MAX_DETAILS_LEN + 1));
        let err = reports.create_report(input).await.unwrap_err();
        assert!(matches!(err, ModerationError::Validation(_)));
    }

    #[tokio::test]
    async fn compare_and_set_guards_the_version() {
        let (catalog, reports, _, _) = memory_stores();
        let seeded = catalog.seed_defaults();
        let report = reports
            .create_report(report_input(&seeded, "QUESTION"))
            .await
            .unwrap();

        let updated = reports
            .compare_and_set_status(report.id, 1, seeded.status_id("REVIEWED"))
            .await
            .unwrap();
        assert_eq!(updated.status_version, 2);
        assert!(updated.updated_at >= report.updated_at);

        // Stale expected version loses the race
        let err = reports
            .compare_and_set_status(report.id, 1, seeded.status_id("DISMISSED"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_by_status_pages_are_zero_indexed() {
        let (catalog, reports, _, _) = memory_stores();
        let seeded = catalog.seed_defaults();
        for _ in 0..23 {
            reports
                .create_report(report_input(&seeded, "ANSWER"))
                .await
                .unwrap();
        }

        let page = reports.list_by_status("PENDING", 0, 10).await.unwrap();
        assert_eq!(page.total_elements, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.content.len(), 10);

        let last = reports.list_by_status("PENDING", 2, 10).await.unwrap();
        assert_eq!(last.content.len(), 3);

        let err = reports
            .list_by_status("NO_SUCH_STATUS", 0, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::Validation(_)));
    }

    #[tokio::test]
    async fn out_of_range_page_number_is_rejected() {
        let (catalog, reports, _, log) = memory_stores();
        let seeded = catalog.seed_defaults();
        reports
            .create_report(report_input(&seeded, "ANSWER"))
            .await
            .unwrap();

        // An offset that would overflow page * size must not panic or wrap
        let err = reports.list_all(i64::MAX, 20).await.unwrap_err();
        assert!(matches!(err, ModerationError::Validation(_)));
        let err = reports
            .list_by_status("PENDING", i64::MAX, 20)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::Validation(_)));
        let err = log
            .list_by_moderator(Uuid::new_v4(), i64::MAX, 20)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::Validation(_)));

        // A large but representable offset is an empty page, not an error
        let far = reports.list_all(1_000_000, 20).await.unwrap();
        assert!(far.content.is_empty());
        assert_eq!(far.total_elements, 1);
    }

    #[tokio::test]
    async fn apply_revoke_round_trip() {
        let (_, _, bans, _) = memory_stores();
        let user_id = Uuid::new_v4();
        bans.apply_ban(ApplyBanInput {
            user_id,
            reason: "spam".into(),
            banned_by: Uuid::new_v4(),
            expires_at: None,
            source_report_id: None,
        })
        .await
        .unwrap();
        assert!(bans.is_banned(user_id).await.unwrap());

        bans.revoke_ban(user_id).await.unwrap();
        assert!(!bans.is_banned(user_id).await.unwrap());

        // The row survives revocation for audit purposes
        let ban = bans.get_ban(user_id).await.unwrap().unwrap();
        assert!(!ban.active);
    }

    #[tokio::test]
    async fn revoking_unknown_user_is_a_no_op() {
        let (_, _, bans, _) = memory_stores();
        bans.revoke_ban(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn expired_ban_reads_as_not_banned_without_sweep() {
        let (_, _, bans, _) = memory_stores();
        let user_id = Uuid::new_v4();
        bans.apply_ban(ApplyBanInput {
            user_id,
            reason: "cooldown".into(),
            banned_by: Uuid::new_v4(),
            expires_at: Some(Utc::now() - Duration::seconds(1)),
            source_report_id: None,
        })
        .await
        .unwrap();

        assert!(!bans.is_banned(user_id).await.unwrap());
        // The reaper later flips the stale row
        assert_eq!(bans.deactivate_expired().await.unwrap(), 1);
        assert!(!bans.get_ban(user_id).await.unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn reapply_overwrites_rather_than_stacking() {
        let (_, _, bans, _) = memory_stores();
        let user_id = Uuid::new_v4();
        let first_expiry = Utc::now() + Duration::days(7);
        let second_expiry = Utc::now() + Duration::days(14);
        let moderator = Uuid::new_v4();

        bans.apply_ban(ApplyBanInput {
            user_id,
            reason: "first".into(),
            banned_by: moderator,
            expires_at: Some(first_expiry),
            source_report_id: None,
        })
        .await
        .unwrap();
        bans.apply_ban(ApplyBanInput {
            user_id,
            reason: "second".into(),
            banned_by: moderator,
            expires_at: Some(second_expiry),
            source_report_id: None,
        })
        .await
        .unwrap();

        let ban = bans.get_ban(user_id).await.unwrap().unwrap();
        assert_eq!(ban.reason, "second");
        assert_eq!(ban.expires_at, Some(second_expiry));
        assert_eq!(bans.list_banned_by_moderator(moderator).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn catalog_deletes_blocked_by_live_references() {
        let (catalog, reports, _, _) = memory_stores();
        let seeded = catalog.seed_defaults();
        reports
            .create_report(report_input(&seeded, "QUESTION"))
            .await
            .unwrap();

        let err = catalog
            .delete_type(seeded.type_id("QUESTION"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::ReferentialConflict(_)));

        let err = catalog
            .delete_reason(seeded.reason_id("QUESTION_SPAM"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::ReferentialConflict(_)));

        let err = catalog
            .delete_status(seeded.status_id("PENDING"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::ReferentialConflict(_)));

        // An unreferenced type still deletes once its reasons are gone
        let unused = catalog.create_type("POLL", None).await.unwrap();
        catalog.delete_type(unused.id).await.unwrap();
    }

    #[tokio::test]
    async fn log_is_append_only_and_queryable_both_ways() {
        let (catalog, reports, _, log) = memory_stores();
        let seeded = catalog.seed_defaults();
        let report = reports
            .create_report(report_input(&seeded, "USER"))
            .await
            .unwrap();
        let moderator = Uuid::new_v4();

        for _ in 0..2 {
            log.append(NewModerationAction {
                report_id: report.id,
                moderator_id: moderator,
                action_type_id: seeded.action_type_id("WARNING"),
                resulting_status_id: seeded.status_id("REVIEWED"),
                notes: None,
                ban_duration_days: None,
                target_user_id: Some(report.target_id),
            })
            .await
            .unwrap();
        }

        let by_report = log.list_by_report(report.id, 0, 10).await.unwrap();
        assert_eq!(by_report.total_elements, 2);
        let by_moderator = log.list_by_moderator(moderator, 0, 1).await.unwrap();
        assert_eq!(by_moderator.total_elements, 2);
        assert_eq!(by_moderator.total_pages, 2);
        assert_eq!(by_moderator.content.len(), 1);
    }
}

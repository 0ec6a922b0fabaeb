//! End-to-end coordinator tests over the in-memory stores: ban side
//! effects, optimistic concurrency, audit logging, and failure semantics.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use moderation_service::error::{ModerationError, Result};
use moderation_service::models::{
    ActionOutcome, ApplyBanInput, CreateReportInput, ModerationAction, NewModerationAction, Page,
    Report, SubmitActionInput, UserBan,
};
use moderation_service::services::ModerationCoordinator;
use moderation_service::store::memory::{
    memory_stores, MemoryBanStore, MemoryCatalogStore, MemoryModerationLog, MemoryReportStore,
    SeededCatalog,
};
use moderation_service::store::{BanStore, ModerationLog, ReportStore};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use uuid::Uuid;

const TIMEOUT_WINDOW_HOURS: i64 = 24;

struct Harness {
    coordinator: ModerationCoordinator,
    catalog: Arc<MemoryCatalogStore>,
    reports: Arc<MemoryReportStore>,
    bans: Arc<MemoryBanStore>,
    log: Arc<MemoryModerationLog>,
    seeded: SeededCatalog,
}

fn harness() -> Harness {
    let (catalog, reports, bans, log) = memory_stores();
    let seeded = catalog.seed_defaults();
    let coordinator = ModerationCoordinator::new(
        catalog.clone(),
        reports.clone(),
        bans.clone(),
        log.clone(),
        TIMEOUT_WINDOW_HOURS,
    );
    Harness {
        coordinator,
        catalog,
        reports,
        bans,
        log,
        seeded,
    }
}

/// Ban store whose every call fails, for the abort-before-mutation path
struct UnavailableBanStore;

impl UnavailableBanStore {
    fn unavailable() -> ModerationError {
        ModerationError::ExternalService("ban store unavailable".into())
    }
}

#[async_trait]
impl BanStore for UnavailableBanStore {
    async fn apply_ban(&self, _input: ApplyBanInput) -> Result<UserBan> {
        Err(Self::unavailable())
    }
    async fn revoke_ban(&self, _user_id: Uuid) -> Result<()> {
        Err(Self::unavailable())
    }
    async fn is_banned(&self, _user_id: Uuid) -> Result<bool> {
        Err(Self::unavailable())
    }
    async fn get_ban(&self, _user_id: Uuid) -> Result<Option<UserBan>> {
        Err(Self::unavailable())
    }
    async fn list_banned_by_moderator(&self, _moderator_id: Uuid) -> Result<Vec<UserBan>> {
        Err(Self::unavailable())
    }
    async fn deactivate_expired(&self) -> Result<u64> {
        Err(Self::unavailable())
    }
}

/// Log store that fails a fixed number of appends before recovering
struct FlakyLog {
    inner: Arc<MemoryModerationLog>,
    failures_remaining: AtomicU32,
}

#[async_trait]
impl ModerationLog for FlakyLog {
    async fn append(&self, entry: NewModerationAction) -> Result<ModerationAction> {
        if self.failures_remaining.load(Ordering::SeqCst) > 0 {
            self.failures_remaining.fetch_sub(1, Ordering::SeqCst);
            return Err(ModerationError::ExternalService(
                "log store unavailable".into(),
            ));
        }
        self.inner.append(entry).await
    }

    async fn list_by_report(
        &self,
        report_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<ModerationAction>> {
        self.inner.list_by_report(report_id, page, size).await
    }

    async fn list_by_moderator(
        &self,
        moderator_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<ModerationAction>> {
        self.inner.list_by_moderator(moderator_id, page, size).await
    }
}

async fn create_report(h: &Harness, type_name: &str) -> Report {
    h.reports
        .create_report(CreateReportInput {
            report_type_id: h.seeded.type_id(type_name),
            target_id: Uuid::new_v4(),
            reporter_id: Uuid::new_v4(),
            report_reason_id: h.seeded.reason_id(&format!("{}_SPAM", type_name)),
            details: Some("reported for spam".into()),
        })
        .await
        .unwrap()
}

fn action_input(h: &Harness, report: &Report, action: &str, status: &str) -> SubmitActionInput {
    SubmitActionInput {
        report_id: report.id,
        moderator_id: Uuid::new_v4(),
        action_type_id: h.seeded.action_type_id(action),
        target_status_id: h.seeded.status_id(status),
        expected_status_version: report.status_version,
        notes: None,
        ban_duration_days: None,
    }
}

async fn submit(h: &Harness, input: SubmitActionInput) -> Result<ActionOutcome> {
    h.coordinator.submit_action(input).await
}

#[tokio::test]
async fn temporary_ban_on_user_report() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    let mut input = action_input(&h, &report, "TEMPORARY_BAN", "ACTION_TAKEN");
    input.ban_duration_days = Some(7);

    let before = Utc::now();
    let outcome = submit(&h, input).await.unwrap();
    let after = Utc::now();

    let ban = outcome.ban.expect("a user report with a ban policy must ban");
    assert_eq!(ban.user_id, report.target_id);
    assert!(ban.active);
    let expires = ban.expires_at.unwrap();
    assert!(expires >= before + Duration::days(7));
    assert!(expires <= after + Duration::days(7));
    assert_eq!(ban.source_report_id, Some(report.id));

    assert_eq!(outcome.report.status_id, h.seeded.status_id("ACTION_TAKEN"));
    assert_eq!(outcome.report.status_version, 2);

    assert!(outcome.audit_logged);
    let action = outcome.action.unwrap();
    assert_eq!(action.ban_duration_days, Some(7));
    assert_eq!(action.target_user_id, Some(report.target_id));
    assert_eq!(
        action.resulting_status_id,
        h.seeded.status_id("ACTION_TAKEN")
    );

    let logged = h.log.list_by_report(report.id, 0, 10).await.unwrap();
    assert_eq!(logged.total_elements, 1);
}

#[tokio::test]
async fn reban_overwrites_the_same_row() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    let mut first = action_input(&h, &report, "TEMPORARY_BAN", "ACTION_TAKEN");
    first.ban_duration_days = Some(7);
    let outcome = submit(&h, first).await.unwrap();

    let mut second = action_input(&h, &report, "2_WEEK_BAN", "ACTION_TAKEN");
    second.expected_status_version = outcome.report.status_version;
    // A stray day count must not leak into a fixed-duration ban
    second.ban_duration_days = Some(7);
    let before = Utc::now();
    let outcome = submit(&h, second).await.unwrap();
    let after = Utc::now();

    // Still exactly one ban row for the user, now with the later expiry
    let ban = h.bans.get_ban(report.target_id).await.unwrap().unwrap();
    assert!(ban.active);
    let expires = ban.expires_at.unwrap();
    assert!(expires >= before + Duration::days(14));
    assert!(expires <= after + Duration::days(14));

    // The fixed-duration ban logs no moderator-supplied day count
    assert_eq!(outcome.action.unwrap().ban_duration_days, None);
    assert_eq!(outcome.report.status_version, 3);
}

#[tokio::test]
async fn permanent_ban_has_no_expiry() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    let outcome = submit(&h, action_input(&h, &report, "PERMANENT_BAN", "ACTION_TAKEN"))
        .await
        .unwrap();
    let ban = outcome.ban.unwrap();
    assert!(ban.active);
    assert_eq!(ban.expires_at, None);
    assert!(h.bans.is_banned(report.target_id).await.unwrap());
}

#[tokio::test]
async fn timeout_uses_the_configured_window() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    let before = Utc::now();
    let outcome = submit(&h, action_input(&h, &report, "TIMEOUT", "ACTION_TAKEN"))
        .await
        .unwrap();
    let after = Utc::now();

    let expires = outcome.ban.unwrap().expires_at.unwrap();
    assert!(expires >= before + Duration::hours(TIMEOUT_WINDOW_HOURS));
    assert!(expires <= after + Duration::hours(TIMEOUT_WINDOW_HOURS));
}

#[tokio::test]
async fn stale_version_fails_with_conflict() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    // Moderator A dismisses at the version both moderators loaded
    let dismiss = action_input(&h, &report, "NO_ACTION", "DISMISSED");
    let outcome = submit(&h, dismiss).await.unwrap();
    assert_eq!(outcome.report.status_version, 2);

    // Moderator B acts on the now-stale version
    let stale = action_input(&h, &report, "WARNING", "ACTION_TAKEN");
    let err = submit(&h, stale).await.unwrap_err();
    assert!(matches!(err, ModerationError::Conflict(_)));

    // B's lost race left the report as A decided it
    let current = h.reports.get_by_id(report.id).await.unwrap();
    assert_eq!(current.status_id, h.seeded.status_id("DISMISSED"));
    assert_eq!(current.status_version, 2);
}

#[tokio::test]
async fn ban_is_not_rolled_back_when_the_status_race_is_lost() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    // Another moderator moves the report first
    submit(&h, action_input(&h, &report, "NO_ACTION", "REVIEWED"))
        .await
        .unwrap();

    // A stale permanent ban still bans before the version check fails
    let stale = action_input(&h, &report, "PERMANENT_BAN", "ACTION_TAKEN");
    let err = submit(&h, stale).await.unwrap_err();
    assert!(matches!(err, ModerationError::Conflict(_)));
    assert!(h.bans.is_banned(report.target_id).await.unwrap());

    // No audit entry for the conflicted attempt
    let logged = h.log.list_by_report(report.id, 0, 10).await.unwrap();
    assert_eq!(logged.total_elements, 1);
}

#[tokio::test]
async fn resubmitting_the_same_decision_is_idempotent() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    let mut first = action_input(&h, &report, "TEMPORARY_BAN", "ACTION_TAKEN");
    first.ban_duration_days = Some(7);
    let outcome = submit(&h, first.clone()).await.unwrap();
    assert_eq!(outcome.report.status_version, 2);

    let mut second = first;
    second.expected_status_version = 2;
    let outcome = submit(&h, second).await.unwrap();

    // One ban row, one more version step, no double jump
    assert_eq!(outcome.report.status_version, 3);
    let ban = h.bans.get_ban(report.target_id).await.unwrap().unwrap();
    assert!(ban.active);
    let logged = h.log.list_by_report(report.id, 0, 10).await.unwrap();
    assert_eq!(logged.total_elements, 2);
}

#[tokio::test]
async fn non_user_reports_never_ban() {
    let h = harness();
    for type_name in ["QUESTION", "ANSWER", "COMMENT", "EVENT", "SHOWCASE"] {
        let report = create_report(&h, type_name).await;

        // Even an explicit ban action type must not ban a content target
        let mut input = action_input(&h, &report, "TEMPORARY_BAN", "ACTION_TAKEN");
        input.ban_duration_days = Some(5);
        let outcome = submit(&h, input).await.unwrap();

        assert!(outcome.ban.is_none());
        assert!(h.bans.get_ban(report.target_id).await.unwrap().is_none());
        assert_eq!(outcome.report.status_id, h.seeded.status_id("ACTION_TAKEN"));
        assert_eq!(outcome.action.unwrap().target_user_id, None);
    }
}

#[tokio::test]
async fn warning_on_question_report_only_moves_status() {
    let h = harness();
    let report = create_report(&h, "QUESTION").await;

    let outcome = submit(&h, action_input(&h, &report, "WARNING", "REVIEWED"))
        .await
        .unwrap();

    assert!(outcome.ban.is_none());
    assert_eq!(outcome.report.status_id, h.seeded.status_id("REVIEWED"));
    assert_eq!(outcome.report.status_version, 2);
}

#[tokio::test]
async fn temporary_ban_requires_positive_duration() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    for days in [None, Some(0), Some(-4)] {
        let mut input = action_input(&h, &report, "TEMPORARY_BAN", "ACTION_TAKEN");
        input.ban_duration_days = days;
        let err = submit(&h, input).await.unwrap_err();
        assert!(matches!(err, ModerationError::Validation(_)));
    }

    // Validation failures mutate nothing
    assert!(h.bans.get_ban(report.target_id).await.unwrap().is_none());
    let current = h.reports.get_by_id(report.id).await.unwrap();
    assert_eq!(current.status_version, 1);
    assert_eq!(
        h.log
            .list_by_report(report.id, 0, 10)
            .await
            .unwrap()
            .total_elements,
        0
    );
}

#[tokio::test]
async fn unknown_action_type_and_status_are_validation_errors() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    let mut input = action_input(&h, &report, "WARNING", "REVIEWED");
    input.action_type_id = Uuid::new_v4();
    assert!(matches!(
        submit(&h, input).await.unwrap_err(),
        ModerationError::Validation(_)
    ));

    let mut input = action_input(&h, &report, "WARNING", "REVIEWED");
    input.target_status_id = Uuid::new_v4();
    assert!(matches!(
        submit(&h, input).await.unwrap_err(),
        ModerationError::Validation(_)
    ));
}

#[tokio::test]
async fn missing_report_is_not_found() {
    let h = harness();
    let report = create_report(&h, "USER").await;
    let mut input = action_input(&h, &report, "WARNING", "REVIEWED");
    input.report_id = Uuid::new_v4();
    assert!(matches!(
        submit(&h, input).await.unwrap_err(),
        ModerationError::NotFound(_)
    ));
}

#[tokio::test]
async fn failed_ban_apply_aborts_before_any_other_mutation() {
    let (catalog, reports, _, log) = memory_stores();
    let seeded = catalog.seed_defaults();
    let coordinator = ModerationCoordinator::new(
        catalog.clone(),
        reports.clone(),
        Arc::new(UnavailableBanStore),
        log.clone(),
        TIMEOUT_WINDOW_HOURS,
    );

    let report = reports
        .create_report(CreateReportInput {
            report_type_id: seeded.type_id("USER"),
            target_id: Uuid::new_v4(),
            reporter_id: Uuid::new_v4(),
            report_reason_id: seeded.reason_id("USER_SPAM"),
            details: None,
        })
        .await
        .unwrap();

    let err = coordinator
        .submit_action(SubmitActionInput {
            report_id: report.id,
            moderator_id: Uuid::new_v4(),
            action_type_id: seeded.action_type_id("PERMANENT_BAN"),
            target_status_id: seeded.status_id("ACTION_TAKEN"),
            expected_status_version: 1,
            notes: None,
            ban_duration_days: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::ExternalService(_)));

    // The ban failed first, so nothing else mutated; the call is retryable
    let current = reports.get_by_id(report.id).await.unwrap();
    assert_eq!(current.status_id, seeded.status_id("PENDING"));
    assert_eq!(current.status_version, 1);
    assert_eq!(
        log.list_by_report(report.id, 0, 10)
            .await
            .unwrap()
            .total_elements,
        0
    );
}

#[tokio::test]
async fn log_append_recovers_within_the_retry_budget() {
    let (catalog, reports, bans, log) = memory_stores();
    let seeded = catalog.seed_defaults();
    let flaky = Arc::new(FlakyLog {
        inner: log.clone(),
        failures_remaining: AtomicU32::new(1),
    });
    let coordinator = ModerationCoordinator::new(
        catalog.clone(),
        reports.clone(),
        bans,
        flaky,
        TIMEOUT_WINDOW_HOURS,
    );

    let report = reports
        .create_report(CreateReportInput {
            report_type_id: seeded.type_id("USER"),
            target_id: Uuid::new_v4(),
            reporter_id: Uuid::new_v4(),
            report_reason_id: seeded.reason_id("USER_SPAM"),
            details: None,
        })
        .await
        .unwrap();

    let outcome = coordinator
        .submit_action(SubmitActionInput {
            report_id: report.id,
            moderator_id: Uuid::new_v4(),
            action_type_id: seeded.action_type_id("WARNING"),
            target_status_id: seeded.status_id("REVIEWED"),
            expected_status_version: 1,
            notes: None,
            ban_duration_days: None,
        })
        .await
        .unwrap();

    assert!(outcome.audit_logged);
    assert_eq!(
        log.list_by_report(report.id, 0, 10)
            .await
            .unwrap()
            .total_elements,
        1
    );
}

#[tokio::test]
async fn exhausted_log_retries_surface_as_partial_success() {
    let (catalog, reports, bans, log) = memory_stores();
    let seeded = catalog.seed_defaults();
    let flaky = Arc::new(FlakyLog {
        inner: log.clone(),
        failures_remaining: AtomicU32::new(u32::MAX),
    });
    let coordinator = ModerationCoordinator::new(
        catalog.clone(),
        reports.clone(),
        bans.clone(),
        flaky,
        TIMEOUT_WINDOW_HOURS,
    );

    let report = reports
        .create_report(CreateReportInput {
            report_type_id: seeded.type_id("USER"),
            target_id: Uuid::new_v4(),
            reporter_id: Uuid::new_v4(),
            report_reason_id: seeded.reason_id("USER_SPAM"),
            details: None,
        })
        .await
        .unwrap();

    let outcome = coordinator
        .submit_action(SubmitActionInput {
            report_id: report.id,
            moderator_id: Uuid::new_v4(),
            action_type_id: seeded.action_type_id("PERMANENT_BAN"),
            target_status_id: seeded.status_id("ACTION_TAKEN"),
            expected_status_version: 1,
            notes: Some("repeated harassment".into()),
            ban_duration_days: None,
        })
        .await
        .unwrap();

    // The primary mutations committed; only the audit entry is missing
    assert!(!outcome.audit_logged);
    assert!(outcome.action.is_none());
    assert!(bans.is_banned(report.target_id).await.unwrap());
    assert_eq!(outcome.report.status_id, seeded.status_id("ACTION_TAKEN"));
    assert_eq!(
        log.list_by_report(report.id, 0, 10)
            .await
            .unwrap()
            .total_elements,
        0
    );
}

#[tokio::test]
async fn notes_become_the_ban_reason() {
    let h = harness();
    let report = create_report(&h, "USER").await;

    let mut input = action_input(&h, &report, "PERMANENT_BAN", "ACTION_TAKEN");
    input.notes = Some("ban evasion".into());
    let outcome = submit(&h, input).await.unwrap();
    assert_eq!(outcome.ban.unwrap().reason, "ban evasion");

    // Blank notes fall back to a generated reason
    let report = create_report(&h, "USER").await;
    let mut input = action_input(&h, &report, "PERMANENT_BAN", "ACTION_TAKEN");
    input.notes = Some("   ".into());
    let outcome = submit(&h, input).await.unwrap();
    assert!(outcome.ban.unwrap().reason.contains("PERMANENT_BAN"));
}

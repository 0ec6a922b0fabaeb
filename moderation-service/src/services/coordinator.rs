//! Moderation coordinator: the orchestration point for moderator decisions.
//!
//! Ordering contract: the ban (when the action type carries one and the
//! report targets a user) is applied before the report status moves. A ban
//! that succeeds before a lost status race is left in place; a ban failure
//! aborts before anything else mutates, so the whole call is safe to retry.

use crate::error::{ModerationError, Result};
use crate::metrics;
use crate::models::{
    ActionOutcome, ApplyBanInput, BanPolicy, NewModerationAction, SubmitActionInput,
    REPORT_TYPE_USER,
};
use crate::store::{BanStore, CatalogStore, ModerationLog, ReportStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

const LOG_APPEND_ATTEMPTS: u32 = 3;
const LOG_APPEND_BACKOFF_MS: u64 = 50;

pub struct ModerationCoordinator {
    catalog: Arc<dyn CatalogStore>,
    reports: Arc<dyn ReportStore>,
    bans: Arc<dyn BanStore>,
    log: Arc<dyn ModerationLog>,
    timeout_window_hours: i64,
}

impl ModerationCoordinator {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        reports: Arc<dyn ReportStore>,
        bans: Arc<dyn BanStore>,
        log: Arc<dyn ModerationLog>,
        timeout_window_hours: i64,
    ) -> Self {
        Self {
            catalog,
            reports,
            bans,
            log,
            timeout_window_hours,
        }
    }

    /// Apply a moderator's decision to a report: conditionally ban the
    /// reported user, move the report's status under the optimistic version
    /// guard, and append to the audit log.
    pub async fn submit_action(&self, input: SubmitActionInput) -> Result<ActionOutcome> {
        let action_type = self
            .catalog
            .get_action_type(input.action_type_id)
            .await
            .map_err(unknown_catalog_entry)?;
        let target_status = self
            .catalog
            .get_status(input.target_status_id)
            .await
            .map_err(unknown_catalog_entry)?;
        let policy = action_type.ban_policy(self.timeout_window_hours);

        let report = self.reports.get_by_id(input.report_id).await?;
        let report_type = self.catalog.get_type(report.report_type_id).await?;
        // A ban policy on a non-USER report is simply not applied; the
        // status side of the action still proceeds.
        let is_user_report = report_type.name == REPORT_TYPE_USER;

        let mut ban = None;
        if is_user_report && !policy.is_none() {
            let expires_at = policy.resolve_expiry(Utc::now(), input.ban_duration_days)?;
            let reason = input
                .notes
                .clone()
                .filter(|notes| !notes.trim().is_empty())
                .unwrap_or_else(|| {
                    format!("{} issued for report {}", action_type.name, report.id)
                });

            let applied = self
                .bans
                .apply_ban(ApplyBanInput {
                    user_id: report.target_id,
                    reason,
                    banned_by: input.moderator_id,
                    expires_at,
                    source_report_id: Some(report.id),
                })
                .await
                .map_err(|e| {
                    ModerationError::ExternalService(format!("ban store apply failed: {}", e))
                })?;

            metrics::BANS_APPLIED_TOTAL.inc();
            ban = Some(applied);
        }

        let updated_report = match self
            .reports
            .compare_and_set_status(report.id, input.expected_status_version, target_status.id)
            .await
        {
            Ok(report) => report,
            Err(err @ ModerationError::Conflict(_)) => {
                metrics::STATUS_CONFLICTS_TOTAL.inc();
                if ban.is_some() {
                    tracing::warn!(
                        report_id = %report.id,
                        moderator_id = %input.moderator_id,
                        "Status update lost a version race after a ban was applied; ban left in place"
                    );
                }
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let entry = NewModerationAction {
            report_id: report.id,
            moderator_id: input.moderator_id,
            action_type_id: action_type.id,
            resulting_status_id: target_status.id,
            notes: input.notes.clone(),
            // The supplied day count only drives a Temporary ban's expiry;
            // recording it for the fixed policies would misstate the ban.
            ban_duration_days: if ban.is_some() && policy == BanPolicy::Temporary {
                input.ban_duration_days
            } else {
                None
            },
            target_user_id: is_user_report.then_some(report.target_id),
        };

        let mut action = None;
        for attempt in 1..=LOG_APPEND_ATTEMPTS {
            match self.log.append(entry.clone()).await {
                Ok(appended) => {
                    action = Some(appended);
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        report_id = %report.id,
                        attempt,
                        error = %err,
                        "Audit log append failed"
                    );
                    if attempt < LOG_APPEND_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(LOG_APPEND_BACKOFF_MS)).await;
                    }
                }
            }
        }

        let audit_logged = action.is_some();
        if !audit_logged {
            // Ban and status already committed; surface for operator backfill
            metrics::AUDIT_APPEND_FAILURES_TOTAL.inc();
            tracing::warn!(
                report_id = %report.id,
                moderator_id = %input.moderator_id,
                action_type = %action_type.name,
                "Action committed but the audit entry could not be appended"
            );
        }

        metrics::ACTIONS_SUBMITTED_TOTAL
            .with_label_values(&[action_type.name.as_str()])
            .inc();

        tracing::info!(
            report_id = %report.id,
            moderator_id = %input.moderator_id,
            action_type = %action_type.name,
            resulting_status = %target_status.name,
            banned = ban.is_some(),
            "Moderation action submitted"
        );

        Ok(ActionOutcome {
            report: updated_report,
            ban,
            action,
            audit_logged,
        })
    }
}

/// Unknown action types and target statuses are malformed input, not
/// missing resources.
fn unknown_catalog_entry(err: ModerationError) -> ModerationError {
    match err {
        ModerationError::NotFound(message) => ModerationError::Validation(message),
        other => other,
    }
}

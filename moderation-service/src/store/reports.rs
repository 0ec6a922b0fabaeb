//! Postgres-backed report store

use crate::error::{ModerationError, Result};
use crate::models::{CreateReportInput, Page, Report, INITIAL_STATUS, MAX_DETAILS_LEN};
use crate::store::{page_offset, ReportStore};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const REPORT_COLUMNS: &str = "id, report_type_id, target_id, reporter_id, report_reason_id, \
     status_id, details, status_version, created_at, updated_at";

pub struct PgReportStore {
    pool: Arc<PgPool>,
}

impl PgReportStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn create_report(&self, input: CreateReportInput) -> Result<Report> {
        if let Some(details) = &input.details {
            if details.chars().count() > MAX_DETAILS_LEN {
                return Err(ModerationError::Validation(format!(
                    "details exceeds the maximum length of {} characters",
                    MAX_DETAILS_LEN
                )));
            }
        }

        // The reason must belong to the report's type
        let reason_matches: Option<bool> = sqlx::query_scalar(
            "SELECT report_type_id = $2 FROM report_reasons WHERE id = $1",
        )
        .bind(input.report_reason_id)
        .bind(input.report_type_id)
        .fetch_optional(&*self.pool)
        .await?;
        match reason_matches {
            Some(true) => {}
            Some(false) => {
                return Err(ModerationError::Validation(format!(
                    "Reason {} does not belong to report type {}",
                    input.report_reason_id, input.report_type_id
                )))
            }
            None => {
                return Err(ModerationError::Validation(format!(
                    "Unknown report reason {}",
                    input.report_reason_id
                )))
            }
        }

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (
                report_type_id, target_id, reporter_id, report_reason_id, status_id, details
            )
            VALUES (
                $1, $2, $3, $4,
                (SELECT id FROM report_statuses WHERE name = $5),
                $6
            )
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(input.report_type_id)
        .bind(input.target_id)
        .bind(input.reporter_id)
        .bind(input.report_reason_id)
        .bind(INITIAL_STATUS)
        .bind(&input.details)
        .fetch_one(&*self.pool)
        .await?;

        tracing::info!(
            report_id = %report.id,
            reporter_id = %input.reporter_id,
            report_type_id = %input.report_type_id,
            "Report created"
        );
        Ok(report)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Report {} not found", id)))
    }

    async fn list_by_status(
        &self,
        status_name: &str,
        page: i64,
        size: i64,
    ) -> Result<Page<Report>> {
        let offset = page_offset(page, size)?;

        let status_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM report_statuses WHERE name = $1")
                .bind(status_name)
                .fetch_optional(&*self.pool)
                .await?;
        let status_id = status_id.ok_or_else(|| {
            ModerationError::Validation(format!("Unknown report status '{}'", status_name))
        })?;

        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE status_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status_id)
        .bind(size)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE status_id = $1")
            .bind(status_id)
            .fetch_one(&*self.pool)
            .await?;

        Ok(Page::new(reports, total, page, size))
    }

    async fn list_all(&self, page: i64, size: i64) -> Result<Page<Report>> {
        let offset = page_offset(page, size)?;

        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(size)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&*self.pool)
            .await?;

        Ok(Page::new(reports, total, page, size))
    }

    async fn compare_and_set_status(
        &self,
        report_id: Uuid,
        expected_status_version: i64,
        new_status_id: Uuid,
    ) -> Result<Report> {
        let updated = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status_id = $3,
                status_version = status_version + 1,
                updated_at = NOW()
            WHERE id = $1 AND status_version = $2
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report_id)
        .bind(expected_status_version)
        .bind(new_status_id)
        .fetch_optional(&*self.pool)
        .await?;

        match updated {
            Some(report) => {
                tracing::info!(
                    report_id = %report_id,
                    status_id = %new_status_id,
                    status_version = report.status_version,
                    "Report status updated"
                );
                Ok(report)
            }
            None => {
                // Distinguish a missing report from a lost version race
                let current: Option<i64> =
                    sqlx::query_scalar("SELECT status_version FROM reports WHERE id = $1")
                        .bind(report_id)
                        .fetch_optional(&*self.pool)
                        .await?;
                match current {
                    Some(version) => Err(ModerationError::Conflict(format!(
                        "Report {} is at status version {}, expected {}",
                        report_id, version, expected_status_version
                    ))),
                    None => Err(ModerationError::NotFound(format!(
                        "Report {} not found",
                        report_id
                    ))),
                }
            }
        }
    }
}

//! Postgres-backed catalog store

use crate::error::{ModerationError, Result};
use crate::models::{ModerationActionType, ReportReason, ReportStatus, ReportType};
use crate::store::CatalogStore;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct PgCatalogStore {
    pool: Arc<PgPool>,
}

impl PgCatalogStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn reference_exists(&self, query: &str, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(query)
            .bind(id)
            .fetch_one(&*self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_types(&self) -> Result<Vec<ReportType>> {
        let types = sqlx::query_as::<_, ReportType>(
            "SELECT id, name, description FROM report_types ORDER BY name",
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(types)
    }

    async fn get_type(&self, id: Uuid) -> Result<ReportType> {
        sqlx::query_as::<_, ReportType>(
            "SELECT id, name, description FROM report_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Report type {} not found", id)))
    }

    async fn create_type(&self, name: &str, description: Option<&str>) -> Result<ReportType> {
        let report_type = sqlx::query_as::<_, ReportType>(
            r#"
            INSERT INTO report_types (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&*self.pool)
        .await?;

        tracing::info!(type_id = %report_type.id, name = %name, "Report type created");
        Ok(report_type)
    }

    async fn update_type(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportType> {
        sqlx::query_as::<_, ReportType>(
            r#"
            UPDATE report_types
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Report type {} not found", id)))
    }

    async fn delete_type(&self, id: Uuid) -> Result<()> {
        if self
            .reference_exists("SELECT EXISTS(SELECT 1 FROM reports WHERE report_type_id = $1)", id)
            .await?
        {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report type {} is referenced by existing reports",
                id
            )));
        }
        if self
            .reference_exists(
                "SELECT EXISTS(SELECT 1 FROM report_reasons WHERE report_type_id = $1)",
                id,
            )
            .await?
        {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report type {} still owns report reasons",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM report_types WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ModerationError::NotFound(format!(
                "Report type {} not found",
                id
            )));
        }

        tracing::info!(type_id = %id, "Report type deleted");
        Ok(())
    }

    async fn list_reasons(&self, report_type_id: Uuid) -> Result<Vec<ReportReason>> {
        let reasons = sqlx::query_as::<_, ReportReason>(
            r#"
            SELECT id, name, description, report_type_id
            FROM report_reasons
            WHERE report_type_id = $1
            ORDER BY name
            "#,
        )
        .bind(report_type_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(reasons)
    }

    async fn get_reason(&self, id: Uuid) -> Result<ReportReason> {
        sqlx::query_as::<_, ReportReason>(
            "SELECT id, name, description, report_type_id FROM report_reasons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Report reason {} not found", id)))
    }

    async fn create_reason(
        &self,
        report_type_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportReason> {
        // Owning type must exist
        self.get_type(report_type_id).await?;

        let reason = sqlx::query_as::<_, ReportReason>(
            r#"
            INSERT INTO report_reasons (report_type_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, report_type_id
            "#,
        )
        .bind(report_type_id)
        .bind(name)
        .bind(description)
        .fetch_one(&*self.pool)
        .await?;

        tracing::info!(
            reason_id = %reason.id,
            report_type_id = %report_type_id,
            name = %name,
            "Report reason created"
        );
        Ok(reason)
    }

    async fn update_reason(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportReason> {
        sqlx::query_as::<_, ReportReason>(
            r#"
            UPDATE report_reasons
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description, report_type_id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Report reason {} not found", id)))
    }

    async fn delete_reason(&self, id: Uuid) -> Result<()> {
        if self
            .reference_exists(
                "SELECT EXISTS(SELECT 1 FROM reports WHERE report_reason_id = $1)",
                id,
            )
            .await?
        {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report reason {} is referenced by existing reports",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM report_reasons WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ModerationError::NotFound(format!(
                "Report reason {} not found",
                id
            )));
        }

        tracing::info!(reason_id = %id, "Report reason deleted");
        Ok(())
    }

    async fn list_statuses(&self) -> Result<Vec<ReportStatus>> {
        let statuses = sqlx::query_as::<_, ReportStatus>(
            "SELECT id, name, description FROM report_statuses ORDER BY name",
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(statuses)
    }

    async fn get_status(&self, id: Uuid) -> Result<ReportStatus> {
        sqlx::query_as::<_, ReportStatus>(
            "SELECT id, name, description FROM report_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Report status {} not found", id)))
    }

    async fn get_status_by_name(&self, name: &str) -> Result<ReportStatus> {
        sqlx::query_as::<_, ReportStatus>(
            "SELECT id, name, description FROM report_statuses WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Report status '{}' not found", name)))
    }

    async fn create_status(&self, name: &str, description: Option<&str>) -> Result<ReportStatus> {
        let status = sqlx::query_as::<_, ReportStatus>(
            r#"
            INSERT INTO report_statuses (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&*self.pool)
        .await?;

        tracing::info!(status_id = %status.id, name = %name, "Report status created");
        Ok(status)
    }

    async fn update_status(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ReportStatus> {
        sqlx::query_as::<_, ReportStatus>(
            r#"
            UPDATE report_statuses
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Report status {} not found", id)))
    }

    async fn delete_status(&self, id: Uuid) -> Result<()> {
        if self
            .reference_exists("SELECT EXISTS(SELECT 1 FROM reports WHERE status_id = $1)", id)
            .await?
        {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report status {} is referenced by existing reports",
                id
            )));
        }
        if self
            .reference_exists(
                "SELECT EXISTS(SELECT 1 FROM moderation_actions WHERE resulting_status_id = $1)",
                id,
            )
            .await?
        {
            return Err(ModerationError::ReferentialConflict(format!(
                "Report status {} is referenced by the moderation log",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM report_statuses WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ModerationError::NotFound(format!(
                "Report status {} not found",
                id
            )));
        }

        tracing::info!(status_id = %id, "Report status deleted");
        Ok(())
    }

    async fn list_action_types(&self) -> Result<Vec<ModerationActionType>> {
        let action_types = sqlx::query_as::<_, ModerationActionType>(
            "SELECT id, name, description FROM moderation_action_types ORDER BY name",
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(action_types)
    }

    async fn get_action_type(&self, id: Uuid) -> Result<ModerationActionType> {
        sqlx::query_as::<_, ModerationActionType>(
            "SELECT id, name, description FROM moderation_action_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Action type {} not found", id)))
    }

    async fn create_action_type(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ModerationActionType> {
        let action_type = sqlx::query_as::<_, ModerationActionType>(
            r#"
            INSERT INTO moderation_action_types (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&*self.pool)
        .await?;

        tracing::info!(action_type_id = %action_type.id, name = %name, "Action type created");
        Ok(action_type)
    }

    async fn update_action_type(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<ModerationActionType> {
        sqlx::query_as::<_, ModerationActionType>(
            r#"
            UPDATE moderation_action_types
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| ModerationError::NotFound(format!("Action type {} not found", id)))
    }

    async fn delete_action_type(&self, id: Uuid) -> Result<()> {
        if self
            .reference_exists(
                "SELECT EXISTS(SELECT 1 FROM moderation_actions WHERE action_type_id = $1)",
                id,
            )
            .await?
        {
            return Err(ModerationError::ReferentialConflict(format!(
                "Action type {} is referenced by the moderation log",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM moderation_action_types WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ModerationError::NotFound(format!(
                "Action type {} not found",
                id
            )));
        }

        tracing::info!(action_type_id = %id, "Action type deleted");
        Ok(())
    }
}

//! Postgres-backed moderation log. Append-only: the service exposes no
//! update or delete path over this table.

use crate::error::Result;
use crate::models::{ModerationAction, NewModerationAction, Page};
use crate::store::{page_offset, ModerationLog};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const ACTION_COLUMNS: &str = "id, report_id, moderator_id, action_type_id, resulting_status_id, \
     notes, ban_duration_days, target_user_id, created_at";

pub struct PgModerationLog {
    pool: Arc<PgPool>,
}

impl PgModerationLog {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationLog for PgModerationLog {
    async fn append(&self, entry: NewModerationAction) -> Result<ModerationAction> {
        let action = sqlx::query_as::<_, ModerationAction>(&format!(
            r#"
            INSERT INTO moderation_actions (
                report_id, moderator_id, action_type_id, resulting_status_id,
                notes, ban_duration_days, target_user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ACTION_COLUMNS}
            "#
        ))
        .bind(entry.report_id)
        .bind(entry.moderator_id)
        .bind(entry.action_type_id)
        .bind(entry.resulting_status_id)
        .bind(&entry.notes)
        .bind(entry.ban_duration_days)
        .bind(entry.target_user_id)
        .fetch_one(&*self.pool)
        .await?;

        tracing::info!(
            action_id = %action.id,
            report_id = %action.report_id,
            moderator_id = %action.moderator_id,
            "Moderation action logged"
        );
        Ok(action)
    }

    async fn list_by_report(
        &self,
        report_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<ModerationAction>> {
        let offset = page_offset(page, size)?;

        let actions = sqlx::query_as::<_, ModerationAction>(&format!(
            r#"
            SELECT {ACTION_COLUMNS}
            FROM moderation_actions
            WHERE report_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(report_id)
        .bind(size)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM moderation_actions WHERE report_id = $1")
                .bind(report_id)
                .fetch_one(&*self.pool)
                .await?;

        Ok(Page::new(actions, total, page, size))
    }

    async fn list_by_moderator(
        &self,
        moderator_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<ModerationAction>> {
        let offset = page_offset(page, size)?;

        let actions = sqlx::query_as::<_, ModerationAction>(&format!(
            r#"
            SELECT {ACTION_COLUMNS}
            FROM moderation_actions
            WHERE moderator_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(moderator_id)
        .bind(size)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM moderation_actions WHERE moderator_id = $1")
                .bind(moderator_id)
                .fetch_one(&*self.pool)
                .await?;

        Ok(Page::new(actions, total, page, size))
    }
}

//! Postgres-backed ban store

use crate::error::Result;
use crate::models::{ApplyBanInput, UserBan};
use crate::store::BanStore;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const BAN_COLUMNS: &str =
    "user_id, reason, banned_by, source_report_id, starts_at, expires_at, active, updated_at";

pub struct PgBanStore {
    pool: Arc<PgPool>,
}

impl PgBanStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BanStore for PgBanStore {
    async fn apply_ban(&self, input: ApplyBanInput) -> Result<UserBan> {
        // One row per user: re-banning overwrites in place, last write wins
        let ban = sqlx::query_as::<_, UserBan>(&format!(
            r#"
            INSERT INTO user_bans (user_id, reason, banned_by, source_report_id, starts_at, expires_at, active, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), $5, TRUE, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET reason = EXCLUDED.reason,
                banned_by = EXCLUDED.banned_by,
                source_report_id = EXCLUDED.source_report_id,
                starts_at = EXCLUDED.starts_at,
                expires_at = EXCLUDED.expires_at,
                active = TRUE,
                updated_at = NOW()
            RETURNING {BAN_COLUMNS}
            "#
        ))
        .bind(input.user_id)
        .bind(&input.reason)
        .bind(input.banned_by)
        .bind(input.source_report_id)
        .bind(input.expires_at)
        .fetch_one(&*self.pool)
        .await?;

        tracing::warn!(
            user_id = %ban.user_id,
            banned_by = %ban.banned_by,
            expires_at = ?ban.expires_at,
            source_report_id = ?ban.source_report_id,
            "User ban applied"
        );
        Ok(ban)
    }

    async fn revoke_ban(&self, user_id: Uuid) -> Result<()> {
        // Revoking a user who has no ban row is a no-op success
        let result = sqlx::query(
            "UPDATE user_bans SET active = FALSE, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(user_id = %user_id, "User ban revoked");
        }
        Ok(())
    }

    async fn is_banned(&self, user_id: Uuid) -> Result<bool> {
        // Lazy expiry: an elapsed expires_at means not banned even if the
        // reaper has not flipped the row yet
        let banned: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_bans
                WHERE user_id = $1
                  AND active
                  AND (expires_at IS NULL OR expires_at > NOW())
            )
            "#,
        )
        .bind(user_id)
        .fetch_one(&*self.pool)
        .await?;
        Ok(banned)
    }

    async fn get_ban(&self, user_id: Uuid) -> Result<Option<UserBan>> {
        let ban = sqlx::query_as::<_, UserBan>(&format!(
            "SELECT {BAN_COLUMNS} FROM user_bans WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(ban)
    }

    async fn list_banned_by_moderator(&self, moderator_id: Uuid) -> Result<Vec<UserBan>> {
        let bans = sqlx::query_as::<_, UserBan>(&format!(
            r#"
            SELECT {BAN_COLUMNS}
            FROM user_bans
            WHERE banned_by = $1 AND active
            ORDER BY updated_at DESC
            "#
        ))
        .bind(moderator_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(bans)
    }

    async fn deactivate_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_bans
            SET active = FALSE, updated_at = NOW()
            WHERE active AND expires_at IS NOT NULL AND expires_at <= NOW()
            "#,
        )
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

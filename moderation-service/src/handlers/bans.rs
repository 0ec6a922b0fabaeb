use actix_web::{delete, get, web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::error::ModerationError;
use crate::handlers::AppState;

#[get("/api/v1/users/{user_id}/ban")]
pub async fn get_ban(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, ModerationError> {
    let ban = state.bans.get_ban(user_id.into_inner()).await?;
    let banned = ban
        .as_ref()
        .map_or(false, |ban| ban.is_banned_at(Utc::now()));
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "banned": banned,
        "ban": ban,
    })))
}

#[delete("/api/v1/users/{user_id}/ban")]
pub async fn revoke_ban(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, ModerationError> {
    state.bans.revoke_ban(user_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/api/v1/moderators/{moderator_id}/bans")]
pub async fn list_bans_by_moderator(
    state: web::Data<AppState>,
    moderator_id: web::Path<Uuid>,
) -> Result<HttpResponse, ModerationError> {
    let bans = state
        .bans
        .list_banned_by_moderator(moderator_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(bans))
}

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ModerationError;
use crate::handlers::{page_params, AppState};
use crate::models::SubmitActionInput;

#[derive(Debug, Deserialize)]
pub struct SubmitActionPayload {
    pub report_id: Uuid,
    pub moderator_id: Uuid,
    pub action_type_id: Uuid,
    pub target_status_id: Uuid,
    pub expected_status_version: i64,
    pub notes: Option<String>,
    pub ban_duration_days: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ListActionsQuery {
    pub moderator_id: Option<Uuid>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[post("/api/v1/moderation/actions")]
pub async fn submit_action(
    state: web::Data<AppState>,
    payload: web::Json<SubmitActionPayload>,
) -> Result<HttpResponse, ModerationError> {
    let payload = payload.into_inner();
    let outcome = state
        .coordinator
        .submit_action(SubmitActionInput {
            report_id: payload.report_id,
            moderator_id: payload.moderator_id,
            action_type_id: payload.action_type_id,
            target_status_id: payload.target_status_id,
            expected_status_version: payload.expected_status_version,
            notes: payload.notes,
            ban_duration_days: payload.ban_duration_days,
        })
        .await?;

    let warning = (!outcome.audit_logged)
        .then_some("action committed but the audit entry could not be appended");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "report": outcome.report,
        "ban": outcome.ban,
        "action": outcome.action,
        "audit_logged": outcome.audit_logged,
        "warning": warning,
    })))
}

#[get("/api/v1/moderation/actions")]
pub async fn list_actions(
    state: web::Data<AppState>,
    query: web::Query<ListActionsQuery>,
) -> Result<HttpResponse, ModerationError> {
    let moderator_id = query.moderator_id.ok_or_else(|| {
        ModerationError::Validation("moderator_id query parameter is required".into())
    })?;
    let (page, size) = page_params(query.page, query.size);
    let actions = state.log.list_by_moderator(moderator_id, page, size).await?;
    Ok(HttpResponse::Ok().json(actions))
}

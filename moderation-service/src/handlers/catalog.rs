//! Catalog administration endpoints. Role checks (ADMIN) are enforced by
//! the surrounding authorization layer before requests reach this service.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ModerationError;
use crate::handlers::AppState;

#[derive(Debug, Deserialize)]
pub struct CatalogEntryPayload {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReasonPayload {
    pub report_type_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListReasonsQuery {
    pub report_type_id: Uuid,
}

#[get("/api/v1/catalog/types")]
pub async fn list_types(state: web::Data<AppState>) -> Result<HttpResponse, ModerationError> {
    Ok(HttpResponse::Ok().json(state.catalog.list_types().await?))
}

#[post("/api/v1/catalog/types")]
pub async fn create_type(
    state: web::Data<AppState>,
    payload: web::Json<CatalogEntryPayload>,
) -> Result<HttpResponse, ModerationError> {
    let created = state
        .catalog
        .create_type(&payload.name, payload.description.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(created))
}

#[put("/api/v1/catalog/types/{id}")]
pub async fn update_type(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    payload: web::Json<CatalogEntryPayload>,
) -> Result<HttpResponse, ModerationError> {
    let updated = state
        .catalog
        .update_type(id.into_inner(), &payload.name, payload.description.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/api/v1/catalog/types/{id}")]
pub async fn delete_type(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ModerationError> {
    state.catalog.delete_type(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/api/v1/catalog/reasons")]
pub async fn list_reasons(
    state: web::Data<AppState>,
    query: web::Query<ListReasonsQuery>,
) -> Result<HttpResponse, ModerationError> {
    Ok(HttpResponse::Ok().json(state.catalog.list_reasons(query.report_type_id).await?))
}

#[post("/api/v1/catalog/reasons")]
pub async fn create_reason(
    state: web::Data<AppState>,
    payload: web::Json<ReasonPayload>,
) -> Result<HttpResponse, ModerationError> {
    let created = state
        .catalog
        .create_reason(
            payload.report_type_id,
            &payload.name,
            payload.description.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Created().json(created))
}

#[put("/api/v1/catalog/reasons/{id}")]
pub async fn update_reason(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    payload: web::Json<CatalogEntryPayload>,
) -> Result<HttpResponse, ModerationError> {
    let updated = state
        .catalog
        .update_reason(id.into_inner(), &payload.name, payload.description.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/api/v1/catalog/reasons/{id}")]
pub async fn delete_reason(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ModerationError> {
    state.catalog.delete_reason(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/api/v1/catalog/statuses")]
pub async fn list_statuses(state: web::Data<AppState>) -> Result<HttpResponse, ModerationError> {
    Ok(HttpResponse::Ok().json(state.catalog.list_statuses().await?))
}

#[post("/api/v1/catalog/statuses")]
pub async fn create_status(
    state: web::Data<AppState>,
    payload: web::Json<CatalogEntryPayload>,
) -> Result<HttpResponse, ModerationError> {
    let created = state
        .catalog
        .create_status(&payload.name, payload.description.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(created))
}

#[put("/api/v1/catalog/statuses/{id}")]
pub async fn update_status(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    payload: web::Json<CatalogEntryPayload>,
) -> Result<HttpResponse, ModerationError> {
    let updated = state
        .catalog
        .update_status(id.into_inner(), &payload.name, payload.description.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/api/v1/catalog/statuses/{id}")]
pub async fn delete_status(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ModerationError> {
    state.catalog.delete_status(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/api/v1/catalog/action-types")]
pub async fn list_action_types(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ModerationError> {
    Ok(HttpResponse::Ok().json(state.catalog.list_action_types().await?))
}

#[post("/api/v1/catalog/action-types")]
pub async fn create_action_type(
    state: web::Data<AppState>,
    payload: web::Json<CatalogEntryPayload>,
) -> Result<HttpResponse, ModerationError> {
    let created = state
        .catalog
        .create_action_type(&payload.name, payload.description.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(created))
}

#[put("/api/v1/catalog/action-types/{id}")]
pub async fn update_action_type(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    payload: web::Json<CatalogEntryPayload>,
) -> Result<HttpResponse, ModerationError> {
    let updated = state
        .catalog
        .update_action_type(id.into_inner(), &payload.name, payload.description.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/api/v1/catalog/action-types/{id}")]
pub async fn delete_action_type(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ModerationError> {
    state.catalog.delete_action_type(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

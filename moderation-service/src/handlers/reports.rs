use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::ModerationError;
use crate::handlers::{page_params, AppState};
use crate::metrics;
use crate::models::CreateReportInput;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportPayload {
    pub report_type_id: Uuid,
    pub target_id: Uuid,
    pub reporter_id: Uuid,
    pub report_reason_id: Uuid,
    #[validate(length(max = 2000))]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[post("/api/v1/reports")]
pub async fn create_report(
    state: web::Data<AppState>,
    payload: web::Json<CreateReportPayload>,
) -> Result<HttpResponse, ModerationError> {
    payload.validate()?;

    let report = state
        .reports
        .create_report(CreateReportInput {
            report_type_id: payload.report_type_id,
            target_id: payload.target_id,
            reporter_id: payload.reporter_id,
            report_reason_id: payload.report_reason_id,
            details: payload.details.clone(),
        })
        .await?;

    metrics::REPORTS_CREATED_TOTAL.inc();
    Ok(HttpResponse::Created().json(report))
}

#[get("/api/v1/reports")]
pub async fn list_reports(
    state: web::Data<AppState>,
    query: web::Query<ListReportsQuery>,
) -> Result<HttpResponse, ModerationError> {
    let (page, size) = page_params(query.page, query.size);
    let summaries = state
        .queries
        .list(query.status.as_deref(), page, size)
        .await?;
    Ok(HttpResponse::Ok().json(summaries))
}

#[get("/api/v1/reports/{report_id}")]
pub async fn get_report(
    state: web::Data<AppState>,
    report_id: web::Path<Uuid>,
) -> Result<HttpResponse, ModerationError> {
    let summary = state.queries.get(report_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[get("/api/v1/reports/{report_id}/actions")]
pub async fn list_report_actions(
    state: web::Data<AppState>,
    report_id: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ModerationError> {
    let (page, size) = page_params(query.page, query.size);
    let actions = state
        .log
        .list_by_report(report_id.into_inner(), page, size)
        .await?;
    Ok(HttpResponse::Ok().json(actions))
}

//! Read-side projection of reports for moderator listings.
//!
//! Purely a projection of report and catalog data; ban state is never
//! consulted here.

use crate::error::Result;
use crate::models::{Page, Report, ReportSummary};
use crate::store::{CatalogStore, ReportStore};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct ReportQueryService {
    reports: Arc<dyn ReportStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl ReportQueryService {
    pub fn new(reports: Arc<dyn ReportStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { reports, catalog }
    }

    pub async fn get(&self, id: Uuid) -> Result<ReportSummary> {
        let report = self.reports.get_by_id(id).await?;
        let mut summaries = self.summarize(vec![report]).await?;
        Ok(summaries.remove(0))
    }

    pub async fn list(
        &self,
        status_name: Option<&str>,
        page: i64,
        size: i64,
    ) -> Result<Page<ReportSummary>> {
        let reports = match status_name {
            Some(status) => self.reports.list_by_status(status, page, size).await?,
            None => self.reports.list_all(page, size).await?,
        };

        let Page {
            content,
            total_elements,
            total_pages,
            page,
            size,
        } = reports;
        let content = self.summarize(content).await?;
        Ok(Page {
            content,
            total_elements,
            total_pages,
            page,
            size,
        })
    }

    async fn summarize(&self, reports: Vec<Report>) -> Result<Vec<ReportSummary>> {
        let (types, statuses) = futures::future::try_join(
            self.catalog.list_types(),
            self.catalog.list_statuses(),
        )
        .await?;
        let type_names: HashMap<Uuid, String> =
            types.into_iter().map(|t| (t.id, t.name)).collect();
        let status_names: HashMap<Uuid, String> =
            statuses.into_iter().map(|s| (s.id, s.name)).collect();

        let mut reason_names: HashMap<Uuid, String> = HashMap::new();
        for report in &reports {
            if !reason_names.contains_key(&report.report_reason_id) {
                let reason = self.catalog.get_reason(report.report_reason_id).await?;
                reason_names.insert(reason.id, reason.name);
            }
        }

        let resolve = |names: &HashMap<Uuid, String>, id: &Uuid| {
            names.get(id).cloned().unwrap_or_else(|| id.to_string())
        };

        Ok(reports
            .into_iter()
            .map(|report| ReportSummary {
                id: report.id,
                report_type: resolve(&type_names, &report.report_type_id),
                reason: resolve(&reason_names, &report.report_reason_id),
                status: resolve(&status_names, &report.status_id),
                target_id: report.target_id,
                reporter_id: report.reporter_id,
                details: report.details,
                status_version: report.status_version,
                created_at: report.created_at,
                updated_at: report.updated_at,
            })
            .collect())
    }
}

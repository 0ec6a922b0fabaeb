pub mod actions;
pub mod bans;
pub mod catalog;
pub mod health;
pub mod reports;

use crate::services::{ModerationCoordinator, ReportQueryService};
use crate::store::{BanStore, CatalogStore, ModerationLog, ReportStore};
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ModerationCoordinator>,
    pub queries: Arc<ReportQueryService>,
    pub catalog: Arc<dyn CatalogStore>,
    pub reports: Arc<dyn ReportStore>,
    pub bans: Arc<dyn BanStore>,
    pub log: Arc<dyn ModerationLog>,
}

/// Listing defaults shared by the paged endpoints
pub(crate) const DEFAULT_PAGE_SIZE: i64 = 20;
pub(crate) const MAX_PAGE_SIZE: i64 = 100;

pub(crate) fn page_params(page: Option<i64>, size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(0).max(0);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, size)
}

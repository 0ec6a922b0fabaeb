use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Maximum length of a report's free-text details
pub const MAX_DETAILS_LEN: usize = 2000;

/// Report record. `status_version` is the optimistic-concurrency counter,
/// advanced only by `compare_and_set_status`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub report_type_id: Uuid,
    pub target_id: Uuid,
    pub reporter_id: Uuid,
    pub report_reason_id: Uuid,
    pub status_id: Uuid,
    pub details: Option<String>,
    pub status_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateReportInput {
    pub report_type_id: Uuid,
    pub target_id: Uuid,
    pub reporter_id: Uuid,
    pub report_reason_id: Uuid,
    pub details: Option<String>,
}

/// 0-indexed page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub page: i64,
    pub size: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: i64, page: i64, size: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Self {
            content,
            total_elements,
            total_pages,
            page,
            size,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page: self.page,
            size: self.size,
        }
    }
}

/// Moderator-facing projection of a report, with catalog names resolved
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub id: Uuid,
    pub report_type: String,
    pub reason: String,
    pub status: String,
    pub target_id: Uuid,
    pub reporter_id: Uuid,
    pub details: Option<String>,
    pub status_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_math_matches_ceil() {
        let page = Page::new(vec![0u8; 10], 23, 0, 10);
        assert_eq!(page.total_elements, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.content.len(), 10);

        let exact = Page::<u8>::new(vec![], 20, 1, 10);
        assert_eq!(exact.total_pages, 2);

        let empty = Page::<u8>::new(vec![], 0, 0, 10);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn page_map_preserves_totals() {
        let page = Page::new(vec![1, 2, 3], 3, 0, 10).map(|n| n * 2);
        assert_eq!(page.content, vec![2, 4, 6]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 1);
    }
}

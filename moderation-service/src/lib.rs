pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{ModerationError, Result};
pub use services::{ModerationCoordinator, ReportQueryService};
pub use store::{BanStore, CatalogStore, ModerationLog, ReportStore};

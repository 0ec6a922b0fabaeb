pub mod coordinator;
pub mod queries;
pub mod reaper;

pub use coordinator::ModerationCoordinator;
pub use queries::ReportQueryService;
pub use reaper::spawn_ban_reaper;

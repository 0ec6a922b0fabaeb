/// Prometheus metrics for the moderation workflow
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_int_counter, CounterVec, Encoder, IntCounter, TextEncoder,
};

lazy_static! {
    /// Total moderation actions submitted (labels: action_type)
    pub static ref ACTIONS_SUBMITTED_TOTAL: CounterVec = register_counter_vec!(
        "moderation_actions_submitted_total",
        "Total number of moderation actions submitted",
        &["action_type"]
    )
    .unwrap();

    /// Total user bans applied or overwritten
    pub static ref BANS_APPLIED_TOTAL: IntCounter = register_int_counter!(
        "moderation_bans_applied_total",
        "Total number of user bans applied"
    )
    .unwrap();

    /// Status updates rejected by the optimistic version guard
    pub static ref STATUS_CONFLICTS_TOTAL: IntCounter = register_int_counter!(
        "moderation_status_conflicts_total",
        "Total number of report status updates lost to a version race"
    )
    .unwrap();

    /// Audit appends that failed after all retries
    pub static ref AUDIT_APPEND_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "moderation_audit_append_failures_total",
        "Total number of audit log appends that failed after retries"
    )
    .unwrap();

    /// Total reports created through the API
    pub static ref REPORTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "moderation_reports_created_total",
        "Total number of reports created"
    )
    .unwrap();
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %err, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

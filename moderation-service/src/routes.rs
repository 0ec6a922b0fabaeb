use actix_web::web;

use crate::handlers::{actions, bans, catalog, health, reports};

/// Register every route on the application
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(health::metrics_endpoint)
        // Reports
        .service(reports::create_report)
        .service(reports::list_reports)
        .service(reports::get_report)
        .service(reports::list_report_actions)
        // Moderation actions
        .service(actions::submit_action)
        .service(actions::list_actions)
        // Bans
        .service(bans::get_ban)
        .service(bans::revoke_ban)
        .service(bans::list_bans_by_moderator)
        // Catalog administration
        .service(catalog::list_types)
        .service(catalog::create_type)
        .service(catalog::update_type)
        .service(catalog::delete_type)
        .service(catalog::list_reasons)
        .service(catalog::create_reason)
        .service(catalog::update_reason)
        .service(catalog::delete_reason)
        .service(catalog::list_statuses)
        .service(catalog::create_status)
        .service(catalog::update_status)
        .service(catalog::delete_status)
        .service(catalog::list_action_types)
        .service(catalog::create_action_type)
        .service(catalog::update_action_type)
        .service(catalog::delete_action_type);
}

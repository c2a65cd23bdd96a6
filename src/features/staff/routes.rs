use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::staff::handlers;
use crate::features::staff::services::StaffService;

/// Create routes for the staff directory
///
/// Every route requires a staff principal.
pub fn routes(service: Arc<StaffService>) -> Router {
    Router::new()
        .route(
            "/api/complaints/staff/",
            get(handlers::list_staff).post(handlers::create_staff),
        )
        .route(
            "/api/complaints/staff/{id}/",
            get(handlers::get_staff)
                .put(handlers::update_staff)
                .delete(handlers::delete_staff),
        )
        .with_state(service)
}

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::feedback::handlers;
use crate::features::feedback::services::FeedbackService;

/// Create routes for complaint feedback (public)
pub fn routes(service: Arc<FeedbackService>) -> Router {
    Router::new()
        .route(
            "/api/complaints/feedback/",
            get(handlers::list_feedback).post(handlers::create_feedback),
        )
        .route("/api/complaints/submit/", post(handlers::submit_feedback))
        .with_state(service)
}

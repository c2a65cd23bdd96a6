use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireStaff;
use crate::shared::types::ApiResponse;

/// Profile of the signed-in staff member
///
/// Also returns the caller's API token, creating one if needed.
#[utoipa::path(
    get,
    path = "/api/admin/profile/",
    responses(
        (status = 200, description = "Admin profile", body = ApiResponse<AdminProfileDto>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized")
    ),
    tag = "admin",
    security(
        ("token_auth" = [])
    )
)]
pub async fn get_profile(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<AdminProfileDto>>> {
    let profile = service.profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Complaint, staff and feedback totals
#[utoipa::path(
    get,
    path = "/api/admin/summary/",
    responses(
        (status = 200, description = "Dashboard totals", body = ApiResponse<AdminSummaryDto>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized")
    ),
    tag = "admin",
    security(
        ("token_auth" = [])
    )
)]
pub async fn get_summary(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<AdminSummaryDto>>> {
    let summary = service.summary().await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::FormPayload;
use crate::features::auth::guards::RequireStaff;
use crate::features::staff::dtos::{StaffFormDto, StaffResponseDto, AVATAR_FIELD};
use crate::features::staff::services::StaffService;
use crate::shared::types::{ApiResponse, Meta};

/// List staff members with their workload
#[utoipa::path(
    get,
    path = "/api/complaints/staff/",
    responses(
        (status = 200, description = "All staff members", body = ApiResponse<Vec<StaffResponseDto>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized")
    ),
    security(("token_auth" = [])),
    tag = "staff"
)]
pub async fn list_staff(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<StaffService>>,
) -> Result<Json<ApiResponse<Vec<StaffResponseDto>>>> {
    let staff = service.list().await?;
    let total = staff.len() as i64;
    Ok(Json(ApiResponse::success(Some(staff), None, Some(Meta { total }))))
}

/// Add a staff member
#[utoipa::path(
    post,
    path = "/api/complaints/staff/",
    request_body(
        content = StaffFormDto,
        content_type = "multipart/form-data",
        description = "Staff fields with an optional `avatar` image (jpeg/png/gif/webp, max 5 MB)",
    ),
    responses(
        (status = 201, description = "Staff member created", body = ApiResponse<StaffResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized")
    ),
    security(("token_auth" = [])),
    tag = "staff"
)]
pub async fn create_staff(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<StaffService>>,
    mut payload: FormPayload,
) -> Result<(StatusCode, Json<ApiResponse<StaffResponseDto>>)> {
    let avatar = payload.take_file(AVATAR_FIELD);
    let staff = service.create(payload.fields, avatar).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(staff),
            Some("Staff member created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/complaints/staff/{id}/",
    params(("id" = i64, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member found", body = ApiResponse<StaffResponseDto>),
        (status = 404, description = "Staff member not found")
    ),
    security(("token_auth" = [])),
    tag = "staff"
)]
pub async fn get_staff(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<StaffService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<StaffResponseDto>>> {
    let staff = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(staff), None, None)))
}

/// Partially update a staff member, optionally replacing the avatar
#[utoipa::path(
    put,
    path = "/api/complaints/staff/{id}/",
    params(("id" = i64, Path, description = "Staff ID")),
    request_body(content = StaffFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Staff member updated", body = ApiResponse<StaffResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Staff member not found")
    ),
    security(("token_auth" = [])),
    tag = "staff"
)]
pub async fn update_staff(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<StaffService>>,
    Path(id): Path<i64>,
    mut payload: FormPayload,
) -> Result<Json<ApiResponse<StaffResponseDto>>> {
    let avatar = payload.take_file(AVATAR_FIELD);
    let staff = service.update_partial(id, payload.fields, avatar).await?;
    Ok(Json(ApiResponse::success(
        Some(staff),
        Some("Staff member updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/complaints/staff/{id}/",
    params(("id" = i64, Path, description = "Staff ID")),
    responses(
        (status = 204, description = "Staff member deleted"),
        (status = 404, description = "Staff member not found")
    ),
    security(("token_auth" = [])),
    tag = "staff"
)]
pub async fn delete_staff(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<StaffService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

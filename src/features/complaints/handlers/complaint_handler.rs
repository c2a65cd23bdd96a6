use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::FormPayload;
use crate::features::auth::guards::RequireStaff;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::complaints::dtos::{
    ComplaintResponseDto, FileComplaintDto, FiledComplaintDto, NotificationResponseDto,
    UpdateComplaintDto, PHOTO_FIELD,
};
use crate::features::complaints::models::Complaint;
use crate::features::complaints::services::ComplaintService;
use crate::shared::types::{ApiResponse, Meta};

/// File a new complaint
///
/// Accepts `multipart/form-data` (optional `photos` file part) or JSON.
/// Status is always Open on creation; a signed-in caller is recorded as filer.
#[utoipa::path(
    post,
    path = "/api/complaints/file/",
    request_body(
        content = FileComplaintDto,
        content_type = "multipart/form-data",
        description = "Complaint fields with an optional `photos` file part",
    ),
    responses(
        (status = 201, description = "Complaint filed", body = ApiResponse<FiledComplaintDto>),
        (status = 400, description = "Validation or storage error")
    ),
    tag = "complaints"
)]
pub async fn file_complaint(
    principal: Option<AuthenticatedUser>,
    State(service): State<Arc<ComplaintService>>,
    mut payload: FormPayload,
) -> Result<(StatusCode, Json<ApiResponse<FiledComplaintDto>>)> {
    let photo = payload.take_file(PHOTO_FIELD);
    let filed = service
        .file_complaint(payload.fields, photo, principal.map(|p| p.user_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(filed),
            Some("Complaint filed successfully".to_string()),
            None,
        )),
    ))
}

/// List all complaints as a plain array, oldest first
#[utoipa::path(
    get,
    path = "/api/complaints/list/",
    responses(
        (status = 200, description = "All complaints", body = Vec<Complaint>)
    ),
    tag = "complaints"
)]
pub async fn list_complaints(
    State(service): State<Arc<ComplaintService>>,
) -> Result<Json<Vec<Complaint>>> {
    let complaints = service.list_all().await?;
    Ok(Json(complaints))
}

/// List all complaints, most recent incident first
#[utoipa::path(
    get,
    path = "/api/complaints/user/",
    responses(
        (status = 200, description = "Complaints by incident date", body = ApiResponse<Vec<ComplaintResponseDto>>)
    ),
    tag = "complaints"
)]
pub async fn list_user_complaints(
    State(service): State<Arc<ComplaintService>>,
) -> Result<Json<ApiResponse<Vec<ComplaintResponseDto>>>> {
    let complaints = service.list_by_incident_date().await?;
    let total = complaints.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(complaints),
        None,
        Some(Meta { total }),
    )))
}

/// Get a complaint by ID
#[utoipa::path(
    get,
    path = "/api/complaints/{id}/",
    params(
        ("id" = i64, Path, description = "Complaint ID")
    ),
    responses(
        (status = 200, description = "Complaint found", body = ApiResponse<ComplaintResponseDto>),
        (status = 404, description = "Complaint not found")
    ),
    tag = "complaints"
)]
pub async fn get_complaint(
    State(service): State<Arc<ComplaintService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ComplaintResponseDto>>> {
    let complaint = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(complaint), None, None)))
}

/// Partially update a complaint
///
/// Only supplied fields change. Any status may be set.
#[utoipa::path(
    put,
    path = "/api/complaints/{id}/",
    params(
        ("id" = i64, Path, description = "Complaint ID")
    ),
    request_body = UpdateComplaintDto,
    responses(
        (status = 200, description = "Complaint updated", body = ApiResponse<ComplaintResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Complaint not found")
    ),
    security(("token_auth" = [])),
    tag = "complaints"
)]
pub async fn update_complaint(
    RequireStaff(_staff): RequireStaff,
    State(service): State<Arc<ComplaintService>>,
    Path(id): Path<i64>,
    mut payload: FormPayload,
) -> Result<Json<ApiResponse<ComplaintResponseDto>>> {
    let photo = payload.take_file(PHOTO_FIELD);
    let complaint = service.update_partial(id, payload.fields, photo).await?;
    Ok(Json(ApiResponse::success(
        Some(complaint),
        Some("Complaint updated successfully".to_string()),
        None,
    )))
}

/// Status-change notifications of a complaint
#[utoipa::path(
    get,
    path = "/api/complaints/{id}/notifications/",
    params(
        ("id" = i64, Path, description = "Complaint ID")
    ),
    responses(
        (status = 200, description = "Notifications, oldest first", body = ApiResponse<Vec<NotificationResponseDto>>),
        (status = 404, description = "Complaint not found")
    ),
    tag = "complaints"
)]
pub async fn list_notifications(
    State(service): State<Arc<ComplaintService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<NotificationResponseDto>>>> {
    let notifications = service.list_notifications(id).await?;
    Ok(Json(ApiResponse::success(Some(notifications), None, None)))
}

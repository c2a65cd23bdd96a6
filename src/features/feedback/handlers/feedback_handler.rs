use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::feedback::dtos::{
    CreateFeedbackDto, FeedbackQuery, FeedbackResponseDto, SubmitFeedbackDto,
    SubmittedFeedbackDto,
};
use crate::features::feedback::services::FeedbackService;
use crate::shared::types::{ApiResponse, Meta};

/// Leave feedback on an existing complaint
#[utoipa::path(
    post,
    path = "/api/complaints/feedback/",
    request_body = CreateFeedbackDto,
    responses(
        (status = 201, description = "Feedback recorded", body = ApiResponse<FeedbackResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Complaint not found")
    ),
    tag = "feedback"
)]
pub async fn create_feedback(
    State(service): State<Arc<FeedbackService>>,
    AppJson(dto): AppJson<CreateFeedbackDto>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackResponseDto>>)> {
    let dto = dto.normalized();
    dto.validate()?;

    let feedback = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(feedback),
            Some("Feedback submitted successfully".to_string()),
            None,
        )),
    ))
}

/// File a complaint and its feedback in one step
#[utoipa::path(
    post,
    path = "/api/complaints/submit/",
    request_body = SubmitFeedbackDto,
    responses(
        (status = 201, description = "Complaint and feedback created", body = ApiResponse<SubmittedFeedbackDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "feedback"
)]
pub async fn submit_feedback(
    State(service): State<Arc<FeedbackService>>,
    AppJson(dto): AppJson<SubmitFeedbackDto>,
) -> Result<(StatusCode, Json<ApiResponse<SubmittedFeedbackDto>>)> {
    let dto = dto.normalized();
    dto.validate()?;

    let submitted = service.submit(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(submitted),
            Some("Feedback submitted successfully".to_string()),
            None,
        )),
    ))
}

/// List feedback for a complaint
#[utoipa::path(
    get,
    path = "/api/complaints/feedback/",
    params(FeedbackQuery),
    responses(
        (status = 200, description = "Feedback, newest first", body = ApiResponse<Vec<FeedbackResponseDto>>),
        (status = 400, description = "Missing or invalid complaint_id")
    ),
    tag = "feedback"
)]
pub async fn list_feedback(
    State(service): State<Arc<FeedbackService>>,
    Query(query): Query<FeedbackQuery>,
) -> Result<Json<ApiResponse<Vec<FeedbackResponseDto>>>> {
    let complaint_id = parse_complaint_id(query.complaint_id.as_deref())?;

    let feedback = service.list_by_complaint(complaint_id).await?;
    let total = feedback.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(feedback),
        None,
        Some(Meta { total }),
    )))
}

fn parse_complaint_id(raw: Option<&str>) -> Result<i64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("complaint_id parameter is required".to_string()))?;

    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest("complaint_id must be an integer".to_string()))
}

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::complaints::services::insert_complaint;
use crate::features::complaints::validation::{validate_complaint, StatusPolicy};
use crate::features::feedback::dtos::{
    CreateFeedbackDto, FeedbackResponseDto, SubmitFeedbackDto, SubmittedFeedbackDto,
};
use crate::features::feedback::models::Feedback;
use crate::shared::form::rename_field;

/// Feedback attached to complaints
pub struct FeedbackService {
    pool: PgPool,
    /// Directory complaint photo paths are validated against
    complaints_dir: String,
}

impl FeedbackService {
    pub fn new(pool: PgPool, complaints_dir: String) -> Self {
        Self {
            pool,
            complaints_dir,
        }
    }

    async fn insert(conn: &mut PgConnection, dto: &CreateFeedbackDto) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO feedback (
                complaint_id, feedback_message, rating, user_name, user_email,
                category, subcategory
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(dto.complaint_id)
        .bind(&dto.feedback_message)
        .bind(dto.rating)
        .bind(dto.user_name.as_deref().unwrap_or_default())
        .bind(dto.user_email.as_deref().unwrap_or_default())
        .bind(&dto.category)
        .bind(&dto.subcategory)
        .fetch_one(&mut *conn)
        .await
        .map_err(handle_db_error)?;

        Ok(id)
    }

    /// Record feedback for an existing complaint
    pub async fn create(&self, dto: CreateFeedbackDto) -> Result<FeedbackResponseDto> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM complaints WHERE id = $1)")
                .bind(dto.complaint_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Complaint not found".to_string()));
        }

        let mut conn = self.pool.acquire().await?;
        let id = Self::insert(&mut conn, &dto).await?;
        info!("Feedback {} recorded for complaint {}", id, dto.complaint_id);

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: i64) -> Result<FeedbackResponseDto> {
        sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, complaint_id, feedback_message, rating, user_name, user_email,
                   category, subcategory, created_at
            FROM feedback
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Into::into)
        .ok_or_else(|| AppError::NotFound("Feedback not found".to_string()))
    }

    /// File a complaint from the submission and attach the feedback to it
    ///
    /// Both rows are written in one transaction.
    pub async fn submit(&self, dto: SubmitFeedbackDto) -> Result<SubmittedFeedbackDto> {
        let mut fields = Map::new();
        fields.insert("type".into(), Value::String(dto.complaint.clone()));
        fields.insert(
            "description".into(),
            Value::String(dto.feedback_message.clone()),
        );
        fields.insert(
            "date_of_incident".into(),
            Value::String(Utc::now().date_naive().format("%Y-%m-%d").to_string()),
        );

        let complaint = validate_complaint(&fields, StatusPolicy::ForceOpen, &self.complaints_dir)
            .map_err(|errors| {
                let errors = rename_field(errors, "type", "complaint");
                AppError::Validation(rename_field(errors, "description", "feedback_message"))
            })?;

        let mut tx = self.pool.begin().await?;
        let complaint_id = insert_complaint(&mut tx, &complaint, None).await?;
        let feedback_id = Self::insert(&mut tx, &dto.into_feedback(complaint_id)).await?;
        tx.commit().await?;

        info!(
            "Quick submission filed complaint {} with feedback {}",
            complaint_id, feedback_id
        );
        Ok(SubmittedFeedbackDto {
            complaint_id,
            feedback_id,
        })
    }

    /// Feedback for a complaint, newest first
    pub async fn list_by_complaint(&self, complaint_id: i64) -> Result<Vec<FeedbackResponseDto>> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, complaint_id, feedback_message, rating, user_name, user_email,
                   category, subcategory, created_at
            FROM feedback
            WHERE complaint_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(complaint_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedback.into_iter().map(Into::into).collect())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::feedback::models::Feedback;
use crate::shared::form::not_blank;

/// Feedback on an existing complaint
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeedbackDto {
    pub complaint_id: i64,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Issue resolved quickly, thank you")]
    pub feedback_message: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    #[schema(example = 4, minimum = 1, maximum = 5)]
    pub rating: i32,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub user_name: Option<String>,

    #[validate(email(message = "Enter a valid email address."))]
    pub user_email: Option<String>,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub category: Option<String>,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub subcategory: Option<String>,
}

/// Quick submission: files a complaint and attaches the feedback to it
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitFeedbackDto {
    /// Complaint type, e.g. "Cleanliness"
    #[schema(example = "Cleanliness")]
    pub complaint: String,

    #[validate(custom(function = "not_blank"))]
    pub feedback_message: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub user_name: Option<String>,

    #[validate(email(message = "Enter a valid email address."))]
    pub user_email: Option<String>,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub category: Option<String>,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub subcategory: Option<String>,
}

/// Form inputs leave optional fields as empty strings
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateFeedbackDto {
    pub fn normalized(self) -> Self {
        Self {
            user_name: blank_to_none(self.user_name),
            user_email: blank_to_none(self.user_email),
            category: blank_to_none(self.category),
            subcategory: blank_to_none(self.subcategory),
            ..self
        }
    }
}

impl SubmitFeedbackDto {
    pub fn normalized(self) -> Self {
        Self {
            user_name: blank_to_none(self.user_name),
            user_email: blank_to_none(self.user_email),
            category: blank_to_none(self.category),
            subcategory: blank_to_none(self.subcategory),
            ..self
        }
    }

    /// Feedback part of the submission, linked to the new complaint
    pub fn into_feedback(self, complaint_id: i64) -> CreateFeedbackDto {
        CreateFeedbackDto {
            complaint_id,
            feedback_message: self.feedback_message,
            rating: self.rating,
            user_name: self.user_name,
            user_email: self.user_email,
            category: self.category,
            subcategory: self.subcategory,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FeedbackQuery {
    /// Complaint to list feedback for
    pub complaint_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponseDto {
    pub id: i64,
    pub complaint_id: i64,
    pub feedback_message: String,
    pub rating: i32,
    pub user_name: String,
    pub user_email: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackResponseDto {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            complaint_id: f.complaint_id,
            feedback_message: f.feedback_message,
            rating: f.rating,
            user_name: f.user_name,
            user_email: f.user_email,
            category: f.category,
            subcategory: f.subcategory,
            created_at: f.created_at,
        }
    }
}

/// Ids created by a quick submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmittedFeedbackDto {
    pub complaint_id: i64,
    pub feedback_id: i64,
}

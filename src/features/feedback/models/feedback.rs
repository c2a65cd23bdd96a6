use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for complaint feedback
#[derive(Debug, Clone, FromRow)]
pub struct Feedback {
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

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::ComplaintStatus;

/// Why a notification row was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    StatusChange,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::StatusChange => "status_change",
        }
    }
}

/// Database model for complaint notifications
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComplaintNotification {
    pub id: i64,
    pub complaint_id: i64,
    pub status: ComplaintStatus,
    pub notification_type: String,
    pub sent_at: DateTime<Utc>,
}

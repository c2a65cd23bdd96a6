use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::complaints::models::{
    Complaint, ComplaintNotification, ComplaintSeverity, ComplaintStatus,
};
use crate::modules::storage::LocalFileStore;

/// MIME types accepted for complaint photos
pub const ALLOWED_PHOTO_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Maximum complaint photo size (10 MB)
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Multipart form field that carries the complaint photo
pub const PHOTO_FIELD: &str = "photos";

/// Request body for filing a complaint (documentation only)
///
/// The endpoint also accepts `multipart/form-data` with the same text fields
/// and an optional `photos` file part.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct FileComplaintDto {
    #[serde(rename = "type")]
    #[schema(example = "Cleanliness")]
    pub complaint_type: String,
    #[schema(example = "Dirty coach")]
    pub description: String,
    #[schema(example = "2025-01-01")]
    pub date_of_incident: NaiveDate,
    pub location: Option<String>,
    pub train_number: Option<String>,
    pub pnr_number: Option<String>,
    pub severity: Option<ComplaintSeverity>,
    pub staff: Option<String>,
    pub staff_id: Option<i64>,
    /// Relative path of an already stored photo
    pub photos: Option<String>,
}

/// Partial update body (documentation only, every field optional)
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UpdateComplaintDto {
    #[serde(rename = "type")]
    pub complaint_type: Option<String>,
    pub description: Option<String>,
    pub date_of_incident: Option<NaiveDate>,
    pub location: Option<String>,
    pub train_number: Option<String>,
    pub pnr_number: Option<String>,
    pub severity: Option<ComplaintSeverity>,
    pub status: Option<ComplaintStatus>,
    pub staff: Option<String>,
    pub staff_id: Option<i64>,
    pub photos: Option<String>,
}

/// Result of a successful intake
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FiledComplaintDto {
    pub id: i64,
    pub status: ComplaintStatus,
}

/// Complaint as returned to clients, with a resolvable photo URL
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplaintResponseDto {
    pub id: i64,
    #[serde(rename = "type")]
    pub complaint_type: String,
    pub description: String,
    pub location: Option<String>,
    pub train_number: Option<String>,
    pub pnr_number: Option<String>,
    pub severity: ComplaintSeverity,
    pub date_of_incident: NaiveDate,
    pub status: ComplaintStatus,
    pub staff: Option<String>,
    pub staff_id: Option<i64>,
    pub filed_by: Option<i64>,
    pub photos: Option<String>,
    pub photos_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComplaintResponseDto {
    pub fn from_model(c: Complaint, store: &LocalFileStore) -> Self {
        let photos_url = c.photos.as_deref().map(|path| store.public_url(path));
        Self {
            id: c.id,
            complaint_type: c.complaint_type,
            description: c.description,
            location: c.location,
            train_number: c.train_number,
            pnr_number: c.pnr_number,
            severity: c.severity,
            date_of_incident: c.date_of_incident,
            status: c.status,
            staff: c.staff,
            staff_id: c.staff_id,
            filed_by: c.filed_by,
            photos: c.photos,
            photos_url,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponseDto {
    pub id: i64,
    pub complaint_id: i64,
    pub status: ComplaintStatus,
    pub notification_type: String,
    pub sent_at: DateTime<Utc>,
}

impl From<ComplaintNotification> for NotificationResponseDto {
    fn from(n: ComplaintNotification) -> Self {
        Self {
            id: n.id,
            complaint_id: n.complaint_id,
            status: n.status,
            notification_type: n.notification_type,
            sent_at: n.sent_at,
        }
    }
}

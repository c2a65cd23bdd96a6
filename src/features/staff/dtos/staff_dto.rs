use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::staff::models::{StaffStatus, StaffWithStats};
use crate::modules::storage::LocalFileStore;

/// MIME types accepted for staff avatars
pub const ALLOWED_AVATAR_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum avatar size (5 MB)
pub const MAX_AVATAR_SIZE: usize = 5 * 1024 * 1024;

/// Multipart form field that carries the avatar image
pub const AVATAR_FIELD: &str = "avatar";

/// Staff form (documentation only)
///
/// Sent as `multipart/form-data` with an optional `avatar` image, or as JSON.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct StaffFormDto {
    #[schema(example = "Priya Sharma")]
    pub name: String,
    #[schema(example = "priya.sharma@railmadad.in")]
    pub email: String,
    #[schema(example = "9876543210")]
    pub phone: String,
    #[schema(example = "Inspector")]
    pub role: String,
    #[schema(example = "Cleanliness")]
    pub department: String,
    pub location: Option<String>,
    pub status: Option<StaffStatus>,
    /// JSON-encoded list, e.g. `["Catering"]`
    pub expertise: Option<String>,
    /// JSON-encoded list, e.g. `["Hindi","English"]`
    pub languages: Option<String>,
}

/// Staff member as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffResponseDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub department: String,
    pub location: Option<String>,
    pub status: StaffStatus,
    pub avatar: Option<String>,
    pub avatar_url: Option<String>,
    pub expertise: Option<String>,
    pub languages: Option<String>,
    pub active_complaints: i64,
    pub resolved_complaints: i64,
    pub created_at: DateTime<Utc>,
}

impl StaffResponseDto {
    pub fn from_model(row: StaffWithStats, store: &LocalFileStore) -> Self {
        let s = row.staff;
        Self {
            id: s.id,
            avatar_url: s.avatar.as_deref().map(|path| store.public_url(path)),
            name: s.name,
            email: s.email,
            phone: s.phone,
            role: s.role,
            department: s.department,
            location: s.location,
            status: s.status,
            avatar: s.avatar,
            expertise: s.expertise,
            languages: s.languages,
            active_complaints: row.active_complaints,
            resolved_complaints: row.resolved_complaints,
            created_at: s.created_at,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::auth::model::User;
use crate::features::complaints::models::{ComplaintSeverity, ComplaintStatus};

/// Display name used when a staff account has no first or last name
pub const DEFAULT_ADMIN_NAME: &str = "Admin User";

// =============================================================================
// PROFILE DTOs
// =============================================================================

/// Signed-in staff member and their API token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminProfileDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub gender: String,
    pub address: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub token: String,
}

impl AdminProfileDto {
    pub fn new(user: User, token: String) -> Self {
        Self {
            full_name: user
                .full_name()
                .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string()),
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            gender: user.gender,
            address: user.address,
            is_staff: user.is_staff,
            created_at: user.created_at,
            token,
        }
    }
}

// =============================================================================
// SUMMARY DTOs
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCountsDto {
    pub open: i64,
    pub in_progress: i64,
    pub closed: i64,
}

impl StatusCountsDto {
    pub fn from_rows(rows: &[(ComplaintStatus, i64)]) -> Self {
        rows.iter()
            .fold(Self::default(), |mut counts, (status, count)| {
                match status {
                    ComplaintStatus::Open => counts.open += count,
                    ComplaintStatus::InProgress => counts.in_progress += count,
                    ComplaintStatus::Closed => counts.closed += count,
                }
                counts
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeverityCountsDto {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

impl SeverityCountsDto {
    pub fn from_rows(rows: &[(ComplaintSeverity, i64)]) -> Self {
        rows.iter()
            .fold(Self::default(), |mut counts, (severity, count)| {
                match severity {
                    ComplaintSeverity::Low => counts.low += count,
                    ComplaintSeverity::Medium => counts.medium += count,
                    ComplaintSeverity::High => counts.high += count,
                }
                counts
            })
    }
}

/// Dashboard totals for the admin panel
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminSummaryDto {
    pub total_complaints: i64,
    pub by_status: StatusCountsDto,
    pub by_severity: SeverityCountsDto,
    pub total_staff: i64,
    pub active_staff: i64,
    pub total_feedback: i64,
    /// Mean feedback rating, absent when there is no feedback
    pub average_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: 1,
            username: "admin".into(),
            email: "admin@railmadad.in".into(),
            first_name: first.into(),
            last_name: last.into(),
            phone_number: String::new(),
            gender: String::new(),
            address: String::new(),
            password_hash: "x".into(),
            is_staff: true,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name_falls_back() {
        let profile = AdminProfileDto::new(user("", ""), "tok".into());
        assert_eq!(profile.full_name, DEFAULT_ADMIN_NAME);
        assert_eq!(profile.token, "tok");

        let profile = AdminProfileDto::new(user("Asha", "Rao"), "tok".into());
        assert_eq!(profile.full_name, "Asha Rao");
    }

    #[test]
    fn test_counts_from_grouped_rows() {
        let by_status = StatusCountsDto::from_rows(&[
            (ComplaintStatus::Open, 4),
            (ComplaintStatus::Closed, 2),
        ]);
        assert_eq!(
            by_status,
            StatusCountsDto {
                open: 4,
                in_progress: 0,
                closed: 2
            }
        );

        let by_severity = SeverityCountsDto::from_rows(&[(ComplaintSeverity::High, 1)]);
        assert_eq!(by_severity.high, 1);
        assert_eq!(by_severity.medium, 0);
    }
}

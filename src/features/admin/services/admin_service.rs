use sqlx::PgPool;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::admin::dtos::*;
use crate::features::auth::AuthService;
use crate::features::complaints::models::{ComplaintSeverity, ComplaintStatus};

/// Service for the admin panel
pub struct AdminService {
    pool: PgPool,
    auth: Arc<AuthService>,
}

impl AdminService {
    pub fn new(pool: PgPool, auth: Arc<AuthService>) -> Self {
        Self { pool, auth }
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    /// Profile of the signed-in staff member, with their token
    pub async fn profile(&self, user_id: i64) -> Result<AdminProfileDto> {
        let user = self.auth.get_user(user_id).await?;
        let token = self.auth.get_or_create_token(user.id).await?;
        Ok(AdminProfileDto::new(user, token))
    }

    // =========================================================================
    // SUMMARY
    // =========================================================================

    pub async fn summary(&self) -> Result<AdminSummaryDto> {
        let by_status: Vec<(ComplaintStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM complaints GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let by_severity: Vec<(ComplaintSeverity, i64)> =
            sqlx::query_as("SELECT severity, COUNT(*) FROM complaints GROUP BY severity")
                .fetch_all(&self.pool)
                .await?;

        let (total_staff, active_staff): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'active')
            FROM staff
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let (total_feedback, average_rating): (i64, Option<f64>) =
            sqlx::query_as("SELECT COUNT(*), AVG(rating)::FLOAT8 FROM feedback")
                .fetch_one(&self.pool)
                .await?;

        let by_status = StatusCountsDto::from_rows(&by_status);
        Ok(AdminSummaryDto {
            total_complaints: by_status.open + by_status.in_progress + by_status.closed,
            by_status,
            by_severity: SeverityCountsDto::from_rows(&by_severity),
            total_staff,
            active_staff,
            total_feedback,
            average_rating,
        })
    }
}

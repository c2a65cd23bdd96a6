use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require a staff principal)
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/api/admin/profile/", get(handlers::get_profile))
        .route("/api/admin/summary/", get(handlers::get_summary))
        .with_state(admin_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::AuthService;
    use crate::shared::test_helpers::{
        insert_staff_user, lazy_pool, with_passenger_auth, with_staff_auth,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;
    use sqlx::PgPool;

    fn admin_router() -> Router {
        router_on(lazy_pool())
    }

    fn router_on(pool: PgPool) -> Router {
        let auth = Arc::new(AuthService::new(pool.clone()));
        routes(Arc::new(AdminService::new(pool, auth)))
    }

    #[tokio::test]
    async fn test_profile_rejects_anonymous_and_passengers() {
        let server = TestServer::new(admin_router()).unwrap();
        server
            .get("/api/admin/profile/")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let server = TestServer::new(with_passenger_auth(admin_router())).unwrap();
        server
            .get("/api/admin/profile/")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .get("/api/admin/summary/")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_summary_counts(pool: PgPool) {
        insert_staff_user(&pool).await;
        sqlx::query(
            r#"
            INSERT INTO complaints ("type", description, date_of_incident, status, severity)
            VALUES ('Cleanliness', 'Dirty coach', '2025-01-01', 'Open', 'High'),
                   ('Catering', 'Cold food', '2025-01-02', 'Closed', 'Medium'),
                   ('Security', 'Unattended bag', '2025-01-03', 'In Progress', 'High')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            r#"
            INSERT INTO staff (name, email, phone, role, department, status)
            VALUES ('Priya Sharma', 'priya@railmadad.in', '9876543210', 'Inspector', 'Cleanliness', 'active'),
                   ('Arjun Rao', 'arjun@railmadad.in', '9876500000', 'Guard', 'Security', 'on-leave')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            r#"
            INSERT INTO feedback (complaint_id, feedback_message, rating)
            SELECT id, 'Thanks', rating
            FROM complaints, (VALUES (2), (5)) AS r(rating)
            WHERE "type" = 'Catering'
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let server = TestServer::new(with_staff_auth(router_on(pool))).unwrap();
        let response = server.get("/api/admin/summary/").await;
        response.assert_status_ok();

        let body: Value = response.json();
        let summary = &body["data"];
        assert_eq!(summary["total_complaints"], 3);
        assert_eq!(summary["by_status"]["open"], 1);
        assert_eq!(summary["by_status"]["in_progress"], 1);
        assert_eq!(summary["by_status"]["closed"], 1);
        assert_eq!(summary["by_severity"]["high"], 2);
        assert_eq!(summary["by_severity"]["low"], 0);
        assert_eq!(summary["total_staff"], 2);
        assert_eq!(summary["active_staff"], 1);
        assert_eq!(summary["total_feedback"], 2);
        assert_eq!(summary["average_rating"], 3.5);
    }
}

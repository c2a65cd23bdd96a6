use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::complaints::handlers;
use crate::features::complaints::services::ComplaintService;

/// Create routes for the complaints feature
///
/// Intake and reads are public; updates require a staff principal.
pub fn routes(service: Arc<ComplaintService>) -> Router {
    Router::new()
        .route("/api/complaints/file/", post(handlers::file_complaint))
        .route("/api/complaints/list/", get(handlers::list_complaints))
        .route("/api/complaints/user/", get(handlers::list_user_complaints))
        .route(
            "/api/complaints/{id}/",
            get(handlers::get_complaint).put(handlers::update_complaint),
        )
        .route(
            "/api/complaints/{id}/notifications/",
            get(handlers::list_notifications),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        insert_staff_user, lazy_pool, staged_file_count, temp_store, with_passenger_auth,
        with_staff_auth,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use sqlx::PgPool;

    fn test_server(wrap: fn(Router) -> Router) -> (tempfile::TempDir, TestServer) {
        server_on(lazy_pool(), wrap)
    }

    fn server_on(pool: PgPool, wrap: fn(Router) -> Router) -> (tempfile::TempDir, TestServer) {
        let (dir, store) = temp_store();
        let service = Arc::new(ComplaintService::new(pool, store));
        let server = TestServer::new(wrap(routes(service))).unwrap();
        (dir, server)
    }

    async fn file(server: &TestServer, body: Value) -> i64 {
        let response = server.post("/api/complaints/file/").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"]["id"].as_i64().unwrap()
    }

    fn anonymous(router: Router) -> Router {
        router
    }

    #[tokio::test]
    async fn test_blank_type_is_rejected_by_field() {
        let (_dir, server) = test_server(anonymous);

        let response = server
            .post("/api/complaints/file/")
            .json(&json!({
                "type": "",
                "description": "Dirty coach",
                "date_of_incident": "2025-01-01"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["field_errors"]["type"][0], "This field may not be blank.");
        assert!(body["field_errors"].get("description").is_none());
    }

    #[tokio::test]
    async fn test_rejected_upload_leaves_no_staged_file() {
        let (dir, server) = test_server(anonymous);

        let form = MultipartForm::new()
            .add_text("type", "Cleanliness")
            .add_text("description", "   ")
            .add_text("date_of_incident", "2025-01-01")
            .add_part(
                "photos",
                Part::bytes(b"\xff\xd8\xff\xe0jpeg".to_vec())
                    .file_name("coach.jpg")
                    .mime_type("image/jpeg"),
            );

        let response = server.post("/api/complaints/file/").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["field_errors"]["description"].is_array());
        assert_eq!(staged_file_count(&dir), 0);
        assert!(!dir.path().join("complaints").exists());
    }

    #[tokio::test]
    async fn test_photo_of_wrong_type_is_rejected() {
        let (dir, server) = test_server(anonymous);

        let form = MultipartForm::new()
            .add_text("type", "Cleanliness")
            .add_text("description", "Dirty coach")
            .add_text("date_of_incident", "2025-01-01")
            .add_part(
                "photos",
                Part::bytes(b"#!/bin/sh".to_vec())
                    .file_name("run.sh")
                    .mime_type("text/x-shellscript"),
            );

        let response = server.post("/api/complaints/file/").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["field_errors"]["photos"].is_array());
        assert_eq!(staged_file_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_photos_object_is_not_a_path() {
        let (_dir, server) = test_server(anonymous);

        let response = server
            .post("/api/complaints/file/")
            .json(&json!({
                "type": "Cleanliness",
                "description": "Dirty coach",
                "date_of_incident": "2025-01-01",
                "photos": {"name": "coach.jpg"}
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["field_errors"]["photos"][0],
            "Photos must be a valid file path"
        );
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let (_dir, server) = test_server(anonymous);

        let response = server
            .post("/api/complaints/file/")
            .text("type=Cleanliness")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_requires_staff() {
        let (_dir, server) = test_server(anonymous);
        server
            .put("/api/complaints/1/")
            .json(&json!({"status": "Closed"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let (_dir, server) = test_server(with_passenger_auth);
        server
            .put("/api/complaints/1/")
            .json(&json!({"status": "Closed"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_rejected_photo_reported_with_other_fields() {
        let (dir, server) = test_server(anonymous);

        let form = MultipartForm::new()
            .add_text("type", "")
            .add_text("description", "")
            .add_text("date_of_incident", "2025-01-01")
            .add_part(
                "photos",
                Part::bytes(b"notes".to_vec())
                    .file_name("notes.txt")
                    .mime_type("text/plain"),
            );

        let response = server.post("/api/complaints/file/").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["field_errors"]["type"].is_array());
        assert!(body["field_errors"]["description"].is_array());
        assert!(body["field_errors"]["photos"][0]
            .as_str()
            .unwrap()
            .starts_with("File type 'text/plain'"));
        assert_eq!(staged_file_count(&dir), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_filed_complaint_is_open_with_defaults(pool: PgPool) {
        let (_dir, server) = server_on(pool.clone(), anonymous);

        let response = server
            .post("/api/complaints/file/")
            .json(&json!({
                "type": "Cleanliness",
                "description": "Dirty coach",
                "date_of_incident": "2025-01-01"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Complaint filed successfully");
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, severity, photos): (String, String, Option<String>) = sqlx::query_as(
            "SELECT status::TEXT, severity::TEXT, photos FROM complaints WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(status, "Open");
        assert_eq!(severity, "Medium");
        assert_eq!(photos, None);

        let fetched: Value = server.get(&format!("/api/complaints/{}/", id)).await.json();
        assert_eq!(fetched["data"]["type"], "Cleanliness");
        assert_eq!(fetched["data"]["description"], "Dirty coach");
        assert_eq!(fetched["data"]["date_of_incident"], "2025-01-01");
        assert_eq!(fetched["data"]["photos_url"], Value::Null);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_intake_ignores_requested_status(pool: PgPool) {
        let (_dir, server) = server_on(pool.clone(), anonymous);

        let id = file(
            &server,
            json!({
                "type": "Catering",
                "description": "Cold food",
                "date_of_incident": "2025-02-10",
                "status": "Closed",
                "severity": "High"
            }),
        )
        .await;

        let (status, severity): (String, String) =
            sqlx::query_as("SELECT status::TEXT, severity::TEXT FROM complaints WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "Open");
        assert_eq!(severity, "High");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_uploaded_photo_is_stored_under_complaints(pool: PgPool) {
        let (dir, server) = server_on(pool.clone(), anonymous);

        let form = MultipartForm::new()
            .add_text("type", "Cleanliness")
            .add_text("description", "Dirty coach")
            .add_text("date_of_incident", "2025-01-01")
            .add_text("photos", "complaints/ignored.jpg")
            .add_part(
                "photos",
                Part::bytes(b"\xff\xd8\xff\xe0jpeg".to_vec())
                    .file_name("coach b3.jpg")
                    .mime_type("image/jpeg"),
            );

        let response = server.post("/api/complaints/file/").multipart(form).await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

        let photos: Option<String> =
            sqlx::query_scalar("SELECT photos FROM complaints WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        let photos = photos.unwrap();
        assert!(photos.starts_with(&format!("complaints/{}_", id)));
        assert!(photos.ends_with("_coach_b3.jpg"));
        assert!(!photos.contains('\\'));
        assert!(dir.path().join(&photos).is_file());
        assert_eq!(staged_file_count(&dir), 0);

        let fetched: Value = server.get(&format!("/api/complaints/{}/", id)).await.json();
        assert!(fetched["data"]["photos_url"]
            .as_str()
            .unwrap()
            .ends_with(&photos));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_status_only_update_keeps_other_fields(pool: PgPool) {
        insert_staff_user(&pool).await;
        let (_dir, server) = server_on(pool.clone(), with_staff_auth);

        let id = file(
            &server,
            json!({
                "type": "Security",
                "description": "Unattended bag",
                "date_of_incident": "2025-03-05",
                "train_number": "12951",
                "location": "Coach S4"
            }),
        )
        .await;
        let before: Value = server.get(&format!("/api/complaints/{}/", id)).await.json();

        let response = server
            .put(&format!("/api/complaints/{}/", id))
            .json(&json!({"status": "In Progress"}))
            .await;
        response.assert_status_ok();

        let after: Value = server.get(&format!("/api/complaints/{}/", id)).await.json();
        assert_eq!(after["data"]["status"], "In Progress");
        for field in [
            "type",
            "description",
            "date_of_incident",
            "train_number",
            "location",
            "severity",
            "photos",
            "created_at",
        ] {
            assert_eq!(after["data"][field], before["data"][field], "{} changed", field);
        }

        let notifications: Value = server
            .get(&format!("/api/complaints/{}/notifications/", id))
            .await
            .json();
        let notifications = notifications["data"].as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["status"], "In Progress");
        assert_eq!(notifications[0]["notification_type"], "status_change");

        // Same status again writes no notification
        server
            .put(&format!("/api/complaints/{}/", id))
            .json(&json!({"status": "In Progress"}))
            .await
            .assert_status_ok();
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM complaint_notifications WHERE complaint_id = $1",
        )
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_reports_photo_with_field_errors(pool: PgPool) {
        insert_staff_user(&pool).await;
        let (dir, server) = server_on(pool.clone(), with_staff_auth);
        let id = file(
            &server,
            json!({
                "type": "Cleanliness",
                "description": "Dirty coach",
                "date_of_incident": "2025-01-01"
            }),
        )
        .await;

        let form = MultipartForm::new()
            .add_text("description", "  ")
            .add_part(
                "photos",
                Part::bytes(vec![0u8; 16])
                    .file_name("notes.txt")
                    .mime_type("text/plain"),
            );
        let response = server
            .put(&format!("/api/complaints/{}/", id))
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["field_errors"]["description"].is_array());
        assert!(body["field_errors"]["photos"].is_array());
        assert_eq!(staged_file_count(&dir), 0);

        let description: String =
            sqlx::query_scalar("SELECT description FROM complaints WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(description, "Dirty coach");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unknown_complaint_is_not_found(pool: PgPool) {
        let (_dir, server) = server_on(pool, with_staff_auth);

        let response = server.get("/api/complaints/999/").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], "Complaint not found");

        server
            .put("/api/complaints/999/")
            .json(&json!({"status": "Closed"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/api/complaints/999/notifications/")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_and_user_orderings(pool: PgPool) {
        let (_dir, server) = server_on(pool, anonymous);

        let mut ids = Vec::new();
        for date in ["2025-01-01", "2025-03-01", "2025-02-01"] {
            let id = file(
                &server,
                json!({
                    "type": "Punctuality",
                    "description": format!("Late on {}", date),
                    "date_of_incident": date
                }),
            )
            .await;
            ids.push(id);
        }

        let listed: Value = server.get("/api/complaints/list/").await.json();
        let listed_ids: Vec<i64> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(listed_ids, ids);

        let by_date: Value = server.get("/api/complaints/user/").await.json();
        assert_eq!(by_date["meta"]["total"], 3);
        let dates: Vec<&str> = by_date["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["date_of_incident"].as_str().unwrap())
            .collect();
        assert_eq!(dates, ["2025-03-01", "2025-02-01", "2025-01-01"]);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_rejected() {
        let (_dir, server) = test_server(anonymous);
        server
            .get("/api/complaints/abc/")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

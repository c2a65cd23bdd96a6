use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{handle_db_error, AppError, Result};
use crate::core::extractor::UploadedFile;
use crate::features::complaints::dtos::{
    ComplaintResponseDto, FiledComplaintDto, NotificationResponseDto, ALLOWED_PHOTO_MIME_TYPES,
    MAX_PHOTO_SIZE, PHOTO_FIELD,
};
use crate::features::complaints::models::{
    Complaint, ComplaintNotification, ComplaintStatus, NotificationType,
};
use crate::features::complaints::validation::{
    validate_complaint, StatusPolicy, ValidatedComplaint,
};
use crate::modules::storage::{record_file_name, LocalFileStore, StagedFile};
use crate::shared::types::FieldErrors;
use crate::shared::validation::{check_upload, with_upload_errors};

pub(crate) const COMPLAINT_COLUMNS: &str = r#"
    id, "type", description, location, train_number, pnr_number, severity,
    date_of_incident, status, staff, staff_id, filed_by, photos, created_at, updated_at
"#;

/// Request fields a partial update may change
const EDITABLE_FIELDS: &[&str] = &[
    "type",
    "description",
    "location",
    "train_number",
    "pnr_number",
    "severity",
    "date_of_incident",
    "status",
    "staff",
    "staff_id",
    "photos",
];

/// Insert a validated complaint and return its id
///
/// Runs on the caller's connection so it can share a transaction with
/// follow-up writes.
pub(crate) async fn insert_complaint(
    conn: &mut PgConnection,
    complaint: &ValidatedComplaint,
    filed_by: Option<i64>,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO complaints (
            "type", description, location, train_number, pnr_number, severity,
            date_of_incident, status, staff, staff_id, filed_by, photos
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id
        "#,
    )
    .bind(&complaint.complaint_type)
    .bind(&complaint.description)
    .bind(&complaint.location)
    .bind(&complaint.train_number)
    .bind(&complaint.pnr_number)
    .bind(complaint.severity)
    .bind(complaint.date_of_incident)
    .bind(complaint.status)
    .bind(&complaint.staff)
    .bind(complaint.staff_id)
    .bind(filed_by)
    .bind(&complaint.photos)
    .fetch_one(&mut *conn)
    .await
    .map_err(handle_db_error)?;

    Ok(id)
}

/// Complaint intake, queries and partial updates
pub struct ComplaintService {
    pool: PgPool,
    store: Arc<LocalFileStore>,
}

impl ComplaintService {
    pub fn new(pool: PgPool, store: Arc<LocalFileStore>) -> Self {
        Self { pool, store }
    }

    fn photos_dir(&self) -> &str {
        &self.store.config().complaints_dir
    }

    /// Type and size failures of an uploaded photo
    fn photo_errors(photo: Option<&UploadedFile>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(photo) = photo {
            check_upload(
                photo,
                PHOTO_FIELD,
                ALLOWED_PHOTO_MIME_TYPES,
                MAX_PHOTO_SIZE,
                &mut errors,
            );
        }
        errors
    }

    async fn stage_photo(&self, photo: Option<UploadedFile>) -> Result<Option<StagedFile>> {
        match photo {
            Some(photo) => Ok(Some(self.store.stage(&photo.file_name, &photo.data).await?)),
            None => Ok(None),
        }
    }

    /// Validate and persist a new complaint
    ///
    /// The photo, if any, is only moved into the complaints directory once the
    /// row exists; a rejected request leaves nothing behind on disk.
    pub async fn file_complaint(
        &self,
        mut fields: Map<String, Value>,
        photo: Option<UploadedFile>,
        filed_by: Option<i64>,
    ) -> Result<FiledComplaintDto> {
        let upload_errors = Self::photo_errors(photo.as_ref());
        if photo.is_some() {
            // The uploaded file decides the path
            fields.remove(PHOTO_FIELD);
        }

        let validated = with_upload_errors(
            validate_complaint(&fields, StatusPolicy::ForceOpen, self.photos_dir()),
            upload_errors,
        )
        .inspect_err(|e| debug!("Rejected complaint: {}", e))?;
        let staged = self.stage_photo(photo).await?;

        let mut tx = self.pool.begin().await?;
        let id = insert_complaint(&mut tx, &validated, filed_by).await?;

        match staged {
            None => tx.commit().await?,
            Some(staged) => {
                let stored_name = record_file_name(id, staged.file_name());
                let path = staged.commit(self.photos_dir(), &stored_name).await?;
                if let Err(e) = Self::attach_photo(tx, id, &path).await {
                    self.discard(&path).await;
                    return Err(e);
                }
            }
        }

        info!("Complaint {} filed (filed_by={:?})", id, filed_by);
        Ok(FiledComplaintDto {
            id,
            status: validated.status,
        })
    }

    /// Store the photo path on the row and commit the transaction
    async fn attach_photo(
        mut tx: Transaction<'_, Postgres>,
        id: i64,
        path: &str,
    ) -> Result<()> {
        sqlx::query("UPDATE complaints SET photos = $1, updated_at = NOW() WHERE id = $2")
            .bind(path)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn discard(&self, path: &str) {
        if let Err(e) = self.store.remove(path).await {
            warn!("Failed to remove orphaned upload {}: {}", path, e);
        }
    }

    /// Every complaint in insertion order
    pub async fn list_all(&self) -> Result<Vec<Complaint>> {
        let query = format!("SELECT {} FROM complaints ORDER BY id", COMPLAINT_COLUMNS);
        let complaints = sqlx::query_as::<_, Complaint>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(complaints)
    }

    /// Every complaint, most recent incident first
    pub async fn list_by_incident_date(&self) -> Result<Vec<ComplaintResponseDto>> {
        let query = format!(
            "SELECT {} FROM complaints ORDER BY date_of_incident DESC, id DESC",
            COMPLAINT_COLUMNS
        );
        let complaints = sqlx::query_as::<_, Complaint>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(complaints
            .into_iter()
            .map(|c| ComplaintResponseDto::from_model(c, &self.store))
            .collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ComplaintResponseDto> {
        let query = format!("SELECT {} FROM complaints WHERE id = $1", COMPLAINT_COLUMNS);
        let complaint = sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;

        Ok(ComplaintResponseDto::from_model(complaint, &self.store))
    }

    /// Apply the supplied fields to a complaint and re-validate the result
    ///
    /// A status change is recorded as a notification in the same transaction.
    pub async fn update_partial(
        &self,
        id: i64,
        mut fields: Map<String, Value>,
        photo: Option<UploadedFile>,
    ) -> Result<ComplaintResponseDto> {
        let upload_errors = Self::photo_errors(photo.as_ref());
        if photo.is_some() {
            fields.remove(PHOTO_FIELD);
        }

        let mut tx = self.pool.begin().await?;

        let query = format!(
            "SELECT {} FROM complaints WHERE id = $1 FOR UPDATE",
            COMPLAINT_COLUMNS
        );
        let existing = sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;

        let merged = merge_fields(existing.to_field_map(), fields);
        let validated = with_upload_errors(
            validate_complaint(&merged, StatusPolicy::Accept, self.photos_dir()),
            upload_errors,
        )?;
        let staged = self.stage_photo(photo).await?;

        let query = format!(
            r#"
            UPDATE complaints
            SET "type" = $1, description = $2, location = $3, train_number = $4,
                pnr_number = $5, severity = $6, date_of_incident = $7, status = $8,
                staff = $9, staff_id = $10, photos = $11, updated_at = NOW()
            WHERE id = $12
            RETURNING {}
            "#,
            COMPLAINT_COLUMNS
        );
        let mut updated = sqlx::query_as::<_, Complaint>(&query)
            .bind(&validated.complaint_type)
            .bind(&validated.description)
            .bind(&validated.location)
            .bind(&validated.train_number)
            .bind(&validated.pnr_number)
            .bind(validated.severity)
            .bind(validated.date_of_incident)
            .bind(validated.status)
            .bind(&validated.staff)
            .bind(validated.staff_id)
            .bind(&validated.photos)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(handle_db_error)?;

        if updated.status != existing.status {
            Self::record_status_change(&mut tx, id, updated.status).await?;
            info!(
                "Complaint {} status changed: {} -> {}",
                id, existing.status, updated.status
            );
        }

        match staged {
            None => tx.commit().await?,
            Some(staged) => {
                let stored_name = record_file_name(id, staged.file_name());
                let path = staged.commit(self.photos_dir(), &stored_name).await?;
                if let Err(e) = Self::attach_photo(tx, id, &path).await {
                    self.discard(&path).await;
                    return Err(e);
                }
                updated.photos = Some(path);
            }
        }

        debug!("Complaint {} updated", id);
        Ok(ComplaintResponseDto::from_model(updated, &self.store))
    }

    async fn record_status_change(
        conn: &mut PgConnection,
        complaint_id: i64,
        status: ComplaintStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO complaint_notifications (complaint_id, status, notification_type)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(complaint_id)
        .bind(status)
        .bind(NotificationType::StatusChange.as_str())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Status-change log of a complaint, oldest first
    pub async fn list_notifications(&self, id: i64) -> Result<Vec<NotificationResponseDto>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM complaints WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Complaint not found".to_string()));
        }

        let notifications = sqlx::query_as::<_, ComplaintNotification>(
            r#"
            SELECT id, complaint_id, status, notification_type, sent_at
            FROM complaint_notifications
            WHERE complaint_id = $1
            ORDER BY sent_at, id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications.into_iter().map(Into::into).collect())
    }
}

/// Overlay the supplied editable fields on the stored ones
fn merge_fields(mut base: Map<String, Value>, supplied: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in supplied {
        if EDITABLE_FIELDS.contains(&key.as_str()) {
            base.insert(key, value);
        } else {
            debug!("Ignoring non-editable field '{}'", key);
        }
    }
    base
}

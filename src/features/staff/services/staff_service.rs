use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{handle_db_error, AppError, Result};
use crate::core::extractor::UploadedFile;
use crate::features::staff::dtos::{
    StaffResponseDto, ALLOWED_AVATAR_MIME_TYPES, AVATAR_FIELD, MAX_AVATAR_SIZE,
};
use crate::features::staff::models::{Staff, StaffWithStats};
use crate::features::staff::validation::{validate_staff, ValidatedStaff};
use crate::modules::storage::{record_file_name_with_ext, LocalFileStore, StagedFile};
use crate::shared::types::FieldErrors;
use crate::shared::validation::{check_upload, extension_for_content_type, with_upload_errors};

const STAFF_COLUMNS: &str = r#"
    s.id, s.name, s.email, s.phone, s.role, s.department, s.location, s.status,
    s.avatar, s.expertise, s.languages, s.created_at
"#;

const WORKLOAD_COLUMNS: &str = r#"
    (SELECT COUNT(*) FROM complaints c
     WHERE c.staff_id = s.id AND c.status <> 'Closed') AS active_complaints,
    (SELECT COUNT(*) FROM complaints c
     WHERE c.staff_id = s.id AND c.status = 'Closed') AS resolved_complaints
"#;

const EDITABLE_FIELDS: &[&str] = &[
    "name",
    "email",
    "phone",
    "role",
    "department",
    "location",
    "status",
    "avatar",
    "expertise",
    "languages",
];

/// Avatar upload checked and staged, waiting for the record id
struct PendingAvatar {
    staged: StagedFile,
    extension: String,
}

/// Staff directory with avatar storage and workload counts
pub struct StaffService {
    pool: PgPool,
    store: Arc<LocalFileStore>,
}

impl StaffService {
    pub fn new(pool: PgPool, store: Arc<LocalFileStore>) -> Self {
        Self { pool, store }
    }

    fn avatars_dir(&self) -> &str {
        &self.store.config().staff_avatars_dir
    }

    /// Type and size failures of an uploaded avatar
    fn avatar_errors(avatar: Option<&UploadedFile>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(avatar) = avatar {
            check_upload(
                avatar,
                AVATAR_FIELD,
                ALLOWED_AVATAR_MIME_TYPES,
                MAX_AVATAR_SIZE,
                &mut errors,
            );
        }
        errors
    }

    async fn stage_avatar(&self, avatar: Option<UploadedFile>) -> Result<Option<PendingAvatar>> {
        let Some(avatar) = avatar else {
            return Ok(None);
        };

        let staged = self.store.stage(&avatar.file_name, &avatar.data).await?;
        let extension = extension_for_content_type(&avatar.content_type)
            .map(String::from)
            .or_else(|| staged.extension())
            .unwrap_or_else(|| "bin".to_string());

        Ok(Some(PendingAvatar { staged, extension }))
    }

    /// Move the avatar into place, record its path and commit
    async fn attach_avatar(
        &self,
        mut tx: Transaction<'_, Postgres>,
        id: i64,
        pending: PendingAvatar,
    ) -> Result<()> {
        let stored_name = record_file_name_with_ext(id, &pending.extension);
        let path = pending.staged.commit(self.avatars_dir(), &stored_name).await?;

        let result = async {
            sqlx::query("UPDATE staff SET avatar = $1 WHERE id = $2")
                .bind(&path)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>(())
        }
        .await;

        if result.is_err() {
            if let Err(e) = self.store.remove(&path).await {
                warn!("Failed to remove orphaned avatar {}: {}", path, e);
            }
        }
        result
    }

    pub async fn create(
        &self,
        mut fields: Map<String, Value>,
        avatar: Option<UploadedFile>,
    ) -> Result<StaffResponseDto> {
        let upload_errors = Self::avatar_errors(avatar.as_ref());
        // Only an uploaded file sets the avatar on creation
        fields.remove(AVATAR_FIELD);

        let validated =
            with_upload_errors(validate_staff(&fields, self.avatars_dir()), upload_errors)?;
        let pending = self.stage_avatar(avatar).await?;

        let mut tx = self.pool.begin().await?;
        let id = Self::insert(&mut tx, &validated).await?;

        match pending {
            None => tx.commit().await?,
            Some(pending) => self.attach_avatar(tx, id, pending).await?,
        }

        info!("Staff member {} created", id);
        self.get_by_id(id).await
    }

    async fn insert(tx: &mut Transaction<'_, Postgres>, staff: &ValidatedStaff) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO staff (
                name, email, phone, role, department, location, status,
                avatar, expertise, languages
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&staff.name)
        .bind(&staff.email)
        .bind(&staff.phone)
        .bind(&staff.role)
        .bind(&staff.department)
        .bind(&staff.location)
        .bind(staff.status)
        .bind(&staff.avatar)
        .bind(&staff.expertise)
        .bind(&staff.languages)
        .fetch_one(&mut **tx)
        .await
        .map_err(handle_db_error)?;

        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<StaffResponseDto>> {
        let query = format!(
            "SELECT {}, {} FROM staff s ORDER BY s.id",
            STAFF_COLUMNS, WORKLOAD_COLUMNS
        );
        let rows = sqlx::query_as::<_, StaffWithStats>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| StaffResponseDto::from_model(row, &self.store))
            .collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<StaffResponseDto> {
        let query = format!(
            "SELECT {}, {} FROM staff s WHERE s.id = $1",
            STAFF_COLUMNS, WORKLOAD_COLUMNS
        );
        let row = sqlx::query_as::<_, StaffWithStats>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?;

        Ok(StaffResponseDto::from_model(row, &self.store))
    }

    /// Apply the supplied fields and an optional new avatar
    pub async fn update_partial(
        &self,
        id: i64,
        fields: Map<String, Value>,
        avatar: Option<UploadedFile>,
    ) -> Result<StaffResponseDto> {
        let upload_errors = Self::avatar_errors(avatar.as_ref());

        let mut tx = self.pool.begin().await?;
        let query = format!("SELECT {} FROM staff s WHERE s.id = $1 FOR UPDATE", STAFF_COLUMNS);
        let existing = sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?;

        let mut merged = existing.to_field_map();
        for (key, value) in fields {
            // The stored avatar path only changes through an upload
            if key != AVATAR_FIELD && EDITABLE_FIELDS.contains(&key.as_str()) {
                merged.insert(key, value);
            }
        }
        let validated =
            with_upload_errors(validate_staff(&merged, self.avatars_dir()), upload_errors)?;
        let pending = self.stage_avatar(avatar).await?;

        sqlx::query(
            r#"
            UPDATE staff
            SET name = $1, email = $2, phone = $3, role = $4, department = $5,
                location = $6, status = $7, expertise = $8, languages = $9
            WHERE id = $10
            "#,
        )
        .bind(&validated.name)
        .bind(&validated.email)
        .bind(&validated.phone)
        .bind(&validated.role)
        .bind(&validated.department)
        .bind(&validated.location)
        .bind(validated.status)
        .bind(&validated.expertise)
        .bind(&validated.languages)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(handle_db_error)?;

        match pending {
            None => tx.commit().await?,
            Some(pending) => self.attach_avatar(tx, id, pending).await?,
        }

        debug!("Staff member {} updated", id);
        self.get_by_id(id).await
    }

    /// Delete a staff member; assigned complaints keep their free-text label
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Staff member not found".to_string()));
        }

        info!("Staff member {} deleted", id);
        Ok(())
    }
}

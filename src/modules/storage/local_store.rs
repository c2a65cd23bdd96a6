use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::MediaConfig;
use crate::core::error::{AppError, Result};
use crate::shared::validation::UNSAFE_FILENAME_CHARS;

/// Directory under the media root that holds uncommitted uploads
const STAGING_DIR: &str = ".staging";

/// Longest basename kept in a stored filename
const MAX_BASENAME_LEN: usize = 100;

/// Local file store for uploaded media
///
/// Every path handed out by the store is relative to the media root and uses
/// forward slashes, so it can be persisted verbatim and appended to the media
/// URL prefix.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    config: MediaConfig,
}

impl LocalFileStore {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Create the media root, staging area and the upload directories
    pub async fn ensure_layout(&self) -> Result<()> {
        for dir in [
            STAGING_DIR,
            self.config.complaints_dir.as_str(),
            self.config.staff_avatars_dir.as_str(),
        ] {
            self.ensure_dir(dir).await?;
        }

        info!(
            "Media storage ready at {} (complaints: {}, staff avatars: {})",
            self.config.root.display(),
            self.config.complaints_dir,
            self.config.staff_avatars_dir
        );
        Ok(())
    }

    /// Create `relative` under the media root if it does not exist yet
    pub async fn ensure_dir(&self, relative: &str) -> Result<PathBuf> {
        let dir = self.absolute_path(relative);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Storage(format!("Failed to create directory {}: {}", dir.display(), e))
        })?;
        Ok(dir)
    }

    /// Write `data` to a temporary file in the staging area
    ///
    /// The returned [`StagedFile`] deletes its temporary file when dropped
    /// unless [`StagedFile::commit`] is called.
    pub async fn stage(&self, original_filename: &str, data: &[u8]) -> Result<StagedFile> {
        let staging_dir = self.ensure_dir(STAGING_DIR).await?;
        let file_name = storage_basename(original_filename);
        let temp_path = staging_dir.join(format!("{}.upload", Uuid::new_v4().simple()));

        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;

        debug!(
            "Staged upload '{}' ({} bytes) at {}",
            file_name,
            data.len(),
            temp_path.display()
        );

        Ok(StagedFile {
            store: self.clone(),
            temp_path,
            file_name,
            committed: false,
        })
    }

    /// Delete a stored file, ignoring files that are already gone
    pub async fn remove(&self, relative: &str) -> Result<()> {
        let path = self.absolute_path(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Map a forward-slash relative path onto the host filesystem
    pub fn absolute_path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.config.root.clone(), |path, segment| path.join(segment))
    }

    /// URL path under which a stored file is served (e.g. "/media/complaints/a.jpg")
    pub fn url_path(&self, relative: &str) -> String {
        format!("{}{}", self.config.url_prefix, relative.trim_start_matches('/'))
    }

    /// Fully qualified URL for a stored file
    pub fn public_url(&self, relative: &str) -> String {
        format!("{}{}", self.config.public_base_url, self.url_path(relative))
    }
}

/// An upload written to the staging area but not yet attached to a record
#[derive(Debug)]
pub struct StagedFile {
    store: LocalFileStore,
    temp_path: PathBuf,
    file_name: String,
    committed: bool,
}

impl StagedFile {
    /// Sanitized basename of the client-supplied filename
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Lowercased extension of the client-supplied filename, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    #[cfg(test)]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Move the staged file to `dir/stored_name` and return its relative path
    pub async fn commit(mut self, dir: &str, stored_name: &str) -> Result<String> {
        let dir = dir.trim_matches('/');
        let target_dir = self.store.ensure_dir(dir).await?;
        let target = target_dir.join(stored_name);

        tokio::fs::rename(&self.temp_path, &target)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to move upload to {}: {}",
                    target.display(),
                    e
                ))
            })?;
        self.committed = true;

        let relative = format!("{}/{}", dir, stored_name);
        debug!("Committed upload to {}", relative);
        Ok(relative)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.temp_path) {
            Ok(()) => debug!("Discarded staged upload {}", self.temp_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to discard staged upload {}: {}",
                self.temp_path.display(),
                e
            ),
        }
    }
}

/// Basename of a client-supplied filename, reduced to safe characters
pub fn storage_basename(original_filename: &str) -> String {
    let basename = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let sanitized = UNSAFE_FILENAME_CHARS.replace_all(basename, "_");
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.is_empty() {
        return "upload".to_string();
    }

    // Keep the tail so the extension survives truncation
    let chars: Vec<char> = sanitized.chars().collect();
    if chars.len() > MAX_BASENAME_LEN {
        chars[chars.len() - MAX_BASENAME_LEN..].iter().collect()
    } else {
        sanitized.to_string()
    }
}

/// "<id>_<timestamp>_<basename>", unique per record and upload instant
pub fn record_file_name(record_id: i64, basename: &str) -> String {
    format!("{}_{}_{}", record_id, upload_timestamp(), basename)
}

/// "<id>_<timestamp>.<ext>", used where the original name is not kept
pub fn record_file_name_with_ext(record_id: i64, extension: &str) -> String {
    format!("{}_{}.{}", record_id, upload_timestamp(), extension)
}

fn upload_timestamp() -> String {
    Utc::now().format("%Y%m%d%H%M%S%6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> LocalFileStore {
        LocalFileStore::new(MediaConfig::with_root(dir.path()))
    }

    #[test]
    fn test_storage_basename_strips_directories() {
        assert_eq!(storage_basename("photo.jpg"), "photo.jpg");
        assert_eq!(storage_basename("/tmp/uploads/photo.jpg"), "photo.jpg");
        assert_eq!(storage_basename("C:\\Users\\me\\photo.jpg"), "photo.jpg");
        assert_eq!(storage_basename("../../etc/passwd"), "passwd");
    }

    #[test]
    fn test_storage_basename_sanitizes() {
        assert_eq!(storage_basename("dirty coach.jpg"), "dirty_coach.jpg");
        assert_eq!(storage_basename(".hidden"), "hidden");
        assert_eq!(storage_basename(""), "upload");
        assert_eq!(storage_basename("dir/"), "upload");

        let long = format!("{}.png", "a".repeat(300));
        let trimmed = storage_basename(&long);
        assert_eq!(trimmed.chars().count(), MAX_BASENAME_LEN);
        assert!(trimmed.ends_with(".png"));
    }

    #[test]
    fn test_record_file_names() {
        let name = record_file_name(42, "coach.jpg");
        assert!(name.starts_with("42_"));
        assert!(name.ends_with("_coach.jpg"));

        let avatar = record_file_name_with_ext(7, "png");
        assert!(avatar.starts_with("7_"));
        assert!(avatar.ends_with(".png"));
    }

    #[test]
    fn test_urls_use_forward_slashes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(
            store.url_path("complaints/a.jpg"),
            "/media/complaints/a.jpg"
        );
        assert_eq!(
            store.public_url("staff_avatars/1.png"),
            "http://localhost:3000/media/staff_avatars/1.png"
        );
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = store.ensure_dir("complaints").await.unwrap();
        let second = store.ensure_dir("complaints").await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[tokio::test]
    async fn test_commit_moves_file_under_dir() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let staged = store.stage("coach b3.jpg", b"jpeg-bytes").await.unwrap();
        assert_eq!(staged.file_name(), "coach_b3.jpg");
        assert_eq!(staged.extension().as_deref(), Some("jpg"));
        let temp = staged.temp_path().to_path_buf();

        let relative = staged
            .commit("complaints", "1_20250101000000000000_coach_b3.jpg")
            .await
            .unwrap();

        assert_eq!(relative, "complaints/1_20250101000000000000_coach_b3.jpg");
        assert!(!relative.contains('\\'));
        assert!(!temp.exists());

        let stored = std::fs::read(store.absolute_path(&relative)).unwrap();
        assert_eq!(stored, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_dropped_staged_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let staged = store.stage("photo.png", b"png").await.unwrap();
        let temp = staged.temp_path().to_path_buf();
        assert!(temp.exists());

        drop(staged);
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.remove("complaints/nothing.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_layout_creates_directories() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_layout().await.unwrap();

        assert!(dir.path().join("complaints").is_dir());
        assert!(dir.path().join("staff_avatars").is_dir());
        assert!(dir.path().join(STAGING_DIR).is_dir());
    }
}

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::{AppError, Result};
use crate::core::extractor::UploadedFile;
use crate::shared::form::merge_errors;
use crate::shared::types::{push_field_error, FieldErrors};

lazy_static! {
    /// Characters that are not kept in stored filenames
    /// - Kept: ASCII letters, digits, '.', '_', '-'
    /// - Replaced: spaces, unicode, path separators, shell metacharacters
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();

    /// Relative media path made of safe segments separated by '/'
    /// - Valid: "complaints/7_20250101_coach.jpg", "staff_avatars/3.png"
    /// - Invalid: "/etc/passwd", "complaints//a.jpg", "complaints\\a.jpg", "a b.jpg"
    pub static ref MEDIA_PATH_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._-]+(?:/[A-Za-z0-9._-]+)*$").unwrap();
}

/// Whether `path` is a relative media path inside `dir` without parent references
pub fn is_media_path_in(path: &str, dir: &str) -> bool {
    if !MEDIA_PATH_REGEX.is_match(path) {
        return false;
    }
    if path.split('/').any(|segment| segment == "." || segment == "..") {
        return false;
    }
    path.strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty())
}

/// Check an uploaded file against a MIME allow-list and size limit
///
/// A failure is recorded against `field` next to the other field errors so
/// the caller can report everything at once.
pub fn check_upload(
    file: &UploadedFile,
    field: &str,
    allowed_mime_types: &[&str],
    max_size: usize,
    errors: &mut FieldErrors,
) {
    if file.data.len() > max_size {
        push_field_error(
            errors,
            field,
            format!(
                "File too large. Maximum size is {} MB.",
                max_size / 1024 / 1024
            ),
        );
    } else if !allowed_mime_types.contains(&file.content_type.as_str()) {
        push_field_error(
            errors,
            field,
            format!(
                "File type '{}' is not allowed. Allowed types: {}",
                file.content_type,
                allowed_mime_types.join(", ")
            ),
        );
    }
}

/// Fold upload failures into the outcome of field validation
pub fn with_upload_errors<T>(
    validated: std::result::Result<T, FieldErrors>,
    upload_errors: FieldErrors,
) -> Result<T> {
    match validated {
        Ok(value) if upload_errors.is_empty() => Ok(value),
        Ok(_) => Err(AppError::Validation(upload_errors)),
        Err(mut errors) => {
            merge_errors(&mut errors, upload_errors);
            Err(AppError::Validation(errors))
        }
    }
}

/// File extension for a supported MIME type
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    fn upload(content_type: &str, size: usize) -> UploadedFile {
        UploadedFile {
            field_name: "photos".into(),
            file_name: "coach.jpg".into(),
            content_type: content_type.into(),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn test_check_upload() {
        let allowed = ["image/jpeg", "image/png"];
        let mut errors = FieldErrors::new();

        check_upload(&upload("image/jpeg", 10), "photos", &allowed, 100, &mut errors);
        assert!(errors.is_empty());

        check_upload(&upload("text/plain", 10), "photos", &allowed, 100, &mut errors);
        check_upload(&upload("image/png", 101), "avatar", &allowed, 100, &mut errors);
        assert_eq!(errors["photos"].len(), 1);
        assert!(errors["photos"][0].starts_with("File type 'text/plain'"));
        assert!(errors["avatar"][0].starts_with("File too large"));
    }

    #[test]
    fn test_upload_errors_join_field_errors() {
        let mut upload_errors = FieldErrors::new();
        push_field_error(&mut upload_errors, "photos", "File type 'text/plain' is not allowed.");

        let mut field_errors = FieldErrors::new();
        push_field_error(&mut field_errors, "type", "This field may not be blank.");

        match with_upload_errors::<()>(Err(field_errors), upload_errors.clone()) {
            Err(AppError::Validation(errors)) => {
                assert!(errors.contains_key("type"));
                assert!(errors.contains_key("photos"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(
            with_upload_errors(Ok(1), upload_errors),
            Err(AppError::Validation(_))
        ));
        assert_eq!(with_upload_errors(Ok(1), FieldErrors::new()).unwrap(), 1);
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_content_type("image/webp"), Some("webp"));
        assert_eq!(extension_for_content_type("text/html"), None);
    }

    #[test]
    fn test_unsafe_filename_chars() {
        assert_eq!(
            UNSAFE_FILENAME_CHARS.replace_all("coach b3 (1).jpg", "_"),
            "coach_b3__1_.jpg"
        );
        assert_eq!(UNSAFE_FILENAME_CHARS.replace_all("ok-name_1.png", "_"), "ok-name_1.png");
    }

    #[test]
    fn test_media_path_regex() {
        assert!(MEDIA_PATH_REGEX.is_match("complaints/7_20250101_coach.jpg"));
        assert!(MEDIA_PATH_REGEX.is_match("staff_avatars/3.png"));
        assert!(!MEDIA_PATH_REGEX.is_match("/etc/passwd"));
        assert!(!MEDIA_PATH_REGEX.is_match("complaints//a.jpg"));
        assert!(!MEDIA_PATH_REGEX.is_match("complaints\\a.jpg"));
        assert!(!MEDIA_PATH_REGEX.is_match("a b.jpg"));
        assert!(!MEDIA_PATH_REGEX.is_match(""));
    }

    #[test]
    fn test_is_media_path_in() {
        assert!(is_media_path_in("complaints/a.jpg", "complaints"));
        assert!(!is_media_path_in("complaints/../secret.txt", "complaints"));
        assert!(!is_media_path_in("staff_avatars/a.jpg", "complaints"));
        assert!(!is_media_path_in("complaintsx/a.jpg", "complaints"));
        assert!(!is_media_path_in("complaints", "complaints"));
    }
}

use serde_json::{Map, Value};
use validator::Validate;

use crate::core::error::field_errors_from;
use crate::features::staff::models::StaffStatus;
use crate::shared::form::{json_text, merge_errors, not_blank, optional_text, required_text};
use crate::shared::types::{push_field_error, FieldErrors};
use crate::shared::validation::is_media_path_in;

pub const MSG_INVALID_AVATAR: &str = "Avatar must be a valid file path";

/// Staff fields that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedStaff {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub department: String,
    pub location: Option<String>,
    pub status: StaffStatus,
    pub avatar: Option<String>,
    pub expertise: Option<String>,
    pub languages: Option<String>,
}

#[derive(Debug, Validate)]
struct StaffFields {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    name: Option<String>,

    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    email: Option<String>,

    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 15, message = "Ensure this field has no more than 15 characters.")
    )]
    phone: Option<String>,

    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    role: Option<String>,

    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    department: Option<String>,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    location: Option<String>,
}

/// Validate a complete set of staff fields
///
/// `avatars_dir` is the directory a stored avatar path must live in.
pub fn validate_staff(
    fields: &Map<String, Value>,
    avatars_dir: &str,
) -> Result<ValidatedStaff, FieldErrors> {
    let mut errors = FieldErrors::new();

    let text = StaffFields {
        name: required_text(fields, "name", &mut errors),
        email: required_text(fields, "email", &mut errors).map(|e| e.trim().to_string()),
        phone: required_text(fields, "phone", &mut errors),
        role: required_text(fields, "role", &mut errors),
        department: required_text(fields, "department", &mut errors),
        location: optional_text(fields, "location", &mut errors),
    };

    if let Err(validation) = text.validate() {
        merge_errors(&mut errors, field_errors_from(&validation));
    }

    let status = match optional_text(fields, "status", &mut errors) {
        None => StaffStatus::default(),
        Some(raw) => StaffStatus::parse(&raw).unwrap_or_else(|| {
            push_field_error(
                &mut errors,
                "status",
                format!("\"{}\" is not a valid choice.", raw),
            );
            StaffStatus::default()
        }),
    };

    let avatar = match fields.get("avatar") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) if is_media_path_in(s.trim(), avatars_dir) => {
            Some(s.trim().to_string())
        }
        Some(_) => {
            push_field_error(&mut errors, "avatar", MSG_INVALID_AVATAR);
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let trimmed = |v: Option<String>| v.unwrap_or_default().trim().to_string();
    Ok(ValidatedStaff {
        name: trimmed(text.name),
        email: trimmed(text.email),
        phone: trimmed(text.phone),
        role: trimmed(text.role),
        department: trimmed(text.department),
        location: text.location,
        status,
        avatar,
        expertise: json_text(fields, "expertise"),
        languages: json_text(fields, "languages"),
    })
}

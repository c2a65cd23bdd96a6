//! Field- and record-level rules for complaints.
//!
//! Raw request fields arrive as a loosely typed JSON map (multipart text parts
//! and JSON bodies look the same here). Every rule runs and failures are
//! collected per field, so one response can report all of them.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use validator::Validate;

use crate::core::error::field_errors_from;
use crate::features::complaints::models::{ComplaintSeverity, ComplaintStatus};
use crate::shared::form::{
    merge_errors, not_blank, optional_integer, optional_text, rename_field, required_text,
};
use crate::shared::types::{push_field_error, FieldErrors};
use crate::shared::validation::is_media_path_in;

pub const MSG_INVALID_PHOTOS: &str = "Photos must be a valid file path";
pub const MSG_DATE_FORMAT: &str = "Date has wrong format. Use YYYY-MM-DD.";

/// Whether the status literal supplied by the client is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// New complaints always start Open
    ForceOpen,
    /// Partial updates may set any status
    Accept,
}

/// Complaint fields that passed validation, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedComplaint {
    pub complaint_type: String,
    pub description: String,
    pub location: Option<String>,
    pub train_number: Option<String>,
    pub pnr_number: Option<String>,
    pub severity: ComplaintSeverity,
    pub status: ComplaintStatus,
    pub date_of_incident: NaiveDate,
    pub staff: Option<String>,
    pub staff_id: Option<i64>,
    pub photos: Option<String>,
}

/// Text form of the fields, checked with validator rules
#[derive(Debug, Default, Validate)]
struct ComplaintFields {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    complaint_type: Option<String>,

    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    description: Option<String>,

    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    location: Option<String>,

    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    train_number: Option<String>,

    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pnr_number: Option<String>,

    severity: Option<String>,

    status: Option<String>,

    #[validate(required(message = "This field is required."))]
    date_of_incident: Option<String>,

    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    staff: Option<String>,

    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    photos: Option<String>,
}

/// Validate a complete set of complaint fields
///
/// `photos_dir` is the directory a client-supplied photo path must live in.
pub fn validate_complaint(
    fields: &Map<String, Value>,
    status_policy: StatusPolicy,
    photos_dir: &str,
) -> Result<ValidatedComplaint, FieldErrors> {
    let mut errors = FieldErrors::new();

    let text = ComplaintFields {
        complaint_type: required_text(fields, "type", &mut errors),
        description: required_text(fields, "description", &mut errors),
        location: optional_text(fields, "location", &mut errors),
        train_number: optional_text(fields, "train_number", &mut errors),
        pnr_number: optional_text(fields, "pnr_number", &mut errors),
        severity: optional_text(fields, "severity", &mut errors),
        status: optional_text(fields, "status", &mut errors),
        date_of_incident: optional_text(fields, "date_of_incident", &mut errors),
        staff: optional_text(fields, "staff", &mut errors),
        photos: photos_path(fields, &mut errors),
    };
    let staff_id = optional_integer(fields, "staff_id", &mut errors);

    if let Err(validation) = text.validate() {
        let reported = rename_field(field_errors_from(&validation), "complaint_type", "type");
        merge_errors(&mut errors, reported);
    }

    let severity = match text.severity.as_deref() {
        None => ComplaintSeverity::default(),
        Some(raw) => ComplaintSeverity::parse(raw).unwrap_or_else(|| {
            push_field_error(
                &mut errors,
                "severity",
                format!("\"{}\" is not a valid choice.", raw),
            );
            ComplaintSeverity::default()
        }),
    };

    let requested_status = match text.status.as_deref() {
        None => ComplaintStatus::default(),
        Some(raw) => ComplaintStatus::parse(raw).unwrap_or_else(|| {
            push_field_error(
                &mut errors,
                "status",
                format!("\"{}\" is not a valid choice.", raw),
            );
            ComplaintStatus::default()
        }),
    };
    let status = match status_policy {
        StatusPolicy::ForceOpen => ComplaintStatus::Open,
        StatusPolicy::Accept => requested_status,
    };

    let date_of_incident = text
        .date_of_incident
        .as_deref()
        .and_then(|raw| match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                push_field_error(&mut errors, "date_of_incident", MSG_DATE_FORMAT);
                None
            }
        });

    if let Some(path) = text.photos.as_deref() {
        if !errors.contains_key("photos") && !is_media_path_in(path, photos_dir) {
            push_field_error(&mut errors, "photos", MSG_INVALID_PHOTOS);
        }
    }

    match (errors.is_empty(), date_of_incident) {
        (true, Some(date_of_incident)) => Ok(ValidatedComplaint {
            complaint_type: text.complaint_type.unwrap_or_default(),
            description: text.description.unwrap_or_default(),
            location: text.location,
            train_number: text.train_number,
            pnr_number: text.pnr_number,
            severity,
            status,
            date_of_incident,
            staff: text.staff,
            staff_id,
            photos: text.photos,
        }),
        _ => Err(errors),
    }
}

/// Photos must be a string path or absent
fn photos_path(fields: &Map<String, Value>, errors: &mut FieldErrors) -> Option<String> {
    match fields.get("photos") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            push_field_error(errors, "photos", MSG_INVALID_PHOTOS);
            None
        }
    }
}

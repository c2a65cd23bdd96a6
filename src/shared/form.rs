//! Readers for loosely typed request fields.
//!
//! Multipart text parts and JSON bodies both land in a `Map<String, Value>`.
//! These helpers pull typed values out of it and record a reason per field
//! instead of failing fast.

use serde_json::{Map, Value};
use validator::ValidationError;

use crate::shared::types::{push_field_error, FieldErrors};

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_NOT_STRING: &str = "Not a valid string.";
pub const MSG_INTEGER: &str = "A valid integer is required.";

/// Validator rule rejecting whitespace-only text
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(MSG_BLANK.into()));
    }
    Ok(())
}

/// Text value of `key`; numbers are accepted in their decimal form
pub fn text_value(
    fields: &Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(_) => {
            push_field_error(errors, key, MSG_NOT_STRING);
            None
        }
    }
}

/// Required text; blank values are kept so a blank rule can report them
pub fn required_text(
    fields: &Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = text_value(fields, key, errors);
    if value.is_none() && fields.contains_key(key) && !errors.contains_key(key) {
        // explicit null
        push_field_error(errors, key, MSG_BLANK);
    }
    value
}

/// Optional text, trimmed; blank input counts as absent
pub fn optional_text(
    fields: &Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    text_value(fields, key, errors)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Optional integer given as a JSON number or a decimal string
pub fn optional_integer(
    fields: &Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<i64> {
    let parsed = match fields.get(key) {
        None | Some(Value::Null) => return None,
        Some(Value::String(s)) if s.trim().is_empty() => return None,
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    if parsed.is_none() {
        push_field_error(errors, key, MSG_INTEGER);
    }
    parsed
}

/// Opaque text; arrays and objects are stored in their JSON encoding
pub fn json_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Rename a validator field key to the request field it came from
pub fn rename_field(errors: FieldErrors, from: &str, to: &str) -> FieldErrors {
    errors
        .into_iter()
        .map(|(field, reasons)| {
            if field == from {
                (to.to_string(), reasons)
            } else {
                (field, reasons)
            }
        })
        .collect()
}

/// Merge validator output into errors collected while reading fields
///
/// Reasons recorded while reading a field take precedence.
pub fn merge_errors(errors: &mut FieldErrors, more: FieldErrors) {
    for (field, reasons) in more {
        errors.entry(field).or_insert(reasons);
    }
}

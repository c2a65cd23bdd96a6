use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Field name -> list of reasons the value was rejected
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
    /// Short reason a request was refused; absent on success
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Per-field validation failures, keyed by request field name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_errors: Option<FieldErrors>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
            error: None,
            field_errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: message.clone(),
            message,
            meta: None,
            errors,
            field_errors: None,
        }
    }

    pub fn field_errors(message: String, field_errors: FieldErrors) -> ApiResponse<()> {
        let errors = field_errors
            .iter()
            .flat_map(|(field, reasons)| {
                reasons
                    .iter()
                    .map(move |reason| format!("{}: {}", field, reason))
            })
            .collect();

        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
            meta: None,
            errors: Some(errors),
            error: None,
            field_errors: Some(field_errors),
        }
    }
}

/// Record a rejection reason for `field`
pub fn push_field_error(errors: &mut FieldErrors, field: &str, reason: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(reason.into());
}

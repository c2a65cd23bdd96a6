use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Complaint status enum matching database enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "complaint_status")]
pub enum ComplaintStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Open,
        ComplaintStatus::InProgress,
        ComplaintStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "Open",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Closed => "Closed",
        }
    }

    /// Exact match on the stored literal
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complaint severity enum matching database enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "complaint_severity")]
pub enum ComplaintSeverity {
    Low,
    #[default]
    Medium,
    High,
}

impl ComplaintSeverity {
    pub const ALL: [ComplaintSeverity; 3] = [
        ComplaintSeverity::Low,
        ComplaintSeverity::Medium,
        ComplaintSeverity::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintSeverity::Low => "Low",
            ComplaintSeverity::Medium => "Medium",
            ComplaintSeverity::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for ComplaintSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for complaints
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Complaint {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub complaint_type: String,
    pub description: String,
    pub location: Option<String>,
    pub train_number: Option<String>,
    pub pnr_number: Option<String>,
    pub severity: ComplaintSeverity,
    pub date_of_incident: NaiveDate,
    pub status: ComplaintStatus,
    pub staff: Option<String>,
    pub staff_id: Option<i64>,
    pub filed_by: Option<i64>,
    pub photos: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Editable fields in request form, used as the base of a partial update
    pub fn to_field_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.complaint_type.clone()));
        map.insert("description".into(), Value::String(self.description.clone()));
        map.insert("location".into(), opt_string(&self.location));
        map.insert("train_number".into(), opt_string(&self.train_number));
        map.insert("pnr_number".into(), opt_string(&self.pnr_number));
        map.insert("severity".into(), Value::String(self.severity.to_string()));
        map.insert(
            "date_of_incident".into(),
            Value::String(self.date_of_incident.format("%Y-%m-%d").to_string()),
        );
        map.insert("status".into(), Value::String(self.status.to_string()));
        map.insert("staff".into(), opt_string(&self.staff));
        map.insert(
            "staff_id".into(),
            self.staff_id.map(Value::from).unwrap_or(Value::Null),
        );
        map.insert("photos".into(), opt_string(&self.photos));
        map
    }
}

fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

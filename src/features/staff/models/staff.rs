use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Staff availability, stored as the `staff_status` enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "staff_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::Inactive => "inactive",
            StaffStatus::OnLeave => "on-leave",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [Self::Active, Self::Inactive, Self::OnLeave]
            .into_iter()
            .find(|s| s.as_str() == value)
    }
}

/// Database model for staff members
#[derive(Debug, Clone, FromRow)]
pub struct Staff {
    pub id: i64,
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
    pub created_at: DateTime<Utc>,
}

impl Staff {
    /// Editable fields in request form, used as the base of a partial update
    pub fn to_field_map(&self) -> Map<String, Value> {
        let opt = |v: &Option<String>| v.clone().map(Value::String).unwrap_or(Value::Null);

        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert("email".into(), Value::String(self.email.clone()));
        map.insert("phone".into(), Value::String(self.phone.clone()));
        map.insert("role".into(), Value::String(self.role.clone()));
        map.insert("department".into(), Value::String(self.department.clone()));
        map.insert("location".into(), opt(&self.location));
        map.insert("status".into(), Value::String(self.status.as_str().into()));
        map.insert("avatar".into(), opt(&self.avatar));
        map.insert("expertise".into(), opt(&self.expertise));
        map.insert("languages".into(), opt(&self.languages));
        map
    }
}

/// Staff row with workload counts over assigned complaints
#[derive(Debug, Clone, FromRow)]
pub struct StaffWithStats {
    #[sqlx(flatten)]
    pub staff: Staff,
    /// Assigned complaints not yet Closed
    pub active_complaints: i64,
    /// Assigned complaints that are Closed
    pub resolved_complaints: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_literals() {
        assert_eq!(StaffStatus::parse("on-leave"), Some(StaffStatus::OnLeave));
        assert_eq!(StaffStatus::parse("OnLeave"), None);
        assert_eq!(
            serde_json::to_value(StaffStatus::OnLeave).unwrap(),
            Value::String("on-leave".into())
        );
        assert_eq!(StaffStatus::default(), StaffStatus::Active);
    }
}

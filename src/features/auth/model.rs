use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Principal attached to a request once its token has been resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
}

impl AuthenticatedUser {
    /// Staff users may manage complaints, personnel and the admin panel
    pub fn is_staff(&self) -> bool {
        self.is_staff
    }
}

/// Database model for users
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub gender: String,
    pub address: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", or `None` when both parts are blank
    pub fn full_name(&self) -> Option<String> {
        let full = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        (!full.is_empty()).then_some(full)
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone_number: String::new(),
            gender: String::new(),
            address: String::new(),
            password_hash: String::new(),
            is_staff: true,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user("Asha", "Rao").full_name().as_deref(), Some("Asha Rao"));
        assert_eq!(user("Asha", "").full_name().as_deref(), Some("Asha"));
        assert_eq!(user("", "").full_name(), None);
    }
}

//! Authorization guards.
//!
//! Anonymous requests are rejected with 401, authenticated users without the
//! staff flag with 403.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for staff-privileged endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireStaff(user): RequireStaff) { ... }
/// ```
pub struct RequireStaff(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

        if !user.is_staff() {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        Ok(RequireStaff(user.clone()))
    }
}

use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::BootstrapAdminConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthUserDto, LoginRequestDto, LoginResponseDto};
use crate::features::auth::model::{AuthenticatedUser, User};
use crate::features::auth::password::{hash_password, verify_password};

const USER_COLUMNS: &str = r#"
    id, username, email, first_name, last_name, phone_number, gender, address,
    password_hash, is_staff, is_active, created_at
"#;

/// Password login, opaque token issuance and token resolution
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Verify credentials and return the user's token (created on first login)
    pub async fn login(&self, dto: &LoginRequestDto) -> Result<LoginResponseDto> {
        let query = format!(
            "SELECT {} FROM users WHERE username = $1 AND is_active = TRUE",
            USER_COLUMNS
        );
        let user: Option<User> = sqlx::query_as(&query)
            .bind(&dto.username)
            .fetch_optional(&self.pool)
            .await?;

        let user = match user {
            Some(user) if verify_password(&dto.password, &user.password_hash) => user,
            _ => {
                debug!("Rejected login for username '{}'", dto.username);
                return Err(AppError::Unauthorized(
                    "Invalid username or password".to_string(),
                ));
            }
        };

        if !user.is_staff {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let token = self.get_or_create_token(user.id).await?;
        info!("User {} logged in", user.id);

        Ok(LoginResponseDto {
            token,
            user: AuthUserDto::from(&user),
        })
    }

    /// Resolve a token key into the principal it belongs to
    pub async fn resolve_token(&self, key: &str) -> Result<Option<AuthenticatedUser>> {
        let principal = sqlx::query_as::<_, (i64, String, bool)>(
            r#"
            SELECT u.id, u.username, u.is_staff
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = $1 AND u.is_active = TRUE
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .map(|(user_id, username, is_staff)| AuthenticatedUser {
            user_id,
            username,
            is_staff,
        });

        Ok(principal)
    }

    /// Return the user's token, creating one if none exists
    pub async fn get_or_create_token(&self, user_id: i64) -> Result<String> {
        let candidate = Uuid::new_v4().simple().to_string();

        // On conflict the existing row is returned unchanged
        let key: String = sqlx::query_scalar(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING key
            "#,
        )
        .bind(&candidate)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Create the configured administrator, or reset its password and privileges
    pub async fn ensure_bootstrap_admin(&self, config: &BootstrapAdminConfig) -> Result<()> {
        if config.password.len() < 8 {
            warn!("Bootstrap admin password is shorter than 8 characters");
        }
        let password_hash = hash_password(&config.password)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash, is_staff, is_active)
            VALUES ($1, $2, $3, TRUE, TRUE)
            ON CONFLICT (username) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                email = CASE WHEN EXCLUDED.email = '' THEN users.email ELSE EXCLUDED.email END,
                is_staff = TRUE,
                is_active = TRUE
            RETURNING id
            "#,
        )
        .bind(&config.username)
        .bind(&config.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Bootstrap admin '{}' ensured (id={})",
            config.username, id
        );
        Ok(())
    }
}

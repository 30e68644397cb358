//! Login and registration rules.

use subtle::ConstantTimeEq;

use super::{password, TokenService};
use crate::config::AdminCredentials;
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{LoginResponse, RegisterRequest, Role, User, UserSummary};

/// Reserved subject for tokens issued through the bypass credential.
pub const SUPER_ADMIN_ID: &str = "superadmin";
const SUPER_ADMIN_NAME: &str = "Super Admin";

/// Authenticates users and issues tokens.
pub struct AuthGate<'a> {
    pub repo: &'a Repository,
    pub tokens: &'a TokenService,
    pub admin: Option<&'a AdminCredentials>,
}

impl AuthGate<'_> {
    /// Check the bypass credential first, then the user store.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        if let Some(admin) = self.admin {
            if is_bypass(admin, email, password) {
                tracing::info!("Super admin login");
                let token = self.tokens.issue(SUPER_ADMIN_ID, Role::Admin)?;
                return Ok(LoginResponse {
                    token,
                    user: UserSummary {
                        id: SUPER_ADMIN_ID.to_string(),
                        username: SUPER_ADMIN_NAME.to_string(),
                        email: email.to_string(),
                        role: Role::Admin,
                    },
                });
            }
        }

        // Stored emails are trimmed on registration; the bypass above is not.
        let user = self
            .repo
            .find_user_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("User not found".to_string()))?;

        let submitted = password.to_string();
        let stored = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || password::verify_password(&submitted, &stored))
                .await?;
        if !matches {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.tokens.issue(&user.id, user.role)?;
        Ok(LoginResponse {
            token,
            user: UserSummary::from(&user),
        })
    }

    /// Public registration. The stored role is always `student`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AppError> {
        let username = request.username.trim();
        let email = request.email.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        if email.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        if self.repo.find_user_by_email(email).await?.is_some() {
            return Err(AppError::Duplicate("User already exists".to_string()));
        }

        let plain = request.password.clone();
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain)).await??;

        self.repo
            .create_user(username, email, &hash, Role::Student)
            .await
    }
}

fn is_bypass(admin: &AdminCredentials, email: &str, password: &str) -> bool {
    let email_ok: bool = email.as_bytes().ct_eq(admin.email.as_bytes()).into();
    let password_ok: bool = password.as_bytes().ct_eq(admin.password.as_bytes()).into();
    email_ok & password_ok
}

//! Token-based authentication.
//!
//! Login issues a signed token; admin routes are guarded by a middleware
//! that verifies the bearer token and its role claim.

mod gate;
mod password;
mod token;

pub use gate::*;
pub use token::*;

use std::sync::Arc;

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::models::Role;

/// Extract and verify the bearer token of a request.
fn bearer_claims(tokens: &TokenService, request: &Request) -> Result<Claims, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    tokens.verify(token.trim())
}

/// Require any valid token. Claims are stored as a request extension.
pub async fn require_token(tokens: Arc<TokenService>, mut request: Request, next: Next) -> Response {
    match bearer_claims(&tokens, &request) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Require a valid token carrying the `admin` role.
pub async fn require_admin(tokens: Arc<TokenService>, mut request: Request, next: Next) -> Response {
    match bearer_claims(&tokens, &request) {
        Ok(claims) if claims.role == Role::Admin => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Ok(claims) => {
            tracing::warn!("Rejected {} token for {}", claims.role.as_str(), request.uri());
            AppError::Forbidden("Admin role required".to_string()).into_response()
        }
        Err(e) => e.into_response(),
    }
}

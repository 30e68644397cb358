//! Registration and login endpoints.

use axum::extract::State;
use axum::{Extension, Json};

use super::{created, success, ApiResult, CreatedResult, MessageResponse};
use crate::auth::{AuthGate, Claims};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest};
use crate::AppState;

fn gate(state: &AppState) -> AuthGate<'_> {
    AuthGate {
        repo: &state.repo,
        tokens: &state.tokens,
        admin: state.config.admin.as_ref(),
    }
}

/// POST /api/auth/register - Create a student account.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> CreatedResult<MessageResponse> {
    let user = gate(&state).register(&request).await?;
    tracing::info!(id = %user.id, "User registered");
    created(MessageResponse::new("User registered successfully"))
}

/// POST /api/auth/login - Authenticate and issue a token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    success(gate(&state).login(&request.email, &request.password).await?)
}

/// GET /api/auth/me - Claims of the presented token.
pub async fn current_user(Extension(claims): Extension<Claims>) -> ApiResult<Claims> {
    success(claims)
}

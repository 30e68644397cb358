//! University API endpoints.

use axum::extract::{Path, State};
use axum::Json;

use super::{created, success, ApiResult, CreatedResult, MessageResponse};
use crate::errors::AppError;
use crate::models::{CreateUniversityRequest, University};
use crate::AppState;

/// GET /api/universities - List all universities.
pub async fn list_universities(State(state): State<AppState>) -> ApiResult<Vec<University>> {
    success(state.repo.list_universities().await?)
}

/// POST /api/universities - Register a university.
pub async fn create_university(
    State(state): State<AppState>,
    Json(request): Json<CreateUniversityRequest>,
) -> CreatedResult<University> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("University name is required".to_string()));
    }

    let university = state.repo.create_university(&request).await?;
    tracing::info!(id = %university.id, name = %university.name, "University created");
    created(university)
}

/// DELETE /api/universities/:id - Delete a university and its materials.
pub async fn delete_university(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let removed = state.repo.delete_university(&id).await?;
    tracing::info!(%id, materials = removed, "University deleted");

    success(MessageResponse {
        message: "University and associated materials deleted".to_string(),
        deleted_materials: Some(removed),
    })
}

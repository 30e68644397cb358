//! REST API module.
//!
//! Success bodies are the bare resource (or array of resources); failures
//! use the error envelope from [`crate::errors`].

mod auth;
mod materials;
mod universities;

pub use auth::*;
pub use materials::*;
pub use universities::*;

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;

/// Handler result: a JSON body on success, an error envelope otherwise.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Handler result for endpoints that answer `201 Created`.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_materials: Option<u64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            deleted_materials: None,
        }
    }
}

pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

pub fn created<T: Serialize>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(data)))
}

//! Study Vault catalog backend.
//!
//! Universities, study materials and accounts in SQLite, exposed over a small
//! REST API, plus the faceted navigation engine used to browse materials.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod facets;
pub mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenService;
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
        .route("/universities", get(api::list_universities))
        .route("/materials", get(api::list_materials))
        .route("/materials/facets", get(api::material_facets));

    let tokens = state.tokens.clone();
    let session_routes = Router::new()
        .route("/auth/me", get(api::current_user))
        .layer(middleware::from_fn(move |req, next| {
            auth::require_token(tokens.clone(), req, next)
        }));

    let tokens = state.tokens.clone();
    let admin_routes = Router::new()
        .route("/universities", post(api::create_university))
        .route("/universities/{id}", delete(api::delete_university))
        .route("/materials", post(api::create_material))
        .route("/materials/{id}", delete(api::delete_material))
        .layer(middleware::from_fn(move |req, next| {
            auth::require_admin(tokens.clone(), req, next)
        }));

    let api_routes = public_routes.merge(session_routes).merge(admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

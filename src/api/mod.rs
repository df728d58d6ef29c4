//! API module
//!
//! HTTP API endpoints and middleware.

pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::IdentityProvider;
use crate::store::LedgerStore;

pub use response::ApiResponse;
pub use routes::{create_protected_router, create_public_router};

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub identity: Arc<IdentityProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, identity: Arc<IdentityProvider>) -> Self {
        Self { store, identity }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Layers run last-added first: context -> logging -> auth -> handler
    let protected_routes = create_protected_router().route_layer(
        axum_middleware::from_fn_with_state(state.clone(), middleware::auth_middleware),
    );

    Router::new()
        // Health check (no auth)
        .route("/health", get(health_check))
        .merge(create_public_router())
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

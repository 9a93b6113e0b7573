//! Router assembly for the cash book HTTP surface.
//!
//! - `services.rs`: store and service wiring shared by every handler
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and small response helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router over a fresh in-memory store.
pub fn build_app(config: &ApiConfig) -> Router {
    build_app_with(Arc::new(AppServices::in_memory(config.stream_poll)))
}

/// Build the router over already-wired services.
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    // Everything except /health needs a caller identity.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::identity_middleware))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}

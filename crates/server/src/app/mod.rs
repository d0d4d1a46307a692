//! HTTP control plane (Axum router).
//!
//! - `routes/`: handlers, one file per area (control plane, subscription, system)
//! - `dto.rs`: form payloads
//! - `errors.rs`: the HTML error page returned on rejected requests

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;
use crate::services::AppServices;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router.
pub fn build_app(services: AppServices) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(Extension(services)),
        )
}

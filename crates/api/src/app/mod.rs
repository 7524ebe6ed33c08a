pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware::viewer_middleware;

pub use services::{build_services, build_services_with_store, AppServices};

pub fn build_app(services: Arc<AppServices>) -> Router {
    // Resource routes see the caller's identity; health checks do not.
    let api = routes::registry()
        .build()
        .layer(axum::middleware::from_fn(viewer_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

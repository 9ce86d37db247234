//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, response compression, CORS
//! for the browser client, and a request body limit.

use std::time::Duration;

use tower_http::cors::CorsLayer;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The browser runtime calls the API cross-origin with JSON bodies.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! This module provides route configuration and handlers for the circulating
//! supply server.

pub mod handlers;

use axum::{Router, middleware, routing::get};
use handlers::{circulating_supply_handler, health_handler};

use crate::{
    cache::ResponseCache,
    metrics::metrics_handler,
    middleware::{RateLimiter, rate_limiting_middleware, response_cache_middleware},
    openapi::{openapi_spec, swagger_ui},
    state::ServerState,
};

/// Create application routes
///
/// The supply endpoint is wrapped in the response cache (when `cache` is set)
/// and, outside of it, the rate limiter (when enabled).
pub fn create_routes(
    rate_limiter: RateLimiter,
    cache: Option<ResponseCache>,
) -> Router<ServerState> {
    // Health and metrics endpoints are not rate limited for monitoring purposes
    let health_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    // Documentation endpoints are not rate limited
    let docs_routes = Router::new()
        .route("/api-doc/openapi.json", get(openapi_spec))
        .route("/swagger-ui", get(swagger_ui));

    let mut supply_routes = Router::new().route("/", get(circulating_supply_handler));

    if let Some(cache) = cache {
        supply_routes = supply_routes.layer(middleware::from_fn_with_state(
            cache,
            response_cache_middleware,
        ));
    }

    // Added last so it runs first
    if rate_limiter.is_enabled() {
        supply_routes = supply_routes.layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limiting_middleware,
        ));
    }

    Router::new()
        .merge(health_routes)
        .merge(docs_routes)
        .merge(supply_routes)
}

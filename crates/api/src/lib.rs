// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Circulating Supply Server Implementation
//!
//! This crate provides the HTTP server reporting the circulating supply of a
//! multichain token, built with Axum and designed for production use with
//! hierarchical configuration, middleware, and graceful shutdown.
//!
//! # Module Structure
//!
//! - [`config`]: Server configuration and environment management with hierarchical loading
//! - [`error`]: Error types and HTTP response handling with proper status codes
//! - [`state`]: Shared application state holding the supply calculator
//! - [`server`]: Main server implementation, lifecycle, and coordinated shutdown
//! - [`routes`]: Route configuration and HTTP request handlers
//! - [`middleware`]: Per-client rate limiting and the response cache layer
//! - [`cache`]: Time-bounded cache of rendered responses
//! - [`metrics`]: Prometheus metrics and the metered balance client
//! - [`openapi`]: `OpenAPI` specification and Swagger UI endpoints for API documentation
//!
//! # Key Features
//!
//! - **Bounded Fan-out**: Balance lookups for every (address, chain) pair share one admission gate
//! - **Fault Tolerance**: Upstream errors contribute zero instead of failing the request
//! - **Response Caching**: Results are reused for the configured cache duration
//! - **Rate Limiting**: Per-client request limiting with a configurable window
//! - **Graceful Shutdown**: Coordinated termination using `CancellationToken` with timeouts

pub mod cache;
pub mod config;
pub mod docs;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, RateLimitSpec, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use routes::handlers::SupplyResponse;
pub use server::{Server, ShutdownConfig};
pub use shared_types::ChainId;
pub use state::{HealthCheck, ServerState};

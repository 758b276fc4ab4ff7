// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! This module provides error types for server operations, including HTTP
//! response mapping and error propagation.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use supply::SupplyError;
use thiserror::Error;

use crate::config::RateLimitSpec;

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Supply computation failed
    #[error(transparent)]
    Supply(#[from] SupplyError),

    /// A client exceeded its request allowance
    #[error("rate limit exceeded: {limit}")]
    RateLimited {
        /// The limit that was exceeded
        limit: RateLimitSpec,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. }
            | Self::Supply(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let json_body = match &self {
            // Endpoint-facing errors carry only the message
            ServerError::Supply(_) | ServerError::RateLimited { .. } => serde_json::json!({
                "error": self.to_string(),
            }),
            _ => serde_json::json!({
                "error": self.to_string(),
                "status": status.as_u16()
            }),
        };

        (status, Json(json_body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(error: ServerError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn supply_error_renders_message_only() {
        let (status, body) = body_json(ServerError::Supply(SupplyError::Overflow)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "error": "locked supply overflows a 256-bit integer" })
        );
    }

    #[tokio::test]
    async fn rate_limited_renders_429() {
        let (status, body) = body_json(ServerError::RateLimited {
            limit: RateLimitSpec::default(),
        })
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body,
            serde_json::json!({ "error": "rate limit exceeded: 5 per minute" })
        );
    }

    #[tokio::test]
    async fn config_error_includes_status() {
        let (status, body) = body_json(ServerError::Config {
            message: "bad".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
        assert_eq!(body["error"], "Configuration error: bad");
    }
}

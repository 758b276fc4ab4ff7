// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Generic balance API client traits and utilities
//!
//! This crate provides the abstraction the supply calculator fans out over,
//! designed for block-explorer style providers that report token balances
//! per (address, chain) pair.
//!
//! # Core Abstractions
//!
//! - **`BalanceClient` Trait**: Common interface for balance providers with async support
//! - **Health Check System**: Standardized health status reporting across all clients
//! - **Error Handling**: `ApiError` for failures a client cannot classify as a balance outcome
//! - **Data Types**: [`BalanceQuery`] and [`BalanceOutcome`]
//!
//! A client separates two kinds of failure. Answers the upstream gave us (a
//! non-200 status, an API-level error status) are reported as a
//! [`BalanceOutcome`] so callers can decide how to account for them.
//! Failures to obtain or understand an answer at all are [`ApiError`]s.

use thiserror::Error;

pub mod health;
pub mod types;

pub use health::*;
pub use types::*;

/// Generic trait for token balance API clients
pub trait BalanceClient: Send + Sync {
    /// Check the health of this API client
    ///
    /// # Errors
    ///
    /// Returns an error if the health check request cannot be performed
    fn health_check(&self) -> impl Future<Output = Result<HealthStatus, ApiError>> + Send;

    /// Get the token balance held by `query.address` on `query.chain_id`
    ///
    /// # Returns
    ///
    /// * `Ok(BalanceOutcome::Balance(_))` if the upstream reported a balance
    /// * `Ok(BalanceOutcome::ApiFailure { .. })` if the upstream answered with an error status
    /// * `Ok(BalanceOutcome::HttpFailure { .. })` if the upstream answered with a non-200 status
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or the response body
    /// could not be understood
    fn get_token_balance(
        &self,
        query: &BalanceQuery,
    ) -> impl Future<Output = Result<BalanceOutcome, ApiError>> + Send;

    /// Get the name/identifier of this API client
    fn name(&self) -> &'static str;
}

/// Common errors that can occur when working with API clients
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {message}")]
    Http { message: String },

    /// Invalid response format
    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

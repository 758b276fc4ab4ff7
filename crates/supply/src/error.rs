// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for supply computation

use api_client::ApiError;
use thiserror::Error;

/// Errors that abort a supply computation
#[derive(Debug, Error)]
pub enum SupplyError {
    /// A balance lookup failed before the upstream could answer
    #[error("balance request for {query} failed: {source}")]
    Upstream {
        /// The (address, chain) pair that failed
        query: String,
        /// Client error
        #[source]
        source: ApiError,
    },

    /// The sum of locked balances does not fit in 256 bits
    #[error("locked supply overflows a 256-bit integer")]
    Overflow,

    /// A balance task panicked or was aborted
    #[error("balance task failed: {source}")]
    TaskJoin {
        /// Underlying tokio join error
        #[from]
        source: tokio::task::JoinError,
    },

    /// The admission gate was closed while requests were being dispatched
    #[error("admission gate closed")]
    GateClosed,
}

/// Result type for supply computation
pub type SupplyResult<T> = Result<T, SupplyError>;

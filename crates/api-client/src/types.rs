// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Common data types for balance queries

use std::{fmt, sync::Arc};

use alloy_primitives::U256;
use shared_types::ChainId;

/// A single unit of upstream work: one address on one chain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BalanceQuery {
    /// Address whose token balance is requested
    pub address: Arc<str>,
    /// Chain to query
    pub chain_id: ChainId,
}

impl BalanceQuery {
    /// Create a new balance query
    pub fn new(address: impl Into<Arc<str>>, chain_id: ChainId) -> Self {
        Self {
            address: address.into(),
            chain_id,
        }
    }
}

impl fmt::Display for BalanceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on chain {}", self.address, self.chain_id)
    }
}

/// What the upstream answered for a [`BalanceQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceOutcome {
    /// Balance in token base units
    Balance(U256),
    /// The upstream answered 200 but reported an error status
    ApiFailure {
        /// Message reported by the upstream
        message: String,
    },
    /// The upstream answered with a non-200 HTTP status
    HttpFailure {
        /// HTTP status code
        status: u16,
    },
}

impl BalanceOutcome {
    /// Balance this outcome contributes to an aggregate; failures contribute zero
    pub fn contribution(&self) -> U256 {
        match self {
            Self::Balance(balance) => *balance,
            Self::ApiFailure { .. } | Self::HttpFailure { .. } => U256::ZERO,
        }
    }

    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Balance(_) => "ok",
            Self::ApiFailure { .. } => "api_error",
            Self::HttpFailure { .. } => "http_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_contribute_zero() {
        let ok = BalanceOutcome::Balance(U256::from(42u64));
        let api = BalanceOutcome::ApiFailure {
            message: "NOTOK".to_string(),
        };
        let http = BalanceOutcome::HttpFailure { status: 502 };

        assert_eq!(ok.contribution(), U256::from(42u64));
        assert_eq!(api.contribution(), U256::ZERO);
        assert_eq!(http.contribution(), U256::ZERO);

        assert_eq!(ok.label(), "ok");
        assert_eq!(api.label(), "api_error");
        assert_eq!(http.label(), "http_error");
    }

    #[test]
    fn query_display() {
        let query = BalanceQuery::new("0xabc", ChainId::ETHEREUM);
        assert_eq!(query.to_string(), "0xabc on chain 1");
    }
}

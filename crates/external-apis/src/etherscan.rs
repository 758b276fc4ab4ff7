// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Etherscan v2 multichain API integration
//!
//! This module provides an implementation of the `BalanceClient` trait for the
//! Etherscan v2 API, which serves ERC-20 token balances for any supported
//! chain from a single endpoint selected by the `chainid` query parameter.

use std::time::Duration;

use alloy_primitives::U256;
use api_client::{ApiError, BalanceClient, BalanceOutcome, BalanceQuery, HealthStatus};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared_types::ChainId;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use crate::{ApiKey, NonEmptyString};

/// Default Etherscan v2 endpoint
pub const DEFAULT_ETHERSCAN_BASE_URL: &str = "https://api.etherscan.io/v2/api";

/// Status value Etherscan uses for a successful call
const STATUS_OK: &str = "1";

/// Configuration for the Etherscan API client
#[derive(Debug, Clone)]
pub struct EtherscanConfig {
    /// Base URL for the Etherscan API
    pub base_url: Url,
    /// API key for authentication
    pub api_key: ApiKey,
    /// Token contract whose balances are queried
    pub contract_address: NonEmptyString,
    /// Chain the health check is sent to
    pub health_check_chain_id: ChainId,
    /// Health check timeout in seconds
    pub health_check_timeout_seconds: u64,
}

impl EtherscanConfig {
    /// Create a configuration against the default endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the API key or contract address is empty
    pub fn new(
        api_key: impl Into<String>,
        contract_address: impl Into<String>,
    ) -> Result<Self, EtherscanError> {
        let base_url = Url::parse(DEFAULT_ETHERSCAN_BASE_URL)
            .map_err(|e| EtherscanError::Config(format!("invalid default base URL: {e}")))?;

        Ok(Self {
            base_url,
            api_key: ApiKey::new(api_key).map_err(EtherscanError::Config)?,
            contract_address: NonEmptyString::new(contract_address)
                .map_err(|e| EtherscanError::Config(format!("contract address: {e}")))?,
            health_check_chain_id: ChainId::ETHEREUM,
            health_check_timeout_seconds: 5,
        })
    }

    /// Point the client at a different endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Send health checks to `chain_id`
    #[must_use]
    pub fn with_health_check_chain(mut self, chain_id: ChainId) -> Self {
        self.health_check_chain_id = chain_id;
        self
    }
}

/// Etherscan API client implementation
#[derive(Debug)]
pub struct EtherscanClient {
    client: Client,
    config: EtherscanConfig,
}

/// Errors specific to the Etherscan API client
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum EtherscanError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A success response carried a result that is not a token amount
    #[error("invalid balance in response: {0}")]
    InvalidBalance(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl From<EtherscanError> for ApiError {
    fn from(value: EtherscanError) -> Self {
        match value {
            EtherscanError::Http(error) => ApiError::Http {
                message: error.to_string(),
            },
            EtherscanError::Json(error) => ApiError::InvalidResponse {
                message: error.to_string(),
            },
            EtherscanError::InvalidBalance(message) => ApiError::InvalidResponse { message },
            EtherscanError::Config(message) => ApiError::Configuration { message },
            EtherscanError::Timeout { .. } => ApiError::Http {
                message: value.to_string(),
            },
        }
    }
}

/// Envelope of every Etherscan `module=account` response
#[derive(Debug, Deserialize)]
pub struct EtherscanResponse {
    /// `"1"` on success, `"0"` otherwise
    pub status: String,
    /// Short status message (`OK`, `NOTOK`, ...)
    pub message: Option<String>,
    /// Balance as a decimal string on success, error detail otherwise
    pub result: Option<serde_json::Value>,
}

impl EtherscanResponse {
    /// Whether Etherscan reported success
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Parse the `result` field as a token balance in base units
    ///
    /// A missing or null result counts as a zero balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not a non-negative integer
    pub fn balance(&self) -> Result<U256, EtherscanError> {
        match &self.result {
            None | Some(serde_json::Value::Null) => Ok(U256::ZERO),
            Some(serde_json::Value::String(raw)) => U256::from_str_radix(raw.trim(), 10)
                .map_err(|_| EtherscanError::InvalidBalance(raw.clone())),
            Some(serde_json::Value::Number(number)) => number
                .as_u64()
                .map(U256::from)
                .ok_or_else(|| EtherscanError::InvalidBalance(number.to_string())),
            Some(other) => Err(EtherscanError::InvalidBalance(other.to_string())),
        }
    }

    /// Error detail reported by Etherscan
    pub fn error_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

impl EtherscanClient {
    /// Create a new Etherscan API client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: EtherscanConfig) -> Result<Self, EtherscanError> {
        let client = Client::builder()
            .user_agent(concat!("circulating-supply/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EtherscanError::Http)?;

        Ok(Self { client, config })
    }

    /// Client configuration
    pub fn config(&self) -> &EtherscanConfig {
        &self.config
    }

    /// Fetch the token balance for a single (address, chain) pair
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a 200 response cannot be parsed
    pub async fn fetch_token_balance(
        &self,
        query: &BalanceQuery,
    ) -> Result<BalanceOutcome, EtherscanError> {
        let chain_id = query.chain_id.to_string();

        debug!(
            address = %query.address,
            chain_id = %query.chain_id,
            "fetching token balance from Etherscan"
        );

        let response = self
            .client
            .get(self.config.base_url.clone())
            .query(&[
                ("chainid", chain_id.as_str()),
                ("module", "account"),
                ("action", "tokenbalance"),
                ("contractaddress", self.config.contract_address.as_str()),
                ("address", query.address.as_ref()),
                ("tag", "latest"),
                ("apikey", self.config.api_key.expose()),
            ])
            .header("accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let parsed: EtherscanResponse = serde_json::from_str(&body)?;

                if parsed.is_ok() {
                    Ok(BalanceOutcome::Balance(parsed.balance()?))
                } else {
                    Ok(BalanceOutcome::ApiFailure {
                        message: parsed.error_message(),
                    })
                }
            }
            status => Ok(BalanceOutcome::HttpFailure {
                status: status.as_u16(),
            }),
        }
    }
}

impl BalanceClient for EtherscanClient {
    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let chain_id = self.config.health_check_chain_id.to_string();
        let seconds = self.config.health_check_timeout_seconds;

        debug!(chain_id, "performing health check on Etherscan API");

        let request = self
            .client
            .get(self.config.base_url.clone())
            .query(&[
                ("chainid", chain_id.as_str()),
                ("module", "proxy"),
                ("action", "eth_blockNumber"),
                ("apikey", self.config.api_key.expose()),
            ])
            .header("accept", "application/json");

        let start_time = std::time::Instant::now();
        let response = timeout(Duration::from_secs(seconds), request.send())
            .await
            .map_err(|_| EtherscanError::Timeout { seconds })?
            .map_err(EtherscanError::Http)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Etherscan API health check failed with status: {}", status);
            return Ok(HealthStatus::from_status_code(status.as_u16()));
        }

        // Etherscan reports bad keys and quota problems with HTTP 200
        let body: serde_json::Value = response.json().await.map_err(EtherscanError::Http)?;
        if body.get("status").and_then(serde_json::Value::as_str) == Some("0") {
            let reason = body
                .get("result")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            warn!(reason, "Etherscan API health check reported an error");
            return Ok(HealthStatus::Degraded { reason });
        }

        info!(
            "Etherscan API health check passed in {:?}",
            start_time.elapsed()
        );
        Ok(HealthStatus::Up)
    }

    async fn get_token_balance(&self, query: &BalanceQuery) -> Result<BalanceOutcome, ApiError> {
        Ok(self.fetch_token_balance(query).await?)
    }

    fn name(&self) -> &'static str {
        "etherscan"
    }
}

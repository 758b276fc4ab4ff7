// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! This module provides shared application state for the circulating supply
//! server: configuration and the supply calculator with its balance client.

use std::{collections::HashMap, sync::Arc};

use api_client::BalanceClient;
use external_apis::EtherscanClient;
use serde::{Deserialize, Serialize};
use supply::SupplyCalculator;
use tracing::warn;
use utoipa::ToSchema;

use crate::{
    config::{Environment, ServerConfig},
    metrics::MeteredClient,
};

/// Balance client used by the server
pub type UpstreamClient = MeteredClient<EtherscanClient>;

/// Supply calculator used by the server
pub type Calculator = SupplyCalculator<UpstreamClient>;

/// Shared application state
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// Supply calculator, shared so every request goes through the same admission gate
    calculator: Arc<Calculator>,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig, calculator: Arc<Calculator>) -> Self {
        Self {
            config: Arc::new(config),
            calculator,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Supply calculator
    pub fn calculator(&self) -> &Arc<Calculator> {
        &self.calculator
    }

    /// Perform health check operations
    ///
    /// The service stays up while the upstream is degraded; cached responses
    /// can still be served.
    pub async fn health_check(&self) -> HealthCheck {
        let client = self.calculator.client();
        let upstream = match client.health_check().await {
            Ok(status) => status,
            Err(e) => {
                warn!(client = client.name(), error = %e, "upstream health check failed");
                api_client::HealthStatus::Down {
                    reason: e.to_string(),
                }
            }
        };

        let status = match &upstream {
            api_client::HealthStatus::Up => HealthStatus::Up,
            degraded if degraded.is_available() => HealthStatus::Degraded {
                reason: Box::from(format!(
                    "{} upstream is degraded: {}",
                    client.name(),
                    degraded.description()
                )),
            },
            down => {
                warn!(
                    client = client.name(),
                    reason = down.description(),
                    "upstream is down, only cached responses can be served"
                );
                HealthStatus::Degraded {
                    reason: Box::from(format!(
                        "{} upstream is down: {}",
                        client.name(),
                        down.description()
                    )),
                }
            }
        };

        HealthCheck {
            status,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            api_version: self.config.api_version.clone().into_boxed_str(),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            api_clients: HashMap::from([(client.name().to_string(), upstream.into())]),
        }
    }
}

/// Health status of a service or dependency
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum HealthStatus {
    /// Service is fully operational and responding normally
    Up,

    /// Service is not operational or has critical failures
    Down {
        /// Human-readable explanation of why the service is down
        reason: Box<str>,
    },

    /// Service is operational but experiencing performance issues or partial failures
    Degraded {
        /// Human-readable explanation of the degradation condition
        reason: Box<str>,
    },
}

impl From<api_client::HealthStatus> for HealthStatus {
    fn from(status: api_client::HealthStatus) -> Self {
        match status {
            api_client::HealthStatus::Up => Self::Up,
            api_client::HealthStatus::Degraded { reason } => Self::Degraded {
                reason: reason.into_boxed_str(),
            },
            api_client::HealthStatus::Down { reason } => Self::Down {
                reason: reason.into_boxed_str(),
            },
        }
    }
}

/// Health check status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    /// Service status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// API version tag
    pub api_version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Status of individual API clients
    #[schema(value_type = Object)]
    pub api_clients: HashMap<String, HealthStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_conversion() {
        assert_eq!(
            HealthStatus::from(api_client::HealthStatus::Up),
            HealthStatus::Up
        );
        assert_eq!(
            HealthStatus::from(api_client::HealthStatus::Down {
                reason: "offline".to_string()
            }),
            HealthStatus::Down {
                reason: Box::from("offline")
            }
        );
    }

    #[test]
    fn health_status_serialization() {
        let json = serde_json::to_value(HealthStatus::Degraded {
            reason: Box::from("Rate limited"),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "Degraded": { "reason": "Rate limited" } })
        );
    }
}

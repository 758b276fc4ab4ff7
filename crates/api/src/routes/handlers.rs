// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module

use std::time::Instant;

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use supply::AggregateResult;
use tracing::error;
use utoipa::ToSchema;

use crate::{
    error::ServerError,
    metrics,
    state::{HealthCheck, ServerState},
};

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check endpoint",
    description = "Returns the current health status of the service including version, API version tag, environment and the status of the upstream balance API.",
    responses(
        (status = 200, description = "Service health report", body = HealthCheck)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.health_check().await)
}

/// Circulating supply of the token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplyResponse {
    /// Circulating supply: total supply minus locked supply
    #[schema(example = 750_000.0)]
    pub result: f64,
    /// Addresses whose balances were excluded from circulation
    #[schema(example = json!(["0x000000000000000000000000000000000000dead"]))]
    pub locked_addresses: Vec<String>,
    /// Sum of locked balances in whole tokens
    #[schema(example = 250_000.0)]
    pub locked_supply: f64,
}

impl From<AggregateResult> for SupplyResponse {
    fn from(result: AggregateResult) -> Self {
        Self {
            result: result.circulating_supply,
            locked_addresses: result.locked_addresses,
            locked_supply: result.locked_supply,
        }
    }
}

/// Error body of the supply endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// What went wrong
    pub error: String,
}

/// Circulating supply
///
/// Queries the balance of every locked address on every configured chain,
/// sums them, and subtracts the result from the total supply. Lookups the
/// upstream answers with an error count as zero.
///
/// # Errors
///
/// Returns `ServerError::Supply` if a balance lookup could not be performed.
#[utoipa::path(
    get,
    path = "/",
    tag = "supply",
    summary = "Get the circulating supply",
    description = "Returns total supply minus the balances held by the locked addresses across all configured chains. Responses are cached and requests are rate limited per client.",
    responses(
        (status = 200, description = "Circulating supply computed", body = SupplyResponse,
            headers(("x-cache" = String, description = "HIT when served from cache, MISS otherwise"))),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Supply computation failed", body = ErrorResponse)
    )
)]
pub async fn circulating_supply_handler(
    State(state): State<ServerState>,
) -> Result<Json<SupplyResponse>, ServerError> {
    let start = Instant::now();
    let computed = state.calculator().compute().await;
    let elapsed = start.elapsed().as_secs_f64();

    match computed {
        Ok(result) => {
            metrics::observe_compute_duration("ok", elapsed);
            metrics::update_supply_metrics(
                result.locked_supply,
                result.circulating_supply,
                result.defaulted(),
            );
            Ok(Json(SupplyResponse::from(result)))
        }
        Err(e) => {
            metrics::observe_compute_duration("error", elapsed);
            error!(error = %e, "circulating supply computation failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy_primitives::U256;

    use super::*;

    #[test]
    fn supply_response_field_order() {
        let response = SupplyResponse::from(AggregateResult {
            locked_supply_raw: U256::from(250_000u64),
            locked_supply: 250_000.0,
            circulating_supply: 750_000.0,
            locked_addresses: vec!["0xA".to_string(), "0xB".to_string()],
            queried: 2,
            api_failures: 0,
            http_failures: 0,
            elapsed: Duration::from_millis(5),
        });

        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"result":750000.0,"locked_addresses":["0xA","0xB"],"locked_supply":250000.0}"#
        );
    }
}

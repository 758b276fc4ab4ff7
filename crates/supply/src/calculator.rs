// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Supply calculator
//!
//! Fans balance lookups out over the cross product of locked addresses and
//! chains, bounded by a counting admission gate, and folds the answers into
//! an [`AggregateResult`].

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use alloy_primitives::U256;
use api_client::{BalanceClient, BalanceOutcome, BalanceQuery};
use shared_types::ChainId;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{SupplyError, SupplyResult};

/// Maximum number of upstream balance calls in flight at once
pub const MAX_IN_FLIGHT: usize = 5;

/// Token and address set a calculator works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyConfig {
    /// Total supply in whole tokens
    pub total_supply: u128,
    /// Addresses whose balances are excluded from circulation, in echo order
    pub locked_addresses: Vec<String>,
    /// Chains every locked address is queried on
    pub chain_ids: Vec<ChainId>,
    /// Number of decimals of the token
    pub token_decimals: u8,
}

impl SupplyConfig {
    /// Every (address, chain) pair to query, address-major
    pub fn queries(&self) -> Vec<BalanceQuery> {
        self.locked_addresses
            .iter()
            .flat_map(|address| {
                let address: Arc<str> = Arc::from(address.as_str());
                self.chain_ids
                    .iter()
                    .map(move |&chain_id| BalanceQuery::new(Arc::clone(&address), chain_id))
            })
            .collect()
    }
}

/// Result of one supply computation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Sum of locked balances in token base units
    pub locked_supply_raw: U256,
    /// Locked supply in whole tokens
    pub locked_supply: f64,
    /// Total supply minus locked supply
    pub circulating_supply: f64,
    /// Echo of the configured locked addresses
    pub locked_addresses: Vec<String>,
    /// Number of balance lookups performed
    pub queried: usize,
    /// Lookups answered with an API error status, counted as zero
    pub api_failures: usize,
    /// Lookups answered with a non-200 status, counted as zero
    pub http_failures: usize,
    /// Wall time of the computation
    pub elapsed: Duration,
}

impl AggregateResult {
    /// Lookups that did not produce a balance and were counted as zero
    pub fn defaulted(&self) -> usize {
        self.api_failures + self.http_failures
    }
}

/// Scale a raw base-unit amount to whole tokens
///
/// Floating point division; precision loss for very large sums is accepted.
pub fn scale_balance(raw: U256, decimals: u8) -> f64 {
    // Decimal digits always parse; values beyond f64 range become infinity
    let raw: f64 = raw.to_string().parse().unwrap_or(f64::INFINITY);
    raw / 10f64.powi(i32::from(decimals))
}

/// Computes circulating supply from locked balances
#[derive(Debug)]
pub struct SupplyCalculator<C> {
    config: SupplyConfig,
    client: Arc<C>,
    gate: Arc<Semaphore>,
    max_in_flight: usize,
}

impl<C> SupplyCalculator<C>
where
    C: BalanceClient + 'static,
{
    /// Create a calculator with the default admission gate size
    pub fn new(config: SupplyConfig, client: Arc<C>) -> Self {
        Self::with_max_in_flight(config, client, MAX_IN_FLIGHT)
    }

    /// Create a calculator admitting at most `max_in_flight` concurrent calls
    ///
    /// A value of zero is raised to one.
    pub fn with_max_in_flight(config: SupplyConfig, client: Arc<C>, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            config,
            client,
            gate: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    /// Calculator configuration
    pub fn config(&self) -> &SupplyConfig {
        &self.config
    }

    /// Balance client the calculator fans out over
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Size of the admission gate
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Compute locked and circulating supply from current balances
    ///
    /// Dispatch blocks once the admission gate is full. Each spawned lookup
    /// owns its permit and releases it when it finishes, whatever the
    /// outcome. Spawned lookups run to completion even if the returned
    /// future is dropped.
    ///
    /// # Errors
    ///
    /// Returns `SupplyError::Upstream` if a lookup could not be performed,
    /// `SupplyError::Overflow` if the locked balances overflow 256 bits, and
    /// `SupplyError::TaskJoin` if a lookup task panicked.
    pub async fn compute(&self) -> SupplyResult<AggregateResult> {
        let started = Instant::now();
        let queries = self.config.queries();
        let queried = queries.len();

        debug!(
            units = queried,
            max_in_flight = self.max_in_flight,
            "dispatching balance lookups"
        );

        let mut handles = Vec::with_capacity(queried);
        for query in queries {
            let permit = Arc::clone(&self.gate)
                .acquire_owned()
                .await
                .map_err(|_| SupplyError::GateClosed)?;
            let client = Arc::clone(&self.client);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = client.get_token_balance(&query).await;
                (query, outcome)
            }));
        }

        let mut locked_supply_raw = U256::ZERO;
        let mut api_failures = 0;
        let mut http_failures = 0;

        for handle in handles {
            let (query, outcome) = handle.await?;
            let outcome = outcome.map_err(|source| SupplyError::Upstream {
                query: query.to_string(),
                source,
            })?;

            match &outcome {
                BalanceOutcome::Balance(balance) => {
                    debug!(
                        address = %query.address,
                        chain_id = %query.chain_id,
                        %balance,
                        "balance fetched"
                    );
                }
                BalanceOutcome::ApiFailure { message } => {
                    api_failures += 1;
                    warn!(
                        address = %query.address,
                        chain_id = %query.chain_id,
                        chain = %query.chain_id.label(),
                        "Error for {} on chain {}: {}",
                        query.address,
                        query.chain_id,
                        message
                    );
                }
                BalanceOutcome::HttpFailure { status } => {
                    http_failures += 1;
                    warn!(
                        address = %query.address,
                        chain_id = %query.chain_id,
                        chain = %query.chain_id.label(),
                        "HTTP error for {} on chain {}: {}",
                        query.address,
                        query.chain_id,
                        status
                    );
                }
            }

            locked_supply_raw = locked_supply_raw
                .checked_add(outcome.contribution())
                .ok_or(SupplyError::Overflow)?;
        }

        let locked_supply = scale_balance(locked_supply_raw, self.config.token_decimals);
        #[allow(clippy::cast_precision_loss)]
        let circulating_supply = self.config.total_supply as f64 - locked_supply;

        let result = AggregateResult {
            locked_supply_raw,
            locked_supply,
            circulating_supply,
            locked_addresses: self.config.locked_addresses.clone(),
            queried,
            api_failures,
            http_failures,
            elapsed: started.elapsed(),
        };

        info!(
            queried,
            defaulted = result.defaulted(),
            locked_supply,
            circulating_supply,
            elapsed_ms = u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
            "circulating supply computed"
        );

        Ok(result)
    }
}

// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros,
//! a [`MeteredClient`] wrapper that records every upstream balance call, and
//! an Axum-compatible metrics handler.

use std::{sync::LazyLock, time::Instant};

use api_client::{ApiError, BalanceClient, BalanceOutcome, BalanceQuery, HealthStatus};
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use prometheus::{
    Encoder, Gauge, HistogramVec, IntCounter, IntCounterVec, TextEncoder, register_gauge,
    register_histogram_vec, register_int_counter, register_int_counter_vec,
};
use shared_types::ChainId;
use tracing::error;

/// Upstream balance calls, labeled by provider, chain and outcome.
pub static UPSTREAM_CALLS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "circulating_supply_upstream_calls_total",
        "Total number of upstream balance calls, labeled by provider, chain_id and outcome",
        &["provider", "chain_id", "outcome"]
    )
    .expect("Failed to create circulating_supply_upstream_calls_total counter vec")
});

/// Histogram for upstream balance call durations in seconds.
pub static UPSTREAM_CALL_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "circulating_supply_upstream_call_duration",
        "Upstream balance call durations in seconds",
        &["provider", "outcome"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create upstream call duration histogram")
});

/// Histogram for full supply computations in seconds.
pub static COMPUTE_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "circulating_supply_compute_duration",
        "Supply computation durations in seconds",
        &["result"],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    )
    .expect("Failed to create compute duration histogram")
});

/// Balance lookups that were counted as zero in the last computation
pub static DEFAULTED_UNITS: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(
        "circulating_supply_defaulted_units",
        "Balance lookups counted as zero in the last computation"
    )
    .expect("Failed to create defaulted units gauge")
});

/// Response cache hit/miss counters
pub static CACHE_OPERATIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "circulating_supply_cache_operations_total",
        "Total number of response cache operations",
        &["operation"]
    )
    .expect("Failed to create cache operations counter vec")
});

/// Cache size gauge
pub static CACHE_SIZE: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(
        "circulating_supply_cache_entries_count",
        "Current number of entries in the response cache"
    )
    .expect("Failed to create cache size gauge")
});

/// Last computed locked supply
pub static LOCKED_SUPPLY: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(
        "circulating_supply_locked_supply",
        "Locked supply from the last successful computation"
    )
    .expect("Failed to create locked supply gauge")
});

/// Last computed circulating supply
pub static CIRCULATING_SUPPLY: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(
        "circulating_supply_circulating_supply",
        "Circulating supply from the last successful computation"
    )
    .expect("Failed to create circulating supply gauge")
});

/// Requests rejected by the rate limiter
pub static RATE_LIMITED_REQUESTS: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "circulating_supply_rate_limited_requests_total",
        "Total number of requests rejected by the rate limiter"
    )
    .expect("Failed to create rate limited requests counter")
});

/// Record one upstream balance call
///
/// # Arguments
/// * `provider` - The name of the balance API
/// * `chain_id` - The chain that was queried
/// * `outcome` - `ok`, `api_error`, `http_error` or `transport_error`
/// * `duration_secs` - The duration of the call in seconds
pub fn observe_upstream_call(provider: &str, chain_id: ChainId, outcome: &str, duration_secs: f64) {
    let chain_id = chain_id.to_string();
    UPSTREAM_CALLS
        .with_label_values(&[provider, chain_id.as_str(), outcome])
        .inc();
    UPSTREAM_CALL_DURATION
        .with_label_values(&[provider, outcome])
        .observe(duration_secs);
}

/// Observe the duration of a supply computation
pub fn observe_compute_duration(result: &str, duration_secs: f64) {
    COMPUTE_DURATION
        .with_label_values(&[result])
        .observe(duration_secs);
}

/// Update the gauges describing the last successful computation
#[allow(clippy::cast_precision_loss)]
pub fn update_supply_metrics(locked_supply: f64, circulating_supply: f64, defaulted: usize) {
    LOCKED_SUPPLY.set(locked_supply);
    CIRCULATING_SUPPLY.set(circulating_supply);
    DEFAULTED_UNITS.set(defaulted as f64);
}

/// Record cache operation metrics
///
/// # Arguments
/// * `operation` - The cache operation (hit, miss, store, expired)
pub fn record_cache_operation(operation: &str) {
    CACHE_OPERATIONS.with_label_values(&[operation]).inc();
}

/// Update the cache size gauge
#[allow(clippy::cast_precision_loss)]
pub fn update_cache_size(entry_count: usize) {
    CACHE_SIZE.set(entry_count as f64);
}

/// Count a request rejected by the rate limiter
pub fn inc_rate_limited() {
    RATE_LIMITED_REQUESTS.inc();
}

/// Balance client wrapper recording call counts and latencies
#[derive(Debug)]
pub struct MeteredClient<C> {
    inner: C,
}

impl<C> MeteredClient<C> {
    /// Wrap `inner`
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: BalanceClient> BalanceClient for MeteredClient<C> {
    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        self.inner.health_check().await
    }

    async fn get_token_balance(&self, query: &BalanceQuery) -> Result<BalanceOutcome, ApiError> {
        let start = Instant::now();
        let outcome = self.inner.get_token_balance(query).await;

        let label = match &outcome {
            Ok(outcome) => outcome.label(),
            Err(_) => "transport_error",
        };
        observe_upstream_call(
            self.inner.name(),
            query.chain_id,
            label,
            start.elapsed().as_secs_f64(),
        );

        outcome
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Axum handler that exports metrics in Prometheus text format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

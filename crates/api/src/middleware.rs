// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Middleware module for HTTP request processing
//!
//! This module provides per-client rate limiting and response caching for
//! the circulating supply endpoint. Rate limiting runs first, so rejected
//! requests never reach the cache or the supply computation.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    body::{Body, to_bytes},
    extract::{ConnectInfo, State},
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tracing::{debug, error, warn};

use crate::{
    cache::{CACHE_STATUS_HEADER, CachedResponse, ResponseCache},
    config::RateLimitingConfig,
    error::ServerError,
    metrics,
};

// Rate limiting constants
const MAX_RATE_LIMIT_ENTRIES: usize = 10_000;

/// Largest response body the cache will buffer
const MAX_CACHED_BODY_BYTES: usize = 1024 * 1024;

/// Rate limiting middleware state
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitingConfig,
    // Lock-free concurrent rate limiting using DashMap
    requests: Arc<DashMap<IpAddr, RequestCounter>>,
}

#[derive(Debug, Clone)]
struct RequestCounter {
    count: u32,
    window_start: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration
    pub fn new(config: RateLimitingConfig) -> Self {
        Self {
            config,
            requests: Arc::new(DashMap::new()),
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Rate limiter configuration
    pub fn config(&self) -> &RateLimitingConfig {
        &self.config
    }

    /// Check if a request from the given IP should be rate limited
    pub fn is_rate_limited(&self, ip: IpAddr) -> bool {
        if !self.config.enabled {
            return false;
        }

        let now = Instant::now();
        let window_duration = self.config.limit.window();

        // Periodically clean up expired entries to prevent memory leaks
        if self.requests.len() > MAX_RATE_LIMIT_ENTRIES {
            self.cleanup_expired_entries(now, window_duration);
        }

        let current_count = self
            .requests
            .entry(ip)
            .and_modify(|counter| {
                if now.duration_since(counter.window_start) >= window_duration {
                    // Reset window
                    counter.count = 1;
                    counter.window_start = now;
                } else {
                    counter.count = counter.count.saturating_add(1);
                }
            })
            .or_insert_with(|| RequestCounter {
                count: 1,
                window_start: now,
            })
            .count;

        if current_count > self.config.limit.requests() {
            debug!("rate limiting IP: {} ({} requests)", ip, current_count);
            true
        } else {
            false
        }
    }

    /// Clean up expired entries using efficient retain operation
    fn cleanup_expired_entries(&self, now: Instant, window_duration: Duration) {
        let entries_before = self.requests.len();

        self.requests
            .retain(|_, counter| now.duration_since(counter.window_start) < window_duration);

        let entries_after = self.requests.len();
        let cleaned_up = entries_before.saturating_sub(entries_after);

        if cleaned_up > 0 {
            debug!("cleaned up {} expired rate limiter entries", cleaned_up);
        }

        // If still too many entries, remove oldest ones
        if entries_after > MAX_RATE_LIMIT_ENTRIES {
            warn!(
                "rate limiter still has {} entries after cleanup, removing oldest",
                entries_after
            );

            let mut oldest_entries: Vec<_> = self
                .requests
                .iter()
                .map(|entry| (*entry.key(), entry.value().window_start))
                .collect();

            oldest_entries.sort_by_key(|(_, window_start)| *window_start);

            let entries_to_remove = entries_after - MAX_RATE_LIMIT_ENTRIES / 2;
            for (ip, _) in oldest_entries.into_iter().take(entries_to_remove) {
                self.requests.remove(&ip);
            }
        }
    }
}

/// Rate limiting middleware function
///
/// Requires the router to be served with connection info
/// (`into_make_service_with_connect_info::<SocketAddr>()`).
pub async fn rate_limiting_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(rate_limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let client_ip = addr.ip();

    if rate_limiter.is_rate_limited(client_ip) {
        warn!("Rate limit exceeded for IP: {}", client_ip);
        metrics::inc_rate_limited();
        return Err(ServerError::RateLimited {
            limit: rate_limiter.config.limit,
        });
    }

    Ok(next.run(req).await)
}

/// Response caching middleware function
///
/// Serves `GET` requests from the cache while the stored response is fresh.
/// Only `200 OK` responses are stored; errors always reach the handler again.
pub async fn response_cache_middleware(
    State(cache): State<ResponseCache>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let key = ResponseCache::key_for(req.uri().path());
    if let Some(cached) = cache.get(&key) {
        return cached.to_response("HIT");
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, key, "failed to buffer response for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    cache.store(
        key,
        CachedResponse::new(
            parts.status,
            parts.headers.get(header::CONTENT_TYPE).cloned(),
            bytes.clone(),
        ),
    );

    let miss = HeaderValue::from_static("MISS");
    parts.headers.insert(CACHE_STATUS_HEADER, miss);
    Response::from_parts(parts, Body::from(bytes))
}

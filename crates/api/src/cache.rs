// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory response cache
//!
//! Successful responses are stored as raw bytes so a cache hit replays the
//! exact body that was computed, until the entry's lifetime runs out.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::metrics;

/// Header reporting whether a response was served from cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Namespace of cache keys
const KEY_PREFIX: &str = "circulating_supply";

/// A stored response
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Response status
    pub status: StatusCode,
    /// Content type of the body, if any
    pub content_type: Option<HeaderValue>,
    /// Response body
    pub body: Bytes,
    /// When this response was cached
    pub cached_at: Instant,
}

impl CachedResponse {
    /// Capture a response body
    pub fn new(status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) -> Self {
        Self {
            status,
            content_type,
            body,
            cached_at: Instant::now(),
        }
    }

    /// Check if this cached response is still valid
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }

    /// Build a response carrying `cache_status` in the cache status header
    pub fn to_response(&self, cache_status: &'static str) -> Response {
        let mut response = (self.status, Body::from(self.body.clone())).into_response();
        let headers = response.headers_mut();
        if let Some(content_type) = &self.content_type {
            headers.insert(header::CONTENT_TYPE, content_type.clone());
        }
        headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static(cache_status));
        response
    }
}

/// Concurrent response cache with a fixed entry lifetime
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<String, CachedResponse>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Cache key for a request path
    pub fn key_for(path: &str) -> String {
        format!("{KEY_PREFIX}:{path}")
    }

    /// Lifetime of cached entries
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached response, dropping it if it has expired
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let stale = match self.entries.get(key) {
            Some(cached) if cached.is_valid(self.ttl) => {
                metrics::record_cache_operation("hit");
                trace!(key, "response cache hit");
                return Some(cached.clone());
            }
            Some(_) => true,
            None => false,
        };

        if stale && self.remove_expired(key) {
            metrics::record_cache_operation("expired");
            metrics::update_cache_size(self.entries.len());
            debug!(key, "expired response cache entry removed");
        }

        metrics::record_cache_operation("miss");
        None
    }

    /// Remove the entry under `key` if it has outlived the cache lifetime
    ///
    /// The check runs under the shard lock, so an entry stored after the
    /// caller's read is kept.
    fn remove_expired(&self, key: &str) -> bool {
        self.entries
            .remove_if(key, |_, cached| !cached.is_valid(self.ttl))
            .is_some()
    }

    /// Store a response under `key`, replacing any previous entry
    pub fn store(&self, key: String, response: CachedResponse) {
        trace!(key = %key, bytes = response.body.len(), "storing response in cache");
        self.entries.insert(key, response);
        metrics::record_cache_operation("store");
        metrics::update_cache_size(self.entries.len());
    }

    /// Number of cached entries, including expired ones not yet removed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

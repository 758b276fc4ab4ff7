// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Health check types and utilities for API clients

use serde::{Deserialize, Serialize};

/// Health status of an API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum HealthStatus {
    /// Service is healthy and operational
    Up,
    /// Service is degraded but still functional
    Degraded { reason: String },
    /// Service is down and not functional
    Down { reason: String },
}

impl HealthStatus {
    /// Check if this health status indicates the service is available
    pub fn is_available(&self) -> bool {
        matches!(self, HealthStatus::Up | HealthStatus::Degraded { .. })
    }

    /// Classify the HTTP status of a health check response
    pub fn from_status_code(status: u16) -> Self {
        match status {
            200..=299 => HealthStatus::Up,
            401 | 403 => HealthStatus::Down {
                reason: "Authentication failed".to_string(),
            },
            429 => HealthStatus::Degraded {
                reason: "Rate limited".to_string(),
            },
            500..=599 => HealthStatus::Down {
                reason: format!("API returned status {status}"),
            },
            _ => HealthStatus::Degraded {
                reason: format!("API returned status {status}"),
            },
        }
    }

    /// Get a human-readable description of the status
    pub fn description(&self) -> &str {
        match self {
            HealthStatus::Up => "Service is healthy",
            HealthStatus::Degraded { reason } | HealthStatus::Down { reason } => reason,
        }
    }
}

// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! External API integrations for token balance providers
//!
//! This crate provides implementations of the `BalanceClient` trait for
//! block-explorer services that report ERC-20 token balances.
//!
//! # Architecture
//!
//! - **Client Implementations**: [`etherscan`] - Etherscan v2 multichain API
//! - **Validation Utilities**: [`non_empty_string::NonEmptyString`] and
//!   [`non_empty_string::ApiKey`] for configuration values
//!
//! Clients report upstream answers (success, API-level error, HTTP error) as
//! a `BalanceOutcome` and never retry; transport failures surface as errors.
//! Test coverage uses wiremock for HTTP simulation.

pub mod etherscan;
pub mod non_empty_string;

pub use etherscan::*;
pub use non_empty_string::{ApiKey, NonEmptyString};

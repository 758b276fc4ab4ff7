// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Circulating supply aggregation
//!
//! [`SupplyCalculator`] fans a token balance lookup out over every
//! (locked address, chain) pair, sums the balances, scales them by the token
//! decimals and subtracts the result from the configured total supply.
//!
//! At most [`MAX_IN_FLIGHT`] upstream calls run at once. The admission gate
//! belongs to the calculator, so every request served by the same calculator
//! shares it.
//!
//! Upstream answers that are not a balance (an API error status or a
//! non-200 response) count as a zero balance and are logged as warnings.
//! Failures to reach or understand the upstream abort the computation with a
//! [`SupplyError`].

pub mod calculator;
pub mod error;

pub use calculator::{AggregateResult, MAX_IN_FLIGHT, SupplyCalculator, SupplyConfig, scale_balance};
pub use error::{SupplyError, SupplyResult};

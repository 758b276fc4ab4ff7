// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the circulating supply service
//!
//! This crate provides common types that are shared across multiple crates
//! in the workspace, avoiding circular dependencies.

pub mod chains;

pub use chains::{ChainId, ChainIdParseError};

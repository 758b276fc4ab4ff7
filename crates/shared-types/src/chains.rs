// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Blockchain chain identifiers
//!
//! The balance API is multichain and addresses chains by their numeric EVM
//! chain id, so [`ChainId`] accepts any non-zero id. A handful of well-known
//! chains also carry a human-readable name used in logs and metrics.

use std::{fmt, num::NonZeroU64, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Well-known chains, by numeric id, name and accepted aliases
const KNOWN_CHAINS: &[(u64, &str, &[&str])] = &[
    (1, "Ethereum", &["ETHEREUM", "ETH", "MAINNET"]),
    (10, "Optimism", &["OPTIMISM", "OP"]),
    (56, "BNB Smart Chain", &["BSC", "BNB"]),
    (137, "Polygon", &["POLYGON", "MATIC"]),
    (8453, "Base", &["BASE"]),
    (42161, "Arbitrum", &["ARBITRUM", "ARB"]),
    (43114, "Avalanche", &["AVALANCHE", "AVAX"]),
];

/// Numeric EVM chain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(NonZeroU64);

impl ChainId {
    /// Ethereum Mainnet - Chain ID: 1
    pub const ETHEREUM: Self = Self(NonZeroU64::MIN);

    /// Create a chain id from its numeric value
    ///
    /// # Errors
    ///
    /// Returns [`ChainIdParseError::Zero`] if `id` is zero.
    pub fn new(id: u64) -> Result<Self, ChainIdParseError> {
        match NonZeroU64::new(id) {
            Some(id) => Ok(Self(id)),
            None => Err(ChainIdParseError::Zero),
        }
    }

    /// Returns the numeric chain ID
    pub const fn chain_id(self) -> u64 {
        self.0.get()
    }

    /// Returns the human-readable name of the chain, if it is a well-known one
    pub fn name(self) -> Option<&'static str> {
        KNOWN_CHAINS
            .iter()
            .find(|(id, _, _)| *id == self.chain_id())
            .map(|(_, name, _)| *name)
    }

    /// Returns the name of the chain, or its numeric id for unknown chains
    pub fn label(self) -> String {
        self.name()
            .map_or_else(|| self.chain_id().to_string(), ToString::to_string)
    }

    fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.to_uppercase();
        KNOWN_CHAINS
            .iter()
            .find(|(_, _, aliases)| aliases.contains(&alias.as_str()))
            .and_then(|(id, _, _)| Self::new(*id).ok())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ChainIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // First try to parse as a numeric chain ID
        if let Ok(id) = s.parse::<u64>() {
            return Self::new(id);
        }

        // Fall back to parsing as a well-known chain name
        Self::from_alias(s).ok_or_else(|| ChainIdParseError::InvalidName(s.to_string()))
    }
}

impl TryFrom<u64> for ChainId {
    type Error = ChainIdParseError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<ChainId> for u64 {
    fn from(chain_id: ChainId) -> Self {
        chain_id.chain_id()
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.chain_id().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ChainIdVisitor;

        impl serde::de::Visitor<'_> for ChainIdVisitor {
            type Value = ChainId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "a non-zero chain ID, chain ID string (\"137\", \"1\", etc.), or well-known chain name"
                )
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                ChainId::new(value).map_err(|_| {
                    E::invalid_value(serde::de::Unexpected::Unsigned(value), &"a non-zero chain ID")
                })
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(value)
                    .ok()
                    .and_then(|value| ChainId::new(value).ok())
                    .ok_or_else(|| {
                        E::invalid_value(
                            serde::de::Unexpected::Signed(value),
                            &"a non-zero chain ID",
                        )
                    })
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                ChainId::from_str(value).map_err(|_| {
                    E::invalid_value(
                        serde::de::Unexpected::Str(value),
                        &"a numeric chain ID or well-known chain name",
                    )
                })
            }
        }

        deserializer.deserialize_any(ChainIdVisitor)
    }
}

/// Error type for chain ID parsing
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainIdParseError {
    /// Chain ID zero is reserved
    #[error("chain ID must be greater than 0")]
    Zero,
    /// Neither a number nor a known chain name
    #[error("invalid chain ID: {0:?} is neither a number nor a known chain name")]
    InvalidName(String),
}

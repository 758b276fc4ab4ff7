// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Validated string types for configuration values
//!
//! [`NonEmptyString`] makes empty configuration values unrepresentable, and
//! [`ApiKey`] wraps one for credentials so they never leak through `Debug` or
//! `Display` output.
//!
//! ```rust
//! use external_apis::{ApiKey, NonEmptyString};
//!
//! let contract = NonEmptyString::new("0xdac17f958d2ee523a2206206994597c13d831ec7").unwrap();
//! assert_eq!(contract.as_str(), "0xdac17f958d2ee523a2206206994597c13d831ec7");
//!
//! assert!(NonEmptyString::new("   ").is_err());
//!
//! let key = ApiKey::new("secret").unwrap();
//! assert_eq!(format!("{key:?}"), "ApiKey(***)");
//! assert_eq!(key.expose(), "secret");
//! ```

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};

/// A string that contains at least one non-whitespace character
///
/// Uses `Box<str>` internally; the value is immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyString(Box<str>);

impl NonEmptyString {
    /// Create a new `NonEmptyString` from any string-like input
    ///
    /// Surrounding whitespace is trimmed; configuration values coming from
    /// the environment routinely carry a stray newline or space.
    ///
    /// # Errors
    ///
    /// Returns a descriptive message if the string is empty or whitespace-only
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Err("String cannot be empty or whitespace-only".to_string())
        } else {
            Ok(NonEmptyString(trimmed.into()))
        }
    }

    /// Get a string slice of the contained value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NonEmptyString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for NonEmptyString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// Secret credential for an upstream API
///
/// `Debug` and `Display` are redacted; use [`ApiKey::expose`] where the raw
/// value has to go on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(NonEmptyString);

impl ApiKey {
    /// Create a new API key
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or whitespace-only
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        NonEmptyString::new(key)
            .map(Self)
            .map_err(|e| format!("API key: {e}"))
    }

    /// Raw key value
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration module
//!
//! This module provides configuration structures and logic for the circulating
//! supply server: the token and locked address set, the Etherscan upstream,
//! caching and rate limiting, and the HTTP listener.
//!
//! Configuration is read once at startup and is immutable afterwards.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};

use anyhow::{Result, anyhow, bail, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File, Map};
use external_apis::{ApiKey, DEFAULT_ETHERSCAN_BASE_URL, EtherscanConfig, NonEmptyString};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_with::{DeserializeFromStr, DisplayFromStr, PickFirst, SerializeDisplay, serde_as};
use shared_types::ChainId;
use supply::SupplyConfig;
use url::Url;

use crate::error::{ServerError, ServerResult};

/// Default response cache lifetime in seconds
pub const DEFAULT_CACHE_DURATION_SECONDS: u64 = 1790;

/// Default per-client rate limit
pub const DEFAULT_RATE_LIMIT: &str = "5 per minute";

/// Prefix of the environment variables configuring the HTTP listener
pub const SERVER_ENV_PREFIX: &str = "SERVER";

/// Variable selecting the environment and its configuration file
const SERVER_ENVIRONMENT_VAR: &str = "SERVER_ENVIRONMENT";

/// Set by the hosting platform, whose deployments carry no `.env` file
const HOSTED_DEPLOYMENT_VAR: &str = "VERCEL";

/// Keys never read from unprefixed variables, since shells and CI runners set them
const LISTENER_KEYS: [&str; 4] = ["host", "port", "timeout_seconds", "environment"];

/// A validated server port that ensures the value is appropriate for the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerPort {
    port: u16,
    environment: Environment,
}

impl ServerPort {
    /// Create a new `ServerPort`, ensuring it's valid for the given environment
    ///
    /// # Errors
    ///
    /// Returns an error if the port is 0 in non-testing environments
    pub fn new(port: u16, environment: Environment) -> Result<Self> {
        if port == 0 && environment != Environment::Testing {
            return Err(anyhow!("port cannot be 0 in non-testing environments"));
        }
        Ok(Self { port, environment })
    }

    /// Create a safe default port for development
    pub const fn default_development() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
        }
    }

    /// Create a safe testing port (port 0)
    pub const fn testing() -> Self {
        Self {
            port: 0,
            environment: Environment::Testing,
        }
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.port
    }
}

impl<'de> Deserialize<'de> for ServerPort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        // Validated during configuration loading once the environment is known
        Ok(Self {
            port,
            environment: Environment::Development,
        })
    }
}

/// A validated timeout duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Create a safe default timeout (30 seconds)
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(30))
    }

    /// Create a safe testing timeout (5 seconds)
    pub const fn testing() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Get the timeout value in seconds
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Requests allowed per client in a fixed time window
///
/// Parsed from strings such as `5 per minute`, `100/hour` or
/// `10 per 30 seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct RateLimitSpec {
    requests: u32,
    periods: u64,
    unit: RateLimitUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateLimitUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl RateLimitUnit {
    fn seconds(self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

impl FromStr for RateLimitUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "s" | "sec" | "second" | "seconds" => Ok(Self::Second),
            "m" | "min" | "minute" | "minutes" => Ok(Self::Minute),
            "h" | "hour" | "hours" => Ok(Self::Hour),
            "d" | "day" | "days" => Ok(Self::Day),
            other => bail!("unknown rate limit unit {other:?}"),
        }
    }
}

impl RateLimitSpec {
    /// Allow `requests` per `window` units
    ///
    /// # Errors
    ///
    /// Returns an error if `requests` is zero
    fn new(requests: u32, periods: u64, unit: RateLimitUnit) -> Result<Self> {
        ensure!(requests > 0, "rate limit must allow at least one request");
        ensure!(periods > 0, "rate limit window must be positive");
        Ok(Self {
            requests,
            periods,
            unit,
        })
    }

    /// Requests allowed per window
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Length of the window
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.periods.saturating_mul(self.unit.seconds()))
    }
}

impl Default for RateLimitSpec {
    fn default() -> Self {
        Self {
            requests: 5,
            periods: 1,
            unit: RateLimitUnit::Minute,
        }
    }
}

impl FromStr for RateLimitSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let spec = s.trim().to_lowercase();
        let (count, period) = spec
            .split_once('/')
            .or_else(|| spec.split_once(" per "))
            .ok_or_else(|| anyhow!("invalid rate limit {s:?}, expected e.g. \"5 per minute\""))?;

        let requests: u32 = count
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid request count in rate limit {s:?}: {e}"))?;

        let mut parts = period.split_whitespace();
        let (periods, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(unit), None, None) => (1, unit),
            (Some(periods), Some(unit), None) => (
                periods
                    .parse()
                    .map_err(|e| anyhow!("invalid window in rate limit {s:?}: {e}"))?,
                unit,
            ),
            _ => bail!("invalid rate limit window in {s:?}"),
        };

        Self::new(requests, periods, unit.parse()?)
    }
}

impl fmt::Display for RateLimitSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.periods == 1 {
            write!(f, "{} per {}", self.requests, self.unit.name())
        } else {
            write!(
                f,
                "{} per {} {}s",
                self.requests,
                self.periods,
                self.unit.name()
            )
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitingConfig {
    /// Whether rate limiting is applied
    pub enabled: bool,
    /// Requests allowed per client and window
    pub limit: RateLimitSpec,
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

/// Server configuration
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: IpAddr,
    /// Server port (validated for environment compatibility)
    pub port: ServerPort,
    /// Request timeout in seconds (validated range: 1-300)
    pub timeout_seconds: TimeoutSeconds,
    /// Environment type
    pub environment: Environment,
    /// Version tag reported by the health endpoint
    pub api_version: String,
    /// Total token supply in whole tokens
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub total_supply: u128,
    /// Token contract whose balances are summed
    pub contract_address: NonEmptyString,
    /// Addresses whose balances are excluded from circulation
    #[serde(deserialize_with = "deserialize_list")]
    pub locked_addresses: Vec<String>,
    /// Number of decimals of the token
    pub token_decimals: u8,
    /// Chains every locked address is queried on
    #[serde(deserialize_with = "deserialize_list")]
    pub chain_ids: Vec<ChainId>,
    /// Etherscan API key
    pub etherscan_api_key: ApiKey,
    /// Etherscan v2 endpoint
    pub etherscan_base_url: Url,
    /// Lifetime of cached responses in seconds, `0` disables caching
    pub cache_duration: u64,
    /// Requests allowed per client and window
    pub rate_limit: RateLimitSpec,
    /// Whether rate limiting is applied
    pub rate_limit_enabled: bool,
}

/// Accept either a sequence or a comma-separated string
///
/// Items are trimmed and empty items are dropped.
fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv<T> {
        List(Vec<T>),
        Csv(String),
    }

    match ListOrCsv::<T>::deserialize(deserializer)? {
        ListOrCsv::List(items) => Ok(items),
        ListOrCsv::Csv(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse::<T>()
                    .map_err(|e| de::Error::custom(format!("invalid list item {item:?}: {e}")))
            })
            .collect(),
    }
}

/// Variables of a `.env` file, empty when there is none
fn env_file_vars(
    file: Result<dotenvy::Iter<std::fs::File>, dotenvy::Error>,
) -> Result<Map<String, String>, ConfigError> {
    match file {
        Ok(entries) => entries
            .collect::<Result<Map<_, _>, _>>()
            .map_err(|e| ConfigError::Message(format!("invalid .env file: {e}"))),
        Err(e) if e.not_found() => Ok(Map::new()),
        Err(e) => Err(ConfigError::Message(format!("failed to read .env file: {e}"))),
    }
}

/// Process environment, skipping variables that are not valid unicode
fn process_vars() -> Map<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

impl ServerConfig {
    /// Create configuration from environment variables and optional configuration files
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Configuration file (config.json)
    /// 3. Environment-specific files (config.{env}.json)
    /// 4. Environment variables: token and upstream keys unprefixed (`TOTAL_SUPPLY`,
    ///    `CHAIN_IDS`, ...), listener keys with the `SERVER_` prefix (`SERVER_HOST`,
    ///    `SERVER_PORT`, `SERVER_TIMEOUT_SECONDS`, `SERVER_ENVIRONMENT`)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    ///
    /// Outside hosted deployments (`VERCEL` unset), variables from a `.env` file
    /// in the working directory or one of its parents are read first; variables
    /// set in the process environment take precedence over them.
    pub fn load() -> Result<Self, ConfigError> {
        let mut vars = if std::env::var_os(HOSTED_DEPLOYMENT_VAR).is_some() {
            Map::new()
        } else {
            env_file_vars(dotenvy::dotenv_iter())?
        };
        vars.extend(process_vars());
        Self::load_from(Some(vars))
    }

    /// Load configuration, reading variables from `vars` instead of the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load_from(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let vars = vars.unwrap_or_else(process_vars);
        let environment = vars
            .get(SERVER_ENVIRONMENT_VAR)
            .map(|env| env.trim().to_lowercase());

        // Listener keys only come from the prefixed source
        let domain_vars: Map<String, String> = vars
            .iter()
            .filter(|(key, _)| !LISTENER_KEYS.contains(&key.to_lowercase().as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let environment_name = environment.as_deref().unwrap_or("development");
        let mut builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("timeout_seconds", 30)?
            .set_default("environment", "development")?
            .set_default("api_version", "v1")?
            .set_default("total_supply", "0")?
            .set_default("locked_addresses", "")?
            .set_default("token_decimals", 18)?
            .set_default("chain_ids", "")?
            .set_default("etherscan_base_url", DEFAULT_ETHERSCAN_BASE_URL)?
            .set_default("cache_duration", DEFAULT_CACHE_DURATION_SECONDS)?
            .set_default("rate_limit", DEFAULT_RATE_LIMIT)?
            .set_default("rate_limit_enabled", true)?
            .add_source(File::with_name("config.json").required(false))
            .add_source(
                File::with_name(&format!("config.{environment_name}.json")).required(false),
            )
            // Values stay strings so large supplies and numeric-looking keys survive intact
            .add_source(
                ConfigEnv::default()
                    .try_parsing(false)
                    .source(Some(domain_vars)),
            )
            .add_source(
                ConfigEnv::with_prefix(SERVER_ENV_PREFIX)
                    .try_parsing(false)
                    .source(Some(vars)),
            );

        if let Some(environment) = environment {
            builder = builder.set_override("environment", environment)?;
        }

        let mut server_config: Self = builder.build()?.try_deserialize()?;

        // Fix the ServerPort to have the correct environment context
        server_config.port = ServerPort::new(server_config.port.value(), server_config.environment)
            .map_err(|e| ConfigError::Message(format!("invalid port configuration: {e}")))?;

        Ok(server_config)
    }

    /// Create configuration optimized for testing
    ///
    /// Listens on an OS-assigned port, caches with the default lifetime, and
    /// queries no locked addresses until the caller sets some.
    pub fn for_testing(
        contract_address: NonEmptyString,
        etherscan_api_key: ApiKey,
        etherscan_base_url: Url,
    ) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::testing(),
            timeout_seconds: TimeoutSeconds::testing(),
            environment: Environment::Testing,
            api_version: "v1".to_string(),
            total_supply: 0,
            contract_address,
            locked_addresses: Vec::new(),
            token_decimals: 18,
            chain_ids: vec![ChainId::ETHEREUM],
            etherscan_api_key,
            etherscan_base_url,
            cache_duration: DEFAULT_CACHE_DURATION_SECONDS,
            rate_limit: RateLimitSpec::default(),
            rate_limit_enabled: true,
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }

    /// Lifetime of cached responses, `None` when caching is disabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_duration > 0).then(|| Duration::from_secs(self.cache_duration))
    }

    /// Rate limiting settings
    pub fn rate_limiting(&self) -> RateLimitingConfig {
        RateLimitingConfig {
            enabled: self.rate_limit_enabled,
            limit: self.rate_limit,
        }
    }

    /// Token and address set for the supply calculator
    pub fn supply_config(&self) -> SupplyConfig {
        SupplyConfig {
            total_supply: self.total_supply,
            locked_addresses: self.locked_addresses.clone(),
            chain_ids: self.chain_ids.clone(),
            token_decimals: self.token_decimals,
        }
    }

    /// Etherscan client configuration
    ///
    /// Health checks go to the first configured chain.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the client configuration is invalid.
    pub fn etherscan_config(&self) -> ServerResult<EtherscanConfig> {
        let config = EtherscanConfig::new(
            self.etherscan_api_key.expose(),
            self.contract_address.as_str(),
        )
        .map_err(|e| ServerError::Config {
            message: e.to_string(),
        })?;

        Ok(config
            .with_base_url(self.etherscan_base_url.clone())
            .with_health_check_chain(
                self.chain_ids.first().copied().unwrap_or(ChainId::ETHEREUM),
            ))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}

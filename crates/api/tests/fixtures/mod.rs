// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Test fixtures for the circulating supply server
//!
//! Starts a server against a wiremock Etherscan and mounts balance answers
//! keyed by (address, chain).

use std::net::SocketAddr;

use api::{ChainId, RateLimitSpec, Server, ServerConfig, ShutdownConfig};
use external_apis::{ApiKey, NonEmptyString};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_CONTRACT: &str = "0x1234567890abcdef1234567890abcdef12345678";
pub const API_PATH: &str = "/v2/api";

/// Server configuration pointing at `mock_server`
pub fn config_for(mock_server: &MockServer) -> ServerConfig {
    let base_url = url::Url::parse(&format!("{}{API_PATH}", mock_server.uri())).unwrap();
    ServerConfig::for_testing(
        NonEmptyString::new(TEST_CONTRACT).unwrap(),
        ApiKey::new(TEST_API_KEY).unwrap(),
        base_url,
    )
}

/// Configuration of the worked example: 1,000,000 tokens, two locked
/// addresses, one chain, no decimals
pub fn worked_example_config(mock_server: &MockServer) -> ServerConfig {
    let mut config = config_for(mock_server);
    config.total_supply = 1_000_000;
    config.locked_addresses = vec!["0xA".to_string(), "0xB".to_string()];
    config.chain_ids = vec![ChainId::ETHEREUM];
    config.token_decimals = 0;
    config
}

/// Configuration with the given rate limit
pub fn with_rate_limit(mut config: ServerConfig, limit: &str) -> ServerConfig {
    config.rate_limit = limit.parse::<RateLimitSpec>().unwrap();
    config
}

/// Start a server and return its base URL
pub async fn start(config: ServerConfig) -> (String, CancellationToken) {
    let (addr, token): (SocketAddr, _) = Server::new(config, ShutdownConfig::default())
        .expect("Failed to create server")
        .run_for_testing()
        .await
        .expect("Failed to start test server");
    (format!("http://{addr}"), token)
}

/// Mount a balance lookup answering `template`, optionally expecting `calls`
pub async fn mount_balance(
    mock_server: &MockServer,
    address: &str,
    chain_id: ChainId,
    template: ResponseTemplate,
    calls: Option<u64>,
) {
    let mock = Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "tokenbalance"))
        .and(query_param("address", address))
        .and(query_param("chainid", chain_id.to_string()))
        .respond_with(template);

    match calls {
        Some(n) => mock.expect(n).mount(mock_server).await,
        None => mock.mount(mock_server).await,
    }
}

/// Mount the two locked balances of the worked example on Ethereum
pub async fn mount_worked_example(mock_server: &MockServer, calls: Option<u64>) {
    let chain_id = ChainId::ETHEREUM;
    mount_balance(mock_server, "0xA", chain_id, balance("200000"), calls).await;
    mount_balance(mock_server, "0xB", chain_id, balance("50000"), calls).await;
}

/// Successful balance answer
pub fn balance(raw: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "1",
        "message": "OK",
        "result": raw
    }))
}

/// API-level error answer
pub fn api_error(result: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "0",
        "message": "NOTOK",
        "result": result
    }))
}

/// Mount a healthy `eth_blockNumber` answer
pub async fn mount_healthy_node(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "eth_blockNumber"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x1234"
        })))
        .mount(mock_server)
        .await;
}

/// Mount an `eth_blockNumber` answer rejected with 429
pub async fn mount_limited_node(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "eth_blockNumber"))
        .respond_with(ResponseTemplate::new(429))
        .mount(mock_server)
        .await;
}

// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Etherscan API test fixtures
//!
//! Mounts wiremock responses for token balance lookups keyed by
//! (address, chain) so tests can describe the upstream as a table.

use serde_json::{Value, json};
use shared_types::ChainId;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_CONTRACT: &str = "0x1234567890abcdef1234567890abcdef12345678";
pub const API_PATH: &str = "/v2/api";

/// Etherscan mock responses
#[derive(Debug)]
pub struct EtherscanFixture;

impl EtherscanFixture {
    /// Base URL of the mocked API on `mock_server`
    pub fn base_url(mock_server: &MockServer) -> url::Url {
        url::Url::parse(&format!("{}{API_PATH}", mock_server.uri())).expect("valid mock URL")
    }

    /// Successful balance response body
    pub fn success_response(balance: &str) -> Value {
        json!({
            "status": "1",
            "message": "OK",
            "result": balance
        })
    }

    /// API-level error response body
    pub fn error_response(message: &str, result: &str) -> Value {
        json!({
            "status": "0",
            "message": message,
            "result": result
        })
    }

    /// Mount a balance lookup answering `template`
    pub async fn mount_balance(
        mock_server: &MockServer,
        address: &str,
        chain_id: ChainId,
        template: ResponseTemplate,
    ) {
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("module", "account"))
            .and(query_param("action", "tokenbalance"))
            .and(query_param("address", address))
            .and(query_param("chainid", chain_id.to_string()))
            .respond_with(template)
            .mount(mock_server)
            .await;
    }

    /// Mount a successful balance lookup
    pub async fn mount_success(
        mock_server: &MockServer,
        address: &str,
        chain_id: ChainId,
        balance: &str,
    ) {
        Self::mount_balance(
            mock_server,
            address,
            chain_id,
            ResponseTemplate::new(200).set_body_json(Self::success_response(balance)),
        )
        .await;
    }
}

// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the circulating supply endpoint

mod fixtures;

use std::time::Duration;

use api::{ChainId, SupplyResponse};
use axum::http::StatusCode;
use fixtures::{
    api_error, balance, config_for, mount_balance, mount_healthy_node, mount_limited_node,
    mount_worked_example, start, with_rate_limit, worked_example_config,
};
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};
use wiremock::{MockServer, ResponseTemplate};

#[tokio::test]
async fn worked_example() {
    let mock_server = MockServer::start().await;
    mount_worked_example(&mock_server, None).await;

    let (base, _token) = start(worked_example_config(&mock_server)).await;

    let response = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: SupplyResponse = response.json().await.unwrap();
    assert_eq!(body.result, 750_000.0);
    assert_eq!(body.locked_supply, 250_000.0);
    assert_eq!(body.locked_addresses, vec!["0xA", "0xB"]);
}

#[tokio::test]
async fn sums_every_chain_for_every_address() {
    let mock_server = MockServer::start().await;
    let polygon = ChainId::new(137).unwrap();
    let raw = "1000000000000000000000";
    for address in ["0xA", "0xB"] {
        for chain_id in [ChainId::ETHEREUM, polygon] {
            mount_balance(&mock_server, address, chain_id, balance(raw), Some(1)).await;
        }
    }

    let mut config = config_for(&mock_server);
    config.total_supply = 10_000;
    config.locked_addresses = vec!["0xA".to_string(), "0xB".to_string()];
    config.chain_ids = vec![ChainId::ETHEREUM, polygon];
    let (base, _token) = start(config).await;

    let body: Value = reqwest::get(format!("{base}/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["locked_supply"], json!(4000.0));
    assert_eq!(body["result"], json!(6000.0));
}

#[tokio::test]
async fn upstream_errors_count_as_zero() {
    let mock_server = MockServer::start().await;
    mount_balance(
        &mock_server,
        "0xA",
        ChainId::ETHEREUM,
        balance("200000"),
        None,
    )
    .await;
    mount_balance(
        &mock_server,
        "0xB",
        ChainId::ETHEREUM,
        api_error("Max rate limit reached"),
        None,
    )
    .await;

    let (base, _token) = start(worked_example_config(&mock_server)).await;

    let response = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: SupplyResponse = response.json().await.unwrap();
    assert_eq!(body.locked_supply, 200_000.0);
    assert_eq!(body.result, 800_000.0);
}

#[tokio::test]
async fn http_errors_count_as_zero() {
    let mock_server = MockServer::start().await;
    mount_balance(
        &mock_server,
        "0xA",
        ChainId::ETHEREUM,
        ResponseTemplate::new(502),
        None,
    )
    .await;
    mount_balance(
        &mock_server,
        "0xB",
        ChainId::ETHEREUM,
        balance("50000"),
        None,
    )
    .await;

    let (base, _token) = start(worked_example_config(&mock_server)).await;

    let body: SupplyResponse = reqwest::get(format!("{base}/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.locked_supply, 50_000.0);
    assert_eq!(body.result, 950_000.0);
}

#[tokio::test]
async fn unreachable_upstream_returns_error_body() {
    let mock_server = MockServer::start().await;
    let mut config = worked_example_config(&mock_server);
    config.locked_addresses = vec!["0xA".to_string()];
    config.etherscan_base_url = url::Url::parse("http://127.0.0.1:1/v2/api").unwrap();

    let (base, _token) = start(config).await;

    let response = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(
        object["error"]
            .as_str()
            .unwrap()
            .contains("0xA on chain 1")
    );
}

#[tokio::test]
async fn no_locked_addresses_reports_total_supply() {
    let mock_server = MockServer::start().await;
    let mut config = worked_example_config(&mock_server);
    config.locked_addresses.clear();

    let (base, _token) = start(config).await;

    let body: SupplyResponse = reqwest::get(format!("{base}/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.result, 1_000_000.0);
    assert_eq!(body.locked_supply, 0.0);
    assert!(body.locked_addresses.is_empty());
}

#[tokio::test]
async fn cached_response_is_replayed() {
    let mock_server = MockServer::start().await;
    mount_worked_example(&mock_server, Some(1)).await;

    let (base, _token) = start(worked_example_config(&mock_server)).await;
    let client = reqwest::Client::new();

    let first = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(first.headers()["x-cache"], "MISS");
    let first_body = first.bytes().await.unwrap();

    let second = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-cache"], "HIT");
    assert_eq!(second.bytes().await.unwrap(), first_body);

    mock_server.verify().await;
}

#[tokio::test]
async fn cached_response_expires() {
    let mock_server = MockServer::start().await;
    mount_worked_example(&mock_server, Some(2)).await;

    let mut config = worked_example_config(&mock_server);
    config.cache_duration = 1;
    let (base, _token) = start(config).await;
    let client = reqwest::Client::new();

    let first = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(first.headers()["x-cache"], "MISS");

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let second = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(second.headers()["x-cache"], "MISS");

    mock_server.verify().await;
}

#[tokio::test]
async fn failed_computation_is_not_cached() {
    let mock_server = MockServer::start().await;
    let mut config = worked_example_config(&mock_server);
    config.locked_addresses = vec!["0xA".to_string()];
    config.etherscan_base_url = url::Url::parse("http://127.0.0.1:1/v2/api").unwrap();

    let (base, _token) = start(config).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response = client.get(format!("{base}/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get("x-cache").is_none());
    }
}

#[tokio::test]
async fn disabled_cache_recomputes() {
    let mock_server = MockServer::start().await;
    mount_worked_example(&mock_server, Some(2)).await;

    let mut config = worked_example_config(&mock_server);
    config.cache_duration = 0;
    let (base, _token) = start(config).await;

    for _ in 0..2 {
        let response = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-cache").is_none());
    }

    mock_server.verify().await;
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let mock_server = MockServer::start().await;
    mount_worked_example(&mock_server, None).await;

    let config = with_rate_limit(worked_example_config(&mock_server), "2 per minute");
    let (base, _token) = start(config).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response = client.get(format!("{base}/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Rejected before the cache is consulted
    let response = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "error": "rate limit exceeded: 2 per minute" })
    );
}

#[tokio::test]
async fn rate_limit_does_not_apply_to_health() {
    let mock_server = MockServer::start().await;
    mount_healthy_node(&mock_server).await;

    let config = with_rate_limit(worked_example_config(&mock_server), "1 per minute");
    let (base, _token) = start(config).await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let response = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn disabled_rate_limit_allows_everything() {
    let mock_server = MockServer::start().await;
    mount_worked_example(&mock_server, None).await;

    let mut config = with_rate_limit(worked_example_config(&mock_server), "1 per minute");
    config.rate_limit_enabled = false;
    let (base, _token) = start(config).await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let response = client.get(format!("{base}/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn health_reports_upstream_status() {
    let mock_server = MockServer::start().await;
    mount_healthy_node(&mock_server).await;

    let (base, _token) = start(worked_example_config(&mock_server)).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!("Up"));
    assert_eq!(body["environment"], json!("testing"));
    assert_eq!(body["api_version"], json!("v1"));
    assert_eq!(body["api_clients"]["etherscan"], json!("Up"));
}

#[tokio::test]
async fn health_degrades_with_unreachable_upstream() {
    let mock_server = MockServer::start().await;
    let mut config = worked_example_config(&mock_server);
    config.etherscan_base_url = url::Url::parse("http://127.0.0.1:1/v2/api").unwrap();

    let (base, _token) = start(config).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let reason = body["status"]["Degraded"]["reason"].as_str().unwrap();
    assert!(reason.starts_with("etherscan upstream is down: "));
    assert!(body["api_clients"]["etherscan"]["Down"].is_object());
}

#[tokio::test]
async fn health_degrades_with_rate_limited_upstream() {
    let mock_server = MockServer::start().await;
    mount_limited_node(&mock_server).await;

    let (base, _token) = start(worked_example_config(&mock_server)).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["status"]["Degraded"]["reason"],
        json!("etherscan upstream is degraded: Rate limited")
    );
    assert_eq!(
        body["api_clients"]["etherscan"]["Degraded"]["reason"],
        json!("Rate limited")
    );
}

#[tokio::test]
async fn metrics_are_exported() {
    let mock_server = MockServer::start().await;
    mount_worked_example(&mock_server, None).await;

    let (base, _token) = start(worked_example_config(&mock_server)).await;
    let client = reqwest::Client::new();

    client.get(format!("{base}/")).send().await.unwrap();

    let response = client.get(format!("{base}/metrics")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text = response.text().await.unwrap();
    assert!(text.contains("circulating_supply_upstream_calls_total"));
    assert!(text.contains("circulating_supply_locked_supply"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let mock_server = MockServer::start().await;
    let (base, _token) = start(config_for(&mock_server)).await;

    let body: Value = reqwest::get(format!("{base}/api-doc/openapi.json"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["paths"]["/"].is_object());
}

#[tokio::test]
async fn request_id_is_propagated() {
    let mock_server = MockServer::start().await;
    mount_healthy_node(&mock_server).await;
    let (base, _token) = start(config_for(&mock_server)).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn stops_serving_after_cancellation() {
    let mock_server = MockServer::start().await;
    mount_healthy_node(&mock_server).await;
    let (base, token) = start(config_for(&mock_server)).await;

    assert_ok!(reqwest::get(format!("{base}/health")).await);

    token.cancel();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    assert_err!(client.get(format!("{base}/health")).send().await);
}

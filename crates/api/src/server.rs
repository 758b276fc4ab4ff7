// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server implementation module
//!
//! This module provides the main server struct and implementation for the
//! circulating supply server, including server lifecycle management, router
//! configuration, and coordinated graceful shutdown using `CancellationToken`.

use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, http::HeaderName};
use external_apis::EtherscanClient;
use hyper::Request;
use supply::SupplyCalculator;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, warn};

use crate::{
    cache::ResponseCache,
    config::ServerConfig,
    error::{ServerError, ServerResult},
    metrics::MeteredClient,
    middleware::RateLimiter,
    routes::create_routes,
    state::{Calculator, ServerState},
};

// Server constants
const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for server shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Maximum time to wait for in-flight requests once shutdown starts
    pub graceful_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS),
        }
    }
}

/// Main server struct
#[derive(Debug)]
pub struct Server {
    /// Server configuration
    config: ServerConfig,
    /// Application router
    router: Router,
    /// Server state
    state: ServerState,
    /// Cancellation token for coordinated shutdown
    cancellation_token: CancellationToken,
    /// Configuration for coordinated shutdown
    graceful_shutdown_config: ShutdownConfig,
}

impl Server {
    /// Create new server instance
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the configuration is invalid or the
    /// upstream client cannot be created.
    pub fn new(config: ServerConfig, shutdown_config: ShutdownConfig) -> ServerResult<Self> {
        let calculator = Self::create_calculator_from_config(&config)?;
        Ok(Self::with_calculator(config, shutdown_config, Arc::new(calculator)))
    }

    /// Create the supply calculator from server configuration
    fn create_calculator_from_config(config: &ServerConfig) -> ServerResult<Calculator> {
        let etherscan_config = config.etherscan_config()?;
        let client = EtherscanClient::new(etherscan_config).map_err(|e| ServerError::Config {
            message: format!("failed to create Etherscan client: {e}"),
        })?;

        info!(
            locked_addresses = config.locked_addresses.len(),
            chains = config.chain_ids.len(),
            token_decimals = config.token_decimals,
            "supply calculator configured"
        );

        let client = Arc::new(MeteredClient::new(client));
        Ok(SupplyCalculator::new(config.supply_config(), client))
    }

    /// Create server with a custom calculator for dependency injection
    pub fn with_calculator(
        config: ServerConfig,
        graceful_shutdown_config: ShutdownConfig,
        calculator: Arc<Calculator>,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let state = ServerState::new(config.clone(), calculator);
        let router = Self::create_router(state.clone());

        Self {
            config,
            router,
            state,
            cancellation_token,
            graceful_shutdown_config,
        }
    }

    /// Create application router with middleware
    fn create_router(state: ServerState) -> Router {
        let timeout_duration = state.config().timeout_seconds.value();

        let rate_limiter = RateLimiter::new(state.config().rate_limiting());
        let cache = state.config().cache_ttl().map(ResponseCache::new);

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                    if let Some(request_id) = req.headers().get(REQUEST_ID_HEADER) {
                        info_span!("http_request", ?request_id)
                    } else {
                        error!("failed to extract id from request");
                        info_span!("http_request", request_id = "unknown")
                    }
                }),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(timeout_duration));

        create_routes(rate_limiter, cache)
            .layer(middleware)
            .with_state(state)
    }

    /// Bind the configured address
    async fn bind(&self) -> ServerResult<(TcpListener, SocketAddr)> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                address: addr,
                source,
            })?;

        let actual_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Startup { source })?;

        Ok((listener, actual_addr))
    }

    /// Run the server with coordinated graceful shutdown
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address,
    /// or `ServerError::Startup` if the server fails to start.
    pub async fn run(self) -> ServerResult<()> {
        let (listener, actual_addr) = self.bind().await?;

        info!(
            address = %actual_addr,
            environment = %self.config.environment,
            api_version = %self.config.api_version,
            "circulating supply server starting",
        );

        let cancellation_token = self.cancellation_token.clone();
        let shutdown_token = cancellation_token.clone();
        tokio::spawn(async move {
            info!("spawning the graceful shutdown task");
            Self::shutdown_signal_handler(shutdown_token).await;
        });

        let graceful_token = cancellation_token.clone();
        let serve = axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            graceful_token.cancelled().await;
            info!("circulating supply server draining connections");
        });

        let graceful_timeout = self.graceful_shutdown_config.graceful_timeout;
        let server_result = tokio::select! {
            result = serve.into_future() => result,
            () = async {
                cancellation_token.cancelled().await;
                tokio::time::sleep(graceful_timeout).await;
            } => {
                warn!(
                    timeout_seconds = graceful_timeout.as_secs(),
                    "graceful shutdown timed out, dropping open connections"
                );
                Ok(())
            }
        };

        if let Err(e) = server_result {
            error!(error = ?e, "Server error during shutdown");
            Err(ServerError::Shutdown { source: e })
        } else {
            info!("circulating supply server shut down");
            Ok(())
        }
    }

    /// Handle shutdown signals and trigger coordinated cancellation
    ///
    /// This function listens for SIGINT (Ctrl+C) and SIGTERM signals,
    /// and cancels the provided cancellation token when received.
    async fn shutdown_signal_handler(cancellation_token: CancellationToken) {
        let signal_received = async {
            #[cfg(unix)]
            #[allow(clippy::expect_used)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                let mut sigterm =
                    signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
                let mut sigint =
                    signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

                tokio::select! {
                    _ = sigterm.recv() => {
                        warn!("Received SIGTERM signal, initiating coordinated shutdown");
                        "SIGTERM"
                    },
                    _ = sigint.recv() => {
                        warn!("Received SIGINT signal, initiating coordinated shutdown");
                        "SIGINT"
                    },
                }
            }

            #[cfg(not(unix))]
            #[allow(clippy::expect_used)]
            {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to install CTRL+C signal handler");
                warn!("Received CTRL+C signal, initiating coordinated shutdown");
                "CTRL+C"
            }
        };

        // Wait for either a signal or existing cancellation
        tokio::select! {
            signal_name = signal_received => {
                warn!("Shutdown signal {} received, cancelling all operations...", signal_name);
                cancellation_token.cancel();
            },
            () = cancellation_token.cancelled() => {
                warn!("Cancellation token already cancelled, shutdown signal handler exiting");
            }
        }
    }

    /// Returns a clone of the cancellation token for coordinated shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Initiates graceful shutdown by cancelling the server's cancellation token
    pub fn shutdown(&self) {
        info!("programmatic shutdown requested");
        self.cancellation_token.cancel();
    }

    /// Run server for testing, returns the bound address
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address.
    pub async fn run_for_testing(self) -> ServerResult<(SocketAddr, CancellationToken)> {
        let (listener, actual_addr) = self.bind().await?;

        let token = self.cancellation_token.child_token();
        let task = token.child_token();
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move { task.cancelled().await })
            .await;
        });

        Ok((actual_addr, token))
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get server state for testing
    pub fn state(&self) -> &ServerState {
        &self.state
    }
}

// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` document definition

use utoipa::OpenApi;

use crate::{
    config::Environment,
    routes::handlers::{self, ErrorResponse, SupplyResponse},
    state::{HealthCheck, HealthStatus},
};

/// `OpenAPI` document of the circulating supply API
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Circulating Supply API",
        description = "Circulating supply of a multichain token: total supply minus the balances held by locked addresses."
    ),
    paths(handlers::circulating_supply_handler, handlers::health_handler),
    components(schemas(SupplyResponse, ErrorResponse, HealthCheck, HealthStatus, Environment)),
    tags(
        (name = "supply", description = "Circulating supply computation"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (users, orders,
//!   notifications, stats, health)
//! - **Schemas**: request/response DTOs plus domain type wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that provide OpenAPI definitions
//!   without coupling domain types to the utoipa framework
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Escrow marketplace API",
        description = "Peer-to-peer escrow trading of digital assets: listings, buyer binding, \
                       status changes, notifications and trade statistics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::register_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_requisites,
        crate::inbound::http::users::list_user_orders,
        crate::inbound::http::users::list_notifications,
        crate::inbound::http::users::unread_notifications,
        crate::inbound::http::orders::create_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::join_order,
        crate::inbound::http::orders::update_status,
        crate::inbound::http::orders::get_role,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::stats::get_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "users", description = "Identity resolution, profiles and requisites"),
        (name = "orders", description = "Listing, joining and driving escrow orders"),
        (name = "notifications", description = "Per-user notification queue"),
        (name = "stats", description = "Marketplace-wide counters"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

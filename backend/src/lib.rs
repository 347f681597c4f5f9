//! Escrow marketplace library modules.
//!
//! Hexagonal layout: [`domain`] holds entities, ports and services;
//! [`outbound`] implements the driven ports (PostgreSQL and in-memory);
//! [`inbound`] exposes the driving ports over HTTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;

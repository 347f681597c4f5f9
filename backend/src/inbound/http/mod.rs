//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every marketplace route lives under `/api`; health probes sit at the root
//! so orchestrators can reach them without knowing the API prefix.

use actix_web::{Scope, web};

pub mod error;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod schemas;
pub mod state;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Build the `/api` scope with every marketplace handler registered.
///
/// Malformed JSON bodies and query strings are answered with the standard
/// error envelope rather than Actix's plain-text defaults.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use escrow_market::inbound::http::api_scope;
///
/// let app = App::new().service(api_scope());
/// ```
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(validation::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(validation::query_error_handler))
        .service(users::register_user)
        .service(users::get_user)
        .service(users::update_requisites)
        .service(users::list_user_orders)
        .service(users::unread_notifications)
        .service(users::list_notifications)
        .service(orders::create_order)
        .service(orders::list_orders)
        .service(orders::get_order)
        .service(orders::join_order)
        .service(orders::update_status)
        .service(orders::get_role)
        .service(notifications::mark_read)
        .service(stats::get_stats)
}

//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! this module is included by path from each suite that needs a database.

pub mod pg_embed;

use postgres::{Client, NoTls};
use uuid::Uuid;

/// Render a `postgres` error with its SQLSTATE and message.
///
/// The `Display` implementation of `postgres::Error` often collapses to a
/// bare `db error`, which hides the cause in CI logs.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Returns true when `RUN_PG_EMBEDDED=1` opts into embedded PostgreSQL suites.
pub fn embedded_postgres_enabled() -> bool {
    std::env::var("RUN_PG_EMBEDDED").as_deref() == Ok("1")
}

/// Create an empty database named after a fresh UUID and return its name.
///
/// `admin_url` must point at an existing maintenance database such as
/// `postgres`.
pub fn create_scratch_database(admin_url: &str) -> Result<String, String> {
    let name = format!("market_{}", Uuid::new_v4().simple());
    let mut client =
        Client::connect(admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(name)
}

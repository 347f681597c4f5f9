//! Shared Diesel error mapping for the marketplace repositories.
//!
//! Each repository has its own port error enum, but all of them share the
//! `connection`/`query` split. These helpers take the port's constructors so
//! the mapping logic lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Unique constraint guarding order codes.
pub(crate) const ORDER_CODE_CONSTRAINT: &str = "orders_code_key";

/// Map pool errors into a repository-specific connection error.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors into query/connection errors.
///
/// Database messages are logged at `debug` and replaced by generic text so
/// SQL details never reach the domain.
pub(crate) fn map_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            query("concurrent update conflict")
        }
        _ => query("database error"),
    }
}

/// Returns `true` when `error` is a unique violation on `constraint`.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            info.constraint_name() == Some(constraint)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::OrderPersistenceError;

    fn map(error: DieselError) -> OrderPersistenceError {
        map_diesel_error(
            error,
            OrderPersistenceError::query,
            OrderPersistenceError::connection,
        )
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err = map_pool_error(
            PoolError::checkout("connection refused"),
            OrderPersistenceError::connection,
        );
        assert_eq!(err, OrderPersistenceError::connection("connection refused"));
    }

    #[rstest]
    #[case(DieselError::NotFound, "record not found")]
    #[case(DieselError::RollbackTransaction, "database error")]
    fn diesel_errors_become_redacted_query_errors(
        #[case] error: DieselError,
        #[case] expected: &str,
    ) {
        assert_eq!(map(error), OrderPersistenceError::query(expected));
    }

    #[rstest]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(
            &DieselError::NotFound,
            ORDER_CODE_CONSTRAINT
        ));
    }
}

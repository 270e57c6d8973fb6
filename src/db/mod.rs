//! MySQL access for the parking utilities.
//!
//! One [`DbSession`] wraps one connection. Every statement binds its values as
//! parameters; the only identifier ever spliced into SQL text is a schema name,
//! which goes through [`schema::quote_identifier`] first.

pub mod connection;
pub mod entries;
pub mod models;
pub mod schema;
pub mod vehicles;

pub use connection::DbSession;
pub use models::{NewVehicle, NpUserEntry, Vehicle};
pub use schema::CreateMode;

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("timed out connecting to {target} after {after:?}")]
    ConnectTimeout { target: String, after: Duration },
    #[error("{statement} failed: {source}")]
    Query {
        statement: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("invalid schema name {0:?}")]
    InvalidIdentifier(String),
    #[error("invalid entry: {0}")]
    InvalidEntry(String),
    #[error("vehicle with plate number '{0}' already exists")]
    DuplicatePlate(String),
    #[error("no vehicle found with plate number '{0}'")]
    VehicleNotFound(String),
}

impl DbError {
    pub(crate) fn query(statement: &'static str) -> impl FnOnce(sqlx::Error) -> DbError {
        move |source| DbError::Query { statement, source }
    }

    /// True for errors detected before any connection is attempted.
    pub fn is_input_error(&self) -> bool {
        matches!(self, DbError::InvalidIdentifier(_) | DbError::InvalidEntry(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_names_the_statement() {
        let err = DbError::query("INSERT INTO np_users")(sqlx::Error::RowNotFound);
        let message = err.to_string();
        assert!(message.starts_with("INSERT INTO np_users failed"));
    }

    #[test]
    fn input_errors_are_distinguished() {
        assert!(DbError::InvalidEntry("empty".to_string()).is_input_error());
        assert!(DbError::InvalidIdentifier("a b".to_string()).is_input_error());
        assert!(!DbError::VehicleNotFound("B1".to_string()).is_input_error());
    }
}

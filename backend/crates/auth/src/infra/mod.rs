//! Infrastructure Layer
//!
//! Credential store implementations: PostgreSQL for the managed deployment,
//! SQLite for the embedded one. Both share the row mapping in `row`.

pub mod postgres;
mod row;
pub mod sqlite;

pub use postgres::PgCredentialStore;
pub use sqlite::SqliteCredentialStore;

use crate::error::AuthError;

/// A unique violation on `accounts` can only be the user name index.
pub(crate) fn map_account_write_error(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AuthError::DuplicateUsername
        }
        _ => AuthError::Database(err),
    }
}

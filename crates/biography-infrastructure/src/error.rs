//! Store error mapping.
//!
//! `sqlx::Error` is foreign to both crates, so conversion goes through
//! helpers instead of a `From` impl.

use biography_core::BiographyError;

/// Maps a store failure to `DataAccess`.
pub(crate) fn db_error(err: sqlx::Error) -> BiographyError {
    BiographyError::data_access(err.to_string())
}

/// Returns true when the failure is a UNIQUE / PRIMARY KEY violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

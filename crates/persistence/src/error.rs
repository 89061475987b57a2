//! Persistence error types.

use domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row, or a record about to be stored, breaks a domain rule.
    #[error("{0}")]
    Malformed(#[from] DomainError),
}

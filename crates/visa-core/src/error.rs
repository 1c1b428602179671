//! Error types for visa-tracker.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using visa-tracker's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for visa-tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Client-supplied data violates a field constraint
    #[error("{0}")]
    Validation(String),

    /// Application not found
    #[error("Application {0} does not exist")]
    ApplicationNotFound(Uuid),

    /// Document not found
    #[error("Document {0} does not exist")]
    DocumentNotFound(Uuid),

    /// Parent application of a new document not found
    #[error("Parent application {0} does not exist")]
    ParentNotFound(Uuid),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used by transport layers to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::ApplicationNotFound(_)
            | Error::DocumentNotFound(_)
            | Error::ParentNotFound(_) => ErrorKind::NotFound,
            Error::Database(_) | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

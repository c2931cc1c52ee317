//! Error types for core hospital operations.

use thiserror::Error;

/// Errors produced by core services and repositories.
///
/// The first five variants map one-to-one onto the HTTP statuses the REST
/// layer answers with: invalid input (400), unauthenticated (401), forbidden
/// (403), not found (404) and conflict (409). The remaining variants carry
/// their underlying cause and surface as internal errors (500); the REST
/// layer logs the cause and returns a generic message.
#[derive(Error, Debug)]
pub enum HmsError {
    /// A request value failed validation. The message is safe to show to the caller.
    #[error("{0}")]
    InvalidInput(String),

    /// Missing or unverifiable credentials.
    #[error("Unauthorized")]
    Unauthenticated,

    /// Authenticated, but not allowed to perform this operation.
    #[error("Forbidden")]
    Forbidden,

    /// A referenced entity does not exist. The payload names the entity.
    #[error("{0} not found")]
    NotFound(String),

    /// The operation would violate a uniqueness or lifecycle rule.
    #[error("{0}")]
    Conflict(String),

    /// A stored value could not be decoded into its domain type.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing or verification failed unexpectedly.
    #[error("password hash error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Token issuance failed. Verification failures are reported as
    /// `Unauthenticated`, never as this variant.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Convenience alias used throughout the workspace.
pub type HmsResult<T> = std::result::Result<T, HmsError>;

//! Error types for the core library.

use thiserror::Error;

use crate::account::{ValidationError, ValidationErrors};
use crate::security::EncryptionError;

/// Kind of entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// An account aggregate.
    Account,
    /// A rule inside an account aggregate.
    Rule,
}

impl Entity {
    /// Name used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Rule => "Rule",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string did not name any known variant of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseKindError {
    kind: &'static str,
    value: String,
}

impl ParseKindError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input or construction data failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Referenced account or rule does not exist.
    #[error("{0} not found")]
    NotFound(Entity),

    /// Password encryption or decryption failed.
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// System keyring error.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// A stored record could not be turned back into a valid aggregate.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.into())
    }
}

impl Error {
    /// Returns `true` if this is a not-found error for the given entity.
    #[must_use]
    pub fn is_not_found(&self, entity: Entity) -> bool {
        matches!(self, Self::NotFound(e) if *e == entity)
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

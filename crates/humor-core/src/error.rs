//! Error types for the Humor Study application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Humor Study application.
///
/// Collaborator failures are split by origin: `Provider` for the identity
/// provider (session lookup, sign-in, sign-out) and `Store`/`Constraint` for
/// the record store (reads and inserts).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HumorError {
    /// Session provider failure (lookup, sign-in, sign-out, refresh)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Record store failure (read or write)
    #[error("Store error: {0}")]
    Store(String),

    /// Record store rejected an insert because of a uniqueness constraint
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HumorError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Creates a Store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates a Constraint error
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Provider error
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// Check if this error came from the record store.
    ///
    /// Constraint violations count as store errors.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Constraint(_))
    }

    /// Check if this is a Constraint error
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns the bare message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Provider(m)
            | Self::Store(m)
            | Self::Constraint(m)
            | Self::Config(m)
            | Self::Internal(m) => m,
            Self::Io { message } | Self::Serialization { message, .. } => message,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HumorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for HumorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HumorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HumorError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, HumorError>`.
pub type Result<T> = std::result::Result<T, HumorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_counts_as_store_error() {
        let err = HumorError::constraint("duplicate key value violates unique constraint");
        assert!(err.is_store());
        assert!(err.is_constraint());
        assert!(!err.is_provider());
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = HumorError::provider("network unreachable");
        assert_eq!(err.message(), "network unreachable");
        assert_eq!(err.to_string(), "Provider error: network unreachable");
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HumorError = io.into();
        assert!(err.message().contains("NotFound"));
    }
}

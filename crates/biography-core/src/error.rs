//! Error types for the biography engine.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for every layer of the biography engine.
///
/// Repository and service layers raise these typed failures; the HTTP
/// boundary maps each variant to a stable status code through [`BiographyError::kind`].
#[derive(Error, Debug, Clone, Serialize)]
pub enum BiographyError {
    /// Record absent, or present but invisible to the current viewer.
    ///
    /// The two cases are deliberately indistinguishable.
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Missing or malformed input (e.g. `name` on create, empty update).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The viewer lacks the rights for this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation collides with existing state (e.g. duplicate follow).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The owner identity has no resolvable profile.
    #[error("Dependency inconsistency: {0}")]
    DependencyInconsistency(String),

    /// Data access error (relational store)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Cache transport error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable, machine-readable classification of a [`BiographyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ValidationError,
    Forbidden,
    Conflict,
    DependencyInconsistency,
    Internal,
}

impl BiographyError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a DependencyInconsistency error
    pub fn dependency_inconsistency(message: impl Into<String>) -> Self {
        Self::DependencyInconsistency(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
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

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// Check if this is a Conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Classifies this error for the transport boundary.
    ///
    /// Every transport failure (store, cache, serialization, config) collapses
    /// into [`ErrorKind::Internal`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::DependencyInconsistency(_) => ErrorKind::DependencyInconsistency,
            Self::DataAccess(_)
            | Self::Cache(_)
            | Self::Serialization { .. }
            | Self::Config(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BiographyError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for BiographyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BiographyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for BiographyError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, BiographyError>`.
pub type Result<T> = std::result::Result<T, BiographyError>;

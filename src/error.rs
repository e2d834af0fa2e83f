//! Error types for the SWAPI provider.
//!
//! This module provides the error hierarchy for every stage of a planet's
//! lifecycle: manifest configuration, the SWAPI REST API, recorded state,
//! planning, and user-facing diagnostics.

use std::path::PathBuf;
use thiserror::Error;

use crate::provider::Diagnostics;

/// The main error type for the SWAPI provider.
#[derive(Debug, Error)]
pub enum SwapiError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// SWAPI REST API errors.
    #[error("SWAPI error: {0}")]
    Api(#[from] ApiError),

    /// State management errors.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Planning errors.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// Diagnostics reported by the provider adapters.
    #[error("{0}")]
    Diagnostics(#[from] Diagnostics),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The manifest file was not found.
    #[error("Manifest file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The manifest could not be parsed.
    #[error("Failed to parse manifest: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Manifest validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// A provider setting resolved to nothing.
    #[error("Missing provider setting '{field}' (set it explicitly or via {env_var})")]
    MissingSetting {
        /// Provider attribute name.
        field: String,
        /// Environment variable consulted as fallback.
        env_var: String,
    },

    /// The endpoint is not a usable base URL.
    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Why it was rejected.
        message: String,
    },
}

/// SWAPI REST API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure.
    #[error("Network error communicating with SWAPI: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// The server answered with a status of 400 or above.
    #[error("Got HTTP status {status} {reason}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The response body did not decode into the expected shape.
    #[error("Invalid response from SWAPI: {message}")]
    Decode {
        /// Description of the decoding issue.
        message: String,
    },

    /// A name lookup matched no planet.
    #[error("No planet named '{name}'")]
    PlanetNotFound {
        /// The requested name.
        name: String,
    },

    /// A name lookup matched several planets.
    #[error("{count} planets are named '{name}'")]
    AmbiguousName {
        /// The requested name.
        name: String,
        /// Number of planets returned.
        count: usize,
    },
}

/// State management errors.
#[derive(Debug, Error)]
pub enum StateError {
    /// State file could not be read or parsed.
    #[error("State is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// State could not be written.
    #[error("Failed to write state: {message}")]
    WriteFailed {
        /// Description of the write failure.
        message: String,
    },

    /// State lock acquisition failed.
    #[error("Failed to acquire state lock: {message}")]
    LockFailed {
        /// Description of the lock failure.
        message: String,
    },

    /// State lock is held by another process.
    #[error("State is locked by another process (lock holder: {holder}, since: {since})")]
    LockedByOther {
        /// Identifier of the lock holder.
        holder: String,
        /// When the lock was acquired.
        since: String,
    },

    /// Serialization error.
    #[error("State serialization error: {message}")]
    SerializationError {
        /// Description of the serialization error.
        message: String,
    },

    /// No resource is recorded under the address.
    #[error("No resource recorded at {address}")]
    ResourceNotFound {
        /// Resource address.
        address: String,
    },

    /// State version mismatch.
    #[error("State version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected state version.
        expected: String,
        /// Found state version.
        found: String,
    },
}

/// Planning errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A resource is already recorded under the address.
    #[error("Resource already managed at {address}")]
    AlreadyManaged {
        /// Resource address.
        address: String,
    },

    /// Execution stopped after a failed action.
    #[error("Apply aborted: {reason}")]
    Aborted {
        /// Reason for abort.
        reason: String,
    },
}

/// Result type alias for SWAPI provider operations.
pub type Result<T> = std::result::Result<T, SwapiError>;

impl SwapiError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the HTTP status if this error came from a remote failure.
    #[must_use]
    pub const fn remote_status(&self) -> Option<u16> {
        match self {
            Self::Api(ApiError::Remote { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Returns true when the remote service reported the planet as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::Remote { status: 404, .. } | ApiError::PlanetNotFound { .. })
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a validation error without a specific field.
    #[must_use]
    pub fn validation_general(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: None,
        }
    }
}

impl StateError {
    /// Creates a serialization error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Creates a write error with the given message.
    #[must_use]
    pub fn write(message: impl Into<String>) -> Self {
        Self::WriteFailed {
            message: message.into(),
        }
    }
}

impl ApiError {
    /// Creates a remote error from a response status.
    #[must_use]
    pub fn remote(status: reqwest::StatusCode) -> Self {
        Self::Remote {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

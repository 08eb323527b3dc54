//! Error types for the SCP provider.
//!
//! This module provides the error hierarchy shared by every layer of the
//! provider: configuration, the REST facade, the status poller, resource
//! handlers and the local state store.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the SCP provider.
#[derive(Debug, Error)]
pub enum ScpError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// SCP API errors.
    #[error("SCP API error: {0}")]
    Api(#[from] ApiError),

    /// Status polling errors.
    #[error("Polling error: {0}")]
    Poll(#[from] PollError),

    /// Resource handler errors.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// State management errors.
    #[error("State error: {0}")]
    State(#[from] StateError),

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
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration{}: {message}", at_location(.location.as_deref()))]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Duplicate block in the manifest.
    #[error("Duplicate {kind} address: {address}")]
    DuplicateAddress {
        /// Block kind (resource or data).
        kind: String,
        /// The duplicated `type.name` address.
        address: String,
    },

    /// Unknown resource or datasource type.
    #[error("Unknown {kind} type: {type_name}")]
    UnknownType {
        /// Block kind (resource or data).
        kind: String,
        /// The unregistered type name.
        type_name: String,
    },
}

/// SCP API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status code.
    #[error("SCP API request failed: {status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Rate limited.
    #[error("SCP API rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("Network error communicating with SCP: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid response from SCP API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Errors raised by the status poller.
#[derive(Debug, Error)]
pub enum PollError {
    /// The resource did not reach a target state within the budget.
    #[error(
        "Timeout after {elapsed_secs}s waiting for {resource} to reach {target:?} (last state: {last_state})"
    )]
    Timeout {
        /// Resource being waited on.
        resource: String,
        /// Target states that were not reached.
        target: Vec<String>,
        /// Last state observed before giving up.
        last_state: String,
        /// Seconds spent polling.
        elapsed_secs: u64,
    },

    /// The remote reported a state outside the pending and target sets.
    #[error("Unexpected state '{state}' for {resource}, wanted {target:?} (pending: {pending:?})")]
    UnexpectedState {
        /// Resource being waited on.
        resource: String,
        /// The unexpected state.
        state: String,
        /// Configured pending states.
        pending: Vec<String>,
        /// Configured target states.
        target: Vec<String>,
    },
}

/// Resource handler errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource configuration could not be decoded.
    #[error("Invalid configuration for {resource_type}: {message}")]
    InvalidConfig {
        /// Type name of the resource.
        resource_type: String,
        /// Decode or validation failure.
        message: String,
    },

    /// A cross-field precondition was violated.
    #[error("{message}")]
    Precondition {
        /// Message surfaced verbatim to the caller.
        message: String,
    },

    /// The operation is not supported by the resource type.
    #[error("{message}")]
    Unsupported {
        /// Type name of the resource.
        resource_type: String,
        /// Message surfaced verbatim to the caller.
        message: String,
    },

    /// The remote answered but the resource could not be located.
    #[error("{message}")]
    NotFound {
        /// Message surfaced verbatim to the caller.
        message: String,
    },

    /// A peering transition reported `success = false`.
    #[error("Transit gateway peering {action} was not accepted for {peering_id}")]
    ActionRejected {
        /// The transition that was attempted.
        action: String,
        /// The peering identifier.
        peering_id: String,
    },

    /// The handler was invoked on data without an identifier.
    #[error("{resource_type} has no identifier")]
    MissingId {
        /// Type name of the resource.
        resource_type: String,
    },
}

/// State management errors.
#[derive(Debug, Error)]
pub enum StateError {
    /// State is corrupted.
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

    /// State version mismatch.
    #[error("State version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected state version.
        expected: String,
        /// Found state version.
        found: String,
    },
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ScpError>;

impl ScpError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the HTTP status code carried by an API error, if any.
    #[must_use]
    pub const fn api_status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status(),
            _ => None,
        }
    }

    /// Returns true for server-side failures the poller retries locally.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.api_status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns true when the API reported the resource as gone.
    ///
    /// SCP answers 403 instead of 404 for resources removed from the
    /// project, so both count as absence.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.api_status(), Some(403 | 404))
    }

    /// Returns true if the HTTP request itself may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::RateLimited { .. } | ApiError::NetworkError { .. })
                | Self::State(StateError::LockFailed { .. })
        )
    }

    /// Returns the suggested retry delay in seconds, if applicable.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::Api(ApiError::RateLimited { retry_after_secs }) => Some(*retry_after_secs),
            Self::Api(ApiError::NetworkError { .. }) => Some(5),
            Self::State(StateError::LockFailed { .. }) => Some(2),
            _ => None,
        }
    }
}

fn at_location(location: Option<&str>) -> String {
    location.map_or_else(String::new, |l| format!(" at {l}"))
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
}

impl ApiError {
    /// Returns the HTTP status code of the failed call, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::NetworkError { .. } | Self::InvalidResponse { .. } => None,
        }
    }

    /// Creates a request error.
    #[must_use]
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

impl ResourceError {
    /// Creates a precondition error.
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Creates an unsupported-operation error.
    #[must_use]
    pub fn unsupported(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unsupported {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
}

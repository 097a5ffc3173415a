//! Error types for the veld instance lifecycle manager.
//!
//! This module provides the error hierarchy for all operations in the
//! instance lifecycle: resource loading, cluster API calls, instance
//! storage, and the diff/deletion engine.

use thiserror::Error;

/// The main error type for veld operations.
#[derive(Debug, Error)]
pub enum VeldError {
    /// Cluster API errors.
    #[error("Cluster API error: {0}")]
    Cluster(#[from] ClusterError),

    /// Resource manifest errors.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Instance storage errors.
    #[error("Instance error: {0}")]
    Instance(#[from] InstanceError),

    /// Diff/deletion engine errors.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {name}")]
    MissingConfig {
        /// Description of the missing value.
        name: String,
    },

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors returned by the cluster API client.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The server rejected a merge because a field cannot change
    /// post-creation.
    #[error("Immutable field conflict for {subject}: {message}")]
    ImmutableField {
        /// Identity of the rejected resource.
        subject: String,
        /// Server-side rejection message.
        message: String,
    },

    /// The requested object does not exist on the cluster.
    #[error("Not found: {subject}")]
    NotFound {
        /// Identity of the missing object.
        subject: String,
    },

    /// Authentication failed.
    #[error("Cluster authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("Cluster API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Rate limited.
    #[error("Cluster API rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("Network error communicating with the cluster: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid response from the cluster API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Errors raised while interpreting resource manifests.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A required identity field is missing from a manifest.
    #[error("Manifest is missing required field: {field}")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// The manifest document could not be parsed.
    #[error("Failed to parse manifest: {message}")]
    InvalidDocument {
        /// Description of the parse error.
        message: String,
    },

    /// Two manifests in the same set share an identity.
    #[error("Duplicate resource in manifest set: {subject}")]
    DuplicateResource {
        /// The duplicated identity.
        subject: String,
    },
}

/// Instance storage errors.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// No instance record exists under the given name and namespace.
    #[error("Instance not found: {namespace}/{name}")]
    NotFound {
        /// Instance name.
        name: String,
        /// Instance namespace.
        namespace: String,
    },

    /// The stored instance record could not be decoded.
    #[error("Instance record is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },
}

/// Diff/deletion engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// One or more per-resource deletions failed; the instance record
    /// was left in place so a retry can discover remaining resources.
    #[error("{failed} of {total} resource deletion(s) failed; instance record kept")]
    DeletionIncomplete {
        /// Number of failed deletions.
        failed: usize,
        /// Number of attempted deletions.
        total: usize,
    },

    /// Deleted resources were still present when the wait deadline elapsed.
    #[error("Timed out after {timeout_secs}s waiting for termination of: {}", .pending.join(", "))]
    TerminationTimeout {
        /// Subjects still present on the cluster.
        pending: Vec<String>,
        /// The elapsed timeout in seconds.
        timeout_secs: u64,
    },

    /// The run's overall deadline elapsed.
    #[error("Run deadline of {secs}s exceeded")]
    DeadlineExceeded {
        /// The configured deadline in seconds.
        secs: u64,
    },

    /// A snapshot could not be serialized for rendering.
    #[error("Failed to render snapshot diff: {message}")]
    RenderFailed {
        /// Description of the serialization failure.
        message: String,
    },
}

/// Result type alias for veld operations.
pub type Result<T> = std::result::Result<T, VeldError>;

impl VeldError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ClusterError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Returns true if this error signals an immutable-field conflict.
    #[must_use]
    pub const fn is_immutable(&self) -> bool {
        matches!(self, Self::ImmutableField { .. })
    }

    /// Returns true if this error signals a missing object.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this error is retryable at the transport layer.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::NetworkError { .. })
    }
}

impl ResourceError {
    /// Creates an invalid-document error with the given message.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_classification() {
        let err = ClusterError::ImmutableField {
            subject: String::from("Service/apps/gateway"),
            message: String::from("spec.clusterIP may not be changed"),
        };
        assert!(err.is_immutable());
        assert!(!err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ClusterError::network("connection reset").is_retryable());
        assert!(ClusterError::RateLimited { retry_after_secs: 5 }.is_retryable());
        assert!(!ClusterError::api_error(500, "boom").is_retryable());
    }

    #[test]
    fn test_deletion_incomplete_display() {
        let err = EngineError::DeletionIncomplete { failed: 2, total: 5 };
        assert_eq!(
            err.to_string(),
            "2 of 5 resource deletion(s) failed; instance record kept"
        );
    }
}

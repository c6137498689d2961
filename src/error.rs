//! Error types and handling for Tempo Tarifs
//!
//! This module defines the error types used throughout the crate. Per-fetch
//! failures (`Transport`, `Timeout`, `HttpStatus`) carry the name of the
//! endpoint they came from so the poller can report them without extra
//! bookkeeping.

use thiserror::Error;

/// Result type alias for Tempo operations
pub type Result<T> = std::result::Result<T, TempoError>;

/// Main error type for Tempo Tarifs
#[derive(Debug, Error)]
pub enum TempoError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Network-level fault while fetching an endpoint (connection, DNS, bad JSON)
    #[error("Transport error on '{endpoint}': {message}")]
    Transport { endpoint: String, message: String },

    /// Endpoint did not answer within the request budget
    #[error("Timeout error on '{endpoint}': {message}")]
    Timeout { endpoint: String, message: String },

    /// Endpoint answered with something other than 200
    #[error("Unexpected response {status} from Tempo API endpoint '{endpoint}'")]
    HttpStatus { endpoint: String, status: u16 },

    /// Every endpoint failed during one poll cycle
    #[error("Fetching EDF Tempo data failed for all endpoints: {}", failed.join(", "))]
    AllEndpointsFailed { failed: Vec<String> },

    /// Mandatory first refresh failed; the host should retry set-up later
    #[error("Not ready: {message}")]
    NotReady { message: String },
}

impl TempoError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        TempoError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        TempoError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        TempoError::Io {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        TempoError::Web {
            message: message.into(),
        }
    }

    /// Create a new transport error for an endpoint
    pub fn transport<E: Into<String>, S: Into<String>>(endpoint: E, message: S) -> Self {
        TempoError::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error for an endpoint
    pub fn timeout<E: Into<String>, S: Into<String>>(endpoint: E, message: S) -> Self {
        TempoError::Timeout {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new HTTP status error for an endpoint
    pub fn http_status<E: Into<String>>(endpoint: E, status: u16) -> Self {
        TempoError::HttpStatus {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Create an all-endpoints-failed error
    pub fn all_endpoints_failed(failed: Vec<String>) -> Self {
        TempoError::AllEndpointsFailed { failed }
    }

    /// Create a new not-ready error
    pub fn not_ready<S: Into<String>>(message: S) -> Self {
        TempoError::NotReady {
            message: message.into(),
        }
    }

    /// Endpoint name attached to a per-fetch error, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            TempoError::Transport { endpoint, .. }
            | TempoError::Timeout { endpoint, .. }
            | TempoError::HttpStatus { endpoint, .. } => Some(endpoint.as_str()),
            _ => None,
        }
    }

    /// Whether this error is scoped to a single fetch
    pub fn is_fetch_error(&self) -> bool {
        self.endpoint().is_some()
    }
}

impl From<std::io::Error> for TempoError {
    fn from(err: std::io::Error) -> Self {
        TempoError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for TempoError {
    fn from(err: serde_yaml::Error) -> Self {
        TempoError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TempoError {
    fn from(err: serde_json::Error) -> Self {
        TempoError::Serialization {
            message: err.to_string(),
        }
    }
}

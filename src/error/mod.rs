//! Error types for nestkit
//!
//! The deep structure toolkit fails soft and almost never returns errors.
//! Request failures are reported as [`FetchError`] records; everything else
//! (configuration, method parsing, serialization) goes through [`NestKitError`].

use thiserror::Error;

use crate::http::FetchError;

/// Main error type for nestkit
#[derive(Error, Debug, Clone)]
pub enum NestKitError {
    /// HTTP method outside of GET, POST, PUT and DELETE
    #[error("Invalid method given: {0}")]
    InvalidMethod(String),

    /// Configuration or builder validation error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network communication error outside of a fetch call
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A fetch call rejected with its structured record
    #[error("Fetch failed: {0}")]
    Fetch(Box<FetchError>),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

/// Type alias for Results using NestKitError
pub type Result<T> = std::result::Result<T, NestKitError>;

impl NestKitError {
    /// Create a custom error with a message
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        NestKitError::Custom(msg.into())
    }

    /// Create a configuration error with a message
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        NestKitError::Configuration(msg.into())
    }

    /// Check if this error came from the network layer
    pub fn is_network_error(&self) -> bool {
        matches!(self, NestKitError::Network(_) | NestKitError::Fetch(_))
    }

    /// The fetch record carried by this error, if any
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            NestKitError::Fetch(record) => Some(record),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NestKitError {
    fn from(error: reqwest::Error) -> Self {
        NestKitError::Network(error.to_string())
    }
}

impl From<serde_json::Error> for NestKitError {
    fn from(error: serde_json::Error) -> Self {
        NestKitError::Serialization(error.to_string())
    }
}

impl From<FetchError> for NestKitError {
    fn from(error: FetchError) -> Self {
        NestKitError::Fetch(Box::new(error))
    }
}

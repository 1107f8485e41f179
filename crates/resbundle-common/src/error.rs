//! Error types and utilities for resbundle

use thiserror::Error;

/// Result type alias for resbundle operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Main error type for resbundle operations
#[derive(Error, Debug)]
pub enum BundleError {
    /// Caller-supplied argument or configuration value is invalid.
    ///
    /// Never retried; surfaced to the caller immediately.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument
        message: String,
    },

    /// The backing store could not be reached or a query failed.
    #[error("Store error: {message}")]
    Store {
        /// Description of the failure
        message: String,
        /// Underlying driver error, when available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A loader was asked for a content format it does not produce.
    #[error("Unsupported bundle format: {format}")]
    UnsupportedFormat {
        /// The rejected format tag
        format: String,
    },
}

impl BundleError {
    /// Create a new invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
        }
    }

    /// Create a new store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new store error with source
    pub fn store_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new unsupported-format error
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// True if this error came from the backing store rather than the caller
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}

//! Error types for TCX import.
//!
//! The decode core never fails: malformed leaves, unparsable timestamps and unknown
//! namespaces all degrade to fewer or worse tours. The variants below belong to the
//! layers around it: file access, XML syntax, configuration and document providers.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use tcxtour::ImportError;
//!
//! let error = ImportError::provider_failed("directory listing failed");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for import operations.
pub type Result<T, E = ImportError> = std::result::Result<T, E>;

/// Main error type for import operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ImportError {
    #[error("TCX file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML at byte {position}: {details}")]
    Xml { position: usize, details: String },

    #[error("Text decoding failed in {context}: {details}")]
    Encoding { context: String, details: String },

    #[error("Invalid import options: {details}")]
    Config { details: String },

    #[error("Document provider failed: {reason}")]
    Provider {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Import cancelled")]
    Cancelled,
}

impl ImportError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ImportError::Provider { .. } => true,
            ImportError::File { .. } => false,
            ImportError::Xml { .. } => false,
            ImportError::Encoding { .. } => false,
            ImportError::Config { .. } => false,
            ImportError::Cancelled => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ImportError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
                "Verify the path points to a .tcx export",
            ],
            ImportError::Xml { .. } => vec![
                "Verify the file is a complete TCX export",
                "Re-export the activity from the device software",
            ],
            ImportError::Encoding { .. } => vec![
                "Convert the file to UTF-8",
                "Check for truncated multi-byte characters",
            ],
            ImportError::Config { .. } => vec![
                "Check option names for typos",
                "Compare against the documented ImportOptions keys",
            ],
            ImportError::Provider { .. } => vec![
                "Retry the import",
                "Check the document source is reachable",
            ],
            ImportError::Cancelled => vec!["Start a new import run"],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        ImportError::File { path, source }
    }

    /// Helper constructor for XML syntax errors.
    pub fn xml_error(position: usize, details: impl Into<String>) -> Self {
        ImportError::Xml { position, details: details.into() }
    }

    /// Helper constructor for text decoding errors.
    pub fn encoding_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        ImportError::Encoding { context: context.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(details: impl Into<String>) -> Self {
        ImportError::Config { details: details.into() }
    }

    /// Helper constructor for provider errors.
    pub fn provider_failed(reason: impl Into<String>) -> Self {
        ImportError::Provider { reason: reason.into(), source: None }
    }

    /// Helper constructor for provider errors with source.
    pub fn provider_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        ImportError::Provider { reason: reason.into(), source: Some(source) }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for ImportError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        ImportError::Config { details: err.to_string() }
    }
}

//! Error types for configuration loading and schema validation
//!
//! Parsing and analysis never fail: every input yields a [`Document`] and a
//! diagnostic list. Errors only surface from the surfaces that touch the
//! outside world (configuration files) or that check a schema catalog for
//! internal consistency.
//!
//! [`Document`]: crate::document::Document

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the MCS analysis core
#[derive(Debug, Error)]
pub enum McsError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Schema catalog consistency errors
    #[error("Schema error in '{statement}': {message}")]
    SchemaError { statement: String, message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failures
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Schema,
    Io,
    Serialization,
}

impl McsError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            McsError::ConfigError { .. } => ErrorKind::Config,
            McsError::SchemaError { .. } => ErrorKind::Schema,
            McsError::IoError { .. } => ErrorKind::Io,
            McsError::SerializationError { .. } => ErrorKind::Serialization,
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a schema error attributed to one statement definition
    pub fn schema_error(statement: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaError {
            statement: statement.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for McsError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for McsError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(McsError::config_error("bad").kind(), ErrorKind::Config);
        assert_eq!(
            McsError::schema_error("HFS", "dangling reference").kind(),
            ErrorKind::Schema
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(McsError::io_error("/tmp/x", io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_error_display() {
        let err = McsError::schema_error("JCLIN", "operand 'X' requires unknown 'Y'");
        assert_eq!(
            err.to_string(),
            "Schema error in 'JCLIN': operand 'X' requires unknown 'Y'"
        );
    }
}

//! Error types for Formflow.
//!
//! All errors in Formflow are represented by the `FormflowError` enum,
//! which provides specific variants for different error categories.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Formflow operations.
///
/// Load-time problems (`Config`, `Schema`, `Graph`) stop a wizard from being
/// built at all. Request-time problems (`Condition`, `UnknownStep`, `Session`)
/// are fatal for the request that raised them.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FormflowError {
    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Wizard definition rejected by the JSON schema.
    #[error("{0}")]
    Schema(String),

    /// Invalid step graph: duplicate routes, dangling targets, `next` cycles.
    #[error("{0}")]
    Graph(String),

    /// A fork predicate failed while deciding the next step.
    #[error("condition on step {route} failed: {message}")]
    Condition {
        route: String,
        message: String,
    },

    /// A request addressed a route that is not part of the wizard.
    #[error("unknown step: {0}")]
    UnknownStep(String),

    /// Malformed data found in a session.
    #[error("{0}")]
    Session(String),

    /// Message queue errors.
    #[error("{0}")]
    Queue(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<FormflowError> for String {
    fn from(val: FormflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for FormflowError {
    fn from(error: std::io::Error) -> Self {
        FormflowError::IoError(error.to_string())
    }
}

impl From<FormflowError> for std::io::Error {
    fn from(val: FormflowError) -> Self {
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for FormflowError {
    fn from(error: serde_json::Error) -> Self {
        FormflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for FormflowError {
    fn from(error: toml::de::Error) -> Self {
        FormflowError::Config(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for FormflowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        FormflowError::Schema(error.to_string())
    }
}

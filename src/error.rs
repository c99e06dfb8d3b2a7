//! Error types for the conftree library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conftree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the conftree library
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize tree data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to process YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse value: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("No choice of setting '{setting}' matches value {value}")]
    NoMatchingChoice { setting: String, value: String },

    #[error("Unknown choice token '{token}' for setting '{setting}'")]
    UnknownChoiceToken { setting: String, token: String },

    #[error("Nested schema of setting '{0}' is not bound")]
    SchemaUnbound(String),

    // -------------------------------------------------------------------------
    // Container Errors
    // -------------------------------------------------------------------------
    #[error("Setting not found: {0}")]
    SettingNotFound(String),

    #[error("Document key '{0}' matches no setting in the schema")]
    UnknownSetting(String),

    #[error("No element of '{setting}' matches {value}")]
    NoMatch { setting: String, value: String },

    #[error("No storage backend attached")]
    NoStorage,

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("Path '{path}' is occupied by a dataset, not a group")]
    NotAGroup { path: String },

    #[error("Type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SettingNotFound(_) | Error::NoMatch { .. } | Error::UnknownSetting(_)
        )
    }

    /// Check if this error came from a schema conversion (choice lookup)
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::NoMatchingChoice { .. }
                | Error::UnknownChoiceToken { .. }
                | Error::SchemaUnbound(_)
        )
    }
}

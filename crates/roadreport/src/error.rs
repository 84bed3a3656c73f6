//! Error types for roadreport.
//!
//! This module defines all error types used throughout the roadreport crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Headline shown to the user when a submission fails.
pub const SUBMISSION_FAILED: &str = "Submission Failed";

/// The main error type for roadreport operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The value stored under the backing key is not a valid report collection.
    #[error("stored report collection under '{key}' is corrupt: {source}")]
    CorruptCollection {
        /// The backing key that was read.
        key: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A report with the same id is already stored.
    #[error("a report with id '{id}' already exists")]
    DuplicateReport {
        /// The conflicting id.
        id: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Submission Errors ===
    /// The media file to submit does not exist.
    #[error("media file not found: {path}")]
    MediaNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The HTTP request to the classification endpoint failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The classification endpoint answered with a non-success status.
    #[error("upload rejected (status {status}): {message}")]
    UploadRejected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the server, or a generic one.
        message: String,
    },

    // === Assistant Errors ===
    /// No API key is configured for the assistant endpoint.
    #[error("assistant API key is not set (use ROADREPORT_ASSISTANT__API_KEY)")]
    MissingApiKey,

    /// The question was empty.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// The assistant endpoint answered with a non-success status.
    #[error("assistant request failed with status {status}")]
    AssistantRejected {
        /// HTTP status code.
        status: u16,
    },

    /// The assistant response carried no usable answer.
    #[error("assistant returned no answer")]
    EmptyCompletion,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// A blocking storage task could not be joined.
    #[error("background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for roadreport operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an upload rejection error.
    #[must_use]
    pub fn upload_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::UploadRejected {
            status,
            message: message.into(),
        }
    }

    /// Check if this error came from the storage backend or the stored data.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::CorruptCollection { .. }
                | Self::DuplicateReport { .. }
                | Self::TaskJoin(_)
        )
    }

    /// Check if this error happened while talking to the classification endpoint.
    #[must_use]
    pub fn is_submission_error(&self) -> bool {
        matches!(
            self,
            Self::MediaNotFound { .. } | Self::Http(_) | Self::UploadRejected { .. }
        )
    }

    /// Check if this error came from asking the assistant.
    #[must_use]
    pub fn is_assistant_error(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey
                | Self::EmptyQuestion
                | Self::AssistantRejected { .. }
                | Self::EmptyCompletion
        )
    }

    /// Message suitable for showing to the person who submitted a report.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MediaNotFound { path } => {
                format!("The media file {} could not be found.", path.display())
            }
            Self::UploadRejected { message, .. } => {
                format!("We couldn't process your traffic report: {message}")
            }
            Self::Http(_) => "We couldn't process your traffic report at this time. \
                              Please try again later."
                .to_string(),
            other => format!("Your traffic report could not be recorded: {other}"),
        }
    }
}

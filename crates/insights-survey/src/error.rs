//! Error types for insights-survey.
//!
//! This module defines all error types used throughout the crate, grouped by
//! the concern that raises them: response storage, configuration, the survey
//! flow itself, and the admin export.

use std::path::PathBuf;
use thiserror::Error;

use crate::survey::{AnswerKey, Event, Page};

/// The main error type for insights-survey operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the response database.
    ///
    /// This is the "storage unavailable" condition: no survey pages should be
    /// served while it holds.
    #[error("response storage unavailable: failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// The directory that holds the response database could not be created.
    #[error("response storage unavailable: failed to create {path}: {source}")]
    DatabaseDirectory {
        /// Directory that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
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

    /// A stored row could not be turned back into a response record.
    #[error("corrupt response record {id}: {message}")]
    CorruptRecord {
        /// Row id of the offending record.
        id: i64,
        /// Description of what went wrong.
        message: String,
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

    // === Survey Flow Errors ===
    /// Required demographics fields are missing.
    #[error("please fill out all fields to continue (missing: {})", join_keys(.missing))]
    Validation {
        /// The fields that are empty or zero.
        missing: Vec<AnswerKey>,
    },

    /// The requested transition is not legal from the current page.
    #[error("cannot {event} from the {page} page")]
    InvalidTransition {
        /// The transition that was requested.
        event: Event,
        /// The page the session was on.
        page: Page,
    },

    /// An answer was rejected at the input boundary.
    #[error("invalid answer for '{key}': {message}")]
    InvalidAnswer {
        /// The question key as supplied.
        key: String,
        /// Why the answer was rejected.
        message: String,
    },

    /// The response store could not durably write a submission.
    #[error("failed to save survey response: {0}")]
    Persistence(#[source] Box<Error>),

    // === Export Errors ===
    /// No admin password is configured, so the export is disabled.
    #[error("admin export is disabled: no admin password configured")]
    AdminNotConfigured,

    /// The supplied admin password did not match.
    #[error("incorrect admin password")]
    AdminAccessDenied,

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Terminal Errors ===
    /// An interactive prompt failed.
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

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
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for insights-survey operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

fn join_keys(keys: &[AnswerKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an invalid answer error.
    #[must_use]
    pub fn invalid_answer(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAnswer {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Wrap a store failure as a persistence error.
    #[must_use]
    pub fn persistence(source: Self) -> Self {
        Self::Persistence(Box::new(source))
    }

    /// Check if this error is a demographics validation failure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error means a submission was not saved.
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Check if this error means the response store cannot be opened.
    #[must_use]
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseDirectory { .. }
                | Self::DatabaseMigration { .. }
        )
    }

    /// Check if this error is a refusal from the admin gate.
    #[must_use]
    pub fn is_admin_error(&self) -> bool {
        matches!(self, Self::AdminNotConfigured | Self::AdminAccessDenied)
    }
}

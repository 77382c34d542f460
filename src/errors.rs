//! Unified error type for the CRM core.
//!
//! Every fallible operation in the crate returns [`Result`]. Authentication and
//! form validation failures are ordinary variants so callers can turn them into
//! user-facing messages without the process ever failing.

use thiserror::Error;

/// Error type shared by the session, store, and business-logic layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Login failed. Deliberately does not say which field was wrong.
    #[error("Invalid credentials or role mismatch")]
    InvalidCredentials,

    /// The operation needs a signed-in user.
    #[error("No user is signed in")]
    NotAuthenticated,

    /// A required field is missing or a value could not be parsed.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The signed-in user's role may not perform this operation.
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// What was attempted
        message: String,
    },

    /// A payment amount larger than the outstanding balance.
    #[error("Payment amount ${amount:.2} cannot exceed the outstanding balance of ${balance:.2}")]
    AmountTooHigh {
        /// Proposed payment amount
        amount: f64,
        /// Outstanding invoice balance
        balance: f64,
    },

    /// Client does not exist or is not visible to the current user.
    #[error("Client not found: {id}")]
    ClientNotFound {
        /// Client identifier that was looked up
        id: String,
    },

    /// Job does not exist or is not visible to the current user.
    #[error("Job not found: {id}")]
    JobNotFound {
        /// Job identifier that was looked up
        id: String,
    },

    /// Invoice does not exist or is not visible to the current user.
    #[error("Invoice not found: {id}")]
    InvoiceNotFound {
        /// Invoice identifier that was looked up
        id: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Database error raised by `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The persisted session could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

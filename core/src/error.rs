//! Error types for the access-control API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers branch on it: a 404 on
//! the system config means "not yet configured", while a 404 on a worker is an
//! ordinary failure. Every other non-2xx response lands in `Http`. Both keep
//! the server's `message` field when the body carried one, so the UI can show
//! it verbatim.

use thiserror::Error;

use crate::confirm::DestructiveAction;
use crate::validation::ValidationErrors;

/// Fallback shown when the server could not be reached at all.
pub const CONNECTIVITY_MESSAGE: &str = "Could not connect to the server";

/// Errors returned by service `build_*` and `parse_*` methods and by
/// transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found{}", suffix(.message))]
    NotFound { message: Option<String> },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}{}", suffix(.message))]
    Http {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The payload failed client-side validation and was never sent.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A destructive request was built without a matching confirmation.
    #[error("{0:?} requires explicit confirmation")]
    Unconfirmed(DestructiveAction),

    /// A report window whose start date cannot be represented.
    #[error("report window of {days} days is out of range")]
    InvalidWindow { days: i64 },
}

fn suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

impl ApiError {
    /// The `message` field the server put in an error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message } | ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text to show the user: the server's message verbatim when present,
    /// a fixed connectivity message for transport failures, the validation
    /// summary for local rejections, and `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Transport(_) => CONNECTIVITY_MESSAGE.to_string(),
            ApiError::Validation(errors) => errors.to_string(),
            other => other
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

//! # AppError
//!
//! Centralized error handling for the Rusty-Forum ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all rf-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Section, Topic, Post)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// One or more form fields failed validation
    #[error("validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Resource already exists (e.g., duplicate username, second rating)
    #[error("conflict: {0}")]
    Conflict(String),

    /// No valid session
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but the account has an active ban
    #[error("account is banned")]
    Banned,

    /// Authenticated, but not the owner and not a moderator
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed request (e.g., missing CSRF token, broken multipart body)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Infrastructure failure (e.g., DB down, disk full)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: &str, id: impl ToString) -> Self {
        AppError::NotFound(what.to_string(), id.to_string())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }
}

/// Plugins may return an `AppError` through `anyhow` (e.g. a UNIQUE violation
/// as `Conflict`); it is passed through. Everything else is `Internal`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AppError>() {
            Ok(app) => app,
            Err(err) => AppError::Internal(format!("{err:#}")),
        }
    }
}

/// A specialized Result type for Rusty-Forum logic.
pub type Result<T> = std::result::Result<T, AppError>;

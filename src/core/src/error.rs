//! Error types raised before and during dispatch
//!
//! `ValidationError` is detected before any backend call is made.
//! `BackendError` is what a single `grant`/`revoke` call fails with; an
//! already-existing (or already-absent) relationship is never an error.

use thiserror::Error;

/// Malformed or missing batch input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No actors were supplied
    #[error("No actors supplied")]
    NoActors,

    /// No relations were supplied
    #[error("No relations supplied")]
    NoRelations,

    /// No resources were supplied
    #[error("No resources supplied")]
    NoResources,

    /// A type label (actor or resource) was empty
    #[error("Empty {0} type label")]
    EmptyTypeLabel(&'static str),
}

/// Failure of one backend call, or of the backend session itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Network or transport failure talking to the backend
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered but refused the operation
    #[error("Backend rejected request ({status}): {message}")]
    Rejected {
        /// Backend status code
        status: u16,
        /// Backend supplied message
        message: String,
    },

    /// The session was closed before or while the call was in flight
    #[error("Session closed")]
    SessionClosed,

    /// The backend could not be reached or configured at session open
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Unexpected backend failure
    #[error("Internal backend error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        BackendError::Transport(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        BackendError::Unavailable(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        BackendError::Internal(msg.into())
    }
}

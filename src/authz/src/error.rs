//! Error types for batch authorization

use crate::report::BatchReport;
use agentauth_core::{BackendError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

/// A batch in which at least one request failed
///
/// Wraps the first failure in issuance order. The full report, including the
/// requests that did complete, travels with the error.
#[derive(Debug, Error)]
#[error("Authorization batch {batch_id} failed ({failed} of {total} requests): {source}")]
pub struct AuthorizationBatchError {
    /// Batch identifier
    pub batch_id: Uuid,

    /// Number of failed requests
    pub failed: usize,

    /// Number of requests in the batch
    pub total: usize,

    /// First backend error encountered
    pub source: BackendError,

    /// Per-request outcomes
    pub report: BatchReport,
}

/// Batch authorization errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Batch input rejected before dispatch
    #[error("Invalid batch: {0}")]
    Validation(#[from] ValidationError),

    /// Backend failure outside of a request (e.g. opening the session)
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// One or more requests in the batch failed
    #[error(transparent)]
    Batch(#[from] AuthorizationBatchError),

    /// No authorizer registered under the configured name
    #[error("Unknown authorizer '{name}' (available: {available})")]
    UnknownAuthorizer {
        /// Requested name
        name: String,
        /// Registered names, comma separated
        available: String,
    },

    /// Authorizer configuration is incomplete or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for batch authorization
pub type Result<T> = std::result::Result<T, AuthzError>;

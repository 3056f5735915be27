//! Per-request outcomes of one batch

use crate::error::AuthorizationBatchError;
use agentauth_core::{AuthorizationRequest, AuthorizationResult, BackendError, Operation};
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one request, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    /// The request that was issued
    pub request: AuthorizationRequest,

    /// Result, or the backend error the call failed with
    pub outcome: Result<AuthorizationResult, BackendError>,
}

impl RequestOutcome {
    /// Whether the backend call succeeded
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Report line for this request
    pub fn status_line(&self) -> String {
        match &self.outcome {
            Ok(result) => result.status_line(),
            Err(e) => format!("FAILED: {}: {}", self.request, e),
        }
    }
}

/// Everything one batch did, in issuance order
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Batch identifier, also recorded on the tracing span
    pub batch_id: Uuid,

    /// Operation applied to every request
    pub operation: Operation,

    /// One entry per request, in issuance order
    pub outcomes: Vec<RequestOutcome>,

    /// Error raised while closing the session, if any
    pub close_error: Option<BackendError>,

    /// Wall time from session open to session close
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of requests issued
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Requests that newly took effect
    pub fn changed(&self) -> usize {
        self.results().filter(|r| r.succeeded).count()
    }

    /// Requests that were already in the requested state
    pub fn unchanged(&self) -> usize {
        self.results().filter(|r| !r.succeeded).count()
    }

    /// Requests that failed with a backend error
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }

    /// Whether every request completed and the session closed cleanly
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.close_error.is_none()
    }

    /// Completed results, in issuance order
    pub fn results(&self) -> impl Iterator<Item = &AuthorizationResult> {
        self.outcomes.iter().filter_map(|o| o.outcome.as_ref().ok())
    }

    /// Failed requests with their errors, in issuance order
    pub fn failures(&self) -> impl Iterator<Item = (&AuthorizationRequest, &BackendError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.outcome.as_ref().err().map(|e| (&o.request, e)))
    }

    /// First failure in issuance order, falling back to the close error
    pub fn first_error(&self) -> Option<&BackendError> {
        self.failures()
            .map(|(_, e)| e)
            .next()
            .or(self.close_error.as_ref())
    }

    /// Report lines, in issuance order
    pub fn status_lines(&self) -> Vec<String> {
        self.outcomes.iter().map(RequestOutcome::status_line).collect()
    }

    /// All results if the batch succeeded, otherwise the batch error
    pub fn into_result(self) -> Result<Vec<AuthorizationResult>, AuthorizationBatchError> {
        let first = self.first_error().cloned();
        match first {
            None => Ok(self
                .outcomes
                .into_iter()
                .filter_map(|o| o.outcome.ok())
                .collect()),
            Some(source) => Err(AuthorizationBatchError {
                batch_id: self.batch_id,
                failed: self.failed(),
                total: self.total(),
                source,
                report: self,
            }),
        }
    }
}

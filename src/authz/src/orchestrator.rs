//! Batch orchestrator
//!
//! Opens one session, issues every request of the batch concurrently through
//! it, waits for all of them and closes the session on every exit path.
//!
//! ```text
//! Idle → SessionOpen → Dispatching → (AllSucceeded | AnyFailed) → SessionClosed
//! ```
//!
//! Each request's outcome is captured on its own, so a failed batch still
//! reports which requests completed. A backend call that panics is recorded
//! as an internal error for that request. If the batch future is dropped
//! before it finishes, the session is closed on a background task.

use crate::authorizer::{Authorizer, AuthorizerSession, BackendResult};
use crate::error::Result;
use crate::report::{BatchReport, RequestOutcome};
use agentauth_core::{
    AuthorizationRequest, AuthorizationResult, BackendError, BatchSpec, Operation,
};
use futures::future::{join_all, FutureExt};
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Orchestrator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upper bound on concurrently in-flight calls (unbounded when `None`)
    pub max_in_flight: Option<usize>,
}

/// Runs batches of grant/revoke requests against an authorizer
#[derive(Debug, Clone, Default)]
pub struct BatchOrchestrator {
    config: OrchestratorConfig,
}

impl BatchOrchestrator {
    /// Create an orchestrator with unbounded fan-out
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an orchestrator with the given configuration
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Validate, expand and run a batch
    ///
    /// Validation errors surface before any session is opened.
    pub async fn run(&self, authorizer: &dyn Authorizer, spec: &BatchSpec) -> Result<BatchReport> {
        spec.validate()?;
        self.run_batch(authorizer, spec.requests(), spec.operation).await
    }

    /// Run a batch and collapse it into its results or the batch error
    pub async fn execute(
        &self,
        authorizer: &dyn Authorizer,
        spec: &BatchSpec,
    ) -> Result<Vec<AuthorizationResult>> {
        let report = self.run(authorizer, spec).await?;
        Ok(report.into_result()?)
    }

    /// Issue every request through one session and collect every outcome
    ///
    /// Fails only if the session cannot be opened; per-request failures are
    /// recorded in the returned report.
    pub async fn run_batch(
        &self,
        authorizer: &dyn Authorizer,
        requests: Vec<AuthorizationRequest>,
        operation: Operation,
    ) -> Result<BatchReport> {
        let batch_id = Uuid::new_v4();
        let span = info_span!(
            "batch",
            %batch_id,
            %operation,
            authorizer = authorizer.name(),
            requests = requests.len()
        );

        self.run_in_session(authorizer, batch_id, requests, operation)
            .instrument(span)
            .await
    }

    async fn run_in_session(
        &self,
        authorizer: &dyn Authorizer,
        batch_id: Uuid,
        requests: Vec<AuthorizationRequest>,
        operation: Operation,
    ) -> Result<BatchReport> {
        let start = Instant::now();

        let session = authorizer.open().await.map_err(|e| {
            error!("Failed to open {} session: {}", authorizer.name(), e);
            e
        })?;
        let session = SessionGuard::new(session);
        debug!("Session opened");

        let outcomes = self
            .dispatch_all(session.session.as_ref(), &requests, operation)
            .await;

        let close_error = match session.close().await {
            Ok(()) => None,
            Err(e) => {
                warn!("Failed to close {} session: {}", authorizer.name(), e);
                Some(e)
            }
        };
        debug!("Session closed");

        let outcomes: Vec<RequestOutcome> = requests
            .into_iter()
            .zip(outcomes)
            .map(|(request, outcome)| {
                let outcome = outcome.map(|succeeded| {
                    AuthorizationResult::new(request.clone(), operation, succeeded)
                });
                RequestOutcome { request, outcome }
            })
            .collect();

        let report = BatchReport {
            batch_id,
            operation,
            outcomes,
            close_error,
            elapsed: start.elapsed(),
        };

        info!(
            "Batch finished in {:?}: {} changed, {} unchanged, {} failed",
            report.elapsed,
            report.changed(),
            report.unchanged(),
            report.failed()
        );

        Ok(report)
    }

    /// Issue all requests; the returned outcomes are in issuance order
    async fn dispatch_all(
        &self,
        session: &dyn AuthorizerSession,
        requests: &[AuthorizationRequest],
        operation: Operation,
    ) -> Vec<BackendResult<bool>> {
        let calls: Vec<_> = requests
            .iter()
            .map(|request| dispatch_caught(session, request, operation))
            .collect();

        match self.config.max_in_flight {
            Some(limit) => stream::iter(calls).buffered(limit.max(1)).collect().await,
            None => join_all(calls).await,
        }
    }
}

/// Closes the session if the batch is dropped before reaching `close`
struct SessionGuard {
    session: Arc<dyn AuthorizerSession>,
    released: bool,
}

impl SessionGuard {
    fn new(session: Box<dyn AuthorizerSession>) -> Self {
        Self {
            session: Arc::from(session),
            released: false,
        }
    }

    async fn close(mut self) -> BackendResult<()> {
        self.released = true;
        self.session.close().await
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let session = self.session.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Batch abandoned before completion, closing session in background");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!("Failed to close abandoned session: {}", e);
                    }
                });
            }
            Err(_) => warn!("Batch abandoned outside a runtime, session left open"),
        }
    }
}

/// One backend call with a panic turned into an error for that request
async fn dispatch_caught(
    session: &dyn AuthorizerSession,
    request: &AuthorizationRequest,
    operation: Operation,
) -> BackendResult<bool> {
    match AssertUnwindSafe(dispatch_one(session, request, operation))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!("{} for {} panicked: {}", operation.title(), request, message);
            Err(BackendError::internal(format!("backend call panicked: {}", message)))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Exactly one backend call for one request, no retries
async fn dispatch_one(
    session: &dyn AuthorizerSession,
    request: &AuthorizationRequest,
    operation: Operation,
) -> BackendResult<bool> {
    info!("{}", operation.attempt_line(request));

    let outcome = match operation {
        Operation::Grant => {
            session
                .grant(&request.actor, &request.relation, &request.resource)
                .await
        }
        Operation::Revoke => {
            session
                .revoke(&request.actor, &request.relation, &request.resource)
                .await
        }
    };

    match &outcome {
        Ok(succeeded) => {
            let result = AuthorizationResult::new(request.clone(), operation, *succeeded);
            info!("{}", result.status_line());
        }
        Err(e) => error!("{} for {} failed: {}", operation.title(), request, e),
    }

    outcome
}

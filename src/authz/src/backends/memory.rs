//! Process-local authorizer
//!
//! Keeps relationships in a set shared by every session opened from the same
//! authorizer. Supports injected failures and latency, and counts session
//! opens/closes and concurrent calls, which makes it the backend of choice for
//! exercising the orchestrator.

use crate::authorizer::{Authorizer, AuthorizerSession, BackendResult};
use agentauth_core::{Actor, AuthorizationRequest, BackendError, Resource};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Session and call counters
#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// In-memory relationship store
#[derive(Clone, Default)]
pub struct InMemoryAuthorizer {
    relationships: Arc<RwLock<HashSet<AuthorizationRequest>>>,
    failing: Arc<RwLock<HashSet<AuthorizationRequest>>>,
    counters: Arc<Counters>,
    latency: Option<Duration>,
}

impl InMemoryAuthorizer {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every grant/revoke by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every call on this triple fail with a backend error
    pub async fn fail_on(&self, actor: Actor, relation: &str, resource: Resource) {
        let mut failing = self.failing.write().await;
        failing.insert(AuthorizationRequest::new(actor, relation, resource));
    }

    /// Whether the relationship currently exists
    pub async fn contains(&self, actor: &Actor, relation: &str, resource: &Resource) -> bool {
        let key = AuthorizationRequest::new(actor.clone(), relation, resource.clone());
        self.relationships.read().await.contains(&key)
    }

    /// Number of stored relationships
    pub async fn len(&self) -> usize {
        self.relationships.read().await.len()
    }

    /// Whether no relationships are stored
    pub async fn is_empty(&self) -> bool {
        self.relationships.read().await.is_empty()
    }

    /// Sessions opened so far
    pub fn sessions_opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Sessions closed so far
    pub fn sessions_closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Grant/revoke calls received so far
    pub fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authorizer for InMemoryAuthorizer {
    fn name(&self) -> &str {
        "InMemoryAuthorizer"
    }

    async fn open(&self) -> BackendResult<Box<dyn AuthorizerSession>> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        debug!("In-memory session opened");

        Ok(Box::new(InMemorySession {
            store: self.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

#[derive(Clone, Copy)]
enum Change {
    Insert,
    Remove,
}

struct InMemorySession {
    store: InMemoryAuthorizer,
    closed: AtomicBool,
}

impl InMemorySession {
    fn ensure_open(&self) -> BackendResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BackendError::SessionClosed);
        }
        Ok(())
    }

    async fn apply(&self, key: AuthorizationRequest, change: Change) -> BackendResult<bool> {
        let counters = &self.store.counters;
        counters.calls.fetch_add(1, Ordering::SeqCst);
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.apply_inner(key, change).await;

        counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn apply_inner(&self, key: AuthorizationRequest, change: Change) -> BackendResult<bool> {
        self.ensure_open()?;

        if let Some(latency) = self.store.latency {
            tokio::time::sleep(latency).await;
            // Closing the session while the call was in flight fails it
            self.ensure_open()?;
        }

        if self.store.failing.read().await.contains(&key) {
            return Err(BackendError::Rejected {
                status: 500,
                message: format!("injected failure for {}", key),
            });
        }

        let mut relationships = self.store.relationships.write().await;
        let changed = match change {
            Change::Insert => relationships.insert(key),
            Change::Remove => relationships.remove(&key),
        };
        Ok(changed)
    }
}

#[async_trait]
impl AuthorizerSession for InMemorySession {
    async fn grant(
        &self,
        actor: &Actor,
        relation: &str,
        resource: &Resource,
    ) -> BackendResult<bool> {
        let key = AuthorizationRequest::new(actor.clone(), relation, resource.clone());
        self.apply(key, Change::Insert).await
    }

    async fn revoke(
        &self,
        actor: &Actor,
        relation: &str,
        resource: &Resource,
    ) -> BackendResult<bool> {
        let key = AuthorizationRequest::new(actor.clone(), relation, resource.clone());
        self.apply(key, Change::Remove).await
    }

    async fn close(&self) -> BackendResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.store.counters.closed.fetch_add(1, Ordering::SeqCst);
            debug!("In-memory session closed");
        }
        Ok(())
    }
}

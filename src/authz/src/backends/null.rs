//! No-op authorizer

use crate::authorizer::{Authorizer, AuthorizerSession, BackendResult};
use agentauth_core::{Actor, Resource};
use async_trait::async_trait;
use tracing::debug;

/// Authorizer that changes nothing.
///
/// Every grant reports the relationship as already present and every revoke
/// reports it as already absent. Used when no real backend is configured.
#[derive(Debug, Default, Clone)]
pub struct NullAuthorizer;

impl NullAuthorizer {
    /// Create a no-op authorizer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authorizer for NullAuthorizer {
    fn name(&self) -> &str {
        "NullAuthorizer"
    }

    async fn open(&self) -> BackendResult<Box<dyn AuthorizerSession>> {
        Ok(Box::new(NullSession))
    }
}

struct NullSession;

#[async_trait]
impl AuthorizerSession for NullSession {
    async fn grant(
        &self,
        actor: &Actor,
        relation: &str,
        resource: &Resource,
    ) -> BackendResult<bool> {
        debug!("Null grant {} {} on {}", actor, relation, resource);
        Ok(false)
    }

    async fn revoke(
        &self,
        actor: &Actor,
        relation: &str,
        resource: &Resource,
    ) -> BackendResult<bool> {
        debug!("Null revoke {} {} on {}", actor, relation, resource);
        Ok(false)
    }

    async fn close(&self) -> BackendResult<()> {
        Ok(())
    }
}

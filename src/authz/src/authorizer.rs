//! Authorizer contract consumed by the batch orchestrator
//!
//! An [`Authorizer`] hands out scoped sessions. A session is the unit of
//! resource acquisition (HTTP client, token, connection) and is shared by
//! every in-flight call of one batch, so implementations must be safe to
//! call concurrently through `&self`.

use agentauth_core::{Actor, BackendError, Resource};
use async_trait::async_trait;

/// Result type for backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Pluggable authorization backend
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Backend name, as reported to the user
    fn name(&self) -> &str;

    /// Begin a scoped session
    async fn open(&self) -> BackendResult<Box<dyn AuthorizerSession>>;
}

/// One open session against the backend
#[async_trait]
pub trait AuthorizerSession: Send + Sync {
    /// Ensure the relationship exists.
    ///
    /// Returns `true` if it was newly created, `false` if it already existed.
    async fn grant(&self, actor: &Actor, relation: &str, resource: &Resource)
        -> BackendResult<bool>;

    /// Ensure the relationship does not exist.
    ///
    /// Returns `true` if it was removed, `false` if it was already absent.
    async fn revoke(&self, actor: &Actor, relation: &str, resource: &Resource)
        -> BackendResult<bool>;

    /// Release the session.
    ///
    /// Calls still in flight, or issued afterwards, fail with
    /// [`BackendError::SessionClosed`].
    async fn close(&self) -> BackendResult<()>;
}

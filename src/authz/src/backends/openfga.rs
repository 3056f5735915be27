//! OpenFGA relationship store backend
//!
//! Grants and revokes are single-tuple writes against
//! `POST {api_url}/stores/{store_id}/write`. OpenFGA refuses to write a tuple
//! that already exists and to delete one that does not; both refusals are
//! reported as "no change" rather than as errors.

use crate::authorizer::{Authorizer, AuthorizerSession, BackendResult};
use agentauth_core::{Actor, BackendError, Resource};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// OpenFGA connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFgaConfig {
    /// Base URL of the OpenFGA HTTP API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Store holding the relationship tuples
    #[serde(default)]
    pub store_id: Option<String>,

    /// Authorization model to write against (latest when unset)
    #[serde(default)]
    pub authorization_model_id: Option<String>,

    /// Bearer token for pre-shared key authentication
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for OpenFgaConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            store_id: None,
            authorization_model_id: None,
            api_token: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_api_url() -> String { "http://localhost:8080".to_string() }
fn default_timeout_ms() -> u64 { 10_000 }

/// One relationship tuple as OpenFGA encodes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleKey {
    pub user: String,
    pub relation: String,
    pub object: String,
}

impl TupleKey {
    pub fn new(actor: &Actor, relation: &str, resource: &Resource) -> Self {
        Self {
            user: actor.to_string(),
            relation: relation.to_string(),
            object: resource.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TupleKeys {
    tuple_keys: Vec<TupleKey>,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    writes: Option<TupleKeys>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deletes: Option<TupleKeys>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_model_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Copy)]
enum TupleChange {
    Write,
    Delete,
}

impl TupleChange {
    /// Fragment of the 400 message OpenFGA returns when the change is a no-op
    fn no_op_marker(&self) -> &'static str {
        match self {
            TupleChange::Write => "already exists",
            TupleChange::Delete => "does not exist",
        }
    }
}

/// Authorizer backed by an OpenFGA server
#[derive(Debug, Clone)]
pub struct OpenFgaAuthorizer {
    config: OpenFgaConfig,
}

impl OpenFgaAuthorizer {
    /// Create an authorizer; `store_id` must be set
    pub fn new(config: OpenFgaConfig) -> Result<Self, BackendError> {
        if config.store_id.as_deref().map_or(true, str::is_empty) {
            return Err(BackendError::unavailable("OpenFGA store_id is not configured"));
        }
        Ok(Self { config })
    }

    fn write_url(&self) -> String {
        format!(
            "{}/stores/{}/write",
            self.config.api_url.trim_end_matches('/'),
            self.config.store_id.as_deref().unwrap_or_default()
        )
    }

    fn build_client(&self) -> BackendResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| BackendError::unavailable(format!("invalid API token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .build()
            .map_err(|e| BackendError::unavailable(format!("failed to build HTTP client: {}", e)))
    }
}

#[async_trait]
impl Authorizer for OpenFgaAuthorizer {
    fn name(&self) -> &str {
        "OpenFgaAuthorizer"
    }

    async fn open(&self) -> BackendResult<Box<dyn AuthorizerSession>> {
        let client = self.build_client()?;
        debug!("OpenFGA session opened against {}", self.config.api_url);

        Ok(Box::new(OpenFgaSession {
            client,
            write_url: self.write_url(),
            authorization_model_id: self.config.authorization_model_id.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct OpenFgaSession {
    client: reqwest::Client,
    write_url: String,
    authorization_model_id: Option<String>,
    closed: AtomicBool,
}

impl OpenFgaSession {
    async fn change(&self, tuple: TupleKey, change: TupleChange) -> BackendResult<bool> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BackendError::SessionClosed);
        }

        let keys = Some(TupleKeys { tuple_keys: vec![tuple] });
        let body = match change {
            TupleChange::Write => WriteRequest {
                writes: keys,
                deletes: None,
                authorization_model_id: self.authorization_model_id.as_deref(),
            },
            TupleChange::Delete => WriteRequest {
                writes: None,
                deletes: keys,
                authorization_model_id: self.authorization_model_id.as_deref(),
            },
        };

        let response = self
            .client
            .post(&self.write_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;

        if self.closed.load(Ordering::SeqCst) {
            return Err(BackendError::SessionClosed);
        }

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;
        let error: ErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ErrorBody {
            code: String::new(),
            message: text.clone(),
        });

        if status == StatusCode::BAD_REQUEST && error.message.contains(change.no_op_marker()) {
            return Ok(false);
        }

        warn!("OpenFGA write failed ({}): {} {}", status, error.code, error.message);
        Err(BackendError::Rejected {
            status: status.as_u16(),
            message: error.message,
        })
    }
}

#[async_trait]
impl AuthorizerSession for OpenFgaSession {
    async fn grant(
        &self,
        actor: &Actor,
        relation: &str,
        resource: &Resource,
    ) -> BackendResult<bool> {
        self.change(TupleKey::new(actor, relation, resource), TupleChange::Write).await
    }

    async fn revoke(
        &self,
        actor: &Actor,
        relation: &str,
        resource: &Resource,
    ) -> BackendResult<bool> {
        self.change(TupleKey::new(actor, relation, resource), TupleChange::Delete).await
    }

    async fn close(&self) -> BackendResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

//! Authorization requests, operations and per-request results

use super::entity::{Actor, Resource};
use super::Relation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One unit of work: a single `(actor, relation, resource)` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Who the relation is for
    pub actor: Actor,

    /// Which relation is granted or revoked
    pub relation: Relation,

    /// What the relation applies to
    pub resource: Resource,
}

impl AuthorizationRequest {
    /// Create a new request
    pub fn new(actor: Actor, relation: impl Into<Relation>, resource: Resource) -> Self {
        Self {
            actor,
            relation: relation.into(),
            resource,
        }
    }

    /// Human readable form: `<actorType>:<actorId> <relation> on <resourceType>:<resourceId>`
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AuthorizationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.actor, self.relation, self.resource)
    }
}

/// Which of the two idempotent operations a batch performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Ensure the relationship exists
    Grant,
    /// Ensure the relationship does not exist
    Revoke,
}

impl Operation {
    /// Pick the operation from the grant/revoke selector
    pub fn from_grant_flag(grant: bool) -> Self {
        if grant {
            Operation::Grant
        } else {
            Operation::Revoke
        }
    }

    /// Lowercase verb ("grant" / "revoke")
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Grant => "grant",
            Operation::Revoke => "revoke",
        }
    }

    /// Capitalized noun used in result lines ("Grant" / "Revoke")
    pub fn title(&self) -> &'static str {
        match self {
            Operation::Grant => "Grant",
            Operation::Revoke => "Revoke",
        }
    }

    /// Line reported before a request is dispatched
    pub fn attempt_line(&self, request: &AuthorizationRequest) -> String {
        format!("Attempting to {} {}", self.verb(), request)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Outcome of one request that completed without a backend error
///
/// `succeeded == false` means the relationship already existed (grant) or
/// was already absent (revoke). That is a normal outcome, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResult {
    /// The request this result answers
    pub request: AuthorizationRequest,

    /// Operation that was performed
    pub operation: Operation,

    /// Whether the operation newly took effect
    pub succeeded: bool,
}

impl AuthorizationResult {
    /// Create a new result
    pub fn new(request: AuthorizationRequest, operation: Operation, succeeded: bool) -> Self {
        Self {
            request,
            operation,
            succeeded,
        }
    }

    /// Line reported once the request completes
    pub fn status_line(&self) -> String {
        let outcome = if self.succeeded { "succeeded" } else { "already existed" };
        format!("{} for {} {}", self.operation.title(), self.request, outcome)
    }
}

impl fmt::Display for AuthorizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_line())
    }
}

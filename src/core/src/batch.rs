//! Batch configuration and up-front validation

use crate::error::ValidationError;
use crate::expand::expand;
use crate::types::{
    AuthorizationRequest, Operation, Relation, DEFAULT_ACTOR_TYPE, DEFAULT_RELATION,
    DEFAULT_RESOURCE_TYPE,
};
use serde::{Deserialize, Serialize};

/// Split a space-delimited list, skipping empty tokens
pub fn parse_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Everything needed to run one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSpec {
    /// Type label for every actor
    pub actor_type: String,

    /// Type label for every resource
    pub resource_type: String,

    /// Actor identifiers
    pub actors: Vec<String>,

    /// Relations to grant or revoke
    pub relations: Vec<Relation>,

    /// Resource identifiers
    pub resources: Vec<String>,

    /// Grant or revoke
    pub operation: Operation,
}

impl BatchSpec {
    /// Create a spec with default type labels and the default relation
    pub fn new(actors: Vec<String>, resources: Vec<String>, operation: Operation) -> Self {
        Self {
            actor_type: DEFAULT_ACTOR_TYPE.to_string(),
            resource_type: DEFAULT_RESOURCE_TYPE.to_string(),
            actors,
            relations: vec![DEFAULT_RELATION.to_string()],
            resources,
            operation,
        }
    }

    /// Replace the relations
    pub fn with_relations(mut self, relations: Vec<Relation>) -> Self {
        self.relations = relations;
        self
    }

    /// Replace the actor type label
    pub fn with_actor_type(mut self, actor_type: impl Into<String>) -> Self {
        self.actor_type = actor_type.into();
        self
    }

    /// Replace the resource type label
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    /// Reject a batch that cannot be dispatched
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.actor_type.trim().is_empty() {
            return Err(ValidationError::EmptyTypeLabel("actor"));
        }
        if self.resource_type.trim().is_empty() {
            return Err(ValidationError::EmptyTypeLabel("resource"));
        }
        if self.actors.is_empty() {
            return Err(ValidationError::NoActors);
        }
        if self.relations.is_empty() {
            return Err(ValidationError::NoRelations);
        }
        if self.resources.is_empty() {
            return Err(ValidationError::NoResources);
        }
        Ok(())
    }

    /// Number of requests the batch will issue
    pub fn size(&self) -> usize {
        self.actors.len() * self.relations.len() * self.resources.len()
    }

    /// Expand into requests, in issuance order
    pub fn requests(&self) -> Vec<AuthorizationRequest> {
        expand(
            &self.actors,
            &self.relations,
            &self.resources,
            &self.actor_type,
            &self.resource_type,
        )
    }
}

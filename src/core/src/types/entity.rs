//! Actors and resources

use serde::{Deserialize, Serialize};
use std::fmt;

/// Principal a relation is granted to (user, service account, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Actor type label (e.g. "User")
    #[serde(rename = "type")]
    pub actor_type: String,

    /// Actor identifier, passed through as an opaque string
    pub id: String,
}

impl Actor {
    /// Create a new actor
    pub fn new(actor_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            actor_type: actor_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.actor_type, self.id)
    }
}

/// Object a relation is granted against (e.g. an agent network)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type label (e.g. "AgentNetwork")
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Resource identifier, passed through as an opaque string
    pub id: String,
}

impl Resource {
    /// Create a new resource
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

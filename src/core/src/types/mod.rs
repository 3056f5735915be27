//! Authorization data model

pub mod entity;
pub mod request;

// Re-export commonly used types
pub use entity::{Actor, Resource};
pub use request::{AuthorizationRequest, AuthorizationResult, Operation};

/// Named permission or action being granted or revoked (e.g. "read")
pub type Relation = String;

/// Actor type label used when none is configured
pub const DEFAULT_ACTOR_TYPE: &str = "User";

/// Resource type label used when none is configured
pub const DEFAULT_RESOURCE_TYPE: &str = "AgentNetwork";

/// Relation granted when none is configured
pub const DEFAULT_RELATION: &str = "read";

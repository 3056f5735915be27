//! # agentauth core
//!
//! Data model shared by every agentauth crate: actors, resources, relations,
//! authorization requests and their results, the cross-product expander that
//! turns a batch configuration into requests, and the error types raised
//! before and during dispatch.
//!
//! ## Example
//!
//! ```rust
//! use agentauth_core::{expand, Operation};
//!
//! let requests = expand(
//!     &["alice", "bob"],
//!     &["read"],
//!     &["sales"],
//!     "User",
//!     "AgentNetwork",
//! );
//!
//! assert_eq!(requests.len(), 2);
//! assert_eq!(
//!     Operation::Grant.attempt_line(&requests[0]),
//!     "Attempting to grant User:alice read on AgentNetwork:sales"
//! );
//! ```

pub mod batch;
pub mod error;
pub mod expand;
pub mod types;

// Re-export commonly used types
pub use batch::{parse_list, BatchSpec};
pub use error::{BackendError, ValidationError};
pub use expand::expand;
pub use types::{
    Actor, AuthorizationRequest, AuthorizationResult, Operation, Relation, Resource,
    DEFAULT_ACTOR_TYPE, DEFAULT_RELATION, DEFAULT_RESOURCE_TYPE,
};

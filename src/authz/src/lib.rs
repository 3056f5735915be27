//! # agentauth authz
//!
//! Bulk grant/revoke client for relationship-based authorization backends.
//!
//! A batch is the cross product of actors, relations and resources. The
//! [`BatchOrchestrator`] opens one [`AuthorizerSession`] for the whole batch,
//! issues every request concurrently through it, and returns a
//! [`BatchReport`] with one outcome per request.
//!
//! ## Example
//!
//! ```rust
//! use agentauth_authz::{BatchOrchestrator, InMemoryAuthorizer};
//! use agentauth_core::{BatchSpec, Operation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let authorizer = InMemoryAuthorizer::new();
//!     let spec = BatchSpec::new(
//!         vec!["alice".into(), "bob".into()],
//!         vec!["sales".into()],
//!         Operation::Grant,
//!     );
//!
//!     let report = BatchOrchestrator::new().run(&authorizer, &spec).await?;
//!     for line in report.status_lines() {
//!         println!("{}", line);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod authorizer;
pub mod backends;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod report;

// Re-export commonly used types
pub use authorizer::{Authorizer, AuthorizerSession, BackendResult};
pub use backends::{InMemoryAuthorizer, NullAuthorizer, OpenFgaAuthorizer, OpenFgaConfig};
pub use error::{AuthorizationBatchError, AuthzError, Result};
pub use orchestrator::{BatchOrchestrator, OrchestratorConfig};
pub use registry::{AuthorizerConfig, AuthorizerFactory, AuthorizerRegistry};
pub use report::{BatchReport, RequestOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

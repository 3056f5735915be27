//! Built-in authorizer backends

pub mod memory;
pub mod null;
pub mod openfga;

pub use memory::InMemoryAuthorizer;
pub use null::NullAuthorizer;
pub use openfga::{OpenFgaAuthorizer, OpenFgaConfig};

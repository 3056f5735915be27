//! Tool configuration loading and validation
//!
//! Precedence, lowest first: built-in defaults, the TOML config file, then
//! environment variables and command line flags (see [`crate::cli::Cli`]).

use agentauth_authz::{AuthorizerConfig, OrchestratorConfig};
use agentauth_core::{
    parse_list, BatchSpec, Operation, DEFAULT_ACTOR_TYPE, DEFAULT_RELATION,
    DEFAULT_RESOURCE_TYPE,
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete tool configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub batch: BatchSection,

    #[serde(default)]
    pub authorizer: AuthorizerConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchSection {
    #[serde(default = "default_actor_type")]
    pub actor_type: String,
    #[serde(default = "default_resource_type")]
    pub resource_type: String,
    /// Space-delimited relation list
    #[serde(default = "default_relations")]
    pub relations: String,
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            actor_type: default_actor_type(),
            resource_type: default_resource_type(),
            relations: default_relations(),
            manifest: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrchestratorSection {
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

// Default value functions
fn default_actor_type() -> String { DEFAULT_ACTOR_TYPE.to_string() }
fn default_resource_type() -> String { DEFAULT_RESOURCE_TYPE.to_string() }
fn default_relations() -> String { DEFAULT_RELATION.to_string() }

impl AppConfig {
    /// Load from a TOML file, or fall back to defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Parse TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject settings the batch cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.authorizer.backend.trim().is_empty() {
            bail!("Authorizer backend name is empty");
        }
        if parse_list(&self.batch.relations).is_empty() {
            bail!("No relations configured");
        }
        if self.orchestrator.max_in_flight == Some(0) {
            bail!("orchestrator.max_in_flight must be at least 1");
        }
        Ok(())
    }

    /// Relations as a list
    pub fn relations(&self) -> Vec<String> {
        parse_list(&self.batch.relations)
    }

    /// Build the batch for the given actors and resources
    pub fn batch_spec(
        &self,
        actors: Vec<String>,
        resources: Vec<String>,
        operation: Operation,
    ) -> BatchSpec {
        BatchSpec::new(actors, resources, operation)
            .with_relations(self.relations())
            .with_actor_type(self.batch.actor_type.clone())
            .with_resource_type(self.batch.resource_type.clone())
    }

    /// Orchestrator settings from the `[orchestrator]` section
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_in_flight: self.orchestrator.max_in_flight,
        }
    }
}

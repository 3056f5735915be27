//! Command line arguments

use crate::config::AppConfig;
use agentauth_core::{parse_list, Operation};
use clap::Parser;
use std::path::PathBuf;

/// Grant or revoke access to agent networks in bulk
#[derive(Debug, Parser)]
#[command(name = "agentauth")]
#[command(about = "Grant or revoke user access to agent networks against an authorization server")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "AGENTAUTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Space separated user name(s) to authorize
    #[arg(long, env = "USER")]
    pub user: Option<String>,

    /// Space separated agent network name(s); all networks in the manifest when unset
    #[arg(long)]
    pub network: Option<String>,

    /// Manifest listing the agent networks
    #[arg(long, env = "AGENT_MANIFEST_FILE")]
    pub manifest: Option<PathBuf>,

    /// Grant authorization (the default operation)
    #[arg(long, conflicts_with = "revoke")]
    pub grant: bool,

    /// Revoke authorization
    #[arg(long)]
    pub revoke: bool,

    /// Registered authorizer backend (null, in_memory, openfga)
    #[arg(long, env = "AGENT_AUTHORIZER")]
    pub authorizer: Option<String>,

    /// Space separated relation(s) to grant or revoke
    #[arg(long, env = "AGENT_AUTHORIZER_ALLOW_ACTION")]
    pub relations: Option<String>,

    /// Type label for resources
    #[arg(long, env = "AGENT_AUTHORIZER_RESOURCE_KEY")]
    pub resource_type: Option<String>,

    /// Type label for actors
    #[arg(long, env = "AGENT_AUTHORIZER_ACTOR_KEY")]
    pub actor_type: Option<String>,

    /// Upper bound on concurrently in-flight backend calls
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// OpenFGA API URL
    #[arg(long, env = "FGA_API_URL")]
    pub fga_api_url: Option<String>,

    /// OpenFGA store id
    #[arg(long, env = "FGA_STORE_ID")]
    pub fga_store_id: Option<String>,

    /// OpenFGA authorization model id
    #[arg(long, env = "FGA_AUTHORIZATION_MODEL_ID")]
    pub fga_model_id: Option<String>,

    /// OpenFGA pre-shared API token
    #[arg(long, env = "FGA_API_TOKEN", hide_env_values = true)]
    pub fga_api_token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Grant unless `--revoke` was given
    pub fn operation(&self) -> Operation {
        Operation::from_grant_flag(!self.revoke)
    }

    /// User names from `--user` / `$USER`
    pub fn users(&self) -> Vec<String> {
        self.user.as_deref().map(parse_list).unwrap_or_default()
    }

    /// Network names given on the command line, if any
    pub fn networks(&self) -> Option<Vec<String>> {
        self.network.as_deref().map(parse_list)
    }

    /// Apply flag and environment overrides on top of the loaded config
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(manifest) = &self.manifest {
            config.batch.manifest = Some(manifest.clone());
        }
        if let Some(backend) = &self.authorizer {
            config.authorizer.backend = backend.clone();
        }
        if let Some(relations) = &self.relations {
            config.batch.relations = relations.clone();
        }
        if let Some(resource_type) = &self.resource_type {
            config.batch.resource_type = resource_type.clone();
        }
        if let Some(actor_type) = &self.actor_type {
            config.batch.actor_type = actor_type.clone();
        }
        if let Some(limit) = self.max_in_flight {
            config.orchestrator.max_in_flight = Some(limit);
        }

        let openfga = &mut config.authorizer.openfga;
        if let Some(url) = &self.fga_api_url {
            openfga.api_url = url.clone();
        }
        if let Some(store_id) = &self.fga_store_id {
            openfga.store_id = Some(store_id.clone());
        }
        if let Some(model_id) = &self.fga_model_id {
            openfga.authorization_model_id = Some(model_id.clone());
        }
        if let Some(token) = &self.fga_api_token {
            openfga.api_token = Some(token.clone());
        }
    }
}

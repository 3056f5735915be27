//! agentauth command line tool
//!
//! Resolves users, networks and backend settings from flags, environment and
//! an optional config file, then runs one grant or revoke batch.

pub mod cli;
pub mod config;
pub mod manifest;

pub use cli::Cli;
pub use config::AppConfig;

use agentauth_authz::{AuthorizerRegistry, BatchOrchestrator, BatchReport};
use agentauth_core::AuthorizationResult;
use anyhow::{bail, Context, Result};
use std::io::Write;
use tracing::info;

/// Initialize logging on stderr, keeping stdout for the report
pub fn init_tracing(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file and apply flag/environment overrides
pub fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

/// Networks named on the command line, or else every enabled manifest entry
pub fn resolve_networks(cli: &Cli, config: &AppConfig) -> Result<Vec<String>> {
    if let Some(networks) = cli.networks() {
        return Ok(networks);
    }

    match &config.batch.manifest {
        Some(path) => manifest::read_network_names(path),
        None => bail!("No --network given and no manifest configured (AGENT_MANIFEST_FILE)"),
    }
}

/// Run one batch as described by the command line
///
/// The selected authorizer is announced on `out` before any request is sent.
pub async fn run<W: Write>(
    cli: &Cli,
    registry: &AuthorizerRegistry,
    out: &mut W,
) -> Result<BatchReport> {
    let config = resolve_config(cli)?;
    let networks = resolve_networks(cli, &config)?;
    let spec = config.batch_spec(cli.users(), networks, cli.operation());

    let authorizer = registry
        .create(&config.authorizer)
        .context("Failed to create authorizer")?;
    writeln!(out, "Using Authorizer: {}", authorizer.name())?;

    info!(
        "{} {} request(s): {} user(s) x {} relation(s) x {} network(s)",
        spec.operation,
        spec.size(),
        spec.actors.len(),
        spec.relations.len(),
        spec.resources.len()
    );

    let orchestrator = BatchOrchestrator::with_config(config.orchestrator_config());
    let report = orchestrator.run(authorizer.as_ref(), &spec).await?;
    Ok(report)
}

/// Print one line per request and fail if any request or the close failed
pub fn print_report<W: Write>(
    report: BatchReport,
    out: &mut W,
) -> Result<Vec<AuthorizationResult>> {
    for line in report.status_lines() {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    Ok(report.into_result()?)
}

//! agentauth - bulk grant/revoke of agent network access
//!
//! ```text
//! agentauth --user "alice bob" --network sales --relations "read write"
//! agentauth --user alice --revoke          # every network in $AGENT_MANIFEST_FILE
//! ```

use agentauth_authz::AuthorizerRegistry;
use agentauth_cli::{init_tracing, print_report, run, Cli};
use anyhow::Result;
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = AuthorizerRegistry::with_builtins();
    let mut stdout = std::io::stdout();
    let report = run(&cli, &registry, &mut stdout).await?;

    if let Err(e) = print_report(report, &mut stdout) {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

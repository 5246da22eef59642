//! edgectl — versioned edge-service configuration CLI.
//!
//! # Usage
//!
//! ```text
//! edgectl services [--json]
//! edgectl create --service-name <name>
//! edgectl sync --path <file.csv> --service <name> --dict <name>
//! edgectl tail <service> --endpoint <host> [--port N]
//!              [--local-endpoint <host>] [--local-port N]
//! ```
//!
//! Connection settings come from `--token` / `--api-endpoint` or the
//! `EDGECTL_API_TOKEN` / `EDGECTL_API_ENDPOINT` environment variables.

mod commands;
mod session;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{create::CreateArgs, services::ServicesArgs, sync::SyncArgs, tail::TailArgs};
use edgectl_api::{Client, ClientConfig};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "edgectl",
    version,
    about = "Manage versioned edge-service configuration",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    api: ApiOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Connection flags shared by every subcommand.
#[derive(Args, Debug)]
struct ApiOpts {
    /// API token.
    #[arg(long, env = "EDGECTL_API_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Base URL of the configuration API.
    #[arg(long, env = "EDGECTL_API_ENDPOINT", global = true)]
    api_endpoint: Option<String>,
}

impl ApiOpts {
    /// Build a client from the flags, failing with a pointer to the env vars
    /// when a setting is missing. No command talks to the API without this.
    fn client(&self) -> Result<Client> {
        let token = self
            .token
            .clone()
            .context("no API token configured; pass --token or export EDGECTL_API_TOKEN")?;
        let endpoint = self.api_endpoint.clone().context(
            "no API endpoint configured; pass --api-endpoint or export EDGECTL_API_ENDPOINT",
        )?;
        Ok(Client::new(ClientConfig::new(endpoint, token)))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List services on the account.
    Services(ServicesArgs),

    /// Create a new service.
    Create(CreateArgs),

    /// Sync a local CSV file into a service's edge dictionary.
    Sync(SyncArgs),

    /// Stream request logs from a service to the terminal.
    Tail(TailArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Services(args) => args.run(&cli.api),
        Commands::Create(args) => args.run(&cli.api),
        Commands::Sync(args) => args.run(&cli.api),
        Commands::Tail(args) => args.run(&cli.api),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

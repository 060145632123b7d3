//! bnctl - command-line interface for bero*fos and bero*rps appliances.
//!
//! Scans the network for devices, drives the UDP management protocol
//! (network configuration, ping, watchdog, reset, firmware flashing) and
//! reads or changes configuration values over the devices' HTTP interface.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::Context;
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "bnctl=debug,bnctl_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::from_cli(&cli);

    match cli.command {
        Commands::Scan(args) => commands::run_scan(args, &ctx).await,
        Commands::Netconf(args) => commands::run_netconf(args, &ctx).await,
        Commands::Ping(args) => commands::run_ping(args, &ctx).await,
        Commands::Kick(args) => commands::run_kick(args, &ctx).await,
        Commands::Reset(args) => commands::run_reset(args, &ctx).await,
        Commands::Flash(args) => commands::run_flash(args, &ctx).await,
        Commands::Set(args) => commands::run_set(args, &ctx).await,
        Commands::Get(args) => commands::run_get(args, &ctx).await,
        Commands::Show(args) => commands::run_show(args, &ctx).await,
        Commands::Keys => commands::run_keys(&ctx),
        Commands::Template => commands::run_template(&ctx),
    }
}

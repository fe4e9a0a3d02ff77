mod catalog;
mod commands;
mod db;
mod depend;
mod diff;
mod docker;
mod order;
mod render;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two SQL-defined schema states inside a disposable PostgreSQL
    /// container and print the ordered DDL
    DiffHeadless(commands::diff_headless::DiffHeadlessArgs),

    /// Print version and host information
    Info(commands::info::InfoArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).init();

    // Interrupts must not leave scratch containers behind.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            docker::cleanup_all_containers().await;
            std::process::exit(130);
        }
    });

    match cli.command {
        Commands::DiffHeadless(args) => commands::diff_headless::run(args).await,
        Commands::Info(args) => commands::info::run(args).await,
    }
}

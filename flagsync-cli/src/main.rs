//! Flagsync — feature-flag document/remote-config sync CLI.
//!
//! # Usage
//!
//! ```text
//! flagsync anchor [--dry-run] [--json]
//! flagsync sync --env <environment> [--dry-run] [--json]
//! flagsync gc [--dry-run] [--json]
//! flagsync set <key> <value> --env <environment> [--dry-run] [--json]
//! ```
//!
//! Exit code 0 on success (dry-runs included), non-zero on any unrecoverable
//! stage failure.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{anchor::AnchorArgs, gc::GcArgs, set::SetArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "flagsync",
    version,
    about = "Synchronize feature-flag planning documents with remote config",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive and anchor flag keys into planning documents.
    Anchor(AnchorArgs),

    /// Synchronize the documents' flags to a target environment.
    Sync(SyncArgs),

    /// Garbage-collect orphaned flags across all environments.
    Gc(GcArgs),

    /// Update a single existing parameter's default value.
    Set(SetArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Anchor(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Gc(args) => args.run(),
        Commands::Set(args) => args.run(),
    }
}

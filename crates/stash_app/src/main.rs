//! `stash`: back up an account's saved posts and comments to a snapshot file.
mod commands;
mod config;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use stash_logging::{stash_error, LogDestination};

use crate::commands::SyncOptions;

#[derive(Parser)]
#[command(name = "stash", version, about = "Saved-listing sync and snapshot tool")]
struct Cli {
    /// Where log output goes: file, terminal or both.
    #[arg(long, global = true, default_value = "terminal")]
    log: LogDestination,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every saved item and write a snapshot.
    Sync {
        /// Snapshot file to write; defaults to a timestamped name.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Existing snapshot to merge under the live results.
        #[arg(long)]
        merge: Option<PathBuf>,
        /// Cancel the sync after this many seconds, keeping partial results.
        #[arg(long)]
        deadline_secs: Option<u64>,
        /// OAuth bearer token; falls back to STASH_TOKEN.
        #[arg(long)]
        token: Option<String>,
        /// RON config file; defaults to ./stash.ron when present.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print a summary of a snapshot file.
    Inspect { snapshot: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    stash_logging::initialize(cli.log, level);

    let result = match cli.command {
        Commands::Sync {
            out,
            merge,
            deadline_secs,
            token,
            config,
        } => commands::sync(SyncOptions {
            out,
            merge,
            deadline_secs,
            token,
            config,
        }),
        Commands::Inspect { snapshot } => commands::inspect(&snapshot),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            stash_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

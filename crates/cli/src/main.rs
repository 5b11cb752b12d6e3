mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// snapsort — photo deduplication and organization
#[derive(Parser)]
#[command(name = "snapsort", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Organize a messy photo tree into a dated output layout
    Organize {
        /// Directory to read photos from
        input: PathBuf,
        /// Directory to build the organized layout in
        output: PathBuf,
    },
    /// Find byte-identical files within a directory
    Dedup {
        /// Directory to scan recursively
        directory: PathBuf,
        /// Delete duplicates, keeping one file per group
        #[arg(long)]
        remove: bool,
        /// Keep the oldest file in each group instead of the newest
        #[arg(long, conflicts_with = "keep_longest_name")]
        keep_oldest: bool,
        /// Keep the file with the most descriptive name in each group
        #[arg(long)]
        keep_longest_name: bool,
        /// Skip the confirmation prompt before deleting
        #[arg(long)]
        force: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Organize { input, output } => commands::organize::run(input, output)?,
        Commands::Dedup {
            directory,
            remove,
            keep_oldest,
            keep_longest_name,
            force,
        } => commands::dedup::run(directory, remove, keep_oldest, keep_longest_name, force)?,
    }

    Ok(())
}

//! Provides the main entry point to the program.
use anyhow::Result;
use centrifuge::commands::handle_run_command;
use clap::Parser;
use std::path::PathBuf;

/// Simulate a uranium enrichment facility trading in a resource exchange.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Folder containing the model definition (model.toml)
    model_dir: PathBuf,
    /// Folder to write output files to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    handle_run_command(&cli.model_dir, cli.output_dir.as_deref())
}

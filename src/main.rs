//! # Tunestats - Listening Analytics
//!
//! Generates a synthetic music-listening dataset and derives a fixed set of
//! descriptive reports from it.
//!
//! ## Usage
//!
//! ```bash
//! # Fabricate data/songs_metadata.csv and data/listening_logs.csv
//! tunestats generate
//!
//! # Write every report under output/
//! tunestats analyze
//!
//! # Both, reproducibly
//! tunestats run --seed 42
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::info;
use tunestats::{cli, completion, generator, pipeline};

/// Main entry point for Tunestats.
///
/// Initializes logging, parses command-line arguments, and routes commands
/// to the generator or the pipeline.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=info tunestats run` - Stage progress and row counts
/// - `RUST_LOG=tunestats::pipeline=debug tunestats analyze` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Generate { common, seed } => {
            let config = common.resolve()?;
            info!("Generating dataset into {}", config.generator.data_dir.display());
            generator::run(&config.generator, seed)?;
        }
        cli::Command::Analyze { common, output_dir } => {
            let mut config = common.resolve()?;
            cli::apply_output_dir(&mut config, output_dir.as_ref());
            info!("Analyzing {}", config.pipeline.data_dir.display());
            let summary = pipeline::run(&config.pipeline)?;
            info!("Pipeline finished: {summary:?}");
        }
        cli::Command::Run { common, output_dir, seed } => {
            let config = common.resolve_for_run(output_dir.as_ref())?;
            generator::run(&config.generator, seed)?;
            let summary = pipeline::run(&config.pipeline)?;
            info!("Pipeline finished: {summary:?}");
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
    }

    Ok(())
}

//! # Command-Line Interface Module
//!
//! Defines the command-line interface for Tunestats using Clap derive macros.
//!
//! ## Commands
//!
//! - `generate`: Fabricate the song catalog and listening logs
//! - `analyze`: Enrich the logs and write every report
//! - `run`: `generate` followed by `analyze`
//! - `completion`: Print a shell completion script
//!
//! Every flag is optional; without any, data goes to `./data` and reports to
//! `./output`.
//!
//! ## Examples
//!
//! ```bash
//! tunestats generate --seed 42
//! tunestats analyze
//! tunestats run --output-dir /tmp/reports
//! ```

use crate::config::Config;
use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "tunestats")]
#[command(about = "Tunestats: synthetic listening logs & batch listening reports")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every stage.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CommonOpts {
    /// JSON configuration file
    ///
    /// Values in the file replace the built-in defaults; flags given on the
    /// command line replace values from the file.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory holding songs_metadata.csv and listening_logs.csv
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,
}

impl CommonOpts {
    /// Load the configuration file (if any) and apply the flag overrides.
    ///
    /// # Errors
    ///
    /// Fails if the configuration file cannot be loaded.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;
        if let Some(data_dir) = &self.data_dir {
            config.set_data_dir(data_dir.clone());
        }
        Ok(config)
    }

    /// Resolve the configuration for `run`.
    ///
    /// The pipeline reads from wherever the generator writes, so a file that
    /// only sets `generator.data_dir` still analyzes the fresh dataset.
    ///
    /// # Errors
    ///
    /// Fails if the configuration file cannot be loaded.
    pub fn resolve_for_run(&self, output_dir: Option<&PathBuf>) -> Result<Config> {
        let mut config = self.resolve()?;
        let data_dir = config.generator.data_dir.clone();
        config.set_data_dir(data_dir);
        apply_output_dir(&mut config, output_dir);
        Ok(config)
    }
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the synthetic dataset
    ///
    /// Writes a 100-song catalog and the listening logs of 20 users into the
    /// data directory, creating it if needed. Two users lean heavily
    /// towards sad songs.
    Generate {
        #[command(flatten)]
        common: CommonOpts,

        /// Seed the random generator for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Compute every report from an existing dataset
    ///
    /// Reads the data directory, joins logs with song metadata and writes
    /// one CSV per report under the output directory.
    Analyze {
        #[command(flatten)]
        common: CommonOpts,

        /// Root directory for the reports
        #[arg(long, value_hint = clap::ValueHint::DirPath)]
        output_dir: Option<PathBuf>,
    },

    /// Generate a dataset, then analyze it
    Run {
        #[command(flatten)]
        common: CommonOpts,

        /// Root directory for the reports
        #[arg(long, value_hint = clap::ValueHint::DirPath)]
        output_dir: Option<PathBuf>,

        /// Seed the random generator for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate shell completions
    ///
    /// Usage: tunestats completion bash > ~/.local/share/bash-completion/completions/tunestats
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Apply an `--output-dir` override on top of `config`.
pub fn apply_output_dir(config: &mut Config, output_dir: Option<&PathBuf>) {
    if let Some(output_dir) = output_dir {
        config.pipeline.output_dir = output_dir.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_generate_without_flags_uses_defaults() -> Result<()> {
        let args = Args::try_parse_from(["tunestats", "generate"])?;
        let Command::Generate { common, seed } = args.command else {
            panic!("expected generate");
        };
        assert_eq!(seed, None);

        let config = common.resolve()?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_run_overrides() -> Result<()> {
        let args = Args::try_parse_from([
            "tunestats",
            "run",
            "--data-dir",
            "/tmp/in",
            "--output-dir",
            "/tmp/out",
            "--seed",
            "9",
        ])?;
        let Command::Run { common, output_dir, seed } = args.command else {
            panic!("expected run");
        };
        let config = common.resolve_for_run(output_dir.as_ref())?;

        assert_eq!(seed, Some(9));
        assert_eq!(config.generator.data_dir, PathBuf::from("/tmp/in"));
        assert_eq!(config.pipeline.data_dir, PathBuf::from("/tmp/in"));
        assert_eq!(config.pipeline.output_dir, PathBuf::from("/tmp/out"));
        Ok(())
    }

    #[test]
    fn test_run_reads_from_generator_data_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cfg.json");
        fs::write(&path, r#"{ "generator": { "data_dir": "gen" } }"#)?;

        let args = Args::try_parse_from([
            "tunestats",
            "run",
            "--config",
            path.to_str().expect("utf-8 temp path"),
        ])?;
        let Command::Run { common, output_dir, .. } = args.command else {
            panic!("expected run");
        };
        let config = common.resolve_for_run(output_dir.as_ref())?;

        assert_eq!(config.generator.data_dir, PathBuf::from("gen"));
        assert_eq!(config.pipeline.data_dir, PathBuf::from("gen"));
        assert_eq!(config.pipeline.output_dir, PathBuf::from("output"));
        Ok(())
    }

    #[test]
    fn test_unknown_shell_rejected() {
        assert!(Args::try_parse_from(["tunestats", "completion", "tcsh"]).is_err());
    }
}

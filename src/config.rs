//! # Configuration Module
//!
//! This module holds the knobs of the generator and the locations the
//! pipeline reads from and writes to.
//!
//! ## Defaults
//!
//! With no configuration file and no flags, Tunestats works relative to the
//! current directory:
//! - input/generator output: `data/`
//! - reports: `output/<report>/<report>.csv`
//!
//! ## Configuration File
//!
//! A JSON file can override any subset of the values; missing fields keep
//! their defaults:
//!
//! ```json
//! {
//!   "generator": { "user_count": 50, "biased_users": ["user_7"] },
//!   "pipeline": { "output_dir": "reports" }
//! }
//! ```

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the song catalog inside the data directory.
pub const SONGS_FILE: &str = "songs_metadata.csv";
/// File name of the listening logs inside the data directory.
pub const LOGS_FILE: &str = "listening_logs.csv";

/// Knobs of the synthetic dataset generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory the two source tables are written to
    pub data_dir: PathBuf,
    /// Catalog size
    pub song_count: usize,
    /// Number of distinct artists, assigned round robin
    pub artist_count: usize,
    /// Number of synthetic users
    pub user_count: usize,
    /// Fewest events a user emits (inclusive)
    pub min_events_per_user: usize,
    /// Most events a user emits (inclusive)
    pub max_events_per_user: usize,
    /// Users whose picks lean towards the "Sad" genre
    pub biased_users: Vec<String>,
    /// Chance that a biased user's pick comes from the "Sad" subset
    pub sad_bias: f64,
    /// Events are spread over this many days before generation time
    pub history_days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            song_count: 100,
            artist_count: 10,
            user_count: 20,
            min_events_per_user: 80,
            max_events_per_user: 150,
            biased_users: vec!["user_1".to_string(), "user_2".to_string()],
            sad_bias: 0.8,
            history_days: 14,
        }
    }
}

impl GeneratorConfig {
    /// Reject settings that cannot produce a dataset.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.song_count > 0, "song_count must be at least 1");
        ensure!(self.artist_count > 0, "artist_count must be at least 1");
        ensure!(
            self.min_events_per_user <= self.max_events_per_user,
            "min_events_per_user ({}) exceeds max_events_per_user ({})",
            self.min_events_per_user,
            self.max_events_per_user
        );
        ensure!(
            (0.0..=1.0).contains(&self.sad_bias),
            "sad_bias must be within [0, 1], got {}",
            self.sad_bias
        );
        ensure!(self.history_days > 0, "history_days must be at least 1");
        Ok(())
    }

    #[must_use]
    pub fn songs_path(&self) -> PathBuf {
        self.data_dir.join(SONGS_FILE)
    }

    #[must_use]
    pub fn logs_path(&self) -> PathBuf {
        self.data_dir.join(LOGS_FILE)
    }
}

/// Where the analytics pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding `songs_metadata.csv` and `listening_logs.csv`
    pub data_dir: PathBuf,
    /// Root of the per-report output directories
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn songs_path(&self) -> PathBuf {
        self.data_dir.join(SONGS_FILE)
    }

    #[must_use]
    pub fn logs_path(&self) -> PathBuf {
        self.data_dir.join(LOGS_FILE)
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid JSON for [`Config`].
    /// Generator values are checked by [`crate::generator::generate`], so
    /// `analyze` accepts a file whose generator section is out of range.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Point both stages at the same data directory.
    pub fn set_data_dir(&mut self, data_dir: PathBuf) {
        self.generator.data_dir = data_dir.clone();
        self.pipeline.data_dir = data_dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_dataset_shape() {
        let config = GeneratorConfig::default();
        assert_eq!(config.song_count, 100);
        assert_eq!(config.artist_count, 10);
        assert_eq!(config.user_count, 20);
        assert_eq!((config.min_events_per_user, config.max_events_per_user), (80, 150));
        assert_eq!(config.biased_users, vec!["user_1", "user_2"]);
        assert!((config.sad_bias - 0.8).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.generator.songs_path(), PathBuf::from("data/songs_metadata.csv"));
        assert_eq!(config.pipeline.logs_path(), PathBuf::from("data/listening_logs.csv"));
        assert_eq!(config.pipeline.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = GeneratorConfig {
            min_events_per_user: 10,
            max_events_per_user: 5,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let config = GeneratorConfig {
            sad_bias: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("tunestats.json");
        fs::write(
            &path,
            r#"{ "generator": { "user_count": 3 }, "pipeline": { "output_dir": "reports" } }"#,
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.generator.user_count, 3);
        assert_eq!(config.generator.song_count, 100);
        assert_eq!(config.pipeline.output_dir, PathBuf::from("reports"));
        assert_eq!(config.pipeline.data_dir, PathBuf::from("data"));
        Ok(())
    }

    #[test]
    fn test_load_does_not_check_generator_values() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("tunestats.json");
        fs::write(&path, r#"{ "generator": { "sad_bias": 2.0, "artist_count": 0 } }"#)?;

        let config = Config::load(&path)?;
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert!(config.generator.validate().is_err());
        Ok(())
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load(Path::new("/nonexistent/tunestats.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_set_data_dir_updates_both_stages() {
        let mut config = Config::default();
        config.set_data_dir(PathBuf::from("/tmp/listens"));
        assert_eq!(config.generator.data_dir, PathBuf::from("/tmp/listens"));
        assert_eq!(config.pipeline.data_dir, PathBuf::from("/tmp/listens"));
    }
}

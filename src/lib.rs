//! Batch analytics over a synthetic music-listening dataset.
//!
//! Core modules:
//! - [`generator`] - Fabricates the song catalog and listening logs
//! - [`analytics`] - Enrichment and the pure report functions
//! - [`pipeline`] - Reads the dataset, writes every report
//! - [`model`] - Row types and their CSV headers
//!
//! ### Supporting Modules
//!
//! - [`config`] - Generator knobs and file locations
//! - [`table`] - CSV reading and writing
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use tunestats::config::Config;
//! use tunestats::{generator, pipeline};
//!
//! let config = Config::default();
//! generator::run(&config.generator, Some(42))?;
//! let summary = pipeline::run(&config.pipeline)?;
//! println!("{} enriched events", summary.enriched);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Reports can also be computed without touching the filesystem:
//!
//! ```
//! use chrono::NaiveDate;
//! use rand::{rngs::StdRng, SeedableRng};
//! use tunestats::{analytics, config::GeneratorConfig, generator};
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let dataset = generator::generate(&GeneratorConfig::default(), now, &mut StdRng::seed_from_u64(1))?;
//!
//! let enriched = analytics::enrich(&dataset.events, &dataset.songs);
//! let favorites = analytics::favorite_genres(&enriched);
//! assert_eq!(favorites.len(), 20);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Reports
//!
//! | Report | Rows |
//! |---|---|
//! | `enriched_logs` | every event joined with its song, plus ISO `week` and `hour` |
//! | `user_favorite_genres` | one per user |
//! | `avg_listen_time_per_song` | one per played song |
//! | `top_songs_this_week` | at most 10, most played first |
//! | `happy_recommendations` | up to 3 per sad-biased user, possibly none |
//! | `genre_loyalty_scores` | users above 0.8; no file when there are none |
//! | `night_owl_users` | users with plays between 00:00 and 04:59 |
//!
//! ## Error Handling
//!
//! All fallible functions return `Result<T, anyhow::Error>` with context
//! naming the file or step that failed. Nothing is retried and partial
//! output is left on disk.

pub mod analytics;
pub mod cli;
pub mod completion;
pub mod config;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod table;

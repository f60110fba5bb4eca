//! # Analytics Pipeline
//!
//! Loads the two source tables, enriches them once, and writes every
//! report to `<output_dir>/<report>/<report>.csv`.
//!
//! ## Empty Results
//!
//! - `happy_recommendations` is always written, header-only when nobody
//!   qualifies.
//! - `genre_loyalty_scores` is skipped entirely when nobody qualifies, and a
//!   notice is printed instead. Its directory is still created.
//!
//! Any error aborts the run; reports already written stay on disk.

use crate::analytics::{self, GenreLoyalty};
use crate::config::PipelineConfig;
use crate::model::{CsvRecord, EnrichedEvent, ListeningEvent, Song};
use crate::table;
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDateTime};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// How many loyalty scores are echoed before filtering.
const LOYALTY_PREVIEW: usize = 10;

/// Every table the pipeline can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    EnrichedLogs,
    UserFavoriteGenres,
    AvgListenTimePerSong,
    TopSongsThisWeek,
    HappyRecommendations,
    GenreLoyaltyScores,
    NightOwlUsers,
}

impl Report {
    pub const ALL: [Report; 7] = [
        Report::EnrichedLogs,
        Report::UserFavoriteGenres,
        Report::AvgListenTimePerSong,
        Report::TopSongsThisWeek,
        Report::HappyRecommendations,
        Report::GenreLoyaltyScores,
        Report::NightOwlUsers,
    ];

    /// Directory and file stem of the report.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Report::EnrichedLogs => "enriched_logs",
            Report::UserFavoriteGenres => "user_favorite_genres",
            Report::AvgListenTimePerSong => "avg_listen_time_per_song",
            Report::TopSongsThisWeek => "top_songs_this_week",
            Report::HappyRecommendations => "happy_recommendations",
            Report::GenreLoyaltyScores => "genre_loyalty_scores",
            Report::NightOwlUsers => "night_owl_users",
        }
    }

    #[must_use]
    pub fn dir(self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.name())
    }

    #[must_use]
    pub fn path(self, output_dir: &Path) -> PathBuf {
        self.dir(output_dir).join(format!("{}.csv", self.name()))
    }
}

/// Row counts of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub songs: usize,
    pub events: usize,
    pub enriched: usize,
    pub favorite_genres: usize,
    pub average_listen_times: usize,
    pub top_songs: usize,
    pub recommendations: usize,
    /// `None` when no loyalty file was written.
    pub loyal_users: Option<usize>,
    pub night_owls: usize,
}

/// Run the pipeline against the local clock.
///
/// # Errors
///
/// See [`run_at`].
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    run_at(config, Local::now().naive_local())
}

/// Run the pipeline with `now` deciding which week is "this week".
///
/// # Errors
///
/// Fails if an input is missing or malformed, or any report cannot be
/// written.
pub fn run_at(config: &PipelineConfig, now: NaiveDateTime) -> Result<RunSummary> {
    create_output_dirs(&config.output_dir)?;

    let events: Vec<ListeningEvent> = table::read_rows(&config.logs_path())
        .context("Failed to load listening logs")?;
    let songs: Vec<Song> =
        table::read_rows(&config.songs_path()).context("Failed to load song metadata")?;
    info!("Loaded {} events and {} songs", events.len(), songs.len());

    let enriched = analytics::enrich(&events, &songs);
    let dropped = events.len() - enriched.len();
    if dropped > 0 {
        warn!("Dropped {dropped} events referencing unknown songs");
    }
    write_report(&config.output_dir, Report::EnrichedLogs, &enriched)?;
    println!("Enriched logs saved.");

    let mut summary = analyze(&config.output_dir, &enriched, &songs, now)?;
    summary.songs = songs.len();
    summary.events = events.len();
    summary.enriched = enriched.len();
    Ok(summary)
}

/// Write every report derived from `enriched`.
fn analyze(
    output_dir: &Path,
    enriched: &[EnrichedEvent],
    songs: &[Song],
    now: NaiveDateTime,
) -> Result<RunSummary> {
    let favorites = analytics::favorite_genres(enriched);
    write_report(output_dir, Report::UserFavoriteGenres, &favorites)?;

    let averages = analytics::average_listen_time(enriched);
    write_report(output_dir, Report::AvgListenTimePerSong, &averages)?;

    let week = now.iso_week().week();
    debug!("Current ISO week is {week}");
    let top_songs = analytics::top_songs_for_week(enriched, week);
    write_report(output_dir, Report::TopSongsThisWeek, &top_songs)?;

    let recommendations = analytics::happy_recommendations(enriched, songs);
    write_report(output_dir, Report::HappyRecommendations, &recommendations)?;

    let loyal_users = write_loyalty(output_dir, enriched)?;

    let owls = analytics::night_owls(enriched);
    write_report(output_dir, Report::NightOwlUsers, &owls)?;

    Ok(RunSummary {
        favorite_genres: favorites.len(),
        average_listen_times: averages.len(),
        top_songs: top_songs.len(),
        recommendations: recommendations.len(),
        loyal_users,
        night_owls: owls.len(),
        ..RunSummary::default()
    })
}

/// Write the loyalty report if anyone qualifies; returns the row count
/// written, or `None` when the file was skipped.
fn write_loyalty(output_dir: &Path, enriched: &[EnrichedEvent]) -> Result<Option<usize>> {
    let scores = analytics::genre_loyalty_scores(enriched);
    print_loyalty_preview(&scores);

    let loyal = analytics::loyal_users(&scores);
    if loyal.is_empty() {
        warn!("No loyal users, skipping {}", Report::GenreLoyaltyScores.name());
        println!(
            "No users with loyalty score > {}. Consider increasing genre concentration in data.",
            analytics::LOYALTY_THRESHOLD
        );
        return Ok(None);
    }

    write_report(output_dir, Report::GenreLoyaltyScores, &loyal)?;
    println!("Genre loyalty scores saved.");
    Ok(Some(loyal.len()))
}

fn print_loyalty_preview(scores: &[GenreLoyalty]) {
    println!();
    println!("Top loyalty scores:");
    println!("{:<10} {:<12} {:>13}", "user_id", "genre", "loyalty_score");
    for score in analytics::top_loyalty_scores(scores, LOYALTY_PREVIEW) {
        println!(
            "{:<10} {:<12} {:>13.6}",
            score.user_id,
            score.genre.as_str(),
            score.loyalty_score
        );
    }
}

/// Create every report directory up front, so each exists even if its
/// report ends up skipped.
fn create_output_dirs(output_dir: &Path) -> Result<()> {
    for report in Report::ALL {
        let dir = report.dir(output_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }
    Ok(())
}

fn write_report<T: CsvRecord>(output_dir: &Path, report: Report, rows: &[T]) -> Result<()> {
    let path = report.path(output_dir);
    table::write_rows(&path, rows)
        .with_context(|| format!("Failed to write {} report", report.name()))?;
    info!("{}: {} rows -> {}", report.name(), rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Genre, Mood};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn write_inputs(data_dir: &Path, songs: &[Song], events: &[ListeningEvent]) -> Result<()> {
        table::write_rows(&data_dir.join(crate::config::SONGS_FILE), songs)?;
        table::write_rows(&data_dir.join(crate::config::LOGS_FILE), events)?;
        Ok(())
    }

    fn setup() -> Result<(TempDir, PipelineConfig)> {
        let temp_dir = TempDir::new()?;
        let config = PipelineConfig {
            data_dir: temp_dir.path().join("data"),
            output_dir: temp_dir.path().join("output"),
        };
        Ok((temp_dir, config))
    }

    #[test]
    fn test_report_paths() {
        let path = Report::TopSongsThisWeek.path(Path::new("output"));
        assert_eq!(path, PathBuf::from("output/top_songs_this_week/top_songs_this_week.csv"));
    }

    #[test]
    fn test_missing_inputs_fail() -> Result<()> {
        let (_temp_dir, config) = setup()?;
        assert!(run_at(&config, at(12, 0)).is_err());
        Ok(())
    }

    #[test]
    fn test_no_loyal_users_skips_file() -> Result<()> {
        let (_temp_dir, config) = setup()?;
        let songs = vec![
            Song {
                song_id: "s1".to_string(),
                title: "One".to_string(),
                artist: "Artist 1".to_string(),
                genre: Genre::Pop,
                mood: Mood::Chill,
            },
            Song {
                song_id: "s2".to_string(),
                title: "Two".to_string(),
                artist: "Artist 2".to_string(),
                genre: Genre::Rock,
                mood: Mood::Energetic,
            },
        ];
        let events: Vec<ListeningEvent> = (0..4)
            .map(|i| ListeningEvent {
                user_id: "u1".to_string(),
                song_id: if i % 2 == 0 { "s1" } else { "s2" }.to_string(),
                timestamp: at(12, 10),
                duration_sec: 90,
            })
            .collect();
        write_inputs(&config.data_dir, &songs, &events)?;

        let summary = run_at(&config, at(12, 0))?;
        assert_eq!(summary.loyal_users, None);
        assert_eq!(summary.recommendations, 0);

        let output = &config.output_dir;
        assert!(Report::GenreLoyaltyScores.dir(output).is_dir());
        assert!(!Report::GenreLoyaltyScores.path(output).exists());
        assert_eq!(
            fs::read_to_string(Report::HappyRecommendations.path(output))?,
            "song_id,title,artist,genre,mood,user_id\n"
        );
        assert_eq!(
            fs::read_to_string(Report::NightOwlUsers.path(output))?,
            "user_id,night_plays\n"
        );
        Ok(())
    }

    #[test]
    fn test_enriched_logs_written_with_derived_columns() -> Result<()> {
        let (_temp_dir, config) = setup()?;
        let songs = vec![Song {
            song_id: "s1".to_string(),
            title: "One".to_string(),
            artist: "Artist 1".to_string(),
            genre: Genre::Sad,
            mood: Mood::Sad,
        }];
        let events = vec![
            ListeningEvent {
                user_id: "u1".to_string(),
                song_id: "s1".to_string(),
                timestamp: at(12, 2),
                duration_sec: 90,
            },
            ListeningEvent {
                user_id: "u1".to_string(),
                song_id: "ghost".to_string(),
                timestamp: at(12, 3),
                duration_sec: 90,
            },
        ];
        write_inputs(&config.data_dir, &songs, &events)?;

        let summary = run_at(&config, at(12, 0))?;
        assert_eq!(summary.events, 2);
        assert_eq!(summary.enriched, 1);
        assert_eq!(summary.top_songs, 1);
        assert_eq!(summary.loyal_users, Some(1));

        let text = fs::read_to_string(Report::EnrichedLogs.path(&config.output_dir))?;
        assert_eq!(
            text,
            "user_id,song_id,timestamp,duration_sec,title,artist,genre,mood,week,hour\n\
             u1,s1,2024-03-12 02:00:00,90,One,Artist 1,Sad,Sad,11,2\n"
        );
        Ok(())
    }
}

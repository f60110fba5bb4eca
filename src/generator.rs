//! # Dataset Generator
//!
//! Fabricates a song catalog and a listening history for a handful of
//! synthetic users, then writes both as CSV tables.
//!
//! ## Catalog
//!
//! Song `i` (1-based) is `song_i`, titled `Song Title i`, by
//! `Artist {i mod artist_count}`. Genre and mood are drawn uniformly.
//!
//! ## Listening History
//!
//! Each user plays a random number of songs within the configured range.
//! Biased users pick from the "Sad" genre with probability `sad_bias` and
//! uniformly from the whole catalog otherwise; everyone else always picks
//! uniformly. Timestamps fall within the last `history_days` days and have
//! no sub-second part.

use crate::config::GeneratorConfig;
use crate::model::{Genre, ListeningEvent, Mood, Song};
use crate::table;
use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs;

/// Shortest generated play, in seconds
pub const MIN_DURATION_SEC: u32 = 30;
/// Longest generated play, in seconds
pub const MAX_DURATION_SEC: u32 = 300;

/// The two source tables produced by one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub songs: Vec<Song>,
    pub events: Vec<ListeningEvent>,
}

/// Build the song catalog. `config` must already be validated.
pub(crate) fn generate_songs<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Vec<Song> {
    (1..=config.song_count)
        .map(|i| Song {
            song_id: format!("song_{i}"),
            title: format!("Song Title {i}"),
            artist: format!("Artist {}", i % config.artist_count),
            genre: Genre::ALL[rng.gen_range(0..Genre::ALL.len())],
            mood: Mood::ALL[rng.gen_range(0..Mood::ALL.len())],
        })
        .collect()
}

/// Build the listening history of every user against `songs`.
///
/// `now` is the reference time all timestamps are counted back from.
/// `config` must already be validated.
pub(crate) fn generate_events<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    songs: &[Song],
    now: NaiveDateTime,
    rng: &mut R,
) -> Vec<ListeningEvent> {
    let sad_songs: Vec<&Song> = songs.iter().filter(|s| s.genre == Genre::Sad).collect();
    let now = now.with_nanosecond(0).unwrap_or(now);
    debug!("{} of {} songs are tagged Sad", sad_songs.len(), songs.len());

    let mut events = Vec::new();
    for u in 1..=config.user_count {
        let user_id = format!("user_{u}");
        let biased = config.biased_users.contains(&user_id);
        let count = rng.gen_range(config.min_events_per_user..=config.max_events_per_user);

        for _ in 0..count {
            let song = if biased {
                pick_biased(songs, &sad_songs, config.sad_bias, rng)
            } else {
                songs.choose(rng)
            };
            let Some(song) = song else {
                break;
            };

            let days = rng.gen_range(0..i64::from(config.history_days));
            let hours = rng.gen_range(0..=23);
            let minutes = rng.gen_range(0..=59);
            let timestamp =
                now - Duration::days(days) - Duration::hours(hours) - Duration::minutes(minutes);

            events.push(ListeningEvent {
                user_id: user_id.clone(),
                song_id: song.song_id.clone(),
                timestamp,
                duration_sec: rng.gen_range(MIN_DURATION_SEC..=MAX_DURATION_SEC),
            });
        }
    }

    events
}

/// Draw from the Sad subset with probability `bias`, from the whole
/// catalog otherwise. The bias draw is skipped when there are no Sad songs.
fn pick_biased<'a, R: Rng + ?Sized>(
    songs: &'a [Song],
    sad_songs: &[&'a Song],
    bias: f64,
    rng: &mut R,
) -> Option<&'a Song> {
    if !sad_songs.is_empty() && rng.gen::<f64>() < bias {
        sad_songs.choose(rng).copied()
    } else {
        songs.choose(rng)
    }
}

/// Generate a whole dataset in memory.
///
/// This is the only entry point to catalog and event generation, so an
/// out-of-range `config` is reported instead of reaching the RNG.
///
/// # Errors
///
/// Fails if `config` does not validate.
pub fn generate<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    now: NaiveDateTime,
    rng: &mut R,
) -> Result<Dataset> {
    config.validate()?;
    let songs = generate_songs(config, rng);
    let events = generate_events(config, &songs, now, rng);
    Ok(Dataset { songs, events })
}

/// Write both tables into `config.data_dir`, creating it if needed.
///
/// # Errors
///
/// Fails if the directory or either file cannot be written.
pub fn write_dataset(config: &GeneratorConfig, dataset: &Dataset) -> Result<()> {
    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("Failed to create data directory {}", config.data_dir.display())
    })?;

    table::write_rows(&config.songs_path(), &dataset.songs)?;
    info!("Wrote {} songs to {}", dataset.songs.len(), config.songs_path().display());
    println!("songs_metadata.csv generated.");

    table::write_rows(&config.logs_path(), &dataset.events)?;
    info!("Wrote {} events to {}", dataset.events.len(), config.logs_path().display());
    println!("listening_logs.csv generated.");

    Ok(())
}

/// Generate a dataset against the local clock and write it to disk.
///
/// With a `seed`, the same seed always produces the same catalog and the
/// same choices (timestamps still follow the clock).
///
/// # Errors
///
/// Fails on invalid configuration or any write error.
pub fn run(config: &GeneratorConfig, seed: Option<u64>) -> Result<Dataset> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let now = Local::now().naive_local();
    info!("Generating dataset at {now}");

    let dataset = generate(config, now, &mut rng)?;
    write_dataset(config, &dataset)?;
    Ok(dataset)
}

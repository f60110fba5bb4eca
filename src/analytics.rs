//! Listening analytics over enriched events.
//!
//! Every report is a pure function of the enriched table (and, for
//! recommendations, the catalog). Nothing here touches the filesystem;
//! see [`crate::pipeline`] for that.
//!
//! Grouped outputs are ordered by their key, with identifiers compared as
//! strings (`user_1` < `user_10` < `user_2`).

use crate::model::{CsvRecord, EnrichedEvent, Genre, ListeningEvent, Mood, Song};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Maximum rows of the weekly chart.
pub const TOP_SONGS_LIMIT: usize = 10;
/// Happy songs suggested per sad-biased user.
pub const RECOMMENDATIONS_PER_USER: usize = 3;
/// A user whose Sad share exceeds this is sad-biased.
pub const SAD_RATIO_THRESHOLD: f64 = 0.5;
/// Loyalty scores above this are reported.
pub const LOYALTY_THRESHOLD: f64 = 0.8;
/// Night owl plays start at or after this hour...
pub const NIGHT_START_HOUR: u32 = 0;
/// ...and end before this one.
pub const NIGHT_END_HOUR: u32 = 5;

/// A user's most-played genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteGenre {
    pub user_id: String,
    pub genre: Genre,
    pub count: usize,
}

impl CsvRecord for FavoriteGenre {
    const HEADERS: &'static [&'static str] = &["user_id", "genre", "count"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageListenTime {
    pub song_id: String,
    pub title: String,
    pub avg_duration_sec: f64,
}

impl CsvRecord for AverageListenTime {
    const HEADERS: &'static [&'static str] = &["song_id", "title", "avg_duration_sec"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopSong {
    pub song_id: String,
    pub title: String,
    pub play_count: usize,
}

impl CsvRecord for TopSong {
    const HEADERS: &'static [&'static str] = &["song_id", "title", "play_count"];
}

/// A Happy song suggested to a sad-biased user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HappyRecommendation {
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub mood: Mood,
    pub user_id: String,
}

impl CsvRecord for HappyRecommendation {
    const HEADERS: &'static [&'static str] =
        &["song_id", "title", "artist", "genre", "mood", "user_id"];
}

/// Share of a user's plays that went to their most-played genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreLoyalty {
    pub user_id: String,
    pub genre: Genre,
    pub genre_plays: usize,
    pub total_plays: usize,
    pub loyalty_score: f64,
}

impl CsvRecord for GenreLoyalty {
    const HEADERS: &'static [&'static str] =
        &["user_id", "genre", "genre_plays", "total_plays", "loyalty_score"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NightOwl {
    pub user_id: String,
    pub night_plays: usize,
}

impl CsvRecord for NightOwl {
    const HEADERS: &'static [&'static str] = &["user_id", "night_plays"];
}

/// Join events with the catalog on `song_id`.
///
/// Events whose song is not in the catalog are dropped, so the result never
/// has more rows than `events`. Event order is preserved.
#[must_use]
pub fn enrich(events: &[ListeningEvent], songs: &[Song]) -> Vec<EnrichedEvent> {
    let by_id: HashMap<&str, &Song> = songs.iter().map(|s| (s.song_id.as_str(), s)).collect();

    events
        .iter()
        .filter_map(|event| {
            by_id
                .get(event.song_id.as_str())
                .map(|song| EnrichedEvent::new(event, song))
        })
        .collect()
}

/// Play counts per genre, per user.
fn genre_counts(events: &[EnrichedEvent]) -> BTreeMap<&str, BTreeMap<Genre, usize>> {
    let mut counts: BTreeMap<&str, BTreeMap<Genre, usize>> = BTreeMap::new();
    for event in events {
        *counts
            .entry(event.user_id.as_str())
            .or_default()
            .entry(event.genre)
            .or_insert(0) += 1;
    }
    counts
}

/// Highest count wins; ties go to the genre whose name sorts first.
fn top_genre(counts: &BTreeMap<Genre, usize>) -> Option<(Genre, usize)> {
    counts
        .iter()
        .min_by_key(|(genre, count)| (Reverse(**count), **genre))
        .map(|(genre, count)| (*genre, *count))
}

/// Each user's favorite genre, one row per user.
#[must_use]
pub fn favorite_genres(events: &[EnrichedEvent]) -> Vec<FavoriteGenre> {
    genre_counts(events)
        .into_iter()
        .filter_map(|(user_id, counts)| {
            top_genre(&counts).map(|(genre, count)| FavoriteGenre {
                user_id: user_id.to_string(),
                genre,
                count,
            })
        })
        .collect()
}

/// Mean play duration of every song played at least once.
#[must_use]
pub fn average_listen_time(events: &[EnrichedEvent]) -> Vec<AverageListenTime> {
    let mut totals: BTreeMap<(&str, &str), (u64, usize)> = BTreeMap::new();
    for event in events {
        let entry = totals
            .entry((event.song_id.as_str(), event.title.as_str()))
            .or_insert((0, 0));
        entry.0 += u64::from(event.duration_sec);
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|((song_id, title), (sum, plays))| AverageListenTime {
            song_id: song_id.to_string(),
            title: title.to_string(),
            avg_duration_sec: sum as f64 / plays as f64,
        })
        .collect()
}

/// The most played songs during ISO week `week`, at most [`TOP_SONGS_LIMIT`].
///
/// Only the week number is compared, not the year. Equal play counts keep
/// `song_id` order.
#[must_use]
pub fn top_songs_for_week(events: &[EnrichedEvent], week: u32) -> Vec<TopSong> {
    let mut plays: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for event in events.iter().filter(|e| e.week == week) {
        *plays
            .entry((event.song_id.as_str(), event.title.as_str()))
            .or_insert(0) += 1;
    }

    let mut chart: Vec<TopSong> = plays
        .into_iter()
        .map(|((song_id, title), play_count)| TopSong {
            song_id: song_id.to_string(),
            title: title.to_string(),
            play_count,
        })
        .collect();
    // Stable, so ties stay in key order.
    chart.sort_by_key(|song| Reverse(song.play_count));
    chart.truncate(TOP_SONGS_LIMIT);
    chart
}

/// Users whose Sad share of plays exceeds [`SAD_RATIO_THRESHOLD`].
#[must_use]
pub fn sad_biased_users(events: &[EnrichedEvent]) -> Vec<String> {
    let mut tallies: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for event in events {
        let tally = tallies.entry(event.user_id.as_str()).or_insert((0, 0));
        tally.1 += 1;
        if event.genre == Genre::Sad {
            tally.0 += 1;
        }
    }

    tallies
        .into_iter()
        .filter(|(_, (sad, total))| *sad as f64 / *total as f64 > SAD_RATIO_THRESHOLD)
        .map(|(user_id, _)| user_id.to_string())
        .collect()
}

/// Suggest unheard Happy-mood songs to sad-biased users.
///
/// Each such user gets up to [`RECOMMENDATIONS_PER_USER`] songs, taken in
/// catalog order. A user who has heard every Happy song gets none.
#[must_use]
pub fn happy_recommendations(events: &[EnrichedEvent], songs: &[Song]) -> Vec<HappyRecommendation> {
    let mut played: HashMap<&str, HashSet<&str>> = HashMap::new();
    for event in events {
        played
            .entry(event.user_id.as_str())
            .or_default()
            .insert(event.song_id.as_str());
    }

    let happy: Vec<&Song> = songs.iter().filter(|s| s.mood == Mood::Happy).collect();
    let mut recommendations = Vec::new();

    for user_id in sad_biased_users(events) {
        let heard = played.get(user_id.as_str());
        let unheard = happy
            .iter()
            .filter(|song| heard.map_or(true, |h| !h.contains(song.song_id.as_str())))
            .take(RECOMMENDATIONS_PER_USER);

        recommendations.extend(unheard.map(|song| HappyRecommendation {
            song_id: song.song_id.clone(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            genre: song.genre,
            mood: song.mood,
            user_id: user_id.clone(),
        }));
    }

    recommendations
}

/// Loyalty score of every user, ordered by user.
///
/// Use [`loyal_users`] to keep only the ones worth reporting.
#[must_use]
pub fn genre_loyalty_scores(events: &[EnrichedEvent]) -> Vec<GenreLoyalty> {
    genre_counts(events)
        .into_iter()
        .filter_map(|(user_id, counts)| {
            let total_plays: usize = counts.values().sum();
            top_genre(&counts).map(|(genre, genre_plays)| GenreLoyalty {
                user_id: user_id.to_string(),
                genre,
                genre_plays,
                total_plays,
                loyalty_score: genre_plays as f64 / total_plays as f64,
            })
        })
        .collect()
}

/// Scores above [`LOYALTY_THRESHOLD`].
#[must_use]
pub fn loyal_users(scores: &[GenreLoyalty]) -> Vec<GenreLoyalty> {
    scores
        .iter()
        .filter(|s| s.loyalty_score > LOYALTY_THRESHOLD)
        .cloned()
        .collect()
}

/// The `limit` highest scores, best first.
#[must_use]
pub fn top_loyalty_scores(scores: &[GenreLoyalty], limit: usize) -> Vec<&GenreLoyalty> {
    let mut ranked: Vec<&GenreLoyalty> = scores.iter().collect();
    ranked.sort_by(|a, b| b.loyalty_score.total_cmp(&a.loyalty_score));
    ranked.truncate(limit);
    ranked
}

/// Users with at least one play between midnight and 5 AM.
#[must_use]
pub fn night_owls(events: &[EnrichedEvent]) -> Vec<NightOwl> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in events
        .iter()
        .filter(|e| (NIGHT_START_HOUR..NIGHT_END_HOUR).contains(&e.hour))
    {
        *counts.entry(event.user_id.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(user_id, night_plays)| NightOwl {
            user_id: user_id.to_string(),
            night_plays,
        })
        .collect()
}

//! # Data Model
//!
//! Row types shared by the generator and the analytics pipeline.
//!
//! - [`Song`] - one row of the song catalog (`songs_metadata.csv`)
//! - [`ListeningEvent`] - one play of a song by a user (`listening_logs.csv`)
//! - [`EnrichedEvent`] - an event joined with its song, plus `week` and `hour`
//!
//! Timestamps carry no timezone and are written with second precision
//! using [`TIMESTAMP_FORMAT`].

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of every timestamp column, e.g. `2024-05-03 01:42:17`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row type that knows its CSV header.
///
/// Headers are written explicitly so that a report with zero rows still
/// produces a valid, header-only file.
pub trait CsvRecord: Serialize {
    /// Column names, in the same order as the struct fields.
    const HEADERS: &'static [&'static str];
}

/// Musical genre of a song.
///
/// Variants are declared alphabetically so the derived `Ord` matches
/// name order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Genre {
    Electronic,
    Happy,
    HipHop,
    Jazz,
    Pop,
    Rock,
    Sad,
}

impl Genre {
    /// All genres, in the order the catalog generator draws from.
    pub const ALL: [Genre; 7] = [
        Genre::Pop,
        Genre::Rock,
        Genre::Jazz,
        Genre::Electronic,
        Genre::HipHop,
        Genre::Sad,
        Genre::Happy,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Genre::Electronic => "Electronic",
            Genre::Happy => "Happy",
            Genre::HipHop => "HipHop",
            Genre::Jazz => "Jazz",
            Genre::Pop => "Pop",
            Genre::Rock => "Rock",
            Genre::Sad => "Sad",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mood tag of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Chill,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Sad, Mood::Energetic, Mood::Chill];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Energetic => "Energetic",
            Mood::Chill => "Chill",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the song catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub mood: Mood,
}

impl CsvRecord for Song {
    const HEADERS: &'static [&'static str] = &["song_id", "title", "artist", "genre", "mood"];
}

/// A single play of a song by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningEvent {
    pub user_id: String,
    pub song_id: String,
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub duration_sec: u32,
}

impl CsvRecord for ListeningEvent {
    const HEADERS: &'static [&'static str] = &["user_id", "song_id", "timestamp", "duration_sec"];
}

/// A listening event joined with its song's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEvent {
    pub user_id: String,
    pub song_id: String,
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub duration_sec: u32,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub mood: Mood,
    /// ISO week number of `timestamp`.
    pub week: u32,
    /// Hour of day of `timestamp`, 0-23.
    pub hour: u32,
}

impl EnrichedEvent {
    /// Join one event with its song and derive `week` and `hour`.
    #[must_use]
    pub fn new(event: &ListeningEvent, song: &Song) -> Self {
        Self {
            user_id: event.user_id.clone(),
            song_id: event.song_id.clone(),
            timestamp: event.timestamp,
            duration_sec: event.duration_sec,
            title: song.title.clone(),
            artist: song.artist.clone(),
            genre: song.genre,
            mood: song.mood,
            week: event.timestamp.iso_week().week(),
            hour: event.timestamp.hour(),
        }
    }
}

impl CsvRecord for EnrichedEvent {
    const HEADERS: &'static [&'static str] = &[
        "user_id",
        "song_id",
        "timestamp",
        "duration_sec",
        "title",
        "artist",
        "genre",
        "mood",
        "week",
        "hour",
    ];
}

/// Serde adapter for [`TIMESTAMP_FORMAT`] timestamps.
pub mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_genre_orders_by_name() {
        let mut genres = Genre::ALL.to_vec();
        genres.sort();
        let names: Vec<&str> = genres.iter().map(|g| g.as_str()).collect();

        let mut expected = names.clone();
        expected.sort_unstable();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_enriched_event_derives_week_and_hour() {
        let song = Song {
            song_id: "song_1".to_string(),
            title: "Song Title 1".to_string(),
            artist: "Artist 1".to_string(),
            genre: Genre::Jazz,
            mood: Mood::Chill,
        };
        // 2024-01-01 is a Monday in ISO week 1.
        let event = ListeningEvent {
            user_id: "user_1".to_string(),
            song_id: "song_1".to_string(),
            timestamp: at(2024, 1, 1, 3, 15),
            duration_sec: 120,
        };

        let enriched = EnrichedEvent::new(&event, &song);
        assert_eq!(enriched.week, 1);
        assert_eq!(enriched.hour, 3);
        assert_eq!(enriched.genre, Genre::Jazz);
        assert_eq!(enriched.title, "Song Title 1");
    }

    #[test]
    fn test_iso_week_crosses_year_boundary() {
        // 2020-12-31 belongs to ISO week 53 of 2020, 2021-01-04 to week 1.
        assert_eq!(at(2020, 12, 31, 0, 0).iso_week().week(), 53);
        assert_eq!(at(2021, 1, 4, 0, 0).iso_week().week(), 1);
    }

    #[test]
    fn test_timestamp_format_round_trip() {
        let ts = at(2024, 5, 3, 1, 42);
        let text = ts.format(TIMESTAMP_FORMAT).to_string();
        assert_eq!(text, "2024-05-03 01:42:00");
        assert_eq!(NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).unwrap(), ts);
    }

    #[test]
    fn test_headers_match_column_count() {
        assert_eq!(Song::HEADERS.len(), 5);
        assert_eq!(ListeningEvent::HEADERS.len(), 4);
        assert_eq!(EnrichedEvent::HEADERS.len(), 10);
    }
}

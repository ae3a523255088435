//! Puzzle records kept between sessions
//!
//! Daily completion stats are keyed by UTC calendar date; uploaded images
//! are kept as a list of data URLs.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage, keys};

/// Uploaded images kept at most
pub const MAX_UPLOADED_IMAGES: usize = 12;

/// `YYYY-MM-DD` (UTC) for a millisecond timestamp
pub fn date_key(now_ms: f64) -> Option<String> {
    DateTime::from_timestamp_millis(now_ms as i64).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Completions for one calendar day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub solves: u32,
    pub best_moves: Option<u32>,
    pub best_time_secs: Option<f64>,
}

impl DailyStats {
    /// Stats for the day containing `now_ms` (default when missing or unreadable)
    pub fn load(storage: &dyn Storage, now_ms: f64) -> Self {
        date_key(now_ms)
            .and_then(|date| persistence::load_json(storage, &keys::puzzle_daily(&date)))
            .unwrap_or_default()
    }

    /// Fold in a solve
    pub fn record(&mut self, moves: u32, elapsed_secs: f64) {
        self.solves += 1;
        self.best_moves = Some(self.best_moves.map_or(moves, |best| best.min(moves)));
        self.best_time_secs = Some(
            self.best_time_secs
                .map_or(elapsed_secs, |best| best.min(elapsed_secs)),
        );
    }

    /// Load, update and store today's stats in one go
    pub fn record_solve(storage: &mut dyn Storage, now_ms: f64, moves: u32, elapsed_secs: f64) -> Self {
        let mut stats = Self::load(storage, now_ms);
        stats.record(moves, elapsed_secs);
        match date_key(now_ms) {
            Some(date) => persistence::save_json(storage, &keys::puzzle_daily(&date), &stats),
            None => log::warn!("No calendar date for timestamp {now_ms}, daily stats not saved"),
        }
        stats
    }
}

/// User-supplied puzzle images
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedImages {
    pub urls: Vec<String>,
}

impl UploadedImages {
    pub fn load(storage: &dyn Storage) -> Self {
        let urls = persistence::load_json::<Vec<String>>(storage, keys::UPLOADED_IMAGES).unwrap_or_default();
        Self { urls }
    }

    /// Add a data URL (newest first), dropping duplicates and the oldest overflow
    pub fn add(&mut self, storage: &mut dyn Storage, data_url: &str) {
        self.urls.retain(|u| u != data_url);
        self.urls.insert(0, data_url.to_string());
        self.urls.truncate(MAX_UPLOADED_IMAGES);
        persistence::save_json(storage, keys::UPLOADED_IMAGES, &self.urls);
    }

    pub fn remove(&mut self, storage: &mut dyn Storage, index: usize) -> Option<String> {
        if index >= self.urls.len() {
            return None;
        }
        let removed = self.urls.remove(index);
        persistence::save_json(storage, keys::UPLOADED_IMAGES, &self.urls);
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    // 2023-11-14T22:13:20Z
    const NOW: f64 = 1_700_000_000_000.0;

    #[test]
    fn test_date_key() {
        assert_eq!(date_key(NOW).as_deref(), Some("2023-11-14"));
        assert_eq!(date_key(0.0).as_deref(), Some("1970-01-01"));
    }

    #[test]
    fn test_daily_stats_best_of_day() {
        let mut storage = MemoryStorage::new();
        DailyStats::record_solve(&mut storage, NOW, 40, 90.0);
        let stats = DailyStats::record_solve(&mut storage, NOW + 1000.0, 55, 60.5);
        assert_eq!(stats.solves, 2);
        assert_eq!(stats.best_moves, Some(40));
        assert_eq!(stats.best_time_secs, Some(60.5));

        let raw = storage.get("slidePuzzle_daily_2023-11-14").unwrap().unwrap();
        assert!(raw.contains("\"bestMoves\":40"));

        // Next day starts fresh
        assert_eq!(DailyStats::load(&storage, NOW + 86_400_000.0), DailyStats::default());
    }

    #[test]
    fn test_uploaded_images() {
        let mut storage = MemoryStorage::new();
        let mut images = UploadedImages::load(&storage);
        assert!(images.urls.is_empty());

        for i in 0..15 {
            images.add(&mut storage, &format!("data:image/png;base64,{i}"));
        }
        images.add(&mut storage, "data:image/png;base64,10");
        assert_eq!(images.urls.len(), MAX_UPLOADED_IMAGES);
        assert_eq!(images.urls[0], "data:image/png;base64,10");
        assert_eq!(images.urls[1], "data:image/png;base64,14");

        assert!(images.remove(&mut storage, 99).is_none());
        images.remove(&mut storage, 0);
        assert_eq!(UploadedImages::load(&storage), images);
    }
}

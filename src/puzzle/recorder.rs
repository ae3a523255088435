//! Move log for replays

use serde::{Deserialize, Serialize};

use super::board::Slide;

/// One committed move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub tile: u16,
    pub from: usize,
    pub to: usize,
    pub timestamp_ms: f64,
}

impl MoveRecord {
    pub fn new(slide: Slide, timestamp_ms: f64) -> Self {
        Self {
            tile: slide.tile,
            from: slide.from,
            to: slide.to,
            timestamp_ms,
        }
    }
}

/// Append-only list of moves since the session started
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveLog {
    records: Vec<MoveRecord>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, slide: Slide, timestamp_ms: f64) {
        self.records.push(MoveRecord::new(slide, timestamp_ms));
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Time between the first and last recorded move (ms)
    pub fn span_ms(&self) -> f64 {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }
}

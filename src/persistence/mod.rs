//! Key/value persistence port
//!
//! Features:
//! - `Storage` trait injected into the cores (no global LocalStorage access)
//! - `MemoryStorage` for native builds and tests
//! - `LocalStorage` backed by `window.localStorage` on wasm32
//! - Best-effort typed helpers that fall back to defaults on failure

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

/// Storage keys shared with the original web build
pub mod keys {
    pub const HIGH_SCORE: &str = "scrollOrDie_highScore";
    pub const TOTAL_COINS: &str = "scrollOrDie_totalCoins";
    pub const ACHIEVEMENTS: &str = "scrollOrDie_achievements";
    pub const LAST_PLAYED: &str = "scrollOrDie_lastPlayed";
    pub const STREAK: &str = "scrollOrDie_streak";
    pub const SETTINGS: &str = "scrollOrDie_settings";
    pub const SOUND_ENABLED: &str = "slidePuzzle_soundEnabled";
    pub const UPLOADED_IMAGES: &str = "slidePuzzle_uploadedImages";

    /// Daily challenge record for a day index
    pub fn challenge(day: i64) -> String {
        format!("scrollOrDie_challenge_{day}")
    }

    /// Daily puzzle stats for a calendar date (`YYYY-MM-DD`)
    pub fn puzzle_daily(date: &str) -> String {
        format!("slidePuzzle_daily_{date}")
    }
}

/// Errors surfaced by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// No storage is available (private mode, SSR, quota disabled)
    #[error("storage unavailable")]
    Unavailable,
    /// The backend rejected the operation
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A stored value could not be encoded or decoded
    #[error("malformed value for key {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value blob store
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage (native builds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Shared handle so several owners (scroller, puzzle, settings) can use one store
impl<S: Storage> Storage for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.borrow_mut().remove(key)
    }
}

/// Boxed backends, for hosts that pick one at runtime
impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Read and parse a JSON value
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        })
}

/// Encode and write a JSON value
pub fn write_json<T: Serialize>(
    storage: &mut dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|source| StorageError::Malformed {
        key: key.to_string(),
        source,
    })?;
    storage.set(key, &json)
}

/// Best-effort JSON read: missing or broken values yield `None`
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    match read_json(storage, key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring stored {key}: {e}");
            None
        }
    }
}

/// Best-effort read of a value stored with `to_string()`
pub fn load_parsed<T: std::str::FromStr>(storage: &dyn Storage, key: &str) -> Option<T> {
    match storage.get(key) {
        Ok(Some(raw)) => {
            let parsed = raw.trim().parse().ok();
            if parsed.is_none() {
                log::warn!("Ignoring malformed {key}: {raw:?}");
            }
            parsed
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("Failed to read {key}: {e}");
            None
        }
    }
}

/// Best-effort JSON write
pub fn save_json<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) {
    if let Err(e) = write_json(storage, key, value) {
        log::warn!("Failed to save {key}: {e}");
    }
}

/// Best-effort raw write
pub fn save_raw(storage: &mut dyn Storage, key: &str, value: &str) {
    if let Err(e) = storage.set(key, value) {
        log::warn!("Failed to save {key}: {e}");
    }
}

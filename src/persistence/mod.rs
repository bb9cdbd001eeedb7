//! Key/value persistence
//!
//! Values are small strings (numbers, `"1"`/`"0"` flags, JSON arrays) under
//! fixed keys. Browsers back this with LocalStorage; native builds and tests
//! use an in-memory map. Every helper here is best-effort: failures are
//! logged and the caller falls back to defaults.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// Storage keys
pub mod keys {
    pub const HIGH_SCORE: &str = "dodge_run_high_score";
    pub const SKIN: &str = "dodge_run_skin_index";
    pub const LEADERBOARD: &str = "dodge_run_local_leaderboard";
    pub const CHALLENGE_DONE_DATE: &str = "dodge_run_challenge_done_date";
    pub const REDUCED_MOTION: &str = "dodge_run_reduced_motion";
    pub const HIGH_CONTRAST: &str = "dodge_run_high_contrast";
    pub const MUTE: &str = "dodge_run_mute";
}

/// A string key/value store
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

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Open the window's LocalStorage, if the browser allows it
    pub fn open() -> Result<Self, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|inner| Self { inner })
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }
}

/// Platform default storage: LocalStorage in the browser (in-memory if it
/// is blocked), in-memory natively
pub fn default_storage() -> Box<dyn Storage> {
    #[cfg(target_arch = "wasm32")]
    {
        match LocalStorage::open() {
            Ok(storage) => return Box::new(storage),
            Err(e) => log::warn!("LocalStorage unavailable ({}), progress will not persist", e),
        }
    }
    Box::new(MemoryStorage::new())
}

/// Read a key, logging and swallowing backend errors
pub fn read(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to read {}: {}", key, e);
            None
        }
    }
}

/// Write a key, logging backend errors
pub fn write(storage: &mut dyn Storage, key: &str, value: &str) {
    if let Err(e) = storage.set(key, value) {
        log::warn!("Failed to save {}: {}", key, e);
    }
}

/// Remove a key, logging backend errors
pub fn clear(storage: &mut dyn Storage, key: &str) {
    if let Err(e) = storage.remove(key) {
        log::warn!("Failed to remove {}: {}", key, e);
    }
}

/// Read and decode a JSON value. `Ok(None)` when the key is missing.
pub fn get_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it
pub fn set_json<T: Serialize + ?Sized>(
    storage: &mut dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}

/// `"1"` is true, anything else (or missing) is false
pub fn read_flag(storage: &dyn Storage, key: &str) -> bool {
    read(storage, key).as_deref() == Some("1")
}

pub fn write_flag(storage: &mut dyn Storage, key: &str, value: bool) {
    write(storage, key, if value { "1" } else { "0" });
}

/// Stored high score; missing or unparsable values read as 0
pub fn load_high_score(storage: &dyn Storage) -> u64 {
    read(storage, keys::HIGH_SCORE)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.floor() as u64)
        .unwrap_or(0)
}

pub fn save_high_score(storage: &mut dyn Storage, score: u64) {
    write(storage, keys::HIGH_SCORE, &score.to_string());
}

/// Date key of the last day the challenge reward was claimed
pub fn load_challenge_done_date(storage: &dyn Storage) -> Option<String> {
    read(storage, keys::CHALLENGE_DONE_DATE).filter(|s| !s.is_empty())
}

pub fn save_challenge_done_date(storage: &mut dyn Storage, date_key: &str) {
    write(storage, keys::CHALLENGE_DONE_DATE, date_key);
}

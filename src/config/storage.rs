// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Preference storage.
//!
//! A small string-keyed store persisted as a TOML table. Storage is never
//! essential to gameplay: read, parse and write failures are logged and
//! swallowed, leaving the in-memory values authoritative.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Key of the best sequence length reached
pub const HIGH_SCORE_KEY: &str = "highScore";
/// Key of the tone volume
pub const VOLUME_KEY: &str = "volume";
/// Key of the difficulty (number of buttons)
pub const DIFFICULTY_KEY: &str = "difficulty";

/// String-keyed preference store
#[derive(Debug, Clone, Default)]
pub struct Storage {
    /// Backing file; in-memory only when absent
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Storage {
    /// Open a store backed by `path`. A missing or unreadable file yields
    /// an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(values) => values,
                Err(e) => {
                    tracing::debug!("ignoring unreadable preferences {:?}: {}", path, e);
                    BTreeMap::new()
                }
            },
            Err(e) => {
                tracing::debug!("no preferences at {:?}: {}", path, e);
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            values,
        }
    }

    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for a key parsed as `T`; unparseable values read as absent
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| value.trim().parse().ok())
    }

    /// Set a value and write the store through to its file
    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }

    /// Remove a value and write the store through to its file
    pub fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush();
        }
    }

    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let contents = match toml::to_string(&self.values) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!("failed to serialize preferences: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(path, contents) {
            tracing::debug!("failed to save preferences to {:?}: {}", path, e);
        }
    }
}

/// Player preferences and progress
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Preferences {
    /// Longest sequence reproduced
    pub high_score: usize,
    /// Saved tone volume
    pub volume: Option<f32>,
    /// Saved number of buttons
    pub difficulty: Option<usize>,
}

impl Preferences {
    /// Read preferences, ignoring values that are not numeric
    pub fn load(storage: &Storage) -> Self {
        Self {
            high_score: storage.get_parsed(HIGH_SCORE_KEY).unwrap_or(0),
            volume: storage
                .get_parsed::<f32>(VOLUME_KEY)
                .filter(|v| v.is_finite()),
            difficulty: storage.get_parsed(DIFFICULTY_KEY),
        }
    }

    /// Record a completed sequence length. Saves and returns `true` when it
    /// beats the high score.
    pub fn record_score(&mut self, storage: &mut Storage, score: usize) -> bool {
        if score <= self.high_score {
            return false;
        }
        self.high_score = score;
        storage.set(HIGH_SCORE_KEY, score);
        true
    }

    /// Save a new volume
    pub fn save_volume(&mut self, storage: &mut Storage, volume: f32) {
        self.volume = Some(volume);
        storage.set(VOLUME_KEY, volume);
    }

    /// Save a new difficulty
    pub fn save_difficulty(&mut self, storage: &mut Storage, difficulty: usize) {
        self.difficulty = Some(difficulty);
        storage.set(DIFFICULTY_KEY, difficulty);
    }
}

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the game.
//!
//! This module provides the YAML application configuration (game rules,
//! tone defaults, storage location) and the string-keyed preference store.

pub mod storage;

pub use storage::{Preferences, Storage};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::audio::ToneSettings;
use crate::game::GameConfig;

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Game rules
    #[serde(default)]
    pub game: GameConfig,
    /// Tone defaults
    #[serde(default)]
    pub tone: ToneSettings,
    /// Preference storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        config.game.validate().context("Invalid game configuration")?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }
}

/// Where preferences and the high score live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Preference file; preferences are kept in memory only when absent
    #[serde(default = "default_storage_path")]
    pub path: Option<PathBuf>,
}

fn default_storage_path() -> Option<PathBuf> {
    Some(PathBuf::from("simon-prefs.toml"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

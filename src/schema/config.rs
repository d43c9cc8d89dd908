//! Configuration types for the player.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::decoder::{BackendMode, DEFAULT_MEMORY_LIMIT};

fn default_brightness() -> f32 {
    1.0
}

fn default_memory_limit() -> usize {
    DEFAULT_MEMORY_LIMIT
}

fn default_chunk_size() -> usize {
    400
}

/// Top-level player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Backend used at start-up.
    #[serde(default)]
    pub mode: BackendMode,
    /// Largest asset the memory backend accepts, in decoded bytes.
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,
    /// Largest upload chunk accepted, in transport bytes. Must be a
    /// multiple of 4 so every full base64 chunk decodes on its own.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Initial brightness (0.0-1.0).
    #[serde(default = "default_brightness")]
    pub brightness: f32,
    /// Where assets are persisted.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            memory_limit: default_memory_limit(),
            chunk_size: default_chunk_size(),
            brightness: default_brightness(),
            storage: StorageConfig::default(),
        }
    }
}

/// Persisted asset locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Asset that is played, and restored at start-up.
    pub live_path: PathBuf,
    /// Upload target, renamed onto `live_path` once complete.
    pub staging_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            live_path: PathBuf::from("latest.image"),
            staging_path: PathBuf::from("temp.image"),
        }
    }
}

impl PlayerConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_limit == 0 {
            return Err(ConfigError::InvalidMemoryLimit);
        }
        if self.chunk_size == 0 || self.chunk_size % 4 != 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(ConfigError::InvalidBrightness(self.brightness));
        }
        if self.storage.live_path == self.storage.staging_path {
            return Err(ConfigError::SameStoragePaths);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Memory limit must be non-zero")]
    InvalidMemoryLimit,
    #[error("Chunk size must be a non-zero multiple of 4 (got {0})")]
    InvalidChunkSize(usize),
    #[error("Brightness must be within 0.0-1.0 (got {0})")]
    InvalidBrightness(f32),
    #[error("Live and staging paths must differ")]
    SameStoragePaths,
}

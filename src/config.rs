//! Store configuration (`trackstore.json`).
//!
//! A missing file means defaults. A malformed file is an error: silently
//! falling back would hide a typo in `duplicate_frames`.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "trackstore.json";

/// What to do with a point whose frame already exists on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateFramePolicy {
    /// Refuse the insertion with `StoreError::DuplicateFrame`.
    #[default]
    Reject,
    /// Last write wins: the new point overwrites the old one in place.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub duplicate_frames: DuplicateFramePolicy,
    /// Extensions accepted by `scan_image_dir` (case-insensitive, no dot)
    pub image_extensions: Vec<String>,
    /// Floor for the frame range
    pub min_total_frames: i32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            duplicate_frames: DuplicateFramePolicy::Reject,
            image_extensions: ["exr", "png", "jpg", "jpeg", "tif", "tiff", "tga", "dpx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_total_frames: 1,
        }
    }
}

impl StoreConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: StoreConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("trackstore_{}.json", uuid::Uuid::new_v4()));
        let cfg = StoreConfig::load(&path).unwrap();
        assert_eq!(cfg, StoreConfig::default());
    }

    #[test]
    fn test_partial_file_and_roundtrip() {
        let path = std::env::temp_dir().join(format!("trackstore_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"duplicate_frames":"replace"}"#).unwrap();
        let cfg = StoreConfig::load(&path).unwrap();
        assert_eq!(cfg.duplicate_frames, DuplicateFramePolicy::Replace);
        assert_eq!(cfg.min_total_frames, 1);
        assert!(cfg.image_extensions.iter().any(|e| e == "exr"));

        let mut changed = cfg.clone();
        changed.min_total_frames = 24;
        changed.save(&path).unwrap();
        assert_eq!(StoreConfig::load(&path).unwrap(), changed);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_malformed_file_is_error() {
        let path = std::env::temp_dir().join(format!("trackstore_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(StoreConfig::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}

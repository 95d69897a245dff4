//! Where trackstore keeps its config file and log.
//!
//! Lookup order: `--config-dir`, then `TRACKSTORE_CONFIG_DIR`, then the
//! working directory when it already holds a trackstore file, then the
//! platform dir (`<config or data dir>/trackstore`).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "trackstore";
const ENV_CONFIG_DIR: &str = "TRACKSTORE_CONFIG_DIR";
const LOCAL_MARKERS: [&str; 2] = ["trackstore.json", "trackstore.log"];

#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Explicit directory; overrides everything else when set.
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var_os(ENV_CONFIG_DIR).map(PathBuf::from));
        Self { config_dir }
    }

    fn resolve(&self, platform_dir: fn() -> Option<PathBuf>) -> PathBuf {
        self.config_dir
            .clone()
            .or_else(|| {
                std::env::current_dir()
                    .ok()
                    .filter(|dir| LOCAL_MARKERS.iter().any(|f| dir.join(f).exists()))
            })
            .or_else(|| platform_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    config.resolve(dirs_next::config_dir).join(name)
}

/// Logs and other non-config output.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    config.resolve(dirs_next::data_dir).join(name)
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/shots/sq010")));
        assert_eq!(
            config_file("trackstore.json", &config),
            PathBuf::from("/shots/sq010/trackstore.json")
        );
        assert_eq!(data_file("run.log", &config), PathBuf::from("/shots/sq010/run.log"));
    }

    #[test]
    fn test_platform_fallback_uses_app_dir() {
        let config = PathConfig::default();
        let dir = config.resolve(|| Some(PathBuf::from("/platform")));
        // A trackstore file in the working directory takes precedence
        let local = LOCAL_MARKERS.iter().any(|f| dir.join(f).exists());
        assert!(local || dir == Path::new("/platform/trackstore"));
        assert!(local || config.resolve(|| None) == Path::new("."));
    }

    #[test]
    fn test_ensure_parent_creates_nested_dirs() {
        let dir = std::env::temp_dir().join(format!("trackstore_paths_{}", uuid::Uuid::new_v4()));
        let file = dir.join("logs").join("trackstore.log");
        ensure_parent(&file).unwrap();
        assert!(dir.join("logs").is_dir());
        ensure_parent(Path::new("bare.log")).unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::mirror::{default_mirrors, MirrorCandidate};

pub const SETTINGS_FILE: &str = "launcher_config.json";

/// Launcher configuration persisted as `launcher_config.json` in the data dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// `.minecraft`-style root holding `versions/`, `libraries/`, `assets/`.
    pub game_dir: PathBuf,
    /// Candidate mirrors; the first one is the fallback.
    pub mirrors: Vec<MirrorCandidate>,
    pub probe_timeout_secs: u64,
    /// Host serving content-addressed asset objects.
    pub resources_base_url: String,
    pub official_auth_url: String,
    pub third_party_auth_url: String,
    /// Re-hash existing client/library files instead of trusting their presence.
    pub verify_existing: bool,
    pub max_memory: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            game_dir: PathBuf::from(".minecraft"),
            mirrors: default_mirrors(),
            probe_timeout_secs: 3,
            resources_base_url: "https://resources.download.minecraft.net".into(),
            official_auth_url: "https://authserver.mojang.com".into(),
            third_party_auth_url: "https://littleskin.cn/api/yggdrasil".into(),
            verify_existing: true,
            max_memory: "2G".into(),
        }
    }
}

impl LauncherConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }

    /// Load from `data_dir`, falling back to defaults when absent or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Self::default_in(data_dir),
        };
        match serde_json::from_str::<LauncherConfig>(&raw) {
            Ok(mut config) => {
                if config.mirrors.is_empty() {
                    config.mirrors = default_mirrors();
                }
                config
            }
            Err(e) => {
                warn!("Corrupt {:?}, using defaults: {}", path, e);
                Self::default_in(data_dir)
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> LauncherResult<()> {
        std::fs::create_dir_all(data_dir).map_err(|e| LauncherError::io(data_dir, e))?;
        let path = data_dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| LauncherError::io(path, e))
    }

    fn default_in(data_dir: &Path) -> Self {
        Self {
            game_dir: data_dir.join(".minecraft"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = LauncherConfig::load(dir.path());
        assert_eq!(config.game_dir, dir.path().join(".minecraft"));
        assert_eq!(config.mirrors[0].label, "BMCLAPI");
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
        assert!(config.verify_existing);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"game_dir": "/games/mc", "verify_existing": false}"#,
        )
        .unwrap();

        let config = LauncherConfig::load(dir.path());
        assert_eq!(config.game_dir, PathBuf::from("/games/mc"));
        assert!(!config.verify_existing);
        assert_eq!(config.mirrors.len(), 3);
        assert_eq!(config.max_memory, "2G");
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LauncherConfig::load(dir.path());
        config.max_memory = "6G".into();
        config.mirrors.truncate(1);
        config.save(dir.path()).unwrap();

        let reloaded = LauncherConfig::load(dir.path());
        assert_eq!(reloaded.max_memory, "6G");
        assert_eq!(reloaded.mirrors.len(), 1);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        let config = LauncherConfig::load(dir.path());
        assert_eq!(config.resources_base_url, "https://resources.download.minecraft.net");
    }
}

use std::path::{Path, PathBuf};

use reqwest::Client;

use tracing::info;

use super::settings::{LauncherConfig, SETTINGS_FILE};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

const APP_DIR_NAME: &str = "PMCL";

/// Paths, configuration and the shared HTTP client for one launcher session.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: LauncherConfig,
    pub http_client: Client,
}

impl AppState {
    pub fn new(data_dir: Option<PathBuf>) -> LauncherResult<Self> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        std::fs::create_dir_all(&data_dir).map_err(|e| LauncherError::io(&data_dir, e))?;

        let config = LauncherConfig::load(&data_dir);
        let http_client = build_http_client()?;

        let state = Self {
            data_dir,
            config,
            http_client,
        };
        if !state.data_dir.join(SETTINGS_FILE).exists() {
            state.save_config()?;
            info!("Wrote default settings to {:?}", state.data_dir.join(SETTINGS_FILE));
        }
        Ok(state)
    }

    pub fn game_dir(&self) -> &Path {
        &self.config.game_dir
    }

    pub fn save_config(&self) -> LauncherResult<()> {
        self.config.save(&self.data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

//! `dashforge.toml` settings.

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub(crate) const SETTINGS_FILE: &str = "dashforge.toml";

/// Project settings. Every field has a default, so the file is optional
/// and may set any subset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) defaults_dir: PathBuf,
    pub(crate) configs_dir: PathBuf,
    pub(crate) dashboards_dir: PathBuf,
    pub(crate) mappings_file: PathBuf,
    pub(crate) api_base: String,
    pub(crate) api_key_env: String,
    pub(crate) category: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            defaults_dir: PathBuf::from("defaults"),
            configs_dir: PathBuf::from("configs"),
            dashboards_dir: PathBuf::from("dashboards"),
            mappings_file: PathBuf::from(".dashboard_mappings.json"),
            api_base: "https://api.glassnode.com/v1/dashboards".to_string(),
            api_key_env: "GLASSNODE_API_KEY".to_string(),
            category: "My Dashboards".to_string(),
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must exist. Without one, `dashforge.toml` in the
    /// working directory is used when present, built-in defaults otherwise.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(SETTINGS_FILE);
                if !path.is_file() {
                    debug!("no {SETTINGS_FILE}, using built-in settings");
                    return Ok(Self::default());
                }
                path
            }
        };
        let text = fs::read_to_string(&path).map_err(|e| CliError::io(&path, e))?;
        Self::parse(&text).map_err(|message| CliError::Settings { path, message })
    }

    pub(crate) fn parse(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub(crate) fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .map_err(|_| CliError::MissingApiKey(self.api_key_env.clone()))
    }
}

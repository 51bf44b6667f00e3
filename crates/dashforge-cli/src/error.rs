//! CLI error type.

use dashforge::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub(crate) type Result<T, E = CliError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings file {path}: {message}")]
    Settings { path: PathBuf, message: String },

    #[error("API key not set: export {0} or add it to .env")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no dashboard uuid recorded for {0}")]
    NotMapped(PathBuf),

    #[error("no mapped configurations under {0}")]
    NoMappedConfigs(PathBuf),

    #[error("{failed} of {total} dashboards failed")]
    Batch { failed: usize, total: usize },
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

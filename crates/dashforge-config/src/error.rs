//! Error types for configuration sources.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for configuration loading.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Errors raised while reading layers or dashboard configurations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A default layer exists but is malformed. Fatal to the whole run.
    #[error("failed to load {layer} layer from {}: {message}", path.display())]
    LayerLoad {
        /// Layer name (`model`, `assets`, `metrics`, `overrides`)
        layer: &'static str,
        /// Source file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// A dashboard configuration is missing or malformed. Fatal to that file.
    #[error("failed to parse dashboard config {}: {message}", path.display())]
    ConfigParse {
        /// Source file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// A configuration parsed but one of its entries did not resolve.
    #[error("failed to build dashboard from {}: {source}", path.display())]
    Build {
        /// Source file
        path: PathBuf,
        /// Underlying resolution error
        #[source]
        source: dashforge_core::Error,
    },

    /// Directory traversal failed.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Batch input is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Batch directory holds nothing to build.
    #[error("no configuration files found in {} matching {patterns}", dir.display())]
    NoConfigFiles {
        /// Directory searched
        dir: PathBuf,
        /// Patterns tried, comma separated
        patterns: String,
    },
}

impl ConfigError {
    /// The file this error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::LayerLoad { path, .. }
            | Self::ConfigParse { path, .. }
            | Self::Build { path, .. }
            | Self::Io { path, .. }
            | Self::NotADirectory(path) => path,
            Self::NoConfigFiles { dir, .. } => dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_load_display() {
        let err = ConfigError::LayerLoad {
            layer: "metrics",
            path: PathBuf::from("defaults/metrics.yaml"),
            message: "expected a mapping".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to load metrics layer from defaults/metrics.yaml: expected a mapping"
        );
    }

    #[test]
    fn test_build_error_carries_code() {
        let source = dashforge_core::MetricCode::parse("bad code").unwrap_err();
        let err = ConfigError::Build {
            path: PathBuf::from("configs/a.json"),
            source,
        };
        assert!(err.to_string().contains("configs/a.json"));
        assert!(err.to_string().contains("'bad code'"));
        assert_eq!(err.path(), std::path::Path::new("configs/a.json"));
    }

    #[test]
    fn test_not_a_directory_display() {
        let err = ConfigError::NotADirectory(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "not a directory: /nope");
    }
}

//! Dashboard configuration files and batch builds.

use crate::error::{ConfigError, Result};
use crate::source::{parse_str, Format};
use dashforge_core::{Assembler, DashboardConfig, DashboardDocument, LayerStore, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name patterns picked up by a batch build when none are given.
pub const DEFAULT_FILE_PATTERNS: [&str; 3] = ["*.json", "*.yaml", "*.yml"];

/// Parse a dashboard configuration file.
///
/// # Errors
///
/// [`ConfigError::ConfigParse`] when the file is missing, unreadable, or
/// does not have the configuration shape.
pub fn load_dashboard(path: &Path) -> Result<DashboardConfig> {
    let parse_error = |message: String| ConfigError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };
    let text = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
    parse_str(&text, Format::from_path(path)).map_err(parse_error)
}

/// Parse and assemble one configuration file.
///
/// # Errors
///
/// [`ConfigError::ConfigParse`] for a bad file, [`ConfigError::Build`] when
/// an entry fails to resolve.
pub fn build_dashboard(path: &Path, layers: &LayerStore) -> Result<DashboardDocument> {
    let config = load_dashboard(path)?;
    Assembler::new(layers)
        .assemble(&config)
        .map_err(|source| ConfigError::Build {
            path: path.to_path_buf(),
            source,
        })
}

/// Outcome of a batch build, one slot per file.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully built documents
    pub built: Vec<(PathBuf, DashboardDocument)>,
    /// Files that failed, with their error
    pub failed: Vec<(PathBuf, ConfigError)>,
}

impl BatchReport {
    /// Total number of files attempted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.built.len() + self.failed.len()
    }

    /// True when no file was attempted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Document built from `path`, if it succeeded.
    #[must_use]
    pub fn document(&self, path: &Path) -> Option<&DashboardDocument> {
        self.built
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, doc)| doc)
    }
}

/// Recursively list files under `dir` whose file name matches any of
/// `patterns`, sorted by path. Dotfiles are skipped.
///
/// # Errors
///
/// [`ConfigError::NotADirectory`] when `dir` is not a directory,
/// [`ConfigError::Io`] when traversal fails.
pub fn discover(dir: &Path, patterns: &[Pattern]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConfigError::NotADirectory(dir.to_path_buf()));
    }

    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let io_error = |source| ConfigError::Io {
            path: current.clone(),
            source,
        };
        for entry in fs::read_dir(&current).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if path.is_dir() {
                pending.push(path);
            } else if patterns.iter().any(|p| p.matches(name)) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Build every matching configuration under `dir`.
///
/// Files are independent: a failure is recorded in the report and the
/// remaining files are still built.
///
/// # Errors
///
/// Only directory-level problems: [`ConfigError::NotADirectory`],
/// [`ConfigError::Io`], or [`ConfigError::NoConfigFiles`].
pub fn build_directory(
    dir: &Path,
    layers: &LayerStore,
    patterns: &[Pattern],
) -> Result<BatchReport> {
    let files = discover(dir, patterns)?;
    if files.is_empty() {
        return Err(ConfigError::NoConfigFiles {
            dir: dir.to_path_buf(),
            patterns: patterns
                .iter()
                .map(Pattern::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let mut report = BatchReport::default();
    for path in files {
        match build_dashboard(&path, layers) {
            Ok(doc) => {
                debug!(path = %path.display(), name = %doc.meta.name, "built dashboard");
                report.built.push((path, doc));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping dashboard");
                report.failed.push((path, e));
            }
        }
    }

    info!(
        dir = %dir.display(),
        built = report.built.len(),
        failed = report.failed.len(),
        "batch build finished"
    );
    Ok(report)
}

/// [`DEFAULT_FILE_PATTERNS`] as patterns.
#[must_use]
pub fn default_patterns() -> Vec<Pattern> {
    DEFAULT_FILE_PATTERNS
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
}

//! Config path to remote dashboard uuid mapping, kept as a JSON object.

use crate::error::{CliError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub(crate) struct MappingStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl MappingStore {
    /// Read the store at `path`; a missing file is an empty store.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| CliError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(CliError::io(path, e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub(crate) fn get(&self, config: &Path) -> Option<&str> {
        self.entries.get(&key(config)).map(String::as_str)
    }

    /// Record `uuid` for `config`, replacing any earlier one.
    pub(crate) fn insert(&mut self, config: &Path, uuid: &str) {
        self.entries.insert(key(config), uuid.to_string());
    }

    /// Mapped configs at or below `dir`, sorted.
    pub(crate) fn under(&self, dir: &Path) -> Vec<(PathBuf, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (PathBuf::from(k), v.clone()))
            .filter(|(p, _)| p.starts_with(dir))
            .collect()
    }

    pub(crate) fn save(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.entries).map_err(|source| CliError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text + "\n").map_err(|e| CliError::io(&self.path, e))
    }
}

fn key(config: &Path) -> String {
    config.to_string_lossy().into_owned()
}

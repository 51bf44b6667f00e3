//! Subcommand implementations.
//!
//! Every command works on one file or a directory tree. Directory runs keep
//! going past failing files and report them at the end.

use crate::client::DashboardApi;
use crate::error::{CliError, Result};
use crate::mappings::MappingStore;
use crate::paths::{config_to_dashboard_path, dashboard_to_config_path, is_dashboard_file};
use crate::settings::Settings;
use dashforge::config::{default_patterns, discover, load_layers, ConfigError};
use dashforge::{build_file, to_json, LayerStore, WireDashboard};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Settings plus the loaded default layers.
pub(crate) struct Workspace {
    pub(crate) settings: Settings,
    pub(crate) layers: LayerStore,
}

impl Workspace {
    pub(crate) fn open(settings: Settings) -> Result<Self> {
        let layers = load_layers(&settings.defaults_dir)?;
        let (assets, rules, overrides) = layers.counts();
        debug!(assets, rules, overrides, "default layers loaded");
        Ok(Self { settings, layers })
    }

    fn dashboard_path(&self, config: &Path) -> PathBuf {
        config_to_dashboard_path(
            config,
            &self.settings.configs_dir,
            &self.settings.dashboards_dir,
        )
    }

    fn write_dashboard(&self, config: &Path, wire: &WireDashboard) -> Result<PathBuf> {
        let out = self.dashboard_path(config);
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
        }
        let text = to_json(wire).map_err(|source| CliError::Json {
            path: out.clone(),
            source,
        })?;
        fs::write(&out, text + "\n").map_err(|e| CliError::io(&out, e))?;
        Ok(out)
    }
}

/// Per-run tally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) succeeded: usize,
    pub(crate) failed: usize,
}

impl Summary {
    fn record<T>(&mut self, path: &Path, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.succeeded += 1;
                Some(value)
            }
            Err(e) => {
                self.failed += 1;
                warn!(path = %path.display(), error = %e, "dashboard failed");
                println!("  ✗ {}: {e}", path.display());
                None
            }
        }
    }

    /// Fail the run if any file failed.
    pub(crate) fn finish(self) -> Result<Self> {
        println!();
        println!("{} succeeded, {} failed", self.succeeded, self.failed);
        if self.failed > 0 {
            return Err(CliError::Batch {
                failed: self.failed,
                total: self.succeeded + self.failed,
            });
        }
        Ok(self)
    }
}

/// Config files named by `target`: the file itself, or every config below
/// a directory. Generated dashboard files are never treated as configs.
pub(crate) fn collect_configs(target: &Path) -> Result<Vec<PathBuf>> {
    if !target.is_dir() {
        return Ok(vec![target.to_path_buf()]);
    }
    let patterns = default_patterns();
    let files: Vec<PathBuf> = discover(target, &patterns)?
        .into_iter()
        .filter(|p| !is_dashboard_file(p))
        .collect();
    if files.is_empty() {
        return Err(ConfigError::NoConfigFiles {
            dir: target.to_path_buf(),
            patterns: patterns
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
        .into());
    }
    Ok(files)
}

/// Build and write dashboards.
pub(crate) fn build(ws: &Workspace, target: &Path) -> Result<Summary> {
    let configs = collect_configs(target)?;
    println!("Building {} dashboard configuration(s)...", configs.len());

    let mut summary = Summary::default();
    for config in &configs {
        let result = build_file(config, &ws.layers)
            .map_err(CliError::from)
            .and_then(|wire| Ok((ws.write_dashboard(config, &wire)?, wire)));
        if let Some((out, wire)) = summary.record(config, result) {
            println!(
                "  ✓ {} -> {} ({} charts)",
                config.display(),
                out.display(),
                wire.configs.len()
            );
        }
    }
    summary.finish()
}

/// Build without writing anything.
pub(crate) fn check(ws: &Workspace, target: &Path) -> Result<Summary> {
    let configs = collect_configs(target)?;
    println!("Checking {} dashboard configuration(s)...", configs.len());

    let mut summary = Summary::default();
    for config in &configs {
        let result = build_file(config, &ws.layers).map_err(CliError::from);
        if let Some(wire) = summary.record(config, result) {
            println!(
                "  ✓ {} ({}, {} charts)",
                config.display(),
                wire.meta.name,
                wire.configs.len()
            );
        }
    }
    summary.finish()
}

/// Build, write and upload new dashboards, recording returned uuids.
pub(crate) fn create(
    ws: &Workspace,
    api: &dyn DashboardApi,
    mappings: &mut MappingStore,
    target: &Path,
    category: &str,
) -> Result<Summary> {
    let configs = collect_configs(target)?;
    println!("Creating {} dashboard(s) in {category}...", configs.len());

    let mut summary = Summary::default();
    for config in &configs {
        let result = build_file(config, &ws.layers)
            .map_err(CliError::from)
            .and_then(|wire| {
                ws.write_dashboard(config, &wire)?;
                api.create(&to_value(&wire, config)?, category)
            });
        if let Some(outcome) = summary.record(config, result) {
            match &outcome.uuid {
                Some(uuid) => {
                    mappings.insert(config, uuid);
                    println!("  ✓ {} -> {uuid}", config.display());
                }
                None => println!(
                    "  ✓ {} (status {}, no uuid returned)",
                    config.display(),
                    outcome.status
                ),
            }
        }
    }
    mappings.save()?;
    summary.finish()
}

/// What `update` was pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpdateTarget {
    /// Explicit uuid and a config or generated dashboard file
    Direct { uuid: String, file: PathBuf },
    /// A mapped config file
    Config(PathBuf),
    /// Every mapped config below a directory
    Directory(PathBuf),
}

impl UpdateTarget {
    pub(crate) fn from_args(args: &[String]) -> Self {
        match args {
            [uuid, file, ..] => Self::Direct {
                uuid: uuid.clone(),
                file: PathBuf::from(file),
            },
            [path] if Path::new(path).is_dir() => Self::Directory(PathBuf::from(path)),
            [path] => Self::Config(PathBuf::from(path)),
            [] => Self::Directory(PathBuf::new()),
        }
    }
}

/// Push rebuilt dashboards to existing remote uuids.
pub(crate) fn update(
    ws: &Workspace,
    api: &dyn DashboardApi,
    mappings: &mut MappingStore,
    target: &UpdateTarget,
) -> Result<Summary> {
    let jobs: Vec<(PathBuf, String)> = match target {
        UpdateTarget::Direct { uuid, file } => vec![(file.clone(), uuid.clone())],
        UpdateTarget::Config(config) => {
            let uuid = mappings
                .get(config)
                .ok_or_else(|| CliError::NotMapped(config.clone()))?;
            vec![(config.clone(), uuid.to_string())]
        }
        UpdateTarget::Directory(dir) => {
            let jobs = mappings.under(dir);
            if jobs.is_empty() {
                return Err(CliError::NoMappedConfigs(dir.clone()));
            }
            jobs
        }
    };
    println!("Updating {} dashboard(s)...", jobs.len());

    let mut summary = Summary::default();
    for (file, uuid) in &jobs {
        let result = update_one(ws, api, file, uuid);
        if let Some(config) = summary.record(file, result) {
            mappings.insert(&config, uuid);
            println!("  ✓ {} -> {uuid}", file.display());
        }
    }
    mappings.save()?;
    summary.finish()
}

/// Update one dashboard; returns the config path to record.
fn update_one(ws: &Workspace, api: &dyn DashboardApi, file: &Path, uuid: &str) -> Result<PathBuf> {
    let (config, document) = if is_dashboard_file(file) {
        let text = fs::read_to_string(file).map_err(|e| CliError::io(file, e))?;
        let document: Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
            path: file.to_path_buf(),
            source,
        })?;
        let config = dashboard_to_config_path(
            file,
            &ws.settings.dashboards_dir,
            &ws.settings.configs_dir,
        )
        .unwrap_or_else(|| file.to_path_buf());
        (config, document)
    } else {
        let wire = build_file(file, &ws.layers)?;
        ws.write_dashboard(file, &wire)?;
        (file.to_path_buf(), to_value(&wire, file)?)
    };
    api.update(uuid, &document)?;
    Ok(config)
}

fn to_value(wire: &WireDashboard, path: &Path) -> Result<Value> {
    serde_json::to_value(wire).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

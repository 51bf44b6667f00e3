//! `configs/<rel>.json` <-> `dashboards/<rel>_dashboard.json`.

use std::path::{Path, PathBuf};

const SUFFIX: &str = "_dashboard";
const CONFIG_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Output path for `config`. Configs outside `configs_dir` land at the
/// top of `dashboards_dir`.
pub(crate) fn config_to_dashboard_path(
    config: &Path,
    configs_dir: &Path,
    dashboards_dir: &Path,
) -> PathBuf {
    let rel = config
        .strip_prefix(configs_dir)
        .ok()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    let stem = config
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    dashboards_dir.join(rel).join(format!("{stem}{SUFFIX}.json"))
}

/// Config path a dashboard file was built from, if it follows the naming
/// convention. An existing config with a YAML extension is preferred over
/// a missing `.json` one.
pub(crate) fn dashboard_to_config_path(
    dashboard: &Path,
    dashboards_dir: &Path,
    configs_dir: &Path,
) -> Option<PathBuf> {
    let stem = dashboard.file_stem()?.to_str()?.strip_suffix(SUFFIX)?;
    let rel = dashboard
        .strip_prefix(dashboards_dir)
        .ok()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    let base = configs_dir.join(rel);
    let candidates: Vec<PathBuf> = CONFIG_EXTENSIONS
        .iter()
        .map(|ext| base.join(format!("{stem}.{ext}")))
        .collect();
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .or_else(|| candidates.into_iter().next())
}

pub(crate) fn is_dashboard_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with(SUFFIX))
}

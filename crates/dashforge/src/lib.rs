//! Dashforge: fully resolved analytics dashboards from sparse configurations.
//!
//! A dashboard configuration names only metric codes and the few attributes
//! that differ from the defaults. Dashforge fills in the rest from a stack
//! of default layers and renders the platform's wire document.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let layers = dashforge::config::load_layers(Path::new("defaults"))?;
//! let wire = dashforge::build_file(Path::new("configs/btc.json"), &layers)?;
//! println!("{}", dashforge::to_json(&wire).unwrap_or_default());
//! # Ok::<(), dashforge::config::ConfigError>(())
//! ```

pub use dashforge_core::*;
pub use dashforge_config as config;
pub use dashforge_layout as layout;

mod render;

pub use render::{render, render_with, to_json, WireChart, WireDashboard, WireMeta, DISPLAY_KEYS};

use std::path::Path;

/// Load, resolve and render one configuration file.
pub fn build_file(path: &Path, layers: &LayerStore) -> config::Result<WireDashboard> {
    let doc = config::build_dashboard(path, layers)?;
    Ok(render(&doc))
}

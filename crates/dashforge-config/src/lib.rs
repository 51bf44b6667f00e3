//! Configuration sources for Dashforge.
//!
//! Reads YAML or JSON documents into the resolution engine's types:
//! default layers from a defaults directory, dashboard configurations from
//! single files or whole directory trees.

mod dashboard;
mod error;
mod layers;
mod source;

pub use dashboard::{
    build_dashboard, build_directory, default_patterns, discover, load_dashboard, BatchReport,
    DEFAULT_FILE_PATTERNS,
};
pub use error::{ConfigError, Result};
pub use layers::{load_layers, locate, ASSETS, METRICS, MODEL, OVERRIDES};
pub use source::{parse_str, Format, Ordered};

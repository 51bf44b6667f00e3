//! Loading the four default layers from a defaults directory.
//!
//! ```text
//! defaults/
//!   model.yaml      resolution: 24h          # applied to every metric
//!   assets.yaml     BTC: {lineColor: ...}    # per asset
//!   metrics.yaml    "market.*": {...}        # ordered pattern rules
//!   overrides.yaml  BTC: {"market.Price*": {...}}
//! ```
//!
//! Each layer may also be `.yml` or `.json`. A missing file is an empty
//! layer; a malformed one is a [`ConfigError::LayerLoad`].

use crate::error::{ConfigError, Result};
use crate::source::{read_source, Ordered, SourceError};
use dashforge_core::{Attributes, CompositeKey, LayerStore, MetricCode, Pattern};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Model layer file stem.
pub const MODEL: &str = "model";
/// Asset layer file stem.
pub const ASSETS: &str = "assets";
/// Metric-pattern layer file stem.
pub const METRICS: &str = "metrics";
/// Asset-metric override layer file stem.
pub const OVERRIDES: &str = "overrides";

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// First existing `<dir>/<stem>.<ext>`, trying YAML before JSON.
#[must_use]
pub fn locate(dir: &Path, stem: &str) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
}

/// Load every layer found under `dir`.
///
/// # Errors
///
/// [`ConfigError::LayerLoad`] if any present layer file is unreadable or
/// malformed.
pub fn load_layers(dir: &Path) -> Result<LayerStore> {
    if !dir.is_dir() {
        info!(dir = %dir.display(), "defaults directory not found, using empty layers");
        return Ok(LayerStore::new());
    }

    let mut store = LayerStore::new();

    if let Some(model) = load_layer::<Attributes>(dir, MODEL)? {
        store = store.with_model(model);
    }

    if let Some(assets) = load_layer::<BTreeMap<String, Attributes>>(dir, ASSETS)? {
        for (asset, attributes) in assets {
            store = store.with_asset(&asset, attributes);
        }
    }

    if let Some((path, rules)) = load_layer_at::<Ordered<Attributes>>(dir, METRICS)? {
        for (key, attributes) in rules.into_entries() {
            let pattern = rule_pattern(&key).map_err(|message| ConfigError::LayerLoad {
                layer: METRICS,
                path: path.clone(),
                message,
            })?;
            store = store.with_metric_rule(pattern, attributes);
        }
    }

    if let Some((path, assets)) = load_layer_at::<Ordered<Ordered<Attributes>>>(dir, OVERRIDES)? {
        for (asset, rules) in assets.into_entries() {
            for (key, attributes) in rules.into_entries() {
                let pattern = rule_pattern(&key).map_err(|message| ConfigError::LayerLoad {
                    layer: OVERRIDES,
                    path: path.clone(),
                    message,
                })?;
                store = store.with_override(CompositeKey::new(&asset, pattern), attributes);
            }
        }
    }

    let (assets, rules, overrides) = store.counts();
    info!(
        dir = %dir.display(),
        model_keys = store.model().len(),
        assets,
        rules,
        overrides,
        "loaded default layers"
    );
    Ok(store)
}

/// Wildcard keys are kept verbatim; literal keys are normalized so
/// `/market/price_usd` and `market.PriceUsd` select the same metric.
/// Wildcards only ever match canonical codes, so a path-form wildcard
/// key is rejected.
fn rule_pattern(key: &str) -> std::result::Result<Pattern, String> {
    let pattern = Pattern::new(key).map_err(|e| e.to_string())?;
    if !pattern.is_literal() {
        if key.contains('/') {
            return Err(format!(
                "wildcard pattern `{key}` uses path form; write it as `domain.Name*`"
            ));
        }
        return Ok(pattern);
    }
    let code = MetricCode::parse(key).map_err(|e| e.to_string())?;
    Pattern::new(&code.canonical()).map_err(|e| e.to_string())
}

fn load_layer<T>(dir: &Path, layer: &'static str) -> Result<Option<T>>
where
    T: DeserializeOwned + Default,
{
    Ok(load_layer_at(dir, layer)?.map(|(_, value)| value))
}

fn load_layer_at<T>(dir: &Path, layer: &'static str) -> Result<Option<(PathBuf, T)>>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = locate(dir, layer) else {
        debug!(layer, dir = %dir.display(), "layer source missing, treating as empty");
        return Ok(None);
    };

    match read_source::<T>(&path) {
        Ok(value) => {
            debug!(layer, path = %path.display(), "layer loaded");
            Ok(Some((path, value)))
        }
        Err(SourceError::Missing) => Ok(None),
        Err(e) => Err(ConfigError::LayerLoad {
            layer,
            path,
            message: e.to_string(),
        }),
    }
}

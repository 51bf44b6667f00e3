//! Layered resolution of metric attributes.
//!
//! Precedence, lowest first:
//!
//! | step | source | skipped when |
//! |------|--------|--------------|
//! | 1 | model layer | never |
//! | 2 | asset layer | entry has no asset |
//! | 3 | every matching metric rule, declaration order | no rule matches |
//! | 4 | asset-metric overrides | no asset, or no key selects the entry |
//! | 5 | dashboard overrides | never |
//! | 6 | inline entry overrides | never |
//!
//! Each step overlays its mapping key-by-key on the accumulator.

use crate::code::MetricCode;
use crate::layers::LayerStore;
use crate::value::{overlay, AttrValue, Attributes};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One metric line item, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    /// Canonical code
    pub code: MetricCode,
    /// Upper-case asset symbol
    pub asset: Option<String>,
    /// Inline overrides (highest precedence)
    pub overrides: Attributes,
}

impl MetricEntry {
    /// Entry with no asset and no overrides.
    #[must_use]
    pub fn new(code: MetricCode) -> Self {
        Self {
            code,
            asset: None,
            overrides: Attributes::new(),
        }
    }

    /// Set the asset; upper-cased.
    #[must_use]
    pub fn with_asset(mut self, asset: &str) -> Self {
        self.asset = Some(asset.to_ascii_uppercase());
        self
    }

    /// Add one inline override.
    #[must_use]
    pub fn with_override(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.overrides.insert(key.to_string(), value.into());
        self
    }
}

/// Fully resolved attributes for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetricConfig {
    /// Canonical code
    pub code: MetricCode,
    /// Asset symbol, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    /// Final attribute values
    pub attributes: Attributes,
}

impl ResolvedMetricConfig {
    /// Look up a resolved attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// Applies the layer stack to metric entries.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    layers: &'a LayerStore,
}

impl<'a> Resolver<'a> {
    /// Resolver borrowing `layers` for its lifetime.
    #[must_use]
    pub const fn new(layers: &'a LayerStore) -> Self {
        Self { layers }
    }

    /// Layers this resolver reads.
    #[must_use]
    pub const fn layers(&self) -> &'a LayerStore {
        self.layers
    }

    /// Resolve one entry. Pure: same inputs, same output.
    #[must_use]
    pub fn resolve(
        &self,
        entry: &MetricEntry,
        dashboard_overrides: &Attributes,
    ) -> ResolvedMetricConfig {
        let mut acc = self.layers.model().clone();

        if let Some(asset) = entry.asset.as_deref() {
            if let Some(defaults) = self.layers.asset(asset) {
                overlay(&mut acc, defaults);
            }
        }

        for rule in self.layers.matching_rules(&entry.code) {
            trace!(code = %entry.code, pattern = %rule.pattern, "metric rule matched");
            overlay(&mut acc, &rule.attributes);
        }

        if let Some(asset) = entry.asset.as_deref() {
            for attributes in self.layers.matching_overrides(asset, &entry.code) {
                overlay(&mut acc, attributes);
            }
        }

        overlay(&mut acc, dashboard_overrides);
        overlay(&mut acc, &entry.overrides);

        ResolvedMetricConfig {
            code: entry.code.clone(),
            asset: entry.asset.clone(),
            attributes: acc,
        }
    }
}

//! In-memory default layers.
//!
//! Four layers feed resolution, lowest precedence first:
//!
//! 1. **model** - one mapping applied to every metric
//! 2. **asset** - keyed by asset symbol (`BTC`)
//! 3. **metric** - ordered `(pattern, mapping)` rules; every matching rule
//!    applies, in declaration order
//! 4. **override** - keyed by `asset|code`; code may itself be a pattern
//!
//! A [`LayerStore`] is built once and then only read. Share it by
//! reference across every resolution in a batch.

use crate::code::MetricCode;
use crate::pattern::Pattern;
use crate::value::Attributes;
use std::collections::HashMap;
use std::fmt;

/// One `(pattern, attributes)` rule from the metric layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternRule {
    /// Pattern matched against canonical codes
    pub pattern: Pattern,
    /// Attributes applied on match
    pub attributes: Attributes,
}

/// Composite key of the asset-metric override layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    /// Upper-case asset symbol
    pub asset: String,
    /// Canonical code or code pattern
    pub code: Pattern,
}

impl CompositeKey {
    /// Build a key; the asset is upper-cased.
    pub fn new(asset: &str, code: Pattern) -> Self {
        Self {
            asset: asset.to_ascii_uppercase(),
            code,
        }
    }

    /// Whether this key selects `code` for `asset`.
    #[must_use]
    pub fn selects(&self, asset: &str, code: &MetricCode) -> bool {
        self.asset == asset && self.code.matches(&code.canonical())
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.asset, self.code)
    }
}

/// Read-only snapshot of all default layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    model: Attributes,
    assets: HashMap<String, Attributes>,
    metrics: Vec<PatternRule>,
    overrides: Vec<(CompositeKey, Attributes)>,
}

impl LayerStore {
    /// Create a store with every layer empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model layer.
    #[must_use]
    pub fn with_model(mut self, model: Attributes) -> Self {
        self.model = model;
        self
    }

    /// Add (or replace) the defaults for one asset.
    #[must_use]
    pub fn with_asset(mut self, asset: &str, attributes: Attributes) -> Self {
        self.assets.insert(asset.to_ascii_uppercase(), attributes);
        self
    }

    /// Append a metric-pattern rule. Append order is match order.
    #[must_use]
    pub fn with_metric_rule(mut self, pattern: Pattern, attributes: Attributes) -> Self {
        self.metrics.push(PatternRule {
            pattern,
            attributes,
        });
        self
    }

    /// Append an asset-metric override. Append order is match order.
    #[must_use]
    pub fn with_override(mut self, key: CompositeKey, attributes: Attributes) -> Self {
        self.overrides.push((key, attributes));
        self
    }

    /// The global model mapping.
    #[must_use]
    pub const fn model(&self) -> &Attributes {
        &self.model
    }

    /// Defaults for `asset`, if declared.
    #[must_use]
    pub fn asset(&self, asset: &str) -> Option<&Attributes> {
        self.assets.get(asset)
    }

    /// Metric rules in declaration order.
    #[must_use]
    pub fn metric_rules(&self) -> &[PatternRule] {
        &self.metrics
    }

    /// Every metric rule matching `code`, in declaration order.
    pub fn matching_rules<'a>(
        &'a self,
        code: &'a MetricCode,
    ) -> impl Iterator<Item = &'a PatternRule> + 'a {
        let canonical = code.canonical();
        self.metrics
            .iter()
            .filter(move |rule| rule.pattern.matches(&canonical))
    }

    /// Every override selecting `(asset, code)`, in declaration order.
    pub fn matching_overrides<'a>(
        &'a self,
        asset: &'a str,
        code: &'a MetricCode,
    ) -> impl Iterator<Item = &'a Attributes> + 'a {
        self.overrides
            .iter()
            .filter(move |(key, _)| key.selects(asset, code))
            .map(|(_, attributes)| attributes)
    }

    /// Number of `(assets, metric rules, overrides)` entries, for logging.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.assets.len(), self.metrics.len(), self.overrides.len())
    }

    /// True when no layer holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
            && self.assets.is_empty()
            && self.metrics.is_empty()
            && self.overrides.is_empty()
    }
}

//! Dashboard assembly: parsed configuration in, resolved document out.

use crate::code::MetricCode;
use crate::error::{Error, Result};
use crate::layers::LayerStore;
use crate::resolve::{MetricEntry, ResolvedMetricConfig, Resolver};
use crate::value::{AttrValue, Attributes};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keys of the detailed entry form that are not attribute overrides.
const CODE_KEYS: [&str; 2] = ["code", "metricCode"];
const ASSET_KEY: &str = "asset";

/// A metric as written in a dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricSpec {
    /// Bare code: `market.PriceUsdClose`
    Code(String),
    /// Object form: `{code, asset?, ...overrides}`
    Detailed(Attributes),
}

impl MetricSpec {
    /// Normalize into a [`MetricEntry`].
    ///
    /// `default_asset` applies when the entry names no asset of its own.
    /// Every key of the object form other than the code and asset keys
    /// becomes an inline override.
    ///
    /// # Errors
    ///
    /// [`Error::MissingField`] when the object form has no code, or
    /// [`Error::InvalidMetricCode`] when the code does not normalize.
    pub fn to_entry(&self, index: usize, default_asset: Option<&str>) -> Result<MetricEntry> {
        match self {
            Self::Code(raw) => {
                let entry = MetricEntry::new(MetricCode::parse(raw)?);
                Ok(match default_asset.and_then(non_blank) {
                    Some(asset) => entry.with_asset(asset),
                    None => entry,
                })
            }
            Self::Detailed(fields) => {
                let raw = CODE_KEYS
                    .iter()
                    .find_map(|k| fields.get(*k).and_then(AttrValue::as_str))
                    .ok_or_else(|| Error::MissingField {
                        field: "code",
                        context: format!("metric entry #{}", index + 1),
                    })?;

                let mut entry = MetricEntry::new(MetricCode::parse(raw)?);
                let asset = fields
                    .get(ASSET_KEY)
                    .and_then(AttrValue::as_str)
                    .and_then(non_blank)
                    .or(default_asset);
                if let Some(asset) = asset {
                    entry = entry.with_asset(asset);
                }
                entry.overrides = fields
                    .iter()
                    .filter(|(k, _)| !CODE_KEYS.contains(&k.as_str()) && k.as_str() != ASSET_KEY)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Ok(entry)
            }
        }
    }
}

fn non_blank(asset: &str) -> Option<&str> {
    let asset = asset.trim();
    (!asset.is_empty()).then_some(asset)
}

impl From<&str> for MetricSpec {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

/// Parsed dashboard configuration file.
///
/// `dashboardOverrides` may also be written `common_overrides`; when both
/// are present `dashboardOverrides` wins. A null overrides value is empty
/// and a blank asset is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawDashboardConfig")]
pub struct DashboardConfig {
    /// Dashboard title
    pub name: String,
    /// Asset used by entries that name none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    /// Overrides applied to every metric of this dashboard
    pub dashboard_overrides: Attributes,
    /// Metrics in display order
    pub metrics: Vec<MetricSpec>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDashboardConfig {
    name: String,
    #[serde(default)]
    asset: Option<String>,
    #[serde(default)]
    dashboard_overrides: Option<Attributes>,
    #[serde(default, rename = "common_overrides")]
    common_overrides: Option<Attributes>,
    metrics: Vec<MetricSpec>,
}

impl From<RawDashboardConfig> for DashboardConfig {
    fn from(raw: RawDashboardConfig) -> Self {
        Self {
            name: raw.name,
            asset: raw.asset.as_deref().and_then(non_blank).map(str::to_string),
            dashboard_overrides: raw
                .dashboard_overrides
                .or(raw.common_overrides)
                .unwrap_or_default(),
            metrics: raw.metrics,
        }
    }
}

impl DashboardConfig {
    /// Minimal configuration with no default asset or overrides.
    pub fn new(name: impl Into<String>, metrics: Vec<MetricSpec>) -> Self {
        Self {
            name: name.into(),
            asset: None,
            dashboard_overrides: Attributes::new(),
            metrics,
        }
    }

    /// Set the default asset.
    #[must_use]
    pub fn with_asset(mut self, asset: &str) -> Self {
        self.asset = Some(asset.to_string());
        self
    }

    /// Set the dashboard-level overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Attributes) -> Self {
        self.dashboard_overrides = overrides;
        self
    }
}

/// Dashboard-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMeta {
    /// Dashboard title
    pub name: String,
    /// Default asset, if the configuration named one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

/// Fully resolved dashboard, metrics in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDocument {
    /// Dashboard metadata
    pub meta: DashboardMeta,
    /// Resolved metrics
    pub configs: Vec<ResolvedMetricConfig>,
}

/// Turns configurations into documents using a shared [`LayerStore`].
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    resolver: Resolver<'a>,
}

impl<'a> Assembler<'a> {
    /// Assembler borrowing `layers`.
    #[must_use]
    pub const fn new(layers: &'a LayerStore) -> Self {
        Self {
            resolver: Resolver::new(layers),
        }
    }

    /// Assemble one dashboard.
    ///
    /// Entries are normalized and resolved in order. The first entry that
    /// fails aborts the whole dashboard; no partial document is returned.
    ///
    /// # Errors
    ///
    /// Propagates the first entry error.
    pub fn assemble(&self, config: &DashboardConfig) -> Result<DashboardDocument> {
        let default_asset = config.asset.as_deref();
        let entries = config
            .metrics
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.to_entry(i, default_asset))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.assemble_entries(
            &config.name,
            default_asset,
            &config.dashboard_overrides,
            &entries,
        ))
    }

    /// Assemble from entries that are already normalized.
    #[must_use]
    pub fn assemble_entries(
        &self,
        name: &str,
        asset: Option<&str>,
        dashboard_overrides: &Attributes,
        entries: &[MetricEntry],
    ) -> DashboardDocument {
        let configs: Vec<_> = entries
            .iter()
            .map(|entry| self.resolver.resolve(entry, dashboard_overrides))
            .collect();
        debug!(dashboard = name, metrics = configs.len(), "assembled dashboard");

        DashboardDocument {
            meta: DashboardMeta {
                name: name.to_string(),
                asset: asset.map(str::to_ascii_uppercase),
            },
            configs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::value::attrs;
    use proptest::prelude::*;

    fn layers() -> LayerStore {
        LayerStore::new()
            .with_model(attrs([("resolution", "24h"), ("zoom", "All")]))
            .with_asset("BTC", attrs([("currency", "usd")]))
            .with_metric_rule(
                Pattern::new("derivatives.*").unwrap(),
                attrs([("chartStyle", "column")]),
            )
    }

    fn detailed(pairs: &[(&str, &str)]) -> MetricSpec {
        MetricSpec::Detailed(attrs(pairs.iter().copied()))
    }

    // =========================================================================
    // Entry parsing
    // =========================================================================

    #[test]
    fn test_bare_code_inherits_default_asset() {
        let entry = MetricSpec::from("/market/price_usd_close")
            .to_entry(0, Some("btc"))
            .unwrap();
        assert_eq!(entry.code.canonical(), "market.PriceUsdClose");
        assert_eq!(entry.asset.as_deref(), Some("BTC"));
        assert!(entry.overrides.is_empty());
    }

    #[test]
    fn test_detailed_entry_splits_overrides() {
        let spec = detailed(&[
            ("code", "indicators.FearGreed"),
            ("asset", "eth"),
            ("chartStyle", "column"),
            ("zoom", "1y"),
        ]);
        let entry = spec.to_entry(0, Some("BTC")).unwrap();
        assert_eq!(entry.asset.as_deref(), Some("ETH"));
        assert_eq!(entry.overrides.len(), 2);
        assert_eq!(entry.overrides["chartStyle"].as_str(), Some("column"));
        assert!(!entry.overrides.contains_key("code"));
    }

    #[test]
    fn test_detailed_entry_accepts_metric_code_key() {
        let spec = detailed(&[("metricCode", "market.MarketCap"), ("asset", "SOL")]);
        let entry = spec.to_entry(0, None).unwrap();
        assert_eq!(entry.code.canonical(), "market.MarketCap");
        assert!(entry.overrides.is_empty());
    }

    #[test]
    fn test_detailed_entry_without_code() {
        let err = detailed(&[("asset", "BTC")]).to_entry(2, None).unwrap_err();
        assert_eq!(
            err,
            Error::MissingField {
                field: "code",
                context: "metric entry #3".to_string()
            }
        );
    }

    #[test]
    fn test_no_asset_anywhere_is_allowed() {
        let entry = MetricSpec::from("market.Price").to_entry(0, None).unwrap();
        assert_eq!(entry.asset, None);
    }

    // =========================================================================
    // Assembly
    // =========================================================================

    #[test]
    fn test_assemble_preserves_order() {
        let layers = layers();
        let config = DashboardConfig::new(
            "Order",
            vec![
                "market.Zeta".into(),
                "market.Alpha".into(),
                "derivatives.Mid".into(),
            ],
        );
        let doc = Assembler::new(&layers).assemble(&config).unwrap();
        let codes: Vec<String> = doc.configs.iter().map(|c| c.code.canonical()).collect();
        assert_eq!(codes, vec!["market.Zeta", "market.Alpha", "derivatives.Mid"]);
    }

    #[test]
    fn test_assemble_fails_fast_on_bad_code() {
        let layers = layers();
        let config = DashboardConfig::new(
            "Broken",
            vec!["market.PriceUsdClose".into(), "bad code".into()],
        );
        let err = Assembler::new(&layers).assemble(&config).unwrap_err();
        assert_eq!(err.metric_code(), Some("bad code"));
    }

    #[test]
    fn test_dashboard_overrides_apply_to_every_metric() {
        let layers = layers();
        let config = DashboardConfig::new(
            "Overrides",
            vec![
                "market.Price".into(),
                detailed(&[("code", "market.Volume"), ("resolution", "1h")]),
            ],
        )
        .with_asset("BTC")
        .with_overrides(attrs([("resolution", "4h"), ("currency", "eur")]));

        let doc = Assembler::new(&layers).assemble(&config).unwrap();
        assert_eq!(doc.meta.asset.as_deref(), Some("BTC"));
        assert_eq!(doc.configs[0].get("resolution").and_then(AttrValue::as_str), Some("4h"));
        assert_eq!(doc.configs[1].get("resolution").and_then(AttrValue::as_str), Some("1h"));
        for c in &doc.configs {
            assert_eq!(c.get("currency").and_then(AttrValue::as_str), Some("eur"));
        }
    }

    #[test]
    fn test_dashboard_overrides_do_not_leak_between_dashboards() {
        let layers = layers();
        let assembler = Assembler::new(&layers);
        let first = DashboardConfig::new("A", vec!["market.Price".into()])
            .with_overrides(attrs([("zoom", "3m")]));
        let second = DashboardConfig::new("B", vec!["market.Price".into()]);

        let a = assembler.assemble(&first).unwrap();
        let b = assembler.assemble(&second).unwrap();
        assert_eq!(a.configs[0].get("zoom").and_then(AttrValue::as_str), Some("3m"));
        assert_eq!(b.configs[0].get("zoom").and_then(AttrValue::as_str), Some("All"));
    }

    #[test]
    fn test_empty_metrics() {
        let layers = layers();
        let doc = Assembler::new(&layers)
            .assemble(&DashboardConfig::new("Empty", vec![]))
            .unwrap();
        assert_eq!(doc.meta.name, "Empty");
        assert!(doc.configs.is_empty());
    }

    #[test]
    fn test_config_deserializes_aliases() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{"name": "X", "asset": "BTC", "common_overrides": {"resolution": "1h"},
                "metrics": ["market.Price", {"code": "/market/volume", "zoom": "1y"}]}"#,
        )
        .unwrap();
        assert_eq!(config.dashboard_overrides["resolution"].as_str(), Some("1h"));
        assert!(matches!(config.metrics[0], MetricSpec::Code(_)));
        assert!(matches!(config.metrics[1], MetricSpec::Detailed(_)));
    }

    #[test]
    fn test_null_dashboard_overrides_are_empty() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{"name": "A", "dashboardOverrides": null, "metrics": ["market.Price"]}"#,
        )
        .unwrap();
        assert!(config.dashboard_overrides.is_empty());

        let config: DashboardConfig =
            serde_json::from_str(r#"{"name": "A", "common_overrides": null, "metrics": []}"#)
                .unwrap();
        assert!(config.dashboard_overrides.is_empty());
    }

    #[test]
    fn test_dashboard_overrides_win_over_common_overrides() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{"name": "A",
                "common_overrides": {"zoom": "1y", "scale": "log"},
                "dashboardOverrides": {"zoom": "3m"},
                "metrics": ["market.Price"]}"#,
        )
        .unwrap();
        assert_eq!(config.dashboard_overrides, attrs([("zoom", "3m")]));
    }

    #[test]
    fn test_blank_asset_falls_back_to_default() {
        let entry = detailed(&[("code", "market.Price"), ("asset", "")])
            .to_entry(0, Some("eth"))
            .unwrap();
        assert_eq!(entry.asset.as_deref(), Some("ETH"));

        let entry = detailed(&[("code", "market.Price"), ("asset", "  ")])
            .to_entry(0, None)
            .unwrap();
        assert_eq!(entry.asset, None);

        let entry = MetricSpec::from("market.Price").to_entry(0, Some("")).unwrap();
        assert_eq!(entry.asset, None);
    }

    #[test]
    fn test_blank_dashboard_asset_is_absent() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"name": "A", "asset": " ", "metrics": []}"#).unwrap();
        assert_eq!(config.asset, None);
    }

    #[test]
    fn test_document_serializes_meta_and_configs() {
        let layers = LayerStore::new();
        let doc = Assembler::new(&layers)
            .assemble(&DashboardConfig::new("S", vec!["market.Price".into()]))
            .unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["meta"]["name"], "S");
        assert_eq!(json["configs"][0]["code"], "market.Price");
        assert!(json["configs"][0].get("asset").is_none());
    }

    proptest! {
        #[test]
        fn prop_order_preserved(names in proptest::collection::vec("[A-Z][a-z]{0,6}", 0..12)) {
            let layers = layers();
            let metrics = names.iter().map(|n| MetricSpec::Code(format!("market.{n}"))).collect();
            let doc = Assembler::new(&layers)
                .assemble(&DashboardConfig::new("P", metrics))
                .unwrap();
            let got: Vec<&str> = doc.configs.iter().map(|c| c.code.name()).collect();
            prop_assert_eq!(got, names.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}

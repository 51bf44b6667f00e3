//! Platform wire format for resolved dashboards.
//!
//! Each resolved metric becomes one chart: presentation attributes go to
//! `extra`, everything else (query parameters and unknown keys) to `meta`.
//! Charts are laid out on the default two-column grid.

use dashforge_core::{AttrValue, Attributes, DashboardDocument, ResolvedMetricConfig};
use dashforge_layout::{GridPlacer, GridTemplate, LayoutItem};
use serde::{Deserialize, Serialize};

/// Attributes rendered under a chart's `extra`.
pub const DISPLAY_KEYS: [&str; 6] = [
    "zoom",
    "scale",
    "lineColor",
    "price",
    "chartStyle",
    "logTickInterval",
];

const NAME_KEY: &str = "name";
const UUID_KEY: &str = "uuid";
const CONFIG_TYPE: &str = "metric";

/// Dashboard-level metadata on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMeta {
    /// Dashboard title
    pub name: String,
}

/// One chart on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireChart {
    /// Chart identifier, shared with its layout item
    pub uuid: String,
    /// Query parameters: `metricCode`, `asset`, and every non-display key
    pub meta: Attributes,
    /// Presentation: `name` plus the display keys
    pub extra: Attributes,
    /// Always `metric`
    pub config_type: String,
}

/// Dashboard document as the platform stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDashboard {
    /// Dashboard metadata
    pub meta: WireMeta,
    /// Charts in declaration order
    pub configs: Vec<WireChart>,
    /// Grid placement, one item per chart
    pub layouts: Vec<LayoutItem>,
}

/// Render with random v4 chart identifiers.
pub fn render(doc: &DashboardDocument) -> WireDashboard {
    render_with(doc, || uuid::Uuid::new_v4().to_string())
}

/// Render with identifiers drawn from `next_id`.
///
/// `next_id` is only called for charts whose attributes carry no `uuid`.
pub fn render_with<F>(doc: &DashboardDocument, mut next_id: F) -> WireDashboard
where
    F: FnMut() -> String,
{
    let mut placer = GridPlacer::new(GridTemplate::two_column());
    let mut configs = Vec::with_capacity(doc.configs.len());
    let mut layouts = Vec::with_capacity(doc.configs.len());

    for resolved in &doc.configs {
        let chart = chart(resolved, &mut next_id);
        layouts.push(placer.place(chart.uuid.clone()));
        configs.push(chart);
    }

    WireDashboard {
        meta: WireMeta {
            name: doc.meta.name.clone(),
        },
        configs,
        layouts,
    }
}

/// Pretty-printed JSON.
pub fn to_json(dashboard: &WireDashboard) -> serde_json::Result<String> {
    serde_json::to_string_pretty(dashboard)
}

fn chart<F: FnMut() -> String>(resolved: &ResolvedMetricConfig, next_id: &mut F) -> WireChart {
    let mut meta = Attributes::new();
    let mut extra = Attributes::new();
    let mut name = None;
    let mut id = None;

    for (key, value) in resolved.attributes.iter().filter(|(_, v)| !v.is_null()) {
        match key.as_str() {
            NAME_KEY => name = Some(value.to_string()),
            UUID_KEY => id = Some(value.to_string()),
            k if DISPLAY_KEYS.contains(&k) => {
                extra.insert(key.clone(), value.clone());
            }
            _ => {
                meta.insert(key.clone(), value.clone());
            }
        }
    }

    meta.insert(
        "metricCode".to_string(),
        AttrValue::String(resolved.code.canonical()),
    );
    if let Some(asset) = &resolved.asset {
        meta.insert("asset".to_string(), AttrValue::String(asset.clone()));
    }
    extra.insert(
        NAME_KEY.to_string(),
        AttrValue::String(name.unwrap_or_else(|| resolved.code.display_name())),
    );

    WireChart {
        uuid: id.unwrap_or_else(next_id),
        meta,
        extra,
        config_type: CONFIG_TYPE.to_string(),
    }
}

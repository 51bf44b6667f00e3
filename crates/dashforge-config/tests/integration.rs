//! Integration tests for dashforge-config.
//!
//! Layers and dashboards are written to temporary directories and built
//! end-to-end.

use dashforge_config::{build_directory, default_patterns, load_layers, ConfigError};
use dashforge_core::{AttrValue, ResolvedMetricConfig};
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn text<'a>(config: &'a ResolvedMetricConfig, key: &str) -> Option<&'a str> {
    config.get(key).and_then(AttrValue::as_str)
}

fn defaults(dir: &Path) {
    write(
        dir,
        "model.yaml",
        "resolution: 24h\nzoom: All\nscale: lin\nchartStyle: line\ncurrency: usd\n",
    );
    write(dir, "assets.yaml", "BTC:\n  lineColor: \"#f7931a\"\nETH:\n  lineColor: \"#627eea\"\n");
    write(
        dir,
        "metrics.yaml",
        "\"derivatives.*\":\n  chartStyle: column\n\"derivatives.FuturesOpenInterest*\":\n  chartStyle: line\n  currency: native\n",
    );
    write(dir, "overrides.yaml", "BTC:\n  market.PriceUsdClose:\n    scale: log\n");
}

// =============================================================================
// Layered resolution through real files
// =============================================================================

#[test]
fn test_full_stack_resolution() {
    let layer_dir = tempfile::tempdir().unwrap();
    defaults(layer_dir.path());
    let layers = load_layers(layer_dir.path()).unwrap();

    let configs = tempfile::tempdir().unwrap();
    write(
        configs.path(),
        "mixed.json",
        r#"{
            "name": "Mixed",
            "asset": "BTC",
            "dashboardOverrides": {"resolution": "1h"},
            "metrics": [
                "/market/price_usd_close",
                {"code": "derivatives.FuturesOpenInterestSum", "asset": "ETH"},
                {"code": "derivatives.FuturesVolume", "resolution": "10m"}
            ]
        }"#,
    );

    let report = build_directory(configs.path(), &layers, &default_patterns()).unwrap();
    assert!(report.failed.is_empty());
    let doc = &report.built[0].1;

    let price = &doc.configs[0];
    assert_eq!(text(price, "scale"), Some("log"));
    assert_eq!(text(price, "lineColor"), Some("#f7931a"));
    assert_eq!(text(price, "resolution"), Some("1h"));

    let open_interest = &doc.configs[1];
    assert_eq!(open_interest.asset.as_deref(), Some("ETH"));
    assert_eq!(text(open_interest, "chartStyle"), Some("line"));
    assert_eq!(text(open_interest, "currency"), Some("native"));
    assert_eq!(text(open_interest, "lineColor"), Some("#627eea"));

    let volume = &doc.configs[2];
    assert_eq!(text(volume, "chartStyle"), Some("column"));
    assert_eq!(text(volume, "resolution"), Some("10m"));
    assert_eq!(text(volume, "scale"), Some("lin"));
}

// =============================================================================
// Batch isolation
// =============================================================================

#[test]
fn test_batch_isolates_failures() {
    let configs = tempfile::tempdir().unwrap();
    write(
        configs.path(),
        "a_valid.json",
        r#"{"name": "Valid A", "asset": "BTC", "metrics": ["market.Price"]}"#,
    );
    write(configs.path(), "b_invalid.json", "{'bad': json, }");
    write(
        configs.path(),
        "c_valid.yaml",
        "name: Valid C\nasset: ETH\nmetrics: [/market/volume, /market/cap]\n",
    );
    write(
        configs.path(),
        "d_bad_code.json",
        r#"{"name": "Bad", "metrics": ["market.Price", "bad code"]}"#,
    );

    let layers = dashforge_core::LayerStore::new();
    let report = build_directory(configs.path(), &layers, &default_patterns()).unwrap();

    assert_eq!(report.len(), 4);
    let names: Vec<_> = report.built.iter().map(|(_, d)| d.meta.name.as_str()).collect();
    assert_eq!(names, vec!["Valid A", "Valid C"]);

    assert_eq!(report.failed.len(), 2);
    assert!(matches!(report.failed[0].1, ConfigError::ConfigParse { .. }));
    assert!(report.failed[0].0.ends_with("b_invalid.json"));
    assert!(matches!(report.failed[1].1, ConfigError::Build { .. }));
}

#[test]
fn test_dashboard_overrides_scoped_per_file() {
    let configs = tempfile::tempdir().unwrap();
    write(
        configs.path(),
        "one.json",
        r#"{"name": "One", "dashboardOverrides": {"zoom": "3m"}, "metrics": ["market.Price"]}"#,
    );
    write(configs.path(), "two.json", r#"{"name": "Two", "metrics": ["market.Price"]}"#);

    let layers = dashforge_core::LayerStore::new();
    let report = build_directory(configs.path(), &layers, &default_patterns()).unwrap();
    assert_eq!(text(&report.built[0].1.configs[0], "zoom"), Some("3m"));
    assert_eq!(report.built[1].1.configs[0].get("zoom"), None);
}

#[test]
fn test_batch_on_missing_directory() {
    let layers = dashforge_core::LayerStore::new();
    let err = build_directory(Path::new("/nonexistent/directory"), &layers, &default_patterns())
        .unwrap_err();
    assert!(err.to_string().contains("not a directory"));
}

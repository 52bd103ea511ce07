//! Loading experiments from configuration files into a catalog

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use variation_picker::config::LogFormat;
use variation_picker::{AppConfig, Context, InMemoryExperimentCatalog, RoundRobinTraffic, Simulator};

const CONFIG: &str = r#"
[logging]
level = "debug"
format = "json"

[simulation]
size = 12
traffic = [
    { geo = "us", page = "buy" },
    { geo = "mx", page = "buy" },
]

[experiments.button-color]
variations = ["red", { object = "green", weight = 2 }]

[experiments.checkout]
targeting = { page = "buy" }
strategy = "smooth"
variations = [
    { variations = ["a", "b"], targeting = { geo = "us" } },
    "c",
]
"#;

fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    write_config_as("picker.toml", contents)
}

fn write_config_as(name: &str, contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn loads_sections_from_explicit_file() {
    let (_dir, path) = write_config(CONFIG);
    let config = AppConfig::load(Some(path.as_path())).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.simulation.size, 12);
    assert_eq!(config.simulation.traffic.len(), 2);
    assert_eq!(
        config.experiments.keys().collect::<Vec<_>>(),
        vec!["button-color", "checkout"]
    );
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(AppConfig::load(Some(path.as_path())).is_err());
}

#[test]
fn catalog_built_from_file_picks_in_schedule_order() {
    let (_dir, path) = write_config(CONFIG);
    let config = AppConfig::load(Some(path.as_path())).unwrap();
    let catalog = InMemoryExperimentCatalog::from_definitions(&config.experiments).unwrap();

    let ctx = Context::new();
    let picks: Vec<_> = (0..6)
        .map(|_| catalog.pick_for("button-color", &ctx).unwrap())
        .collect();

    assert_eq!(
        picks,
        vec![
            Some(json!("green")),
            Some(json!("red")),
            Some(json!("green")),
            Some(json!("green")),
            Some(json!("red")),
            Some(json!("green")),
        ]
    );
}

#[test]
fn nested_definition_respects_both_targeting_layers() {
    let (_dir, path) = write_config(CONFIG);
    let config = AppConfig::load(Some(path.as_path())).unwrap();
    let catalog = InMemoryExperimentCatalog::from_definitions(&config.experiments).unwrap();

    let us = Context::new().with("geo", "us").with("page", "buy");
    let mx = Context::new().with("geo", "mx").with("page", "buy");
    let browsing = Context::new().with("geo", "us").with("page", "index");

    assert_eq!(catalog.pick_for("checkout", &browsing).unwrap(), None);
    assert_eq!(catalog.pick_for("checkout", &us).unwrap(), Some(json!("a")));
    assert_eq!(catalog.pick_for("checkout", &mx).unwrap(), Some(json!("c")));
    assert_eq!(catalog.pick_for("checkout", &mx).unwrap(), None);
}

#[test]
fn simulation_over_configured_traffic() {
    let (_dir, path) = write_config(CONFIG);
    let config = AppConfig::load(Some(path.as_path())).unwrap();
    let catalog = InMemoryExperimentCatalog::from_definitions(&config.experiments).unwrap();
    let experiment = catalog.get("button-color").unwrap();

    let traffic = RoundRobinTraffic::new(config.simulation.traffic.clone());
    let report = Simulator::new(traffic)
        .run(&experiment, config.simulation.size)
        .unwrap();

    assert_eq!(report.size, 12);
    assert_eq!(report.unassigned, 0);
    assert_eq!(report.count_of(r#""green""#), 8);
    assert_eq!(report.count_of(r#""red""#), 4);
    assert_eq!(report.counts[0].variation, r#""green""#);
}

#[test]
fn invalid_definition_names_the_experiment() {
    let (_dir, path) = write_config(
        r#"
[experiments.broken]
variations = [{ object = "x", weight = -1 }]
"#,
    );
    let config = AppConfig::load(Some(path.as_path())).unwrap();
    let error = InMemoryExperimentCatalog::from_definitions(&config.experiments).unwrap_err();

    assert!(error.to_string().contains("'broken'"));
}

#[test]
fn targeting_and_traffic_keys_keep_their_case() {
    let (_dir, path) = write_config(
        r#"
[simulation]
traffic = [
    { pageType = "buy", Geo = "US" },
    { pageType = "home", Geo = "US" },
]

[experiments.bannerTest]
targeting = { pageType = "buy", Geo = "US" }
variations = ["wide", "narrow"]
"#,
    );
    let config = AppConfig::load(Some(path.as_path())).unwrap();

    assert_eq!(
        config.simulation.traffic[0],
        Context::new().with("pageType", "buy").with("Geo", "US")
    );
    assert_eq!(
        config.experiments["bannerTest"].targeting,
        Some(json!({"pageType": "buy", "Geo": "US"}))
    );

    let catalog = InMemoryExperimentCatalog::from_definitions(&config.experiments).unwrap();
    let buyer = Context::new().with("pageType", "buy").with("Geo", "US");
    let lowercased = Context::new().with("pagetype", "buy").with("geo", "US");

    assert_eq!(catalog.pick_for("bannerTest", &buyer).unwrap(), Some(json!("wide")));
    assert_eq!(catalog.pick_for("bannerTest", &lowercased).unwrap(), None);

    let experiment = catalog.get("bannerTest").unwrap();
    let report = Simulator::new(RoundRobinTraffic::new(config.simulation.traffic.clone()))
        .run(&experiment, 4)
        .unwrap();
    assert_eq!(report.unassigned, 2);
    assert_eq!(report.count_of(r#""narrow""#), 1);
    assert_eq!(report.count_of(r#""wide""#), 1);
}

#[test]
fn json_config_keeps_key_case() {
    let (_dir, path) = write_config_as(
        "picker.json",
        r#"{
            "experiments": {
                "checkout": {
                    "targeting": {"userTier": "gold"},
                    "variations": ["a"]
                }
            }
        }"#,
    );
    let config = AppConfig::load(Some(path.as_path())).unwrap();
    let catalog = InMemoryExperimentCatalog::from_definitions(&config.experiments).unwrap();

    let gold = Context::new().with("userTier", "gold");
    assert_eq!(catalog.pick_for("checkout", &gold).unwrap(), Some(json!("a")));
}

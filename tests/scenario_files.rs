//! ---
//! ems_section: "15-testing-qa-runbook"
//! ems_subsection: "integration-tests"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Integration and validation tests for the GridSim stack."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;

use gridsim_common::{init_tracing, GridSimConfig, LogFormat, LoggingConfig};
use gridsim_core::{
    preset_catalog, Circuit, ComponentKind, GridSimError, LoadType, QueryResult, Scenario,
    SourceType,
};

const CAMPUS: &str = r#"
[source]
type = "MVSUB"
params = { kV = 13.8 }

[[loads]]
type = "commercial"
count = 2

[[loads]]
type = "industrial"
params = { kV = 4.16, kW = 400 }

[[generators]]
type = "small"

[[lines]]
type = "mv"
connections = [["source", "load0"], ["source", "load1"], ["source", "load2"]]

[[transformers]]
connections = [["load2", "generator0"]]
params = { kVA = 500 }

[[pv]]
loads = ["load0", "load1"]
num_panels = 12

[results]
queries = ["Voltages", "Losses", "TotalPower"]
export_path = "out/campus.json"
"#;

#[test]
fn campus_scenario_runs_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    init_tracing(
        "gridsim-tests",
        &LoggingConfig {
            directory: dir.path().join("logs"),
            format: LogFormat::StructuredJson,
            file_prefix: Some("scenario".into()),
        },
    )
    .unwrap();

    let export = dir.path().join("out").join("campus.json");
    let document = CAMPUS.replace("out/campus.json", &export.display().to_string().replace('\\', "/"));
    let scenario_path = dir.path().join("campus.toml");
    fs::write(&scenario_path, document).unwrap();

    let config_path = dir.path().join("gridsim.toml");
    fs::write(
        &config_path,
        "[simulation]\nrandom_seed = 17\ncircuit_name = \"campus\"\n",
    )
    .unwrap();
    let config = GridSimConfig::from_path(&config_path).unwrap();

    let scenario = Scenario::from_path(&scenario_path).unwrap();
    let mut circuit = Circuit::with_config(&config).unwrap();
    let report = circuit.build_scenario(&scenario).unwrap();
    assert_eq!(report.loads.len(), 3);
    assert_eq!(report.generators.len(), 1);
    assert_eq!(report.transformers.len(), 1);
    assert_eq!(report.pv.len(), 2);
    assert_eq!(circuit.view(ComponentKind::Transformer).len(), 4);

    circuit.solve().unwrap();
    let results = circuit
        .results(&scenario.results.queries, scenario.results.export_path.as_deref())
        .unwrap();
    let voltages = results.get("Voltages").and_then(QueryResult::voltages).unwrap();
    assert_eq!(voltages.len(), 5);
    assert!(voltages["source"] > 0.0);

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
    assert!(exported["TotalPower"]["Active Power"].is_number());
    assert_eq!(exported["Voltages"].as_object().unwrap().len(), 5);
}

#[test]
fn scenario_errors_leave_earlier_sections_in_place() {
    let scenario: Scenario = r#"
[source]
type = "hvsub"

[[loads]]
count = 2

[[lines]]
connections = [["source", "load5"]]
"#
    .parse()
    .unwrap();

    let mut circuit = Circuit::new().unwrap();
    let err = circuit.build_scenario(&scenario).unwrap_err();
    assert!(matches!(err, GridSimError::UnknownEndpoint(ref id) if id == "load5"));
    assert_eq!(circuit.view(ComponentKind::Load).len(), 2);
    assert!(circuit.view(ComponentKind::Line).is_empty());
}

#[test]
fn catalog_describes_every_preset() {
    let loads = preset_catalog::<LoadType>(true);
    assert_eq!(loads.len(), 3);
    let json = serde_json::to_value(&loads).unwrap();
    assert_eq!(json[2]["name"], "industrial");
    assert_eq!(json[2]["nominals"]["kW"], serde_json::json!([200.0, 1000.0]));

    let sources = preset_catalog::<SourceType>(false);
    assert!(sources.iter().any(|entry| entry.name == "shvsub"));
}

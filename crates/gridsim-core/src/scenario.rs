//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Declarative circuit descriptions loaded from TOML or JSON.
//!
//! ```toml
//! [source]
//! type = "hvsub"
//! params = { kV = 100 }
//!
//! [[loads]]
//! type = "house"
//! count = 2
//!
//! [[lines]]
//! type = "mv"
//! connections = [["source", "load0"], ["source", "load1"]]
//!
//! [results]
//! queries = ["Voltages", "Losses"]
//! ```
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gridsim_engine::ElementSink;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    circuit::Circuit,
    components::LineLink,
    errors::{GridSimError, Result},
    naming::Identifier,
    params::ParameterOverrides,
    presets::{parse_preset, GeneratorType, LineType, LoadType, SourceType},
    results::SimulationResults,
};

fn default_source_type() -> String {
    SourceType::default().to_string()
}

fn default_load_type() -> String {
    LoadType::default().to_string()
}

fn default_generator_type() -> String {
    GeneratorType::default().to_string()
}

fn default_line_type() -> String {
    LineType::default().to_string()
}

fn default_count() -> usize {
    1
}

fn default_num_panels() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_queries() -> Vec<String> {
    vec![
        "Voltages".to_owned(),
        "Losses".to_owned(),
        "TotalPower".to_owned(),
    ]
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub source: Option<SourceSection>,
    #[serde(default)]
    pub loads: Vec<LoadSection>,
    #[serde(default)]
    pub generators: Vec<GeneratorSection>,
    #[serde(default)]
    pub lines: Vec<LineSection>,
    #[serde(default)]
    pub transformers: Vec<TransformerSection>,
    #[serde(default)]
    pub pv: Vec<PvSection>,
    #[serde(default)]
    pub results: ResultsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,
    #[serde(default)]
    pub params: ParameterOverrides,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadSection {
    #[serde(rename = "type", default = "default_load_type")]
    pub load_type: String,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub params: ParameterOverrides,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSection {
    #[serde(rename = "type", default = "default_generator_type")]
    pub gen_type: String,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub params: ParameterOverrides,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineSection {
    #[serde(rename = "type", default = "default_line_type")]
    pub line_type: String,
    pub connections: Vec<(String, String)>,
    #[serde(default = "default_true")]
    pub transformer: bool,
    #[serde(default)]
    pub params: ParameterOverrides,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformerSection {
    pub connections: Vec<(String, String)>,
    #[serde(default)]
    pub params: ParameterOverrides,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PvSection {
    pub loads: Vec<String>,
    #[serde(default = "default_num_panels")]
    pub num_panels: u32,
    #[serde(default)]
    pub params: ParameterOverrides,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultsSection {
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,
    #[serde(default)]
    pub export_path: Option<PathBuf>,
}

impl Default for ResultsSection {
    fn default() -> Self {
        Self {
            queries: default_queries(),
            export_path: None,
        }
    }
}

impl Scenario {
    /// Reads a scenario; `.json` files are parsed as JSON, anything else as
    /// TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|err| GridSimError::Scenario(err.to_string())),
            _ => content.parse(),
        }
    }
}

impl FromStr for Scenario {
    type Err = GridSimError;

    fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| GridSimError::Scenario(err.to_string()))
    }
}

/// Identifiers created by [`Circuit::build_scenario`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub source: Option<Identifier>,
    pub loads: Vec<Identifier>,
    pub generators: Vec<Identifier>,
    pub lines: Vec<LineLink>,
    pub transformers: Vec<Identifier>,
    pub pv: Vec<Identifier>,
}

impl<E: ElementSink> Circuit<E> {
    /// Adds every component of `scenario` in dependency order: source,
    /// loads, generators, lines, transformers, PV.
    pub fn build_scenario(&mut self, scenario: &Scenario) -> Result<ScenarioReport> {
        let mut report = ScenarioReport::default();
        if let Some(source) = &scenario.source {
            let source_type = parse_preset::<SourceType>(&source.source_type)?;
            report.source = Some(self.update_source(source_type, &source.params)?);
        }
        for section in &scenario.loads {
            let load_type = parse_preset::<LoadType>(&section.load_type)?;
            report
                .loads
                .extend(self.add_load_nodes(load_type, &section.params, section.count)?);
        }
        for section in &scenario.generators {
            let gen_type = parse_preset::<GeneratorType>(&section.gen_type)?;
            report
                .generators
                .extend(self.add_generators(section.count, gen_type, &section.params)?);
        }
        for section in &scenario.lines {
            let line_type = parse_preset::<LineType>(&section.line_type)?;
            report.lines.extend(self.add_lines(
                &section.connections,
                line_type,
                &section.params,
                section.transformer,
            )?);
        }
        for section in &scenario.transformers {
            report
                .transformers
                .extend(self.add_transformers(&section.connections, &section.params)?);
        }
        for section in &scenario.pv {
            report
                .pv
                .extend(self.add_pv_systems(&section.loads, &section.params, section.num_panels)?);
        }
        info!(
            loads = report.loads.len(),
            generators = report.generators.len(),
            lines = report.lines.len(),
            pv = report.pv.len(),
            "built scenario"
        );
        Ok(report)
    }

    /// Builds, solves and queries `scenario`, exporting when it names a path.
    pub fn run_scenario(&mut self, scenario: &Scenario) -> Result<SimulationResults> {
        self.build_scenario(scenario)?;
        self.solve()?;
        self.results(
            &scenario.results.queries,
            scenario.results.export_path.as_deref(),
        )
    }
}

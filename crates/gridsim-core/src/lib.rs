//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Circuit builder for distribution-grid power-flow studies.
//!
//! A [`Circuit`] assembles sources, loads, lines, transformers, generators
//! and PV systems from named presets or explicit overrides, hands them to an
//! [`ElementSink`](gridsim_engine::ElementSink) and shapes the solved state
//! into [`SimulationResults`].
//!
//! ```no_run
//! use gridsim_core::{Circuit, LineType, LoadType, ParameterOverrides, SourceType};
//!
//! # fn main() -> gridsim_core::Result<()> {
//! let mut circuit = Circuit::new()?;
//! circuit.update_source(SourceType::MvSubstation, &ParameterOverrides::new())?;
//! circuit.add_load_nodes(LoadType::House, &ParameterOverrides::new(), 3)?;
//! circuit.add_lines(&[("source", "load0")], LineType::Lv, &ParameterOverrides::new(), true)?;
//! circuit.solve()?;
//! let results = circuit.results(&["Voltages", "Losses"], None)?;
//! # let _ = results;
//! # Ok(())
//! # }
//! ```

pub mod circuit;
pub mod components;
pub mod defaults;
pub mod errors;
pub mod naming;
pub mod params;
pub mod presets;
pub mod results;
pub mod scenario;

pub use circuit::{Circuit, DEFAULT_CIRCUIT_NAME};
pub use components::{Endpoint, LineLink};
pub use errors::{GridSimError, Result};
pub use naming::{ComponentKind, Identifier, NameRegistry};
pub use params::{ParameterOverrides, ResolvedAttributes};
pub use presets::{
    parse_preset, preset_catalog, ComponentPreset, GeneratorType, LineType, LoadType, Nominal,
    PresetDescription, SourceType,
};
pub use results::{QueryKind, QueryResult, SimulationResults};
pub use scenario::{Scenario, ScenarioReport};

//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Steady-state power-flow engine and element model."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Solver-side collaborators for the circuit builder: the element declarations
//! a power-flow engine accepts, the [`ElementSink`] seam the builder talks to,
//! and [`NodalEngine`], an in-process implementation of that seam.
pub mod errors;
pub mod load_flow;
pub mod model;
pub mod sink;

pub use errors::{EngineError, Result};
pub use load_flow::{EngineSettings, NodalEngine};
pub use model::{
    Element, ElementClass, GeneratorSpec, LineSpec, LoadSpec, PvSystemSpec, TransformerSpec,
    VsourceSpec, WindingConnection,
};
pub use nalgebra::Complex;
pub use sink::ElementSink;

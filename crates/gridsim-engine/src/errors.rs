//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Steady-state power-flow engine and element model."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use thiserror::Error;

use crate::model::ElementClass;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("no active circuit; create one before defining elements")]
    NoCircuit,
    #[error("circuit has no voltage source to act as slack")]
    MissingSource,
    #[error("{class}.{name}: property {property} cannot be {value}")]
    InvalidProperty {
        class: ElementClass,
        name: String,
        property: &'static str,
        value: f64,
    },
    #[error("circuit has not been solved since its last modification")]
    NotSolved,
    #[error("nodal admittance matrix is singular")]
    SingularSystem,
    #[error("power flow did not converge after {iterations} iterations")]
    DidNotConverge { iterations: usize },
}

//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the circuit builder."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the GridSim workspace.
//! This crate exposes configuration loading and tracing initialisation
//! consumed by the engine and circuit builder crates.

pub mod config;
pub mod logging;

pub use config::{
    GridSimConfig, LoadedGridSimConfig, LoggingConfig, SimulationConfig, SolverConfig,
};
pub use logging::{init_tracing, LogFormat};

//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Nominal values for every preset plus the fixed defaults applied when a
//! caller does not override them.
//!
//! Units: kV, kW, kvar, km, ohm. Two-element arrays are `[low, high]`
//! ranges sampled uniformly.

pub const PHASES: u32 = 1;
pub const FREQUENCY_HZ: f64 = 60.0;

// Loads
pub const HOUSE_KV: [f64; 2] = [0.12, 0.24];
pub const HOUSE_KW: [f64; 2] = [1.0, 1.4];
pub const HOUSE_KVAR: f64 = 0.6;

pub const COMMERCIAL_KV: [f64; 2] = [0.24, 0.48];
pub const COMMERCIAL_KW: [f64; 2] = [10.0, 50.0];
pub const COMMERCIAL_KVAR: [f64; 2] = [5.0, 15.0];

pub const INDUSTRIAL_KV: [f64; 2] = [4.16, 13.8];
pub const INDUSTRIAL_KW: [f64; 2] = [200.0, 1000.0];
pub const INDUSTRIAL_KVAR: [f64; 2] = [50.0, 300.0];

pub const LOAD_SHAPE: &str = "default";

// Sources
pub const TURBINE_BASE_KV: [f64; 2] = [0.55, 0.7];
pub const POWER_PLANT_KV: [f64; 2] = [13.8, 25.0];
pub const LV_SUBSTATION_BASE_KV: [f64; 2] = [0.208, 0.48];
pub const MV_SUBSTATION_BASE_KV: [f64; 2] = [4.16, 34.5];
pub const HV_SUBSTATION_BASE_KV: [f64; 2] = [69.0, 230.0];
pub const SHV_SUBSTATION_BASE_KV: [f64; 2] = [345.0, 765.0];

/// Shared default for the source's R0, R1, X0 and X1.
pub const SOURCE_IMPEDANCE_OHM: f64 = 0.0001;
pub const SOURCE_PU: f64 = 1.0;

// Lines
pub const LV_LINE_LENGTH: [f64; 2] = [0.05, 0.3];
pub const MV_LINE_LENGTH: [f64; 2] = [1.0, 10.0];
pub const HV_LINE_LENGTH: [f64; 2] = [10.0, 50.0];

pub const LINE_R1_OHM_PER_KM: f64 = 0.1903;
pub const LINE_X1_OHM_PER_KM: f64 = 0.3957;

// Transformers
pub const NUM_WINDINGS: usize = 2;
pub const XHL_PCT: f64 = 7.0;
pub const TRANSFORMER_R_PCT: f64 = 0.4;
pub const TRANSFORMER_KVA: f64 = 1000.0;

// Generators
pub const SMALL_GEN_KV: [f64; 2] = [0.2, 0.6];
pub const SMALL_GEN_KW: [f64; 2] = [2.0, 5.0];
pub const LARGE_GEN_KV: [f64; 2] = [1.0, 35.0];
pub const LARGE_GEN_KW: [f64; 2] = [5.0, 50.0];
pub const INDUSTRIAL_GEN_KV: [f64; 2] = [35.0, 100.0];
pub const INDUSTRIAL_GEN_KW: [f64; 2] = [50.0, 500.0];
pub const GENERATOR_PF: f64 = 0.88;

// PV, per panel
pub const SOLAR_PANEL_BASE_KV: [f64; 2] = [0.03, 0.04];
pub const SOLAR_PANEL_PMPP_KW: [f64; 2] = [0.3, 0.4];
pub const PV_IRRADIANCE: f64 = 1.0;

//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Steady-state power-flow engine and element model."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Declarations accepted by an [`ElementSink`](crate::sink::ElementSink).
//!
//! Every element is addressed by its class and a name that is unique within
//! that class. Voltages are in kV, powers in kW/kvar/kVA, lengths in km and
//! impedances in ohms unless a field name says otherwise.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::errors::{EngineError, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum ElementClass {
    Vsource,
    Load,
    Line,
    Transformer,
    Generator,
    #[strum(serialize = "PVSystem")]
    PvSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum Element {
    Vsource(VsourceSpec),
    Load(LoadSpec),
    Line(LineSpec),
    Transformer(TransformerSpec),
    Generator(GeneratorSpec),
    PvSystem(PvSystemSpec),
}

impl Element {
    pub fn class(&self) -> ElementClass {
        match self {
            Element::Vsource(_) => ElementClass::Vsource,
            Element::Load(_) => ElementClass::Load,
            Element::Line(_) => ElementClass::Line,
            Element::Transformer(_) => ElementClass::Transformer,
            Element::Generator(_) => ElementClass::Generator,
            Element::PvSystem(_) => ElementClass::PvSystem,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Element::Vsource(spec) => &spec.name,
            Element::Load(spec) => &spec.name,
            Element::Line(spec) => &spec.name,
            Element::Transformer(spec) => &spec.name,
            Element::Generator(spec) => &spec.name,
            Element::PvSystem(spec) => &spec.name,
        }
    }

    /// Buses this element touches, in terminal order.
    pub fn buses(&self) -> Vec<&str> {
        match self {
            Element::Vsource(spec) => vec![spec.bus1.as_str()],
            Element::Load(spec) => vec![spec.bus1.as_str()],
            Element::Line(spec) => vec![spec.bus1.as_str(), spec.bus2.as_str()],
            Element::Transformer(spec) => spec.buses.iter().map(String::as_str).collect(),
            Element::Generator(spec) => vec![spec.bus1.as_str()],
            Element::PvSystem(spec) => vec![spec.bus1.as_str()],
        }
    }

    /// Rejects property values the engine cannot model.
    pub fn validate(&self) -> Result<()> {
        let class = self.class();
        let name = self.name();
        let check = |property: &'static str, value: f64, ok: bool| -> Result<()> {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(EngineError::InvalidProperty {
                    class,
                    name: name.to_owned(),
                    property,
                    value,
                })
            }
        };
        let phases = |phases: u32| check("phases", f64::from(phases), phases > 0);

        match self {
            Element::Vsource(spec) => {
                phases(spec.phases)?;
                check("basekv", spec.base_kv, spec.base_kv >= 0.0)?;
                check("pu", spec.pu, spec.pu >= 0.0)?;
                check("frequency", spec.frequency, spec.frequency > 0.0)?;
                check("r1", spec.r1, spec.r1 >= 0.0)?;
                check("x1", spec.x1, true)?;
            }
            Element::Load(spec) => {
                phases(spec.phases)?;
                check("kv", spec.kv, spec.kv >= 0.0)?;
                check("kw", spec.kw, true)?;
                check("kvar", spec.kvar, true)?;
            }
            Element::Line(spec) => {
                phases(spec.phases)?;
                check("length", spec.length_km, spec.length_km >= 0.0)?;
                check("r1", spec.r1_per_km, spec.r1_per_km >= 0.0)?;
                check("x1", spec.x1_per_km, true)?;
            }
            Element::Transformer(spec) => {
                phases(spec.phases)?;
                for kv in spec.kvs {
                    check("kv", kv, kv > 0.0)?;
                }
                check("kva", spec.kva, spec.kva > 0.0)?;
                check("xhl", spec.xhl_pct, spec.xhl_pct >= 0.0)?;
                check("%r", spec.r_pct, spec.r_pct >= 0.0)?;
            }
            Element::Generator(spec) => {
                phases(spec.phases)?;
                check("kv", spec.kv, spec.kv >= 0.0)?;
                check("kw", spec.kw, true)?;
                check("pf", spec.pf, spec.pf > 0.0 && spec.pf <= 1.0)?;
            }
            Element::PvSystem(spec) => {
                phases(spec.phases)?;
                check("kv", spec.kv, spec.kv >= 0.0)?;
                check("pmpp", spec.pmpp_kw, spec.pmpp_kw >= 0.0)?;
                check("kva", spec.kva, spec.kva >= 0.0)?;
                check("irradiance", spec.irradiance, spec.irradiance >= 0.0)?;
            }
        }
        Ok(())
    }
}

/// Ideal voltage source behind a series impedance; the circuit's slack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsourceSpec {
    pub name: String,
    pub bus1: String,
    pub phases: u32,
    pub base_kv: f64,
    pub pu: f64,
    pub frequency: f64,
    pub r0: f64,
    pub r1: f64,
    pub x0: f64,
    pub x1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSpec {
    pub name: String,
    pub bus1: String,
    pub phases: u32,
    pub kv: f64,
    pub kw: f64,
    pub kvar: f64,
    /// Name of the daily load shape; snapshot solves ignore it.
    #[serde(default)]
    pub daily: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub name: String,
    pub bus1: String,
    pub bus2: String,
    pub phases: u32,
    pub length_km: f64,
    pub r1_per_km: f64,
    pub x1_per_km: f64,
}

impl LineSpec {
    /// Positive-sequence series impedance `(R, X)` in ohms.
    pub fn impedance(&self) -> (f64, f64) {
        (
            self.r1_per_km * self.length_km,
            self.x1_per_km * self.length_km,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WindingConnection {
    Wye,
    Delta,
}

/// Two-winding transformer. Index 0 is the primary (high side by convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerSpec {
    pub name: String,
    pub phases: u32,
    pub buses: [String; 2],
    pub kvs: [f64; 2],
    pub conns: [WindingConnection; 2],
    /// Rating shared by both windings.
    pub kva: f64,
    /// Leakage reactance in percent on the rating base.
    pub xhl_pct: f64,
    /// Total winding resistance in percent on the rating base.
    pub r_pct: f64,
}

impl TransformerSpec {
    /// Leakage impedance `(R, X)` in ohms referred to winding 2.
    pub fn leakage_impedance(&self) -> (f64, f64) {
        let z_base = self.kvs[1].powi(2) * 1000.0 / self.kva;
        (self.r_pct / 100.0 * z_base, self.xhl_pct / 100.0 * z_base)
    }

    pub fn turns_ratio(&self) -> f64 {
        self.kvs[0] / self.kvs[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSpec {
    pub name: String,
    pub bus1: String,
    pub phases: u32,
    pub kv: f64,
    pub kw: f64,
    pub pf: f64,
}

impl GeneratorSpec {
    pub fn kvar(&self) -> f64 {
        self.kw * self.pf.acos().tan()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvSystemSpec {
    pub name: String,
    pub bus1: String,
    pub phases: u32,
    pub kv: f64,
    pub pmpp_kw: f64,
    /// Inverter rating; output is clipped to it.
    pub kva: f64,
    /// Per-unit irradiance applied to `pmpp_kw`.
    pub irradiance: f64,
}

impl PvSystemSpec {
    pub fn output_kw(&self) -> f64 {
        (self.pmpp_kw * self.irradiance).min(self.kva)
    }
}

//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Synthesizers that turn presets and overrides into engine elements.
//!
//! Nothing in here touches an engine: each function either returns fully
//! validated elements or an error, so the caller can define them afterwards.
pub mod generator;
pub mod line;
pub mod load;
pub mod pv;
pub mod source;
pub mod transformer;

pub use line::LineLink;

use serde::Serialize;

use crate::naming::ComponentKind;

/// A component that can terminate a line or transformer, with the kV its
/// winding should be rated for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Endpoint {
    pub kind: ComponentKind,
    pub kv: f64,
}

impl Endpoint {
    pub fn new(kind: ComponentKind, kv: f64) -> Self {
        Self { kind, kv }
    }
}

/// One end of a connection: the bus name and what sits on it.
#[derive(Debug, Clone, Copy)]
pub struct Terminal<'a> {
    pub bus: &'a str,
    pub endpoint: Endpoint,
}

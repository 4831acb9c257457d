//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gridsim_engine::{Element, LoadSpec};
use rand::Rng;

use crate::{
    defaults::LOAD_SHAPE,
    errors::Result,
    naming::{ComponentKind, Identifier},
    params::{resolve, ParameterOverrides, LOAD_PARAMS},
    presets::{ComponentPreset, LoadType},
};

/// Builds a load sitting on its own bus, named after `id`.
pub fn synthesize<R: Rng + ?Sized>(
    id: &Identifier,
    load_type: LoadType,
    overrides: &ParameterOverrides,
    rng: &mut R,
) -> Result<Element> {
    let attrs = resolve(
        overrides,
        &load_type.nominals(),
        LOAD_PARAMS,
        ComponentKind::Load,
        rng,
    )?;
    Ok(Element::Load(LoadSpec {
        name: id.to_string(),
        bus1: id.to_string(),
        phases: attrs.phases(),
        kv: attrs.require("kV")?,
        kw: attrs.require("kW")?,
        kvar: attrs.require("kvar")?,
        daily: Some(LOAD_SHAPE.to_owned()),
    }))
}

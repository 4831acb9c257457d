//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gridsim_engine::{Element, VsourceSpec};
use rand::Rng;

use crate::{
    defaults::{FREQUENCY_HZ, SOURCE_IMPEDANCE_OHM, SOURCE_PU},
    errors::{GridSimError, Result},
    naming::{ComponentKind, Identifier},
    params::{resolve, ParameterOverrides, SOURCE_PARAMS},
    presets::{ComponentPreset, SourceType},
};

/// Builds the circuit's single voltage source on the `source` bus.
pub fn synthesize<R: Rng + ?Sized>(
    source_type: SourceType,
    overrides: &ParameterOverrides,
    rng: &mut R,
) -> Result<Element> {
    let attrs = resolve(
        overrides,
        &source_type.nominals(),
        SOURCE_PARAMS,
        ComponentKind::Source,
        rng,
    )?;
    let base_kv = attrs.require("kV")?;
    if base_kv < 0.0 {
        return Err(GridSimError::invalid_value("kV", base_kv));
    }
    let pu = attrs.get_or("pu", SOURCE_PU);
    if pu < 0.0 {
        return Err(GridSimError::invalid_value("pu", pu));
    }

    let id = Identifier::source().to_string();
    Ok(Element::Vsource(VsourceSpec {
        name: id.clone(),
        bus1: id,
        phases: attrs.phases(),
        base_kv,
        pu,
        frequency: attrs.get_or("frequency", FREQUENCY_HZ),
        r0: attrs.get_or("R0", SOURCE_IMPEDANCE_OHM),
        r1: attrs.get_or("R1", SOURCE_IMPEDANCE_OHM),
        x0: attrs.get_or("X0", SOURCE_IMPEDANCE_OHM),
        x1: attrs.get_or("X1", SOURCE_IMPEDANCE_OHM),
    }))
}

//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! PV systems attached to existing loads.
//!
//! Voltage and rated power are drawn per panel and multiplied by the panel
//! count; an explicit `kV` or `Pmpp` is taken as the total for the system.
use gridsim_engine::{Element, PvSystemSpec};
use rand::Rng;

use crate::{
    defaults::PV_IRRADIANCE,
    errors::{GridSimError, Result},
    naming::{ComponentKind, Identifier},
    params::{resolve, ParameterOverrides, PV_PARAMS},
    presets::{pv_panel_nominals, NominalTable},
};

fn system_nominals(num_panels: u32) -> NominalTable {
    let panels = f64::from(num_panels);
    pv_panel_nominals()
        .into_iter()
        .map(|(key, nominal)| (key, nominal.scaled(panels)))
        .collect()
}

/// Builds one PV system on `target_bus`.
pub fn synthesize<R: Rng + ?Sized>(
    id: &Identifier,
    target_bus: &str,
    overrides: &ParameterOverrides,
    num_panels: u32,
    rng: &mut R,
) -> Result<Element> {
    if num_panels == 0 {
        return Err(GridSimError::invalid_value("num_panels", 0.0));
    }
    let attrs = resolve(
        overrides,
        &system_nominals(num_panels),
        PV_PARAMS,
        ComponentKind::Pv,
        rng,
    )?;
    let kv = attrs.require("kV")?;
    if kv < 0.0 {
        return Err(GridSimError::invalid_value("kV", kv));
    }
    let pmpp_kw = attrs.require("Pmpp")?;
    let irradiance = attrs.get_or("irradiance", PV_IRRADIANCE);
    if irradiance < 0.0 {
        return Err(GridSimError::invalid_value("irradiance", irradiance));
    }

    Ok(Element::PvSystem(PvSystemSpec {
        name: id.to_string(),
        bus1: target_bus.to_owned(),
        phases: attrs.phases(),
        kv,
        pmpp_kw,
        kva: attrs.get_or("kVA", pmpp_kw),
        irradiance,
    }))
}

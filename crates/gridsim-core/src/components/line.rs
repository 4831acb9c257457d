//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gridsim_engine::{Element, LineSpec};
use rand::Rng;
use serde::Serialize;

use super::{transformer, Terminal};
use crate::{
    defaults::{LINE_R1_OHM_PER_KM, LINE_X1_OHM_PER_KM},
    errors::{GridSimError, Result},
    naming::{ComponentKind, Identifier},
    params::{resolve, ParameterOverrides, LINE_PARAMS},
    presets::{ComponentPreset, LineType},
};

/// Identifiers created for one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineLink {
    pub line: Identifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformer: Option<Identifier>,
}

/// Builds `line{seq}` and, if requested, `transformer{seq}` across the same
/// two buses.
pub fn synthesize<R: Rng + ?Sized>(
    seq: u32,
    from: Terminal<'_>,
    to: Terminal<'_>,
    line_type: LineType,
    overrides: &ParameterOverrides,
    with_transformer: bool,
    rng: &mut R,
) -> Result<(LineLink, Vec<Element>)> {
    let attrs = resolve(
        overrides,
        &line_type.nominals(),
        LINE_PARAMS,
        ComponentKind::Line,
        rng,
    )?;
    let length_km = attrs.require("length")?;
    if length_km < 0.0 {
        return Err(GridSimError::InvalidLength(length_km));
    }

    let line_id = Identifier::new(ComponentKind::Line, seq);
    let mut elements = vec![Element::Line(LineSpec {
        name: line_id.to_string(),
        bus1: from.bus.to_owned(),
        bus2: to.bus.to_owned(),
        phases: attrs.phases(),
        length_km,
        r1_per_km: attrs.get_or("R1", LINE_R1_OHM_PER_KM),
        x1_per_km: attrs.get_or("X1", LINE_X1_OHM_PER_KM),
    })];

    let transformer_id = if with_transformer {
        let id = Identifier::new(ComponentKind::Transformer, seq);
        elements.push(transformer::element(&id, from, to, &attrs)?);
        Some(id)
    } else {
        None
    };

    Ok((
        LineLink {
            line: line_id,
            transformer: transformer_id,
        },
        elements,
    ))
}

//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gridsim_engine::{Element, TransformerSpec, WindingConnection};
use rand::Rng;

use super::Terminal;
use crate::{
    defaults::{NUM_WINDINGS, TRANSFORMER_KVA, TRANSFORMER_R_PCT, XHL_PCT},
    errors::{GridSimError, Result},
    naming::{ComponentKind, Identifier},
    params::{resolve, ParameterOverrides, ResolvedAttributes, TRANSFORMER_PARAMS},
    presets::NominalTable,
};

const CONNECTIONS: [WindingConnection; NUM_WINDINGS] =
    [WindingConnection::Delta, WindingConnection::Wye];

/// Two-winding transformer between `from` and `to`, each winding rated at
/// its endpoint's kV.
pub fn element(
    id: &Identifier,
    from: Terminal<'_>,
    to: Terminal<'_>,
    attrs: &ResolvedAttributes,
) -> Result<Element> {
    for kv in [from.endpoint.kv, to.endpoint.kv] {
        if kv <= 0.0 {
            return Err(GridSimError::invalid_value("kV", kv));
        }
    }
    let kva = attrs.get_or("kVA", TRANSFORMER_KVA);
    if kva <= 0.0 {
        return Err(GridSimError::invalid_value("kVA", kva));
    }
    let xhl_pct = attrs.get_or("XHL", XHL_PCT);
    if xhl_pct < 0.0 {
        return Err(GridSimError::invalid_value("XHL", xhl_pct));
    }

    Ok(Element::Transformer(TransformerSpec {
        name: id.to_string(),
        phases: attrs.phases(),
        buses: [from.bus.to_owned(), to.bus.to_owned()],
        kvs: [from.endpoint.kv, to.endpoint.kv],
        conns: CONNECTIONS,
        kva,
        xhl_pct,
        r_pct: TRANSFORMER_R_PCT,
    }))
}

/// Standalone transformer; only `phases`, `XHL` and `kVA` may be overridden.
pub fn synthesize<R: Rng + ?Sized>(
    id: &Identifier,
    from: Terminal<'_>,
    to: Terminal<'_>,
    overrides: &ParameterOverrides,
    rng: &mut R,
) -> Result<Element> {
    let attrs = resolve(
        overrides,
        &NominalTable::new(),
        TRANSFORMER_PARAMS,
        ComponentKind::Transformer,
        rng,
    )?;
    element(id, from, to, &attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Endpoint;
    use rand::{rngs::StdRng, SeedableRng};

    fn terminals() -> (Terminal<'static>, Terminal<'static>) {
        (
            Terminal {
                bus: "source",
                endpoint: Endpoint::new(ComponentKind::Source, 100.0),
            },
            Terminal {
                bus: "load0",
                endpoint: Endpoint::new(ComponentKind::Load, 10.0),
            },
        )
    }

    #[test]
    fn windings_follow_endpoint_voltages() {
        let mut rng = StdRng::seed_from_u64(5);
        let (from, to) = terminals();
        let id = Identifier::new(ComponentKind::Transformer, 0);
        let Element::Transformer(spec) =
            synthesize(&id, from, to, &ParameterOverrides::new(), &mut rng).unwrap()
        else {
            panic!("expected a transformer");
        };
        assert_eq!(spec.kvs, [100.0, 10.0]);
        assert_eq!(spec.buses, ["source".to_owned(), "load0".to_owned()]);
        assert_eq!(spec.conns, [WindingConnection::Delta, WindingConnection::Wye]);
        assert_eq!(spec.xhl_pct, 7.0);
        assert_eq!(spec.kva, 1000.0);
        assert_eq!(spec.r_pct, 0.4);
    }

    #[test]
    fn line_only_keys_are_not_accepted() {
        let mut rng = StdRng::seed_from_u64(5);
        let (from, to) = terminals();
        let id = Identifier::new(ComponentKind::Transformer, 0);
        let overrides = ParameterOverrides::new().with("length", 2);
        let err = synthesize(&id, from, to, &overrides, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            GridSimError::UnsupportedParameter {
                kind: ComponentKind::Transformer,
                ..
            }
        ));
    }

    #[test]
    fn zero_rating_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let (from, to) = terminals();
        let id = Identifier::new(ComponentKind::Transformer, 0);
        let overrides = ParameterOverrides::new().with("kva", 0);
        let err = synthesize(&id, from, to, &overrides, &mut rng).unwrap_err();
        assert!(matches!(err, GridSimError::InvalidParameterValue { ref key, .. } if key == "kVA"));
    }
}

//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gridsim_engine::{Element, GeneratorSpec};
use rand::Rng;

use crate::{
    defaults::GENERATOR_PF,
    errors::{GridSimError, Result},
    naming::{ComponentKind, Identifier},
    params::{resolve, ParameterOverrides, GENERATOR_PARAMS},
    presets::{ComponentPreset, GeneratorType},
};

pub fn synthesize<R: Rng + ?Sized>(
    id: &Identifier,
    gen_type: GeneratorType,
    overrides: &ParameterOverrides,
    rng: &mut R,
) -> Result<Element> {
    let attrs = resolve(
        overrides,
        &gen_type.nominals(),
        GENERATOR_PARAMS,
        ComponentKind::Generator,
        rng,
    )?;
    let kv = attrs.require("kV")?;
    if kv < 0.0 {
        return Err(GridSimError::invalid_value("kV", kv));
    }
    let pf = attrs.get_or("pf", GENERATOR_PF);
    if pf <= 0.0 || pf > 1.0 {
        return Err(GridSimError::invalid_value("pf", pf));
    }

    Ok(Element::Generator(GeneratorSpec {
        name: id.to_string(),
        bus1: id.to_string(),
        phases: attrs.phases(),
        kv,
        kw: attrs.require("kW")?,
        pf,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn industrial_generator_uses_default_power_factor() {
        let mut rng = StdRng::seed_from_u64(21);
        let id = Identifier::new(ComponentKind::Generator, 1);
        let Element::Generator(spec) =
            synthesize(&id, GeneratorType::Industrial, &ParameterOverrides::new(), &mut rng)
                .unwrap()
        else {
            panic!("expected a generator");
        };
        assert_eq!(spec.bus1, "generator1");
        assert!((35.0..=100.0).contains(&spec.kv));
        assert!((50.0..=500.0).contains(&spec.kw));
        assert_eq!(spec.pf, 0.88);
    }

    #[test]
    fn power_factor_above_one_is_rejected() {
        let mut rng = StdRng::seed_from_u64(21);
        let id = Identifier::new(ComponentKind::Generator, 0);
        let overrides = ParameterOverrides::new().with("pf", 1.2);
        let err = synthesize(&id, GeneratorType::Small, &overrides, &mut rng).unwrap_err();
        assert!(matches!(err, GridSimError::InvalidParameterValue { ref key, .. } if key == "pf"));
    }
}

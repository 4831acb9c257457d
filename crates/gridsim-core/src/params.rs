//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Override validation and default filling for a single component.
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::{GridSimError, Result},
    naming::ComponentKind,
    presets::NominalTable,
};

pub const LOAD_PARAMS: &[&str] = &["kV", "kW", "kvar", "phases"];
pub const SOURCE_PARAMS: &[&str] = &["kV", "phases", "frequency", "pu", "R0", "R1", "X0", "X1"];
/// Line keys plus the keys forwarded to an auto-created transformer.
pub const LINE_PARAMS: &[&str] = &["length", "phases", "R1", "X1", "XHL", "kVA"];
pub const TRANSFORMER_PARAMS: &[&str] = &["phases", "XHL", "kVA"];
pub const GENERATOR_PARAMS: &[&str] = &["kV", "kW", "phases", "pf"];
pub const PV_PARAMS: &[&str] = &["kV", "phases", "Pmpp", "kVA", "irradiance"];

const NON_NEGATIVE: &[&str] = &["kV", "kW", "kVA", "Pmpp"];

/// Accepted override keys for `kind`.
pub fn whitelist(kind: ComponentKind) -> &'static [&'static str] {
    match kind {
        ComponentKind::Load => LOAD_PARAMS,
        ComponentKind::Source => SOURCE_PARAMS,
        ComponentKind::Line => LINE_PARAMS,
        ComponentKind::Transformer => TRANSFORMER_PARAMS,
        ComponentKind::Generator => GENERATOR_PARAMS,
        ComponentKind::Pv => PV_PARAMS,
    }
}

/// Caller supplied attribute values for one call.
///
/// Values are kept as JSON so that overrides read from a scenario file can
/// carry anything; the resolver rejects what is not a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterOverrides(IndexMap<String, Value>);

impl ParameterOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterOverrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Fully resolved attribute values keyed by their canonical names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAttributes {
    values: IndexMap<&'static str, f64>,
    overridden: Vec<&'static str>,
}

impl ResolvedAttributes {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Value of an attribute the kind config guarantees.
    pub fn require(&self, key: &'static str) -> Result<f64> {
        self.get(key)
            .ok_or_else(|| GridSimError::MissingAttribute(key.to_owned()))
    }

    /// True if the caller supplied `key` rather than it being drawn.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.overridden.iter().any(|k| *k == key)
    }

    /// `phases` as an integer, 1 when absent.
    pub fn phases(&self) -> u32 {
        self.get("phases").map(|p| p as u32).unwrap_or(crate::defaults::PHASES)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().map(|(key, value)| (*key, *value))
    }
}

fn canonical_key(key: &str, whitelist: &[&'static str]) -> Option<&'static str> {
    whitelist
        .iter()
        .copied()
        .find(|allowed| allowed.eq_ignore_ascii_case(key.trim()))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_owned(),
        Value::Object(_) => "object".to_owned(),
        Value::Number(n) => n.to_string(),
    }
}

/// Validates overrides against `whitelist` and fills everything else from
/// `nominals`, drawing ranges with `rng`.
///
/// Checks run over every override before anything is sampled, in the order
/// key, type, domain.
pub fn resolve<R: Rng + ?Sized>(
    overrides: &ParameterOverrides,
    nominals: &NominalTable,
    whitelist: &[&'static str],
    kind: ComponentKind,
    rng: &mut R,
) -> Result<ResolvedAttributes> {
    let mut canonical = Vec::with_capacity(overrides.len());
    for (key, value) in overrides.iter() {
        let name = canonical_key(key, whitelist).ok_or_else(|| GridSimError::UnsupportedParameter {
            kind,
            key: key.to_owned(),
        })?;
        if canonical.iter().any(|(seen, _)| *seen == name) {
            return Err(GridSimError::DuplicateParameter {
                kind,
                key: key.to_owned(),
            });
        }
        canonical.push((name, value));
    }

    let mut resolved = ResolvedAttributes::default();
    for (name, value) in canonical {
        let number = value
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| GridSimError::InvalidParameterType {
                key: name.to_owned(),
                found: describe(value),
            })?;
        resolved.values.insert(name, number);
        resolved.overridden.push(name);
    }

    for (name, value) in resolved.iter() {
        if NON_NEGATIVE.contains(&name) && value < 0.0 {
            return Err(GridSimError::invalid_value(name, value));
        }
        if name == "phases" && (value < 1.0 || value.fract() != 0.0) {
            return Err(GridSimError::invalid_value(name, value));
        }
    }

    for (name, nominal) in nominals {
        if !resolved.values.contains_key(*name) {
            resolved.values.insert(*name, nominal.sample(rng));
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{ComponentPreset, LoadType, Nominal};
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    fn house() -> NominalTable {
        LoadType::House.nominals()
    }

    #[test]
    fn overrides_win_over_drawn_defaults() {
        let mut rng = StdRng::seed_from_u64(7);
        let overrides = ParameterOverrides::new().with("kV", 10).with("kW", 20.5);
        let resolved = resolve(&overrides, &house(), LOAD_PARAMS, ComponentKind::Load, &mut rng).unwrap();
        assert_eq!(resolved.get("kV"), Some(10.0));
        assert_eq!(resolved.get("kW"), Some(20.5));
        assert_eq!(resolved.get("kvar"), Some(0.6));
        assert!(resolved.is_overridden("kV"));
        assert!(!resolved.is_overridden("kvar"));
        assert_eq!(resolved.phases(), 1);
    }

    #[test]
    fn keys_match_case_insensitively_and_canonicalise() {
        let mut rng = StdRng::seed_from_u64(7);
        let overrides = ParameterOverrides::from_iter([("KVAR", 2.0), ("Phases", 3.0)]);
        let resolved = resolve(&overrides, &house(), LOAD_PARAMS, ComponentKind::Load, &mut rng).unwrap();
        assert_eq!(resolved.get("kvar"), Some(2.0));
        assert_eq!(resolved.phases(), 3);
    }

    #[test]
    fn keys_differing_only_in_case_are_duplicates() {
        let mut rng = StdRng::seed_from_u64(7);
        let overrides = ParameterOverrides::new().with("kV", 0.24).with("KV", 0.48);
        let err = resolve(&overrides, &house(), LOAD_PARAMS, ComponentKind::Load, &mut rng).unwrap_err();
        match err {
            GridSimError::DuplicateParameter { kind, key } => {
                assert_eq!(kind, ComponentKind::Load);
                assert_eq!(key, "KV");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_key_is_rejected_before_type_errors() {
        let mut rng = StdRng::seed_from_u64(7);
        let overrides = ParameterOverrides::new()
            .with("kV", "high")
            .with("badParam", 1.0);
        let err = resolve(&overrides, &house(), LOAD_PARAMS, ComponentKind::Load, &mut rng).unwrap_err();
        match err {
            GridSimError::UnsupportedParameter { kind, key } => {
                assert_eq!(kind, ComponentKind::Load);
                assert_eq!(key, "badParam");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_numeric_values_are_type_errors() {
        let mut rng = StdRng::seed_from_u64(7);
        let overrides = ParameterOverrides::new().with("kW", json!("lots"));
        let err = resolve(&overrides, &house(), LOAD_PARAMS, ComponentKind::Load, &mut rng).unwrap_err();
        assert!(matches!(err, GridSimError::InvalidParameterType { ref key, .. } if key == "kW"));
        assert!(err.to_string().contains("\"lots\""));
    }

    #[test]
    fn negative_voltage_and_fractional_phases_are_invalid() {
        let mut rng = StdRng::seed_from_u64(7);
        let negative = ParameterOverrides::new().with("kV", -1);
        let err = resolve(&negative, &house(), LOAD_PARAMS, ComponentKind::Load, &mut rng).unwrap_err();
        assert!(matches!(err, GridSimError::InvalidParameterValue { ref key, value } if key == "kV" && value == -1.0));

        let phases = ParameterOverrides::new().with("phases", 1.5);
        let err = resolve(&phases, &house(), LOAD_PARAMS, ComponentKind::Load, &mut rng).unwrap_err();
        assert!(matches!(err, GridSimError::InvalidParameterValue { .. }));
    }

    #[test]
    fn negative_length_passes_through_to_the_synthesizer() {
        let mut rng = StdRng::seed_from_u64(7);
        let nominals: NominalTable = [("length", Nominal::Range([1.0, 10.0]))].into_iter().collect();
        let overrides = ParameterOverrides::new().with("length", -100);
        let resolved = resolve(&overrides, &nominals, LINE_PARAMS, ComponentKind::Line, &mut rng).unwrap();
        assert_eq!(resolved.get("length"), Some(-100.0));
    }

    #[test]
    fn overrides_deserialize_from_json_objects() {
        let overrides: ParameterOverrides =
            serde_json::from_value(json!({"kV": 0.24, "kW": 3})).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides.iter().next().map(|(k, _)| k), Some("kV"));
    }
}

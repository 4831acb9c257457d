//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Named component presets and the lookup table of their nominal values.
//!
//! A preset enum only names a type; its numbers live in
//! [`ComponentPreset::nominals`], so the table can change without touching
//! the identity of a type.
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{
    defaults::*,
    errors::{GridSimError, Result},
    naming::ComponentKind,
};

/// Nominal value of one attribute: a fixed scalar or a `[low, high]` range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nominal {
    Scalar(f64),
    Range([f64; 2]),
}

impl Nominal {
    pub fn low(&self) -> f64 {
        match *self {
            Nominal::Scalar(value) => value,
            Nominal::Range([low, _]) => low,
        }
    }

    pub fn high(&self) -> f64 {
        match *self {
            Nominal::Scalar(value) => value,
            Nominal::Range([_, high]) => high,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low() && value <= self.high()
    }

    /// Draws a value: uniform over a range, the value itself for a scalar.
    ///
    /// Uniform sampling is a simplification; real load and voltage
    /// distributions are not uniform.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Nominal::Scalar(value) => value,
            Nominal::Range([low, high]) if low >= high => low,
            Nominal::Range([low, high]) => rng.gen_range(low..=high),
        }
    }

    pub fn scaled(&self, factor: f64) -> Nominal {
        match *self {
            Nominal::Scalar(value) => Nominal::Scalar(value * factor),
            Nominal::Range([low, high]) => Nominal::Range([low * factor, high * factor]),
        }
    }
}

impl From<f64> for Nominal {
    fn from(value: f64) -> Self {
        Nominal::Scalar(value)
    }
}

impl From<[f64; 2]> for Nominal {
    fn from(range: [f64; 2]) -> Self {
        Nominal::Range(range)
    }
}

/// Attribute name to nominal value for one preset.
pub type NominalTable = IndexMap<&'static str, Nominal>;

fn table<const N: usize>(entries: [(&'static str, Nominal); N]) -> NominalTable {
    entries.into_iter().collect()
}

/// A closed set of named types for one component kind.
pub trait ComponentPreset:
    Copy + fmt::Debug + fmt::Display + FromStr + IntoEnumIterator + 'static
{
    const KIND: ComponentKind;

    fn nominals(self) -> NominalTable;
}

/// Parses a preset name case-insensitively.
pub fn parse_preset<P: ComponentPreset>(name: &str) -> Result<P> {
    name.trim()
        .parse::<P>()
        .map_err(|_| GridSimError::UnknownPreset {
            kind: P::KIND,
            name: name.to_owned(),
        })
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LoadType {
    #[default]
    House,
    Commercial,
    Industrial,
}

impl ComponentPreset for LoadType {
    const KIND: ComponentKind = ComponentKind::Load;

    fn nominals(self) -> NominalTable {
        match self {
            LoadType::House => table([
                ("kV", HOUSE_KV.into()),
                ("kW", HOUSE_KW.into()),
                ("kvar", HOUSE_KVAR.into()),
            ]),
            LoadType::Commercial => table([
                ("kV", COMMERCIAL_KV.into()),
                ("kW", COMMERCIAL_KW.into()),
                ("kvar", COMMERCIAL_KVAR.into()),
            ]),
            LoadType::Industrial => table([
                ("kV", INDUSTRIAL_KV.into()),
                ("kW", INDUSTRIAL_KW.into()),
                ("kvar", INDUSTRIAL_KVAR.into()),
            ]),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum SourceType {
    #[default]
    #[serde(rename = "turbine")]
    #[strum(serialize = "turbine")]
    Turbine,
    #[serde(rename = "powerplant")]
    #[strum(serialize = "powerplant")]
    PowerPlant,
    #[serde(rename = "lvsub")]
    #[strum(serialize = "lvsub")]
    LvSubstation,
    #[serde(rename = "mvsub")]
    #[strum(serialize = "mvsub")]
    MvSubstation,
    #[serde(rename = "hvsub")]
    #[strum(serialize = "hvsub")]
    HvSubstation,
    #[serde(rename = "shvsub")]
    #[strum(serialize = "shvsub")]
    ShvSubstation,
}

impl ComponentPreset for SourceType {
    const KIND: ComponentKind = ComponentKind::Source;

    fn nominals(self) -> NominalTable {
        let kv = match self {
            SourceType::Turbine => TURBINE_BASE_KV,
            SourceType::PowerPlant => POWER_PLANT_KV,
            SourceType::LvSubstation => LV_SUBSTATION_BASE_KV,
            SourceType::MvSubstation => MV_SUBSTATION_BASE_KV,
            SourceType::HvSubstation => HV_SUBSTATION_BASE_KV,
            SourceType::ShvSubstation => SHV_SUBSTATION_BASE_KV,
        };
        table([("kV", kv.into())])
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LineType {
    #[default]
    Lv,
    Mv,
    Hv,
}

impl ComponentPreset for LineType {
    const KIND: ComponentKind = ComponentKind::Line;

    fn nominals(self) -> NominalTable {
        let length = match self {
            LineType::Lv => LV_LINE_LENGTH,
            LineType::Mv => MV_LINE_LENGTH,
            LineType::Hv => HV_LINE_LENGTH,
        };
        table([("length", length.into())])
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GeneratorType {
    #[default]
    Small,
    Large,
    Industrial,
}

impl ComponentPreset for GeneratorType {
    const KIND: ComponentKind = ComponentKind::Generator;

    fn nominals(self) -> NominalTable {
        match self {
            GeneratorType::Small => table([("kV", SMALL_GEN_KV.into()), ("kW", SMALL_GEN_KW.into())]),
            GeneratorType::Large => table([("kV", LARGE_GEN_KV.into()), ("kW", LARGE_GEN_KW.into())]),
            GeneratorType::Industrial => table([
                ("kV", INDUSTRIAL_GEN_KV.into()),
                ("kW", INDUSTRIAL_GEN_KW.into()),
            ]),
        }
    }
}

/// Per-panel nominal values for PV systems; scaled by the panel count.
pub fn pv_panel_nominals() -> NominalTable {
    table([
        ("kV", SOLAR_PANEL_BASE_KV.into()),
        ("Pmpp", SOLAR_PANEL_PMPP_KW.into()),
    ])
}

/// One entry of [`preset_catalog`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetDescription {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominals: Option<NominalTable>,
}

/// Lists every preset of `P`, optionally with its nominal values.
pub fn preset_catalog<P: ComponentPreset>(show_ranges: bool) -> Vec<PresetDescription> {
    P::iter()
        .map(|preset| PresetDescription {
            name: preset.to_string(),
            nominals: show_ranges.then(|| preset.nominals()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn assert_draws_in_range<P: ComponentPreset>(rng: &mut StdRng) {
        for preset in P::iter() {
            for (attribute, nominal) in preset.nominals() {
                assert!(nominal.low() <= nominal.high(), "{preset}.{attribute}");
                for _ in 0..1000 {
                    let value = nominal.sample(rng);
                    assert!(
                        nominal.contains(value),
                        "{preset}.{attribute} drew {value} outside {nominal:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn every_preset_draws_within_its_range() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        assert_draws_in_range::<LoadType>(&mut rng);
        assert_draws_in_range::<SourceType>(&mut rng);
        assert_draws_in_range::<LineType>(&mut rng);
        assert_draws_in_range::<GeneratorType>(&mut rng);
    }

    #[test]
    fn scalar_nominal_is_returned_verbatim() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Nominal::Scalar(0.6).sample(&mut rng), 0.6);
        assert_eq!(Nominal::Range([2.0, 2.0]).sample(&mut rng), 2.0);
    }

    #[test]
    fn preset_names_parse_case_insensitively() {
        assert_eq!(parse_preset::<LoadType>("House").unwrap(), LoadType::House);
        assert_eq!(
            parse_preset::<SourceType>("LVSUB").unwrap(),
            SourceType::LvSubstation
        );
        assert_eq!(parse_preset::<LineType>(" mv ").unwrap(), LineType::Mv);
        let err = parse_preset::<GeneratorType>("gigantic").unwrap_err();
        assert!(matches!(
            err,
            GridSimError::UnknownPreset {
                kind: ComponentKind::Generator,
                ..
            }
        ));
    }

    #[test]
    fn catalog_lists_names_and_optional_ranges() {
        let names = preset_catalog::<SourceType>(false);
        assert_eq!(
            names.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec!["turbine", "powerplant", "lvsub", "mvsub", "hvsub", "shvsub"]
        );
        assert!(names.iter().all(|d| d.nominals.is_none()));

        let detailed = preset_catalog::<LoadType>(true);
        let house = detailed[0].nominals.as_ref().unwrap();
        assert_eq!(house["kvar"], Nominal::Scalar(HOUSE_KVAR));
        let json = serde_json::to_value(&detailed[0]).unwrap();
        assert_eq!(json["nominals"]["kV"], serde_json::json!([0.12, 0.24]));
    }

    #[test]
    fn pv_nominals_scale_with_panel_count() {
        let scaled = pv_panel_nominals()["kV"].scaled(10.0);
        assert!((scaled.low() - 0.3).abs() < 1e-12);
        assert!((scaled.high() - 0.4).abs() < 1e-12);
    }
}

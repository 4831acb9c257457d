//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Translation of named result queries into engine calls, and JSON export.
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use gridsim_engine::ElementSink;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use strum::Display;
use tracing::debug;

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum QueryKind {
    Voltages,
    Losses,
    TotalPower,
}

impl QueryKind {
    /// Matches a query name ignoring ASCII case and whitespace.
    pub fn parse(query: &str) -> Option<Self> {
        let normalised: String = query
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalised.as_str() {
            "voltages" | "busvmag" => Some(QueryKind::Voltages),
            "losses" => Some(QueryKind::Losses),
            "totalpower" => Some(QueryKind::TotalPower),
            _ => None,
        }
    }
}

/// Answer to one query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Bus name to voltage magnitude in volts.
    Voltages(IndexMap<String, f64>),
    /// Series losses in W and var.
    Losses { active: f64, reactive: f64 },
    /// Power delivered by the source in kW and kvar.
    TotalPower { active: f64, reactive: f64 },
    /// The query name was not recognised.
    Invalid,
}

impl QueryResult {
    pub fn is_invalid(&self) -> bool {
        matches!(self, QueryResult::Invalid)
    }

    pub fn voltages(&self) -> Option<&IndexMap<String, f64>> {
        match self {
            QueryResult::Voltages(map) => Some(map),
            _ => None,
        }
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let pair = |serializer: S,
                    keys: [&str; 2],
                    values: [f64; 2]|
         -> std::result::Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(2))?;
            map.serialize_entry(keys[0], &values[0])?;
            map.serialize_entry(keys[1], &values[1])?;
            map.end()
        };
        match self {
            QueryResult::Voltages(map) => map.serialize(serializer),
            QueryResult::Losses { active, reactive } => pair(
                serializer,
                ["Active Power Loss", "Reactive Power Loss"],
                [*active, *reactive],
            ),
            QueryResult::TotalPower { active, reactive } => pair(
                serializer,
                ["Active Power", "Reactive Power"],
                [*active, *reactive],
            ),
            QueryResult::Invalid => serializer.serialize_str("Invalid"),
        }
    }
}

/// Answers one query against a solved engine.
///
/// Unknown query names yield [`QueryResult::Invalid`] instead of an error.
pub fn query<E: ElementSink + ?Sized>(
    engine: &E,
    name: &str,
    nicknames: &HashMap<String, String>,
) -> Result<QueryResult> {
    let Some(kind) = QueryKind::parse(name) else {
        debug!(query = name, "unrecognised result query");
        return Ok(QueryResult::Invalid);
    };
    let result = match kind {
        QueryKind::Voltages => {
            let names = engine.bus_names()?;
            let magnitudes = engine.bus_vmag()?;
            QueryResult::Voltages(
                names
                    .into_iter()
                    .zip(magnitudes)
                    .map(|(bus, vmag)| match nicknames.get(&bus) {
                        Some(nickname) => (format!("{bus} ({nickname})"), vmag),
                        None => (bus, vmag),
                    })
                    .collect(),
            )
        }
        QueryKind::Losses => {
            let losses = engine.losses()?;
            QueryResult::Losses {
                active: losses.re,
                reactive: losses.im,
            }
        }
        QueryKind::TotalPower => {
            let power = engine.total_power()?;
            QueryResult::TotalPower {
                active: power.re,
                reactive: power.im,
            }
        }
    };
    Ok(result)
}

/// Query name, as the caller spelled it, to its answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimulationResults(IndexMap<String, QueryResult>);

impl SimulationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: impl Into<String>, result: QueryResult) {
        self.0.insert(query.into(), result);
    }

    pub fn get(&self, query: &str) -> Option<&QueryResult> {
        self.0.get(query)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryResult)> {
        self.0.iter().map(|(query, result)| (query.as_str(), result))
    }

    /// Writes the results as indented JSON. An empty path is a no-op.
    pub fn export(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        debug!(path = %path.display(), queries = self.len(), "exported results");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_names_ignore_case_and_whitespace() {
        assert_eq!(QueryKind::parse("Voltages"), Some(QueryKind::Voltages));
        assert_eq!(QueryKind::parse("BusVMag"), Some(QueryKind::Voltages));
        assert_eq!(QueryKind::parse(" total Power "), Some(QueryKind::TotalPower));
        assert_eq!(QueryKind::parse("LOSSES"), Some(QueryKind::Losses));
        assert_eq!(QueryKind::parse("BadQuery"), None);
    }

    #[test]
    fn results_serialise_with_display_keys() {
        let mut results = SimulationResults::new();
        results.insert(
            "Voltages",
            QueryResult::Voltages([("source".to_owned(), 100_000.0)].into_iter().collect()),
        );
        results.insert(
            "Losses",
            QueryResult::Losses {
                active: 12.5,
                reactive: 30.0,
            },
        );
        results.insert(
            "TotalPower",
            QueryResult::TotalPower {
                active: 20.0,
                reactive: 1.0,
            },
        );
        results.insert("BadQuery", QueryResult::Invalid);

        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            json!({
                "Voltages": {"source": 100000.0},
                "Losses": {"Active Power Loss": 12.5, "Reactive Power Loss": 30.0},
                "TotalPower": {"Active Power": 20.0, "Reactive Power": 1.0},
                "BadQuery": "Invalid",
            })
        );
    }

    #[test]
    fn export_writes_pretty_json_and_skips_empty_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");
        let mut results = SimulationResults::new();
        results.insert("Oops", QueryResult::Invalid);

        results.export(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, json!({"Oops": "Invalid"}));

        results.export(Path::new("")).unwrap();
    }
}

//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumIter};

/// Kinds of components a circuit can contain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentKind {
    Load,
    Source,
    Line,
    Transformer,
    Generator,
    Pv,
}

impl ComponentKind {
    /// Canonical identifier prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            ComponentKind::Load => "load",
            ComponentKind::Source => "source",
            ComponentKind::Line => "line",
            ComponentKind::Transformer => "transformer",
            ComponentKind::Generator => "generator",
            ComponentKind::Pv => "pv",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "load" => ComponentKind::Load,
            "source" => ComponentKind::Source,
            "line" => ComponentKind::Line,
            "transformer" => ComponentKind::Transformer,
            "generator" => ComponentKind::Generator,
            "pv" => ComponentKind::Pv,
            _ => return None,
        })
    }
}

/// Name of a component within one circuit, e.g. `load3`.
///
/// The singleton source carries no sequence number and renders as `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    kind: ComponentKind,
    seq: Option<u32>,
}

impl Identifier {
    pub fn new(kind: ComponentKind, seq: u32) -> Self {
        Self {
            kind,
            seq: Some(seq),
        }
    }

    pub fn source() -> Self {
        Self {
            kind: ComponentKind::Source,
            seq: None,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn seq(&self) -> Option<u32> {
        self.seq
    }

    /// Parses `prefix` + digits (or the bare `source`).
    pub fn parse(name: &str) -> Option<Self> {
        let split = name
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(name.len());
        let (prefix, digits) = name.split_at(split);
        let kind = ComponentKind::from_prefix(prefix)?;
        if digits.is_empty() {
            return (kind == ComponentKind::Source).then(Identifier::source);
        }
        digits.parse().ok().map(|seq| Identifier::new(kind, seq))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seq {
            Some(seq) => write!(f, "{}{}", self.kind.prefix(), seq),
            None => f.write_str(self.kind.prefix()),
        }
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        Identifier::parse(other).as_ref() == Some(self)
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Per-kind monotonically increasing counters.
///
/// Counters only move forward; [`NameRegistry::reset_all`] is the single way
/// back to zero and belongs to the circuit's clear operation.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    counters: HashMap<ComponentKind, u32>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next identifier of `kind` will receive.
    pub fn peek(&self, kind: ComponentKind) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    pub fn next(&mut self, kind: ComponentKind) -> Identifier {
        let counter = self.counters.entry(kind).or_insert(0);
        let seq = *counter;
        *counter += 1;
        Identifier::new(kind, seq)
    }

    /// Hands out one sequence number valid for every kind in `kinds`.
    ///
    /// Used for a line and its paired transformer so both share the count.
    pub fn next_shared(&mut self, kinds: &[ComponentKind]) -> u32 {
        let seq = kinds.iter().map(|kind| self.peek(*kind)).max().unwrap_or(0);
        for kind in kinds {
            self.counters.insert(*kind, seq + 1);
        }
        seq
    }

    pub fn reset(&mut self, kind: ComponentKind) {
        self.counters.remove(&kind);
    }

    pub fn reset_all(&mut self) {
        self.counters.clear();
    }
}

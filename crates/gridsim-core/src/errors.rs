//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gridsim_engine::EngineError;
use thiserror::Error;

use crate::naming::ComponentKind;

pub type Result<T> = std::result::Result<T, GridSimError>;

#[derive(Debug, Error)]
pub enum GridSimError {
    #[error("parameter '{key}' is not supported for {kind} components")]
    UnsupportedParameter { kind: ComponentKind, key: String },
    #[error("parameter '{key}' is given more than once for {kind} components")]
    DuplicateParameter { kind: ComponentKind, key: String },
    #[error("parameter '{key}' must be numeric, got {found}")]
    InvalidParameterType { key: String, found: String },
    #[error("parameter '{key}' cannot be {value}")]
    InvalidParameterValue { key: String, value: f64 },
    #[error("attribute '{0}' has neither an override nor a nominal value")]
    MissingAttribute(String),
    #[error("line length cannot be negative (got {0} km)")]
    InvalidLength(f64),
    #[error("no component named '{0}' exists in this circuit")]
    UnknownEndpoint(String),
    #[error("PV systems need at least one target load")]
    EmptyTargetList,
    #[error("unknown {kind} type '{name}'")]
    UnknownPreset { kind: ComponentKind, name: String },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("scenario error: {0}")]
    Scenario(String),
}

impl GridSimError {
    pub(crate) fn invalid_value(key: impl Into<String>, value: f64) -> Self {
        GridSimError::InvalidParameterValue {
            key: key.into(),
            value,
        }
    }
}

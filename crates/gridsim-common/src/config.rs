//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the circuit builder."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_circuit_name() -> String {
    "gridsim".to_owned()
}

fn default_max_iterations() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_vmin_pu() -> f64 {
    0.95
}

fn default_vmax_pu() -> f64 {
    1.05
}

/// Primary configuration object for a circuit-building session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridSimConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Metadata describing where a [`GridSimConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedGridSimConfig {
    pub config: GridSimConfig,
    pub source: PathBuf,
}

impl GridSimConfig {
    pub const ENV_CONFIG_PATH: &'static str = "GRIDSIM_CONFIG";

    /// Load configuration from disk, respecting the `GRIDSIM_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedGridSimConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedGridSimConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedGridSimConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<GridSimConfig>()
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.solver.validate()?;
        if self.simulation.circuit_name.trim().is_empty() {
            return Err(anyhow!("simulation.circuit_name cannot be empty"));
        }
        Ok(())
    }
}

impl std::str::FromStr for GridSimConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: GridSimConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

/// Controls how randomized preset values are drawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for preset sampling. `None` draws a fresh seed from the OS.
    #[serde(default)]
    pub random_seed: Option<u64>,
    #[serde(default = "default_circuit_name")]
    pub circuit_name: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            circuit_name: default_circuit_name(),
        }
    }
}

/// Convergence settings handed to the power-flow engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Largest per-unit voltage update accepted as converged.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_vmin_pu")]
    pub vmin_pu: f64,
    #[serde(default = "default_vmax_pu")]
    pub vmax_pu: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            vmin_pu: default_vmin_pu(),
            vmax_pu: default_vmax_pu(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(anyhow!("solver.max_iterations must be greater than zero"));
        }
        if !(self.tolerance > 0.0) {
            return Err(anyhow!("solver.tolerance must be positive"));
        }
        if !(self.vmin_pu > 0.0 && self.vmin_pu < self.vmax_pu) {
            return Err(anyhow!(
                "solver voltage band [{}, {}] is invalid",
                self.vmin_pu,
                self.vmax_pu
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config: GridSimConfig = "".parse().unwrap();
        assert_eq!(config.solver.max_iterations, 100);
        assert_eq!(config.simulation.circuit_name, "gridsim");
        assert!(config.simulation.random_seed.is_none());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parses_overrides() {
        let config: GridSimConfig = r#"
            [simulation]
            random_seed = 7
            circuit_name = "feeder-a"

            [solver]
            max_iterations = 25
            vmin_pu = 0.9
            vmax_pu = 1.1

            [logging]
            format = "structured-json"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.simulation.random_seed, Some(7));
        assert_eq!(config.simulation.circuit_name, "feeder-a");
        assert_eq!(config.solver.max_iterations, 25);
        assert_eq!(config.solver.vmin_pu, 0.9);
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
    }

    #[test]
    fn rejects_inverted_voltage_band() {
        let err = r#"
            [solver]
            vmin_pu = 1.1
            vmax_pu = 0.9
        "#
        .parse::<GridSimConfig>()
        .unwrap_err();
        assert!(err.to_string().contains("voltage band"));
    }

    #[test]
    fn rejects_zero_iterations() {
        let err = "[solver]\nmax_iterations = 0\n"
            .parse::<GridSimConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("max_iterations"));
    }

    #[test]
    fn loads_first_existing_candidate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\nrandom_seed = 99").unwrap();
        let missing = PathBuf::from("does/not/exist.toml");
        let loaded =
            GridSimConfig::load_with_source(&[missing, file.path().to_path_buf()]).unwrap();
        assert_eq!(loaded.source, file.path());
        assert_eq!(loaded.config.simulation.random_seed, Some(99));
    }

    #[test]
    fn missing_candidates_are_reported() {
        let err = GridSimConfig::load(&["nope.toml"]).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}

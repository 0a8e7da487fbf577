//! Configuration loading and typed config structures for the `FollowFlee`
//! simulation.
//!
//! The canonical configuration lives in `followflee-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure and provides a loader for the file.
//!
//! The three model parameters have no usable default: a missing
//! `rep_mode`, `rep_rate` or `steps_per_generation` is reported by
//! [`ModelConfig::validate`] and the simulation refuses to start.

use std::path::Path;

use followflee_types::ReplacementMode;
use followflee_world::{Neighbourhood, RawCell};
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A required value was left unset.
    #[error("required config value `{field}` is not set")]
    MissingValue {
        /// Dotted path of the missing field.
        field: &'static str,
    },

    /// `model.rep_mode` names no known replacement mode.
    #[error("unknown replacement mode `{value}` (expected simpleBD or neighbourBD)")]
    UnknownReplacementMode {
        /// The rejected value.
        value: String,
    },

    /// A value lies outside its documented range.
    #[error("config value `{field}` = {value} is out of range ({expected})")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// The rejected value, formatted.
        value: String,
        /// Human-readable description of the valid range.
        expected: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `followflee-config.yaml`. Every section may be
/// omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowFleeConfig {
    /// Lattice and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial population.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Model parameters read once at initialization.
    #[serde(default)]
    pub model: ModelConfig,

    /// Run length.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FollowFleeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Lattice configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Seed of the simulation's random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Lattice width in cells.
    #[serde(default = "default_side")]
    pub width: u32,

    /// Lattice height in cells.
    #[serde(default = "default_side")]
    pub height: u32,

    /// Which cells count as neighbours.
    #[serde(default)]
    pub neighbourhood: Neighbourhood,

    /// Whether the lattice wraps around its borders.
    #[serde(default = "default_true")]
    pub periodic: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            width: default_side(),
            height: default_side(),
            neighbourhood: Neighbourhood::default(),
            periodic: true,
        }
    }
}

/// Initial population configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Probability that a cell starts occupied.
    #[serde(default = "default_half")]
    pub density: f64,

    /// Probability that an initial agent cooperates.
    #[serde(default = "default_half")]
    pub cooperator_fraction: f64,

    /// Genome given to every initial agent; a random one per agent if unset.
    #[serde(default)]
    pub genome: Option<u8>,

    /// Explicit initial cells, one per lattice node in id order. Overrides
    /// the random seeding when present.
    #[serde(default)]
    pub initial_cells: Option<Vec<RawCell>>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            density: default_half(),
            cooperator_fraction: default_half(),
            genome: None,
            initial_cells: None,
        }
    }
}

impl PopulationConfig {
    /// Check that both probabilities lie in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("population.density", self.density)?;
        check_unit_interval("population.cooperator_fraction", self.cooperator_fraction)
    }
}

/// Model parameters as written in the file.
///
/// Unset values stay `None` until [`ModelConfig::validate`] rejects them.
/// The camel-case names used by earlier model descriptions are accepted as
/// aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Replacement mode name: `simpleBD` or `neighbourBD`.
    #[serde(default, alias = "repMode")]
    pub rep_mode: Option<String>,

    /// Fraction of the population replaced each generation.
    #[serde(default, alias = "repRate")]
    pub rep_rate: Option<f64>,

    /// Movement micro-steps per agent per generation.
    #[serde(default, alias = "stepsPerGen", alias = "stepsPerGeneration")]
    pub steps_per_generation: Option<i64>,
}

/// Model parameters after validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidatedModelConfig {
    /// Replacement strategy applied after every generation.
    pub mode: ReplacementMode,
    /// Replacement rate in `[0, 1]`.
    pub rep_rate: f64,
    /// Micro-steps per agent per generation, at least 1.
    pub steps_per_generation: u32,
}

impl ModelConfig {
    /// Turn the raw section into a [`ValidatedModelConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] for an unset field,
    /// [`ConfigError::UnknownReplacementMode`] for an unrecognized mode, or
    /// [`ConfigError::OutOfRange`] for a rate outside `[0, 1]` or fewer than
    /// one step per generation.
    pub fn validate(&self) -> Result<ValidatedModelConfig, ConfigError> {
        let name = self
            .rep_mode
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::MissingValue {
                field: "model.rep_mode",
            })?;
        let mode = ReplacementMode::from_config_name(name).ok_or_else(|| {
            ConfigError::UnknownReplacementMode {
                value: name.to_owned(),
            }
        })?;

        let rep_rate = self.rep_rate.ok_or(ConfigError::MissingValue {
            field: "model.rep_rate",
        })?;
        check_unit_interval("model.rep_rate", rep_rate)?;

        let steps = self.steps_per_generation.ok_or(ConfigError::MissingValue {
            field: "model.steps_per_generation",
        })?;
        let steps_per_generation = u32::try_from(steps)
            .ok()
            .filter(|&steps| steps >= 1)
            .ok_or_else(|| ConfigError::OutOfRange {
                field: "model.steps_per_generation",
                value: steps.to_string(),
                expected: "1 to 4294967295",
            })?;

        Ok(ValidatedModelConfig {
            mode,
            rep_rate,
            steps_per_generation,
        })
    }
}

/// Run length configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of generations the host runs before stopping.
    #[serde(default = "default_max_generations")]
    pub max_generations: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_generations: default_max_generations(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is
    /// not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn check_unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "0.0 to 1.0",
        })
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_side() -> u32 {
    20
}

const fn default_true() -> bool {
    true
}

const fn default_half() -> f64 {
    0.5
}

const fn default_max_generations() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = FollowFleeConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.width, 20);
        assert_eq!(config.world.neighbourhood, Neighbourhood::Moore);
        assert!(config.world.periodic);
        assert!(config.population.genome.is_none());
        assert_eq!(config.simulation.max_generations, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 123
  width: 8
  height: 6
  neighbourhood: von_neumann
  periodic: false

population:
  density: 0.3
  cooperator_fraction: 0.7
  genome: 140

model:
  rep_mode: neighbourBD
  rep_rate: 0.1
  steps_per_generation: 3

simulation:
  max_generations: 25

logging:
  level: debug
  json: true
";

        let config = FollowFleeConfig::parse(yaml).unwrap();

        assert_eq!(config.world.seed, 123);
        assert_eq!(config.world.width, 8);
        assert_eq!(config.world.neighbourhood, Neighbourhood::VonNeumann);
        assert!(!config.world.periodic);
        assert_eq!(config.population.genome, Some(140));
        assert_eq!(config.simulation.max_generations, 25);
        assert!(config.logging.json);

        let model = config.model.validate().unwrap();
        assert_eq!(model.mode, ReplacementMode::NeighbourPreferring);
        assert_eq!(model.steps_per_generation, 3);
        assert!((model.rep_rate - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = FollowFleeConfig::parse("world:\n  seed: 7\n").unwrap();
        // Seed is overridden
        assert_eq!(config.world.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.world.height, 20);
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(FollowFleeConfig::parse("").is_ok());
    }

    #[test]
    fn camel_case_aliases_accepted() {
        let yaml = "model:\n  repMode: simpleBD\n  repRate: 0.5\n  stepsPerGen: 1\n";
        let model = FollowFleeConfig::parse(yaml).unwrap().model.validate().unwrap();
        assert_eq!(model.mode, ReplacementMode::Simple);
        assert_eq!(model.steps_per_generation, 1);
    }

    #[test]
    fn unset_model_values_fail_validation() {
        assert!(matches!(
            ModelConfig::default().validate(),
            Err(ConfigError::MissingValue { field: "model.rep_mode" })
        ));

        let model = ModelConfig {
            rep_mode: Some("simpleBD".to_owned()),
            rep_rate: None,
            steps_per_generation: Some(1),
        };
        assert!(matches!(
            model.validate(),
            Err(ConfigError::MissingValue { field: "model.rep_rate" })
        ));

        let model = ModelConfig {
            rep_mode: Some("simpleBD".to_owned()),
            rep_rate: Some(0.2),
            steps_per_generation: None,
        };
        assert!(matches!(
            model.validate(),
            Err(ConfigError::MissingValue {
                field: "model.steps_per_generation"
            })
        ));
    }

    #[test]
    fn invalid_model_values_rejected() {
        let base = ModelConfig {
            rep_mode: Some("simpleBD".to_owned()),
            rep_rate: Some(0.2),
            steps_per_generation: Some(1),
        };
        assert!(base.validate().is_ok());

        let bad_mode = ModelConfig {
            rep_mode: Some("tournament".to_owned()),
            ..base.clone()
        };
        assert!(matches!(
            bad_mode.validate(),
            Err(ConfigError::UnknownReplacementMode { value }) if value == "tournament"
        ));

        let bad_rate = ModelConfig {
            rep_rate: Some(1.5),
            ..base.clone()
        };
        assert!(matches!(
            bad_rate.validate(),
            Err(ConfigError::OutOfRange { field: "model.rep_rate", .. })
        ));

        let no_steps = ModelConfig {
            steps_per_generation: Some(0),
            ..base
        };
        assert!(matches!(
            no_steps.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn population_ranges_checked() {
        assert!(PopulationConfig::default().validate().is_ok());
        let config = PopulationConfig {
            density: -0.1,
            ..PopulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_initial_cells_parse() {
        let yaml = r"
population:
  initial_cells:
    - { strategy: 1, actions: 64 }
    - { strategy: 0 }
    - { strategy: 2, actions: 255, score: 4 }
";
        let config = FollowFleeConfig::parse(yaml).unwrap();
        let cells = config.population.initial_cells.unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[2].score, 4);
        assert_eq!(cells[1].actions, 0);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("followflee-config.yaml");
        if path.exists() {
            let config = FollowFleeConfig::from_file(&path).unwrap();
            assert!(config.model.validate().is_ok());
            assert!(config.population.validate().is_ok());
        }
    }
}

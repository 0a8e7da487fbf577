//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the simulation run.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: followflee_core::config::ConfigError,
    },

    /// Lattice construction or initial attribute decoding failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: followflee_world::WorldError,
    },

    /// The simulation hit an invariant violation.
    #[error("model error: {source}")]
    Model {
        /// The underlying model error.
        #[from]
        source: followflee_core::ModelError,
    },

    /// The final report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

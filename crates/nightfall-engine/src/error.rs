//! Error types for the batch engine binary.
//!
//! [`EngineError`] wraps every failure mode between loading the
//! configuration and finishing the last game.

/// Top-level error for the batch engine.
///
/// Each variant wraps a specific subsystem error, so `main` can propagate
/// any of them with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: nightfall_core::ConfigError,
    },

    /// Role assignment failed.
    #[error("game error: {source}")]
    Game {
        /// The underlying contract error.
        #[from]
        source: nightfall_rules::GameError,
    },

    /// A game could not be played to its end.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: nightfall_core::RunnerError,
    },

    /// A board could not be serialized for the debug dump.
    #[error("serialization error: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

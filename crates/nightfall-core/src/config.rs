//! Configuration loading and typed config structures for Nightfall.
//!
//! The canonical configuration lives in `nightfall-config.yaml` at the
//! project root. Every section and field has a default, so an empty or
//! partial file is valid. [`GameConfig::validate`] checks the cross-field
//! rules serde cannot express.

use std::collections::BTreeSet;
use std::path::Path;

use nightfall_types::Role;
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
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

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `nightfall-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Seed, game count, day bound and participant names.
    #[serde(default)]
    pub game: GameSettings,

    /// Role composition.
    #[serde(default)]
    pub roles: RolesConfig,

    /// Per-viewer context limits.
    #[serde(default)]
    pub context: ContextConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `NIGHTFALL_SEED` overrides `game.seed` when set to a valid number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config
            .game
            .apply_seed_override(std::env::var("NIGHTFALL_SEED").ok().as_deref());
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check the rules that span several fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown role name, a
    /// composition whose size differs from the name list, a duplicate
    /// name, or a composition without a wolf.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let composition = self.roles.parsed()?;

        if composition.len() != self.game.player_names.len() {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "{} roles configured for {} player names",
                    composition.len(),
                    self.game.player_names.len()
                ),
            });
        }

        let mut seen = BTreeSet::new();
        for name in &self.game.player_names {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Invalid {
                    reason: format!("duplicate player name: {name}"),
                });
            }
        }

        if !composition.iter().any(|r| r.is_wolf()) {
            return Err(ConfigError::Invalid {
                reason: String::from("composition has no werewolf"),
            });
        }

        Ok(())
    }
}

/// Game-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameSettings {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of games the batch engine plays.
    #[serde(default = "default_games")]
    pub games: u32,

    /// Stop a batch game after this many days. Zero means no bound.
    #[serde(default)]
    pub max_days: u32,

    /// Participant names, in roster order.
    #[serde(default = "default_player_names")]
    pub player_names: Vec<String>,
}

impl GameSettings {
    /// Replace the seed with `value` when it parses as a number.
    pub fn apply_seed_override(&mut self, value: Option<&str>) {
        let Some(raw) = value else {
            return;
        };
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = seed,
            Err(_) => warn!(value = raw, "Ignoring non-numeric NIGHTFALL_SEED"),
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            games: default_games(),
            max_days: 0,
            player_names: default_player_names(),
        }
    }
}

/// Role composition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RolesConfig {
    /// One role name per seat.
    #[serde(default = "default_composition")]
    pub composition: Vec<String>,
}

impl RolesConfig {
    /// The composition as typed roles.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first unknown role.
    pub fn parsed(&self) -> Result<Vec<Role>, ConfigError> {
        self.composition
            .iter()
            .map(|name| {
                name.parse::<Role>().map_err(|e| ConfigError::Invalid {
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            composition: default_composition(),
        }
    }
}

/// Per-viewer context settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContextConfig {
    /// How many recent statements a viewer's context keeps. Negative keeps
    /// all of them.
    #[serde(default = "default_max_recent_statements")]
    pub max_recent_statements: i64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_recent_statements: default_max_recent_statements(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit one JSON object per line instead of human-readable text.
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

const fn default_seed() -> u64 {
    42
}

const fn default_games() -> u32 {
    1
}

fn default_player_names() -> Vec<String> {
    [
        "Alice", "Bob", "Carol", "Dave", "Eve", "Finn", "Gina", "Hank", "Ivan",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_composition() -> Vec<String> {
    nightfall_rules::DEFAULT_COMPOSITION
        .iter()
        .map(|r| r.as_str().to_owned())
        .collect()
}

const fn default_max_recent_statements() -> i64 {
    20
}

fn default_log_level() -> String {
    String::from("info")
}

//! Batch engine binary for Nightfall.
//!
//! Plays `game.games` unattended games with random action sources and
//! reports how often each faction won. Game `i` is seeded with
//! `game.seed + i`, so any single game can be replayed on its own.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `nightfall-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Validate the configuration
//! 4. Play every game and log its result
//! 5. Log the faction standings

mod error;
mod progress;

use std::path::Path;

use anyhow::Context as _;
use nightfall_core::config::LoggingConfig;
use nightfall_core::{GameConfig, GameResult, RandomActionSource, log_game_end, run_game};
use nightfall_rules::{assign_roles, extract, new_game};
use nightfall_types::{Role, Team};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::TracingObserver;

const CONFIG_PATH: &str = "nightfall-config.yaml";

/// Application entry point for the batch engine.
///
/// # Errors
///
/// Returns an error if the configuration is unusable or a game fails.
fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, from_file) = load_config().context("failed to load configuration")?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("nightfall-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }

    // 3. Validate.
    config.validate().context("invalid configuration")?;
    let composition = config.roles.parsed()?;
    info!(
        seed = config.game.seed,
        games = config.game.games,
        max_days = config.game.max_days,
        participants = config.game.player_names.len(),
        "Configuration loaded"
    );

    // 4. Play.
    let mut standings = Standings::default();
    for index in 0..config.game.games {
        let result =
            play(&config, &composition, index).with_context(|| format!("game {index} failed"))?;
        standings.record(&result);
    }

    // 5. Report.
    info!(
        games = config.game.games,
        village = standings.village,
        werewolf = standings.werewolf,
        undecided = standings.undecided,
        "nightfall-engine finished"
    );

    Ok(())
}

/// Load `nightfall-config.yaml` from the working directory.
///
/// Returns the configuration and whether it came from the file.
fn load_config() -> Result<(GameConfig, bool), EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok((GameConfig::from_file(path)?, true))
    } else {
        Ok((GameConfig::default(), false))
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Play game number `index` to its end.
fn play(config: &GameConfig, composition: &[Role], index: u32) -> Result<GameResult, EngineError> {
    let seed = config.game.seed.wrapping_add(u64::from(index));
    let mut rng = StdRng::seed_from_u64(seed);

    let roster = assign_roles(&config.game.player_names, composition, &mut rng)?;
    let mut game = new_game(roster, &mut rng);
    let mut sources = RandomActionSource::for_all(&config.game.player_names, &mut rng);
    let mut observer = TracingObserver::new(index);

    info!(game = index, seed, game_id = %game.id(), "Game starting");
    let result = run_game(
        &mut game,
        &mut sources,
        &mut rng,
        config.game.max_days,
        &mut observer,
    )?;
    log_game_end(&result);

    if tracing::enabled!(Level::DEBUG) {
        let board = serde_json::to_string(&extract(&game))?;
        debug!(game = index, %board, "Final board");
        debug!(game = index, log = %nightfall_types::render(game.log()), "Full log");
    }

    Ok(result)
}

/// Win counts across a batch.
#[derive(Debug, Default, PartialEq, Eq)]
struct Standings {
    village: u32,
    werewolf: u32,
    undecided: u32,
}

impl Standings {
    const fn record(&mut self, result: &GameResult) {
        match result.winner {
            Some(Team::Village) => self.village = self.village.saturating_add(1),
            Some(Team::Werewolf) => self.werewolf = self.werewolf.saturating_add(1),
            None => self.undecided = self.undecided.saturating_add(1),
        }
    }
}

//! Game observer that reports progress through tracing.

use nightfall_core::{GameObserver, PhaseSummary};
use nightfall_rules::GameSnapshot;
use nightfall_types::Phase;
use tracing::{debug, info};

/// Logs every statement at debug level and every phase at info level.
pub struct TracingObserver {
    game_index: u32,
}

impl TracingObserver {
    /// Create an observer for the game with the given index.
    pub const fn new(game_index: u32) -> Self {
        Self { game_index }
    }
}

impl GameObserver for TracingObserver {
    fn on_statement(&mut self, speaker: &str, text: &str) {
        debug!(game = self.game_index, speaker, text, "Statement");
    }

    fn on_phase_end(&mut self, summary: &PhaseSummary, game: &GameSnapshot) {
        let deaths: Vec<&str> = summary.deaths.iter().map(|d| d.name.as_str()).collect();
        match summary.phase {
            Phase::Day => info!(
                game = self.game_index,
                day = summary.day,
                executed = ?summary.executed.as_ref().map(|t| t.target.as_str()),
                votes = summary.executed.as_ref().map_or(0, |t| t.votes),
                alive = game.alive().count(),
                "Day complete"
            ),
            Phase::Night => info!(
                game = self.game_index,
                day = summary.day,
                ?deaths,
                attack_blocked = summary.attack_blocked,
                alive = game.alive().count(),
                "Night complete"
            ),
        }
    }
}

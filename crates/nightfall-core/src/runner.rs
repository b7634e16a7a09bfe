//! Unattended game loop.
//!
//! [`run_game`] plays a game to completion with every participant driven
//! by an action source. It supports:
//!
//! - **Victory check** after every day and every night
//! - **Day bound**: stop with no winner after `max_days`
//! - **Progress hooks** through a [`GameObserver`]
//!
//! The loop is a thin driver over the shared steps in [`crate::cycle`].

use nightfall_rules::{GameSnapshot, victory};
use nightfall_types::Team;
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::actions;
use crate::cycle::{self, CycleError, PhaseSummary};
use crate::decision::ActionSources;
use crate::observer::GameObserver;

/// Errors that can occur during a batch run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A shared day or night step failed.
    #[error("cycle error: {source}")]
    Cycle {
        /// The underlying cycle error.
        #[from]
        source: CycleError,
    },
}

/// Why a batch game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// A faction won.
    Victory,
    /// The day bound was reached with no winner.
    DayLimitReached,
}

/// Result of a batch game.
#[derive(Debug, Clone, Serialize)]
pub struct GameResult {
    /// The winning faction, if any.
    pub winner: Option<Team>,
    /// Why the game ended.
    pub end_reason: EndReason,
    /// Day number on which the game ended.
    pub days: u32,
    /// The last phase summary.
    pub final_summary: Option<PhaseSummary>,
}

/// Play `game` until a faction wins or the day bound is reached.
///
/// `max_days` of zero means no bound. All randomness drawn by the core
/// (speaking order, tie-breaks) comes from `rng`.
///
/// # Errors
///
/// Returns [`RunnerError::Cycle`] if any participant has no source or a
/// snapshot contract is violated.
pub fn run_game<R: Rng + ?Sized>(
    game: &mut GameSnapshot,
    sources: &mut ActionSources,
    rng: &mut R,
    max_days: u32,
    observer: &mut dyn GameObserver,
) -> Result<GameResult, RunnerError> {
    cycle::check_sources(game, sources, None)?;

    let mut order = actions::initial_order(game, rng);
    let mut last: Option<PhaseSummary> = None;

    info!(
        game_id = %game.id(),
        participants = game.roster().len(),
        max_days,
        "Game starting"
    );

    loop {
        // --- Day bound ---
        if max_days > 0 && game.day() > max_days {
            info!(day = game.day(), max_days, "Day limit reached");
            return Ok(GameResult {
                winner: None,
                end_reason: EndReason::DayLimitReached,
                days: game.day(),
                final_summary: last,
            });
        }

        // --- Day ---
        let day = game.day();
        cycle::begin_day(game);
        for round in 1..=actions::discussion_rounds(day) {
            cycle::begin_round(game, round);
            let speakers = cycle::speakers(game, &order);
            cycle::run_speakers(game, &speakers, sources, observer)?;
        }
        let ballots = cycle::collect_votes(game, sources, None)?;
        let executed = cycle::execute_votes(game, &ballots, rng)?;
        let winner = victory::evaluate(game);
        let summary = PhaseSummary::day(day, executed, winner);
        observer.on_phase_end(&summary, game);
        if let Some(team) = winner {
            return Ok(end(game, team, summary));
        }

        // --- Night ---
        cycle::begin_night(game);
        let outcome = cycle::resolve_night(game, &mut order, sources, None)?;
        let winner = victory::evaluate(game);
        let summary = PhaseSummary::night(day, &outcome, winner);
        observer.on_phase_end(&summary, game);
        if let Some(team) = winner {
            return Ok(end(game, team, summary));
        }
        last = Some(summary);
    }
}

fn end(game: &mut GameSnapshot, winner: Team, summary: PhaseSummary) -> GameResult {
    cycle::finish(game, winner);
    GameResult {
        winner: Some(winner),
        end_reason: EndReason::Victory,
        days: game.day(),
        final_summary: Some(summary),
    }
}

/// Log the end of a batch game.
pub fn log_game_end(result: &GameResult) {
    info!(
        reason = ?result.end_reason,
        winner = ?result.winner,
        days = result.days,
        final_phase = ?result.final_summary.as_ref().map(|s| s.phase),
        "Game ended"
    );
}

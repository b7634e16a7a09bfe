//! Step-wise game session with one externally driven participant.
//!
//! A [`GameSession`] runs the same cycle as the batch runner but returns
//! control whenever the external participant (usually a human) has to
//! act. Each public operation is valid in exactly one or two [`Step`]s;
//! calling it anywhere else fails with [`SessionError::InvalidTransition`]
//! and leaves the session untouched.
//!
//! ```text
//! RoleReveal -> Discussion -> Vote -> ExecutionResult -> NightAction -> NightResult
//!                   ^  |                    |                              |
//!                   +--+                    +------------------------------+
//!                                                                          |
//!            Discussion <------------------------------------------------+
//! ```
//!
//! Any step that ends with a winner moves to [`Step::GameOver`].
//!
//! A missing or illegal external choice is treated as no choice.

use core::fmt;

use nightfall_rules::{
    Board, GameError, GameSnapshot, Participant, board, victory, visibility,
};
use nightfall_types::{Ability, LogEntry, Team};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::actions::{self, Ballot, Tally};
use crate::cycle::{self, CycleError, ExternalChoice, NightOutcome};
use crate::decision::ActionSources;
use crate::observer::NoOpObserver;

/// Where the session is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Roles have been dealt; the first day has not started.
    RoleReveal,
    /// Waiting for the external participant's statement.
    Discussion,
    /// Waiting for the external participant's vote.
    Vote,
    /// The vote has been resolved; night has not started.
    ExecutionResult,
    /// Waiting for the external participant's night target.
    NightAction,
    /// The night has been resolved; the next day has not started.
    NightResult,
    /// Terminal.
    GameOver,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RoleReveal => "role_reveal",
            Self::Discussion => "discussion",
            Self::Vote => "vote",
            Self::ExecutionResult => "execution_result",
            Self::NightAction => "night_action",
            Self::NightResult => "night_result",
            Self::GameOver => "game_over",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operation is not allowed in the current step.
    #[error("cannot {operation} during {step}")]
    InvalidTransition {
        /// The step the session was in.
        step: Step,
        /// The rejected operation.
        operation: &'static str,
    },

    /// A snapshot operation failed.
    #[error("game error: {source}")]
    Game {
        /// The underlying contract error.
        #[from]
        source: GameError,
    },

    /// A shared day or night step failed.
    #[error("cycle error: {source}")]
    Cycle {
        /// The underlying cycle error.
        #[from]
        source: CycleError,
    },
}

/// Produces the opaque summary stored on the snapshot.
///
/// Called at the start of every day from the second on. `fresh` is the
/// public part of the log appended since the previous summary.
pub trait Summarizer {
    /// Summarize the game so far.
    fn summarize(&mut self, game: &GameSnapshot, board: &Board, fresh: &[LogEntry]) -> String;
}

/// Result of a discussion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscussionUpdate {
    /// Statements made by other participants during this step.
    pub statements: Vec<LogEntry>,
    /// Whether discussion is over and the vote is next.
    pub vote_ready: bool,
}

/// Result of the vote step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    /// Every ballot, the external participant's first.
    pub ballots: Vec<Ballot>,
    /// Who was executed, if anyone.
    pub executed: Option<Tally>,
    /// The winner, if the vote ended the game.
    pub winner: Option<Team>,
}

/// Result of a night resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightReport {
    /// What the night did.
    pub outcome: NightOutcome,
    /// The winner, if the night ended the game.
    pub winner: Option<Team>,
}

/// A suspendable game with one external participant.
pub struct GameSession<R: Rng> {
    game: GameSnapshot,
    sources: ActionSources,
    external: String,
    rng: R,
    order: Vec<String>,
    round: u32,
    step: Step,
    winner: Option<Team>,
    summarizer: Option<Box<dyn Summarizer>>,
}

impl<R: Rng> GameSession<R> {
    /// Start a session. `external` must be in the roster; everybody else
    /// needs an action source.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Game`] if `external` is not a participant, or
    /// [`SessionError::Cycle`] if someone else has no source.
    pub fn new(
        game: GameSnapshot,
        sources: ActionSources,
        external: &str,
        mut rng: R,
    ) -> Result<Self, SessionError> {
        if game.find(external, false).is_none() {
            return Err(GameError::UnknownParticipant(external.to_owned()).into());
        }
        cycle::check_sources(&game, &sources, Some(external))?;
        let order = actions::initial_order(&game, &mut rng);

        info!(game_id = %game.id(), external, "Session created");

        Ok(Self {
            game,
            sources,
            external: external.to_owned(),
            rng,
            order,
            round: 0,
            step: Step::RoleReveal,
            winner: None,
            summarizer: None,
        })
    }

    /// Attach a summary collaborator.
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// The current snapshot.
    pub const fn game(&self) -> &GameSnapshot {
        &self.game
    }

    /// The current step.
    pub const fn step(&self) -> Step {
        self.step
    }

    /// The winning faction once the game is over.
    pub const fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// The external participant's name.
    pub fn external(&self) -> &str {
        &self.external
    }

    /// The current speaking order, dead names included until rotated out.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// The discussion round in progress, or zero outside discussion.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// The log as the external participant sees it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Game`] if the external participant is not in
    /// the roster.
    pub fn context(&self, max_recent: i64) -> Result<Vec<LogEntry>, SessionError> {
        Ok(visibility::context_for(&self.game, &self.external, max_recent)?)
    }

    fn expect_step(&self, allowed: &[Step], operation: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                step: self.step,
                operation,
            })
        }
    }

    fn external_alive(&self) -> Option<&Participant> {
        self.game.find(&self.external, true)
    }

    // -----------------------------------------------------------------
    // Day
    // -----------------------------------------------------------------

    /// Start the day and run discussion up to the external participant's
    /// turn.
    ///
    /// Valid from [`Step::RoleReveal`] and [`Step::NightResult`]. When the
    /// external participant is dead, every living participant speaks
    /// unattended.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside those steps.
    pub fn start_discussion(&mut self) -> Result<DiscussionUpdate, SessionError> {
        self.expect_step(&[Step::RoleReveal, Step::NightResult], "start discussion")?;

        cycle::begin_day(&mut self.game);
        if self.game.day() >= 2 {
            if let Some(summarizer) = self.summarizer.as_mut() {
                let board = board::extract(&self.game);
                let fresh = visibility::public_log(self.game.log_since_summary());
                let text = summarizer.summarize(&self.game, &board, &fresh);
                self.game.set_summary(text);
                debug!(day = self.game.day(), "Summary stored");
            }
        }

        self.round = 0;
        let statements = self.open_round()?;
        self.step = Step::Discussion;
        Ok(DiscussionUpdate {
            statements,
            vote_ready: false,
        })
    }

    /// Begin the next round and run the speakers before the external
    /// participant.
    fn open_round(&mut self) -> Result<Vec<LogEntry>, SessionError> {
        self.round = self.round.saturating_add(1);
        cycle::begin_round(&mut self.game, self.round);

        let speakers = cycle::speakers(&self.game, &self.order);
        let before: Vec<String> = match speakers.iter().position(|n| *n == self.external) {
            Some(idx) => speakers.into_iter().take(idx).collect(),
            None => speakers,
        };
        Ok(cycle::run_speakers(
            &mut self.game,
            &before,
            &mut self.sources,
            &mut NoOpObserver,
        )?)
    }

    /// Record the external participant's statement, run the remaining
    /// speakers, then open the next round or move to the vote.
    ///
    /// Valid in [`Step::Discussion`]. The statement is ignored when the
    /// external participant is dead.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside that step.
    pub fn submit_statement(&mut self, text: &str) -> Result<DiscussionUpdate, SessionError> {
        self.expect_step(&[Step::Discussion], "submit a statement")?;

        let mut statements = Vec::new();
        if self.external_alive().is_some() {
            self.game.append_log(LogEntry::Statement {
                speaker: self.external.clone(),
                text: text.to_owned(),
            });
            let speakers = cycle::speakers(&self.game, &self.order);
            let after: Vec<String> = speakers
                .into_iter()
                .skip_while(|n| *n != self.external)
                .skip(1)
                .collect();
            statements = cycle::run_speakers(
                &mut self.game,
                &after,
                &mut self.sources,
                &mut NoOpObserver,
            )?;
        }

        if self.round < actions::discussion_rounds(self.game.day()) {
            statements.extend(self.open_round()?);
            return Ok(DiscussionUpdate {
                statements,
                vote_ready: false,
            });
        }

        self.round = 0;
        self.step = Step::Vote;
        Ok(DiscussionUpdate {
            statements,
            vote_ready: true,
        })
    }

    /// Everyone the external participant may vote for.
    pub fn vote_candidates(&self) -> Vec<Participant> {
        self.external_alive()
            .map(|me| actions::vote_candidates(&self.game, me))
            .unwrap_or_default()
    }

    /// Cast the external participant's vote, collect everyone else's,
    /// tally and execute.
    ///
    /// Valid in [`Step::Vote`]. A vote for anyone outside
    /// [`Self::vote_candidates`] is dropped, as is any vote from a dead
    /// external participant.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside that step.
    pub fn submit_vote(&mut self, target: Option<&str>) -> Result<VoteOutcome, SessionError> {
        self.expect_step(&[Step::Vote], "submit a vote")?;

        let mut ballots = Vec::new();
        if let Some(target) = target {
            if self.vote_candidates().iter().any(|p| p.name == target) {
                ballots.push(Ballot {
                    voter: self.external.clone(),
                    target: target.to_owned(),
                });
            } else {
                debug!(target, "External vote dropped");
            }
        }
        ballots.extend(cycle::collect_votes(
            &self.game,
            &mut self.sources,
            Some(&self.external),
        )?);

        let executed = cycle::execute_votes(&mut self.game, &ballots, &mut self.rng)?;
        let winner = self.settle(Step::ExecutionResult);
        Ok(VoteOutcome {
            ballots,
            executed,
            winner,
        })
    }

    // -----------------------------------------------------------------
    // Night
    // -----------------------------------------------------------------

    /// The external participant's night ability, if they are the one who
    /// acts on it tonight.
    ///
    /// Only the first living holder of an ability acts, so a second wolf
    /// has no night action.
    pub fn night_ability(&self) -> Option<Ability> {
        self.night_actor().and_then(|me| me.role.ability())
    }

    /// Targets offered to the external participant tonight.
    ///
    /// Empty unless [`Self::night_ability`] is set. For a knight this omits
    /// the previous protectee, but [`Self::submit_night_action`] still
    /// accepts that name.
    pub fn night_candidates(&self) -> Vec<Participant> {
        self.night_actor()
            .map(|me| actions::candidates(&self.game, me))
            .unwrap_or_default()
    }

    fn night_actor(&self) -> Option<&Participant> {
        let ability = self.external_alive()?.role.ability()?;
        actions::night_actor(&self.game, ability).filter(|actor| actor.name == self.external)
    }

    /// Start the night.
    ///
    /// Valid in [`Step::ExecutionResult`]. Suspends at
    /// [`Step::NightAction`] and returns `None` when the external
    /// participant has a night action with at least one candidate;
    /// otherwise resolves the night at once.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside that step.
    pub fn begin_night(&mut self) -> Result<Option<NightReport>, SessionError> {
        self.expect_step(&[Step::ExecutionResult], "begin the night")?;

        cycle::begin_night(&mut self.game);
        if self.night_ability().is_some() && !self.night_candidates().is_empty() {
            self.step = Step::NightAction;
            return Ok(None);
        }
        self.resolve(None).map(Some)
    }

    /// Supply the external participant's night target and resolve the
    /// night.
    ///
    /// Valid in [`Step::NightAction`]. `None` or an illegal target means no
    /// action.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside that step.
    pub fn submit_night_action(&mut self, target: Option<&str>) -> Result<NightReport, SessionError> {
        self.expect_step(&[Step::NightAction], "submit a night action")?;
        self.resolve(target)
    }

    fn resolve(&mut self, target: Option<&str>) -> Result<NightReport, SessionError> {
        let external = ExternalChoice {
            name: &self.external,
            target,
        };
        let outcome = cycle::resolve_night(
            &mut self.game,
            &mut self.order,
            &mut self.sources,
            Some(external),
        )?;
        let winner = self.settle(Step::NightResult);
        Ok(NightReport { outcome, winner })
    }

    /// Evaluate victory and move to `next` or to the end.
    fn settle(&mut self, next: Step) -> Option<Team> {
        let winner = victory::evaluate(&self.game);
        if let Some(team) = winner {
            cycle::finish(&mut self.game, team);
            self.winner = Some(team);
            self.step = Step::GameOver;
        } else {
            self.step = next;
        }
        winner
    }
}

//! The day/night cycle shared by the batch runner and the step-wise session.
//!
//! Each function here is one step of a phase. The batch runner calls them
//! back to back; the session calls the same functions with suspension
//! points in between. Neither runner re-implements any of this.
//!
//! Day: [`begin_day`], then per round [`begin_round`] and
//! [`run_speakers`], then [`collect_votes`] and [`execute_votes`].
//!
//! Night: [`begin_night`], then [`resolve_night`]. Resolution order is
//! divine, guard, attack. A guard on the attack target blocks the attack.
//! A seer killed the same night loses that night's divination.

use nightfall_rules::{GameError, GameSnapshot, Participant};
use nightfall_types::{Ability, DeathCause, LogEntry, Phase, Role, Team, Verdict};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::actions::{self, Ballot, Tally};
use crate::decision::ActionSources;
use crate::observer::GameObserver;

/// Errors that can occur while running a phase step.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// A participant who must act has no action source.
    #[error("no action source for participant {name}")]
    MissingActionSource {
        /// The participant's name.
        name: String,
    },

    /// A snapshot operation failed.
    #[error("game error: {source}")]
    Game {
        /// The underlying contract error.
        #[from]
        source: GameError,
    },
}

/// One death in a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Casualty {
    /// Who died.
    pub name: String,
    /// How.
    pub cause: DeathCause,
}

/// What happened in one completed phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    /// The day number the phase belongs to.
    pub day: u32,
    /// Which half of the day.
    pub phase: Phase,
    /// Deaths during the phase.
    pub deaths: Vec<Casualty>,
    /// The vote result, for a day phase that executed someone.
    pub executed: Option<Tally>,
    /// Whether a guard blocked tonight's attack.
    pub attack_blocked: bool,
    /// The winner, if the phase ended the game.
    pub winner: Option<Team>,
}

impl PhaseSummary {
    /// Summary of a day phase.
    pub fn day(day: u32, executed: Option<Tally>, winner: Option<Team>) -> Self {
        let deaths = executed
            .iter()
            .map(|t| Casualty {
                name: t.target.clone(),
                cause: DeathCause::Execution,
            })
            .collect();
        Self {
            day,
            phase: Phase::Day,
            deaths,
            executed,
            attack_blocked: false,
            winner,
        }
    }

    /// Summary of a night phase.
    pub fn night(day: u32, outcome: &NightOutcome, winner: Option<Team>) -> Self {
        let deaths = outcome
            .killed
            .iter()
            .map(|name| Casualty {
                name: name.clone(),
                cause: DeathCause::Attack,
            })
            .collect();
        Self {
            day,
            phase: Phase::Night,
            deaths,
            executed: None,
            attack_blocked: outcome.attack_blocked,
            winner,
        }
    }
}

/// Result of night resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightOutcome {
    /// Who the attack killed.
    pub killed: Option<String>,
    /// Whether a guard blocked the attack.
    pub attack_blocked: bool,
}

/// A night choice supplied from outside instead of by an action source.
#[derive(Debug, Clone, Copy)]
pub struct ExternalChoice<'a> {
    /// The participant whose choice this is.
    pub name: &'a str,
    /// Their target, or `None` for no choice.
    pub target: Option<&'a str>,
}

/// Check that every participant except `external` has an action source.
///
/// # Errors
///
/// Returns [`CycleError::MissingActionSource`] naming the first participant
/// without one.
pub fn check_sources(
    game: &GameSnapshot,
    sources: &ActionSources,
    external: Option<&str>,
) -> Result<(), CycleError> {
    for p in game.roster() {
        if Some(p.name.as_str()) != external && !sources.contains_key(&p.name) {
            return Err(CycleError::MissingActionSource {
                name: p.name.clone(),
            });
        }
    }
    Ok(())
}

fn missing(name: &str) -> CycleError {
    CycleError::MissingActionSource {
        name: name.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Day
// ---------------------------------------------------------------------------

/// Open a day: header, phase switch and the morning notifications.
pub fn begin_day(game: &mut GameSnapshot) {
    game.append_log(LogEntry::DayHeader { day: game.day() });
    game.set_phase(Phase::Day);
    actions::notify_divine_result(game);
    actions::notify_medium_result(game);
    info!(day = game.day(), alive = game.alive().count(), "Day started");
}

/// Open discussion round `round` (one-based).
pub fn begin_round(game: &mut GameSnapshot, round: u32) {
    game.append_log(LogEntry::RoundHeader { round });
    debug!(day = game.day(), round, "Discussion round started");
}

/// Names of the living in speaking order.
pub fn speakers(game: &GameSnapshot, order: &[String]) -> Vec<String> {
    actions::ordered_alive(game, order)
        .into_iter()
        .map(|p| p.name.clone())
        .collect()
}

/// Ask each named speaker for one statement and log it.
///
/// Speakers who are dead by now are skipped. Returns the statements in the
/// order they were made.
///
/// # Errors
///
/// Returns [`CycleError::MissingActionSource`] if a living speaker has no
/// source.
pub fn run_speakers(
    game: &mut GameSnapshot,
    speakers: &[String],
    sources: &mut ActionSources,
    observer: &mut dyn GameObserver,
) -> Result<Vec<LogEntry>, CycleError> {
    let mut said = Vec::with_capacity(speakers.len());
    for name in speakers {
        let Some(me) = game.find(name, true).cloned() else {
            continue;
        };
        let source = sources.get_mut(name).ok_or_else(|| missing(name))?;
        let text = source.discuss(game, &me);
        debug!(speaker = %name, "Statement");
        observer.on_statement(name, &text);
        let entry = LogEntry::Statement {
            speaker: name.clone(),
            text,
        };
        game.append_log(entry.clone());
        said.push(entry);
    }
    Ok(said)
}

/// Collect one vote from every living participant except `skip`, in roster
/// order.
///
/// # Errors
///
/// Returns [`CycleError::MissingActionSource`] if a voter has no source.
pub fn collect_votes(
    game: &GameSnapshot,
    sources: &mut ActionSources,
    skip: Option<&str>,
) -> Result<Vec<Ballot>, CycleError> {
    let voters: Vec<Participant> = game
        .alive()
        .filter(|p| Some(p.name.as_str()) != skip)
        .cloned()
        .collect();
    let mut ballots = Vec::with_capacity(voters.len());
    for voter in voters {
        let candidates = actions::vote_candidates(game, &voter);
        let source = sources
            .get_mut(&voter.name)
            .ok_or_else(|| missing(&voter.name))?;
        let target = source.vote(game, &voter, &candidates);
        debug!(voter = %voter.name, target = %target, "Vote");
        ballots.push(Ballot {
            voter: voter.name,
            target,
        });
    }
    Ok(ballots)
}

/// Log every ballot, tally, and execute the winner if they are alive.
///
/// Records a medium reading when the roster has a medium. Returns the tally
/// only when someone was executed.
///
/// # Errors
///
/// Returns [`CycleError::Game`] if the kill transition fails.
pub fn execute_votes<R: Rng + ?Sized>(
    game: &mut GameSnapshot,
    ballots: &[Ballot],
    rng: &mut R,
) -> Result<Option<Tally>, CycleError> {
    for ballot in ballots {
        game.append_log(LogEntry::Vote {
            voter: ballot.voter.clone(),
            target: ballot.target.clone(),
        });
    }

    let Some(result) = actions::tally(ballots, rng) else {
        info!(day = game.day(), "No votes cast");
        return Ok(None);
    };
    let Some(role) = game.find(&result.target, true).map(|p| p.role) else {
        info!(day = game.day(), target = %result.target, "Vote target is not a living participant");
        return Ok(None);
    };

    game.kill(&result.target)?;
    game.append_log(LogEntry::Execution {
        name: result.target.clone(),
        votes: result.votes,
    });
    if game.roster().iter().any(|p| p.role == Role::Medium) {
        game.record_medium(game.day(), &result.target, Verdict::of(role));
    }
    info!(
        day = game.day(),
        executed = %result.target,
        votes = result.votes,
        "Execution"
    );
    Ok(Some(result))
}

// ---------------------------------------------------------------------------
// Night
// ---------------------------------------------------------------------------

/// Open a night: header and phase switch.
pub fn begin_night(game: &mut GameSnapshot) {
    game.append_log(LogEntry::NightHeader { day: game.day() });
    game.set_phase(Phase::Night);
    info!(day = game.day(), "Night started");
}

/// Ask the first living holder of `ability` for a target.
///
/// When that holder is the external participant their recorded choice is
/// used instead of a source. Returns `None` when nobody alive holds the
/// ability, when there is no candidate, or when the external actor made no
/// choice.
fn choose_target(
    game: &GameSnapshot,
    ability: Ability,
    sources: &mut ActionSources,
    external: Option<ExternalChoice<'_>>,
) -> Result<Option<(Participant, String)>, CycleError> {
    let Some(actor) = actions::night_actor(game, ability).cloned() else {
        return Ok(None);
    };
    let candidates = actions::candidates(game, &actor);
    if candidates.is_empty() {
        debug!(%ability, actor = %actor.name, "No candidates");
        return Ok(None);
    }

    if let Some(choice) = external.filter(|c| c.name == actor.name) {
        return Ok(choice.target.map(|t| (actor, t.to_owned())));
    }

    let source = sources
        .get_mut(&actor.name)
        .ok_or_else(|| missing(&actor.name))?;
    let target = match ability {
        Ability::Divine => source.divine(game, &actor, &candidates),
        Ability::Attack => source.attack(game, &actor, &candidates),
        Ability::Guard => source.guard(game, &actor, &candidates),
    };
    Ok(Some((actor, target)))
}

/// Resolve the whole night and move to the next day.
///
/// `order` is rotated past the victim when the attack kills someone.
///
/// # Errors
///
/// Returns [`CycleError::MissingActionSource`] if a night actor has no
/// source, or [`CycleError::Game`] if a snapshot transition fails.
pub fn resolve_night(
    game: &mut GameSnapshot,
    order: &mut Vec<String>,
    sources: &mut ActionSources,
    external: Option<ExternalChoice<'_>>,
) -> Result<NightOutcome, CycleError> {
    // divine -> guard -> attack
    let divination = choose_target(game, Ability::Divine, sources, external)?
        .and_then(|(seer, target)| actions::execute_divine(game, &seer, &target));
    let guarded = choose_target(game, Ability::Guard, sources, external)?
        .and_then(|(knight, target)| actions::execute_guard(game, &knight, &target));
    let attacked = choose_target(game, Ability::Attack, sources, external)?
        .and_then(|(wolf, target)| actions::execute_attack(game, &wolf, &target));

    let mut outcome = NightOutcome::default();
    if let Some(target) = attacked {
        if guarded.as_deref() == Some(target.as_str()) {
            game.append_log(LogEntry::GuardSuccess {
                target: target.clone(),
            });
            game.append_log(LogEntry::NoAttack);
            outcome.attack_blocked = true;
            info!(day = game.day(), protected = %target, "Attack blocked by guard");
        } else {
            game.kill(&target)?;
            game.append_log(LogEntry::Attack {
                name: target.clone(),
            });
            info!(day = game.day(), victim = %target, "Attack");
            outcome.killed = Some(target);
        }
    }

    if let Some(pending) = divination {
        if outcome.killed.as_deref() == Some(pending.seer.as_str()) {
            debug!(seer = %pending.seer, "Seer killed, divination discarded");
        } else {
            game.record_divination(&pending.seer, &pending.target)?;
        }
    }

    if let Some(victim) = &outcome.killed {
        *order = actions::rotate(order, victim);
    }

    game.advance_day();
    game.set_phase(Phase::Day);
    Ok(outcome)
}

/// Log the closing record.
pub fn finish(game: &mut GameSnapshot, winner: Team) {
    game.append_log(LogEntry::GameEnd { winner });
    info!(day = game.day(), %winner, "Game over");
}

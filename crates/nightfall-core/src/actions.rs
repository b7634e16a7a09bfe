//! Shared rule helpers used by both runners.
//!
//! Speaking order, round counts, candidate lists, night-action execution,
//! vote tallying and the morning notifications. Night executors never fail:
//! an illegal choice is logged and returns `None`.

use nightfall_rules::{GameSnapshot, Participant, eligibility};
use nightfall_types::{Ability, LogEntry, Role, Verdict};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use tracing::{debug, warn};

/// A divination that has been made but not yet committed to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDivination {
    /// The seer.
    pub seer: String,
    /// The divined participant.
    pub target: String,
    /// What the seer will learn.
    pub verdict: Verdict,
}

/// One cast vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ballot {
    /// Who voted.
    pub voter: String,
    /// Who they voted for.
    pub target: String,
}

/// The outcome of a tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// The name with the most votes, after tie-breaking.
    pub target: String,
    /// How many votes it received.
    pub votes: u32,
}

// ---------------------------------------------------------------------------
// Speaking order
// ---------------------------------------------------------------------------

/// A random permutation of the roster, fixed at game start.
pub fn initial_order<R: Rng + ?Sized>(game: &GameSnapshot, rng: &mut R) -> Vec<String> {
    let mut order: Vec<String> = game.roster().iter().map(|p| p.name.clone()).collect();
    order.shuffle(rng);
    order
}

/// Living participants in speaking order.
///
/// An empty order falls back to roster order.
pub fn ordered_alive<'a>(game: &'a GameSnapshot, order: &[String]) -> Vec<&'a Participant> {
    if order.is_empty() {
        return game.alive().collect();
    }
    order
        .iter()
        .filter_map(|name| game.find(name, true))
        .collect()
}

/// Drop `removed` and restart the order at its successor.
///
/// Returns the order unchanged when `removed` is not in it.
pub fn rotate(order: &[String], removed: &str) -> Vec<String> {
    let Some(idx) = order.iter().position(|n| n == removed) else {
        return order.to_vec();
    };
    let (before, from) = order.split_at(idx);
    from.iter().skip(1).chain(before).cloned().collect()
}

/// Number of discussion rounds on `day`: one on the first day, two after.
pub const fn discussion_rounds(day: u32) -> u32 {
    if day <= 1 { 1 } else { 2 }
}

// ---------------------------------------------------------------------------
// Night actors and candidates
// ---------------------------------------------------------------------------

/// The first living holder of `ability`, in roster order.
pub fn night_actor(game: &GameSnapshot, ability: Ability) -> Option<&Participant> {
    game.alive().find(|p| p.role.ability() == Some(ability))
}

/// Who `actor` may target tonight.
///
/// - divine: the living, minus the seer and everyone already divined
/// - attack: the living, minus every wolf
/// - guard: the living, minus the knight and the most recent protectee
///
/// The guard list is a narrowing for display only; [`execute_guard`]
/// accepts the most recent protectee again.
pub fn candidates(game: &GameSnapshot, actor: &Participant) -> Vec<Participant> {
    let Some(ability) = actor.role.ability() else {
        return Vec::new();
    };
    let last_guard = game.last_guard_of(&actor.name);
    game.alive()
        .filter(|p| match ability {
            Ability::Divine => {
                p.name != actor.name && !game.divined_by(&actor.name).any(|t| t == p.name)
            }
            Ability::Attack => !p.role.is_wolf(),
            Ability::Guard => p.name != actor.name && last_guard != Some(p.name.as_str()),
        })
        .cloned()
        .collect()
}

/// Everyone `voter` may vote for: every other living participant.
pub fn vote_candidates(game: &GameSnapshot, voter: &Participant) -> Vec<Participant> {
    game.alive()
        .filter(|p| p.name != voter.name)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Night executors
// ---------------------------------------------------------------------------

fn rejected(ability: Ability, actor: &Participant, target: &str, reason: eligibility::Ineligible) {
    warn!(
        %ability,
        actor = %actor.name,
        target,
        %reason,
        "Night action rejected, treated as no effect"
    );
}

/// Validate and log a divination. The ledger is left to the caller.
pub fn execute_divine(
    game: &mut GameSnapshot,
    seer: &Participant,
    target: &str,
) -> Option<PendingDivination> {
    if let Err(reason) = eligibility::validate(game, Ability::Divine, seer, target) {
        rejected(Ability::Divine, seer, target, reason);
        return None;
    }
    let verdict = Verdict::of(game.find(target, true)?.role);
    game.append_log(LogEntry::DivineAct {
        seer: seer.name.clone(),
        target: target.to_owned(),
    });
    debug!(seer = %seer.name, target, "Divination made");
    Some(PendingDivination {
        seer: seer.name.clone(),
        target: target.to_owned(),
        verdict,
    })
}

/// Validate, record and log a guard. Returns the protectee.
pub fn execute_guard(game: &mut GameSnapshot, knight: &Participant, target: &str) -> Option<String> {
    if let Err(reason) = eligibility::validate(game, Ability::Guard, knight, target) {
        rejected(Ability::Guard, knight, target, reason);
        return None;
    }
    game.record_guard(&knight.name, target);
    game.append_log(LogEntry::GuardAct {
        knight: knight.name.clone(),
        target: target.to_owned(),
    });
    debug!(knight = %knight.name, target, "Guard placed");
    Some(target.to_owned())
}

/// Validate an attack. The kill happens at night resolution.
pub fn execute_attack(game: &GameSnapshot, wolf: &Participant, target: &str) -> Option<String> {
    if let Err(reason) = eligibility::validate(game, Ability::Attack, wolf, target) {
        rejected(Ability::Attack, wolf, target, reason);
        return None;
    }
    debug!(wolf = %wolf.name, target, "Attack chosen");
    Some(target.to_owned())
}

// ---------------------------------------------------------------------------
// Voting
// ---------------------------------------------------------------------------

/// Count ballots and pick the most-voted name.
///
/// Ties are broken uniformly at random; the RNG is only drawn from when
/// there is a tie. No ballots means no result.
pub fn tally<R: Rng + ?Sized>(ballots: &[Ballot], rng: &mut R) -> Option<Tally> {
    // first-appearance order keeps the tie-break reproducible
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for ballot in ballots {
        match counts.iter_mut().find(|(name, _)| *name == ballot.target) {
            Some((_, n)) => *n = n.saturating_add(1),
            None => counts.push((ballot.target.as_str(), 1)),
        }
    }

    let max = counts.iter().map(|(_, n)| *n).max()?;
    let top: Vec<&str> = counts
        .iter()
        .filter(|(_, n)| *n == max)
        .map(|(name, _)| *name)
        .collect();

    let target = if top.len() > 1 {
        top.choose(rng).copied()?
    } else {
        top.first().copied()?
    };
    Some(Tally {
        target: target.to_owned(),
        votes: max,
    })
}

// ---------------------------------------------------------------------------
// Morning notifications
// ---------------------------------------------------------------------------

/// Tell the living seer the result of their latest committed divination.
///
/// From day 2 on this runs every morning, so the latest result is repeated
/// until a newer divination is committed.
pub fn notify_divine_result(game: &mut GameSnapshot) {
    if game.day() < 2 {
        return;
    }
    let Some(seer) = game.alive().find(|p| p.role == Role::Seer) else {
        return;
    };
    let Some(latest) = game.divined_by(&seer.name).last() else {
        return;
    };
    let Some(target) = game.find(latest, false) else {
        return;
    };
    let entry = LogEntry::DivineResult {
        seer: seer.name.clone(),
        target: target.name.clone(),
        verdict: Verdict::of(target.role),
    };
    game.append_log(entry);
}

/// Tell the living medium whether the most recently executed participant
/// was a wolf.
pub fn notify_medium_result(game: &mut GameSnapshot) {
    if game.day() < 2 {
        return;
    }
    let Some(medium) = game.alive().find(|p| p.role == Role::Medium) else {
        return;
    };
    let Some(reading) = game.medium_readings().last() else {
        return;
    };
    let entry = LogEntry::MediumResult {
        medium: medium.name.clone(),
        executed: reading.executed.clone(),
        verdict: reading.verdict,
    };
    game.append_log(entry);
}

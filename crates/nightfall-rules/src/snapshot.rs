//! The game snapshot: aggregate root of one game.
//!
//! A [`GameSnapshot`] owns the roster, the phase and day counter, the
//! append-only log and the three ledgers (divination, guard, medium). It
//! is a plain value: callers that need to try a transition and roll it
//! back clone it first.
//!
//! Invariants held by the methods here:
//!
//! - Roster membership is fixed at creation; only status changes, through
//!   [`GameSnapshot::replace`].
//! - The log and every ledger only grow.
//! - The day counter never decreases.
//! - A seer never has the same target twice in the divination ledger.

use nightfall_types::{GameId, LogEntry, Phase, Verdict};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::participant::Participant;

/// One committed divination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divination {
    /// The seer who divined.
    pub seer: String,
    /// The divined participant.
    pub target: String,
    /// The day number of the night it happened on.
    pub night: u32,
}

/// One guard choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    /// The knight who guarded.
    pub knight: String,
    /// The protectee.
    pub target: String,
}

/// What the medium learns about one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediumReading {
    /// Day of the execution.
    pub day: u32,
    /// Who was executed.
    pub executed: String,
    /// Whether they held the wolf role.
    pub verdict: Verdict,
}

/// Opaque summary blob supplied by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// The collaborator's output. Never parsed here.
    pub text: String,
    /// Log length at the time the summary was stored.
    pub log_offset: usize,
}

/// Complete state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    id: GameId,
    roster: Vec<Participant>,
    phase: Phase,
    day: u32,
    log: Vec<LogEntry>,
    divinations: Vec<Divination>,
    guards: Vec<Guard>,
    medium: Vec<MediumReading>,
    summary: Option<Summary>,
}

impl GameSnapshot {
    /// Create a day-1 snapshot with an empty log and empty ledgers.
    pub const fn new(id: GameId, roster: Vec<Participant>) -> Self {
        Self {
            id,
            roster,
            phase: Phase::Day,
            day: 1,
            log: Vec::new(),
            divinations: Vec::new(),
            guards: Vec::new(),
            medium: Vec::new(),
            summary: None,
        }
    }

    /// The game identifier.
    pub const fn id(&self) -> GameId {
        self.id
    }

    /// All participants in creation order, dead ones included.
    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current day number, starting at 1.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// The full log.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Look up a participant by name.
    pub fn find(&self, name: &str, alive_only: bool) -> Option<&Participant> {
        self.roster
            .iter()
            .find(|p| p.name == name && (!alive_only || p.is_alive()))
    }

    /// Swap in a new version of `old`. Only the status may differ.
    pub fn replace(&mut self, old: &Participant, new: Participant) -> Result<(), GameError> {
        if new.name != old.name || new.role != old.role {
            return Err(GameError::IdentityChanged {
                name: old.name.clone(),
            });
        }
        let slot = self
            .roster
            .iter_mut()
            .find(|p| p.name == old.name)
            .ok_or_else(|| GameError::UnknownParticipant(old.name.clone()))?;
        *slot = new;
        Ok(())
    }

    /// Kill the named participant and return their dead record.
    pub fn kill(&mut self, name: &str) -> Result<Participant, GameError> {
        let current = self
            .find(name, false)
            .cloned()
            .ok_or_else(|| GameError::UnknownParticipant(name.to_owned()))?;
        let dead = current.kill()?;
        self.replace(&current, dead.clone())?;
        Ok(dead)
    }

    /// Append one record to the log.
    pub fn append_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    /// Switch the phase.
    pub const fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Move to the next day.
    pub const fn advance_day(&mut self) {
        self.day = self.day.saturating_add(1);
    }

    /// Living participants in roster order.
    pub fn alive(&self) -> impl Iterator<Item = &Participant> {
        self.roster.iter().filter(|p| p.is_alive())
    }

    /// Living holders of the wolf role.
    pub fn alive_wolves(&self) -> impl Iterator<Item = &Participant> {
        self.alive().filter(|p| p.role.is_wolf())
    }

    /// Living participants without the wolf role. The madman counts here.
    pub fn alive_non_wolves(&self) -> impl Iterator<Item = &Participant> {
        self.alive().filter(|p| !p.role.is_wolf())
    }

    // -----------------------------------------------------------------
    // Ledgers
    // -----------------------------------------------------------------

    /// Commit a divination made on the current day's night.
    pub fn record_divination(&mut self, seer: &str, target: &str) -> Result<(), GameError> {
        if self.divined_by(seer).any(|t| t == target) {
            return Err(GameError::DuplicateDivination {
                seer: seer.to_owned(),
                target: target.to_owned(),
            });
        }
        self.divinations.push(Divination {
            seer: seer.to_owned(),
            target: target.to_owned(),
            night: self.day,
        });
        Ok(())
    }

    /// Every committed divination, oldest first.
    pub fn divinations(&self) -> &[Divination] {
        &self.divinations
    }

    /// Targets already divined by `seer`, oldest first.
    pub fn divined_by<'a>(&'a self, seer: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.divinations
            .iter()
            .filter(move |d| d.seer == seer)
            .map(|d| d.target.as_str())
    }

    /// Record a guard choice.
    pub fn record_guard(&mut self, knight: &str, target: &str) {
        self.guards.push(Guard {
            knight: knight.to_owned(),
            target: target.to_owned(),
        });
    }

    /// Every guard choice, oldest first.
    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// The most recent protectee of `knight`.
    pub fn last_guard_of(&self, knight: &str) -> Option<&str> {
        self.guards
            .iter()
            .rev()
            .find(|g| g.knight == knight)
            .map(|g| g.target.as_str())
    }

    /// Record what the medium learns about an execution.
    pub fn record_medium(&mut self, day: u32, executed: &str, verdict: Verdict) {
        self.medium.push(MediumReading {
            day,
            executed: executed.to_owned(),
            verdict,
        });
    }

    /// Every medium reading, oldest first.
    pub fn medium_readings(&self) -> &[MediumReading] {
        &self.medium
    }

    // -----------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------

    /// The stored summary, if any.
    pub const fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Store a summary produced from the log as it stands now.
    pub fn set_summary(&mut self, text: String) {
        self.summary = Some(Summary {
            text,
            log_offset: self.log.len(),
        });
    }

    /// Log entries appended after the stored summary, or the whole log
    /// when there is none.
    pub fn log_since_summary(&self) -> &[LogEntry] {
        let offset = self.summary.as_ref().map_or(0, |s| s.log_offset);
        self.log.get(offset..).unwrap_or(&[])
    }
}

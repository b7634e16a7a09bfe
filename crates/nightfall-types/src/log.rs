//! Tagged game-log records.
//!
//! Every mutating step of a game appends one [`LogEntry`]. The entry keeps
//! its structure (who, what, which verdict) so that the visibility filter,
//! the board extractor and front-ends can work on tags instead of parsing
//! text. The human-readable line is produced by the [`Display`] impl.
//!
//! [`Display`]: core::fmt::Display

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Role, Team, Verdict};

/// Visibility class of a log entry.
///
/// The per-viewer rules are keyed on this tag; see
/// `nightfall_rules::visibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LogCategory {
    /// A participant's own role assignment.
    RoleReveal,
    /// A seer's divination choice.
    DivineAct,
    /// A seer's divination outcome.
    DivineResult,
    /// A knight's protection choice.
    GuardAct,
    /// A blocked attack.
    GuardSuccess,
    /// A medium's reading of the last execution.
    MediumResult,
    /// The list of wolf-role holders.
    WolfAlly,
    /// A free-text discussion statement.
    Statement,
    /// Votes, executions, attacks, headers, start and end.
    Event,
}

impl LogCategory {
    /// Whether entries of this category are left out of the public-only
    /// log handed to the narrative collaborator.
    ///
    /// `GuardSuccess` is visible to every viewer in-game but is still kept
    /// out of the public-only log.
    pub const fn is_private(self) -> bool {
        !matches!(self, Self::Statement | Self::Event)
    }
}

/// One record in the append-only game log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LogEntry {
    /// The game started.
    GameStart,
    /// A participant learned their role.
    RoleReveal {
        /// The participant.
        name: String,
        /// Their role.
        role: Role,
    },
    /// The wolves learned who their allies are.
    WolfAllies {
        /// Every wolf-role holder, in roster order.
        wolves: Vec<String>,
    },
    /// A day started.
    DayHeader {
        /// The day number.
        day: u32,
    },
    /// A night started.
    NightHeader {
        /// The day number the night belongs to.
        day: u32,
    },
    /// A discussion round started.
    RoundHeader {
        /// One-based round number within the day.
        round: u32,
    },
    /// A participant spoke during discussion.
    Statement {
        /// Who spoke.
        speaker: String,
        /// What they said.
        text: String,
    },
    /// A participant cast a vote.
    Vote {
        /// Who voted.
        voter: String,
        /// Who they voted for.
        target: String,
    },
    /// The vote executed a participant.
    Execution {
        /// Who was executed.
        name: String,
        /// How many votes they received.
        votes: u32,
    },
    /// The night attack killed a participant.
    Attack {
        /// Who was killed.
        name: String,
    },
    /// Nobody died to the night attack.
    NoAttack,
    /// A seer chose a divination target.
    DivineAct {
        /// The seer.
        seer: String,
        /// The target.
        target: String,
    },
    /// A seer received the outcome of a past divination.
    DivineResult {
        /// The seer.
        seer: String,
        /// The divined participant.
        target: String,
        /// Whether the target is a wolf.
        verdict: Verdict,
    },
    /// A knight chose whom to guard.
    GuardAct {
        /// The knight.
        knight: String,
        /// The protectee.
        target: String,
    },
    /// An attack was blocked by a guard.
    GuardSuccess {
        /// The protected participant.
        target: String,
    },
    /// A medium received the reading of the previous execution.
    MediumResult {
        /// The medium.
        medium: String,
        /// The executed participant.
        executed: String,
        /// Whether the executed participant was a wolf.
        verdict: Verdict,
    },
    /// The game ended.
    GameEnd {
        /// The winning faction.
        winner: Team,
    },
}

impl LogEntry {
    /// The visibility class of this entry.
    pub const fn category(&self) -> LogCategory {
        match self {
            Self::RoleReveal { .. } => LogCategory::RoleReveal,
            Self::DivineAct { .. } => LogCategory::DivineAct,
            Self::DivineResult { .. } => LogCategory::DivineResult,
            Self::GuardAct { .. } => LogCategory::GuardAct,
            Self::GuardSuccess { .. } => LogCategory::GuardSuccess,
            Self::MediumResult { .. } => LogCategory::MediumResult,
            Self::WolfAllies { .. } => LogCategory::WolfAlly,
            Self::Statement { .. } => LogCategory::Statement,
            Self::GameStart
            | Self::DayHeader { .. }
            | Self::NightHeader { .. }
            | Self::RoundHeader { .. }
            | Self::Vote { .. }
            | Self::Execution { .. }
            | Self::Attack { .. }
            | Self::NoAttack
            | Self::GameEnd { .. } => LogCategory::Event,
        }
    }

    /// Whether this entry names the given participant.
    pub fn names(&self, name: &str) -> bool {
        match self {
            Self::RoleReveal { name: n, .. }
            | Self::Execution { name: n, .. }
            | Self::Attack { name: n } => n == name,
            Self::WolfAllies { wolves } => wolves.iter().any(|w| w == name),
            Self::Statement { speaker, .. } => speaker == name,
            Self::Vote { voter: a, target: b }
            | Self::DivineAct { seer: a, target: b }
            | Self::DivineResult { seer: a, target: b, .. }
            | Self::GuardAct { knight: a, target: b }
            | Self::MediumResult {
                medium: a,
                executed: b,
                ..
            } => a == name || b == name,
            Self::GuardSuccess { target } => target == name,
            Self::GameStart
            | Self::DayHeader { .. }
            | Self::NightHeader { .. }
            | Self::RoundHeader { .. }
            | Self::NoAttack
            | Self::GameEnd { .. } => false,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameStart => write!(f, "=== Game start ==="),
            Self::RoleReveal { name, role } => write!(f, "[Role] {name}: {role}"),
            Self::WolfAllies { wolves } => {
                write!(f, "[Wolf allies] The wolves are {}", wolves.join(", "))
            }
            Self::DayHeader { day } => write!(f, "--- Day {day} (day phase) ---"),
            Self::NightHeader { day } => write!(f, "--- Night {day} (night phase) ---"),
            Self::RoundHeader { round } => write!(f, "[Discussion] Round {round}"),
            Self::Statement { speaker, text } => write!(f, "[Statement] {speaker}: {text}"),
            Self::Vote { voter, target } => write!(f, "[Vote] {voter} -> {target}"),
            Self::Execution { name, votes } => {
                write!(f, "[Execution] {name} was executed (votes: {votes})")
            }
            Self::Attack { name } => write!(f, "[Attack] {name} was attacked by the wolves"),
            Self::NoAttack => write!(f, "[Attack] No one was attacked tonight"),
            Self::DivineAct { seer, target } => write!(f, "[Divine] {seer} divined {target}"),
            Self::DivineResult {
                seer,
                target,
                verdict,
            } => match verdict {
                Verdict::Wolf => write!(f, "[Divine result] {seer}'s divination: {target} is a wolf"),
                Verdict::NotWolf => {
                    write!(f, "[Divine result] {seer}'s divination: {target} is not a wolf")
                }
            },
            Self::GuardAct { knight, target } => write!(f, "[Guard] {knight} guarded {target}"),
            Self::GuardSuccess { target } => {
                write!(f, "[Guard success] The attack on {target} was blocked")
            }
            Self::MediumResult {
                medium,
                executed,
                verdict,
            } => match verdict {
                Verdict::Wolf => write!(f, "[Medium result] {medium}'s reading: {executed} was a wolf"),
                Verdict::NotWolf => {
                    write!(f, "[Medium result] {medium}'s reading: {executed} was not a wolf")
                }
            },
            Self::GameEnd { winner } => write!(f, "=== Game over: {winner} wins ==="),
        }
    }
}

/// Render a sequence of entries as newline-separated text.
pub fn render<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let lines: Vec<String> = entries.into_iter().map(ToString::to_string).collect();
    lines.join("\n")
}

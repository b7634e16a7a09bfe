//! Compact structural view of a game for the summary collaborator.
//!
//! [`extract`] walks the tagged log once and reduces it to who is alive,
//! who died how and when, and how each day's vote went. It is pure and
//! only looks at public categories.

use std::collections::BTreeMap;

use nightfall_types::{DeathCause, LogEntry};
use serde::Serialize;

use crate::snapshot::GameSnapshot;

/// One death recorded on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Death {
    /// Who died.
    pub name: String,
    /// How they died.
    pub cause: DeathCause,
    /// The day (or the night belonging to that day) of the death.
    pub day: u32,
}

/// One day's vote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayVotes {
    /// The day number.
    pub day: u32,
    /// Voter to target.
    pub votes: BTreeMap<String, String>,
    /// Who was executed, if anyone.
    pub executed: Option<String>,
}

/// The structural snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    /// Living participants in roster order.
    pub alive: Vec<String>,
    /// Deaths in the order they happened.
    pub dead: Vec<Death>,
    /// Vote record for every day that held a vote.
    pub days: Vec<DayVotes>,
}

/// Reduce the snapshot to a [`Board`].
pub fn extract(game: &GameSnapshot) -> Board {
    let mut dead = Vec::new();
    let mut days: BTreeMap<u32, DayVotes> = BTreeMap::new();
    let mut day = 1_u32;

    for entry in game.log() {
        match entry {
            LogEntry::DayHeader { day: d } | LogEntry::NightHeader { day: d } => day = *d,
            LogEntry::Vote { voter, target } => {
                day_votes(&mut days, day)
                    .votes
                    .insert(voter.clone(), target.clone());
            }
            LogEntry::Execution { name, .. } => {
                day_votes(&mut days, day).executed = Some(name.clone());
                dead.push(Death {
                    name: name.clone(),
                    cause: DeathCause::Execution,
                    day,
                });
            }
            LogEntry::Attack { name } => dead.push(Death {
                name: name.clone(),
                cause: DeathCause::Attack,
                day,
            }),
            _ => {}
        }
    }

    Board {
        alive: game.alive().map(|p| p.name.clone()).collect(),
        dead,
        days: days.into_values().collect(),
    }
}

fn day_votes(days: &mut BTreeMap<u32, DayVotes>, day: u32) -> &mut DayVotes {
    days.entry(day).or_insert_with(|| DayVotes {
        day,
        ..DayVotes::default()
    })
}

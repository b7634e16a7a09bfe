//! Role assignment and game creation.

use std::collections::BTreeSet;

use nightfall_types::{GameId, LogEntry, Role};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::error::GameError;
use crate::participant::Participant;
use crate::snapshot::GameSnapshot;

/// The standard nine-seat composition.
pub const DEFAULT_COMPOSITION: [Role; 9] = [
    Role::Villager,
    Role::Villager,
    Role::Villager,
    Role::Seer,
    Role::Werewolf,
    Role::Werewolf,
    Role::Knight,
    Role::Medium,
    Role::Madman,
];

fn check_roster(names: &[String], composition: &[Role]) -> Result<(), GameError> {
    if names.len() != composition.len() {
        return Err(GameError::RosterSize {
            names: names.len(),
            roles: composition.len(),
        });
    }
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(GameError::DuplicateName(name.clone()));
        }
    }
    Ok(())
}

/// Shuffle `composition` and hand one role to each name.
///
/// The returned roster keeps the order of `names`.
pub fn assign_roles<R: Rng + ?Sized>(
    names: &[String],
    composition: &[Role],
    rng: &mut R,
) -> Result<Vec<Participant>, GameError> {
    check_roster(names, composition)?;

    let mut roles = composition.to_vec();
    roles.shuffle(rng);

    Ok(names
        .iter()
        .zip(roles)
        .map(|(name, role)| Participant::new(name.clone(), role))
        .collect())
}

/// Like [`assign_roles`], but `fixed_name` always receives `fixed_role`.
///
/// One copy of `fixed_role` is removed from the composition and the rest is
/// shuffled over the remaining names.
pub fn assign_roles_with_fixed<R: Rng + ?Sized>(
    names: &[String],
    fixed_name: &str,
    fixed_role: Role,
    composition: &[Role],
    rng: &mut R,
) -> Result<Vec<Participant>, GameError> {
    check_roster(names, composition)?;
    if !names.iter().any(|n| n == fixed_name) {
        return Err(GameError::UnknownParticipant(fixed_name.to_owned()));
    }

    let mut roles = composition.to_vec();
    let slot = roles
        .iter()
        .position(|r| *r == fixed_role)
        .ok_or(GameError::UnknownRole(fixed_role))?;
    roles.remove(slot);
    roles.shuffle(rng);

    let mut rest = roles.into_iter();
    let mut roster = Vec::with_capacity(names.len());
    for name in names {
        let role = if name == fixed_name {
            fixed_role
        } else {
            rest.next()
                .ok_or(GameError::RosterSize {
                    names: names.len(),
                    roles: composition.len(),
                })?
        };
        roster.push(Participant::new(name.clone(), role));
    }
    Ok(roster)
}

/// Build a fresh snapshot from an assigned roster.
///
/// The log starts with the start header, one role reveal per participant
/// and the wolf-ally list.
pub fn new_game<R: Rng + ?Sized>(roster: Vec<Participant>, rng: &mut R) -> GameSnapshot {
    let id = GameId::from_random_bytes(rng.random());
    let wolves: Vec<String> = roster
        .iter()
        .filter(|p| p.role.is_wolf())
        .map(|p| p.name.clone())
        .collect();
    let reveals: Vec<LogEntry> = roster
        .iter()
        .map(|p| LogEntry::RoleReveal {
            name: p.name.clone(),
            role: p.role,
        })
        .collect();

    info!(
        game_id = %id,
        participants = roster.len(),
        wolves = wolves.len(),
        "Game created"
    );

    let mut game = GameSnapshot::new(id, roster);
    game.append_log(LogEntry::GameStart);
    for entry in reveals {
        game.append_log(entry);
    }
    game.append_log(LogEntry::WolfAllies { wolves });
    game
}

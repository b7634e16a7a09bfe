//! Night-action eligibility pipeline.
//!
//! The pipeline runs 6 stages in order and stops at the first failure:
//! 1. Role -- does the actor hold the ability?
//! 2. Actor -- is the actor alive?
//! 3. Target exists -- is the target in the roster?
//! 4. Target alive -- is the target still playing?
//! 5. Self -- is the actor targeting someone else?
//! 6. Role-specific -- divine forbids a repeat target, attack forbids a
//!    wolf target, guard has no further restriction.
//!
//! A failure is a value, not an error: callers downgrade it to "no effect".

use nightfall_types::{Ability, Role};

use crate::participant::Participant;
use crate::snapshot::GameSnapshot;

/// Why a night action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Ineligible {
    /// The actor does not hold the role that owns the ability.
    #[error("actor does not hold the {required} role")]
    WrongRole {
        /// The role the ability requires.
        required: Role,
    },
    /// The actor is dead.
    #[error("actor is dead")]
    ActorDead,
    /// No participant has the target name.
    #[error("target is not in the game")]
    TargetNotInGame,
    /// The target is dead.
    #[error("target is dead")]
    TargetDead,
    /// The actor targeted themselves.
    #[error("actor cannot target themselves")]
    SelfTarget,
    /// The seer already divined this target.
    #[error("target was already divined")]
    AlreadyDivined,
    /// The wolves cannot attack one of their own.
    #[error("target holds the wolf role")]
    TargetIsWolf,
}

/// Validate a night action through the full pipeline.
pub fn validate(
    game: &GameSnapshot,
    ability: Ability,
    actor: &Participant,
    target: &str,
) -> Result<(), Ineligible> {
    // Stage 1: role
    let required = ability.holder();
    if actor.role != required {
        return Err(Ineligible::WrongRole { required });
    }

    // Stage 2: actor alive, read from the snapshot rather than the
    // possibly stale argument
    if game.find(&actor.name, true).is_none() {
        return Err(Ineligible::ActorDead);
    }

    // Stages 3 and 4: target exists and is alive
    let target = game
        .find(target, false)
        .ok_or(Ineligible::TargetNotInGame)?;
    if !target.is_alive() {
        return Err(Ineligible::TargetDead);
    }

    // Stage 5: self
    if target.name == actor.name {
        return Err(Ineligible::SelfTarget);
    }

    // Stage 6: role-specific
    match ability {
        Ability::Divine => {
            if game.divined_by(&actor.name).any(|t| t == target.name) {
                return Err(Ineligible::AlreadyDivined);
            }
        }
        Ability::Attack => {
            if target.role.is_wolf() {
                return Err(Ineligible::TargetIsWolf);
            }
        }
        Ability::Guard => {}
    }

    Ok(())
}

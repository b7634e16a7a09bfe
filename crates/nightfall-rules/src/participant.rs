//! A single role-bearing participant.

use nightfall_types::{Role, Status};
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// One player in the game: a unique name, a fixed role and a liveness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique name. Identity within a game.
    pub name: String,
    /// Role held for the whole game.
    pub role: Role,
    /// Alive or dead.
    pub status: Status,
}

impl Participant {
    /// Create a living participant.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            status: Status::Alive,
        }
    }

    /// Whether the participant is still in the game.
    pub fn is_alive(&self) -> bool {
        self.status == Status::Alive
    }

    /// Return the dead version of this participant.
    ///
    /// The receiver is left untouched; the snapshot applies the
    /// replacement.
    pub fn kill(&self) -> Result<Self, GameError> {
        if !self.is_alive() {
            return Err(GameError::AlreadyDead {
                name: self.name.clone(),
            });
        }
        Ok(Self {
            name: self.name.clone(),
            role: self.role,
            status: Status::Dead,
        })
    }
}

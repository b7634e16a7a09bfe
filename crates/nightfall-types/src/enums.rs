//! Enumeration types for the Nightfall engine.
//!
//! Roles, factions, night-ability categories, phases and liveness. The
//! role table (faction and ability per role) lives here as `const fn`
//! lookups so every crate derives the same answers from one place.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Factions
// ---------------------------------------------------------------------------

/// One of the two victory factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Team {
    /// The village: every role except the wolf and the madman.
    Village,
    /// The werewolves: the wolf role plus the madman.
    Werewolf,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Village => write!(f, "village"),
            Self::Werewolf => write!(f, "werewolf"),
        }
    }
}

// ---------------------------------------------------------------------------
// Night abilities
// ---------------------------------------------------------------------------

/// The night-ability category a role may hold.
///
/// A role holds at most one category. Roles without a night ability map
/// to `None` in [`Role::ability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Ability {
    /// Learn whether one living participant holds the wolf role.
    Divine,
    /// Eliminate one living non-wolf participant.
    Attack,
    /// Shield one other living participant from tonight's attack.
    Guard,
}

impl Ability {
    /// The role that holds this ability.
    pub const fn holder(self) -> Role {
        match self {
            Self::Divine => Role::Seer,
            Self::Attack => Role::Werewolf,
            Self::Guard => Role::Knight,
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Divine => write!(f, "divine"),
            Self::Attack => write!(f, "attack"),
            Self::Guard => write!(f, "guard"),
        }
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// A role held by exactly one participant for the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Plain villager with no night ability.
    Villager,
    /// Divines one participant per night.
    Seer,
    /// The wolf role. Attacks at night and counts toward the wolf total.
    Werewolf,
    /// Guards one participant per night.
    Knight,
    /// Learns whether each executed participant was a wolf.
    Medium,
    /// Werewolf-team member without an ability; reads as non-wolf.
    Madman,
}

impl Role {
    /// Every role, in table order.
    pub const ALL: [Self; 6] = [
        Self::Villager,
        Self::Seer,
        Self::Werewolf,
        Self::Knight,
        Self::Medium,
        Self::Madman,
    ];

    /// The faction this role wins with.
    pub const fn team(self) -> Team {
        match self {
            Self::Werewolf | Self::Madman => Team::Werewolf,
            Self::Villager | Self::Seer | Self::Knight | Self::Medium => Team::Village,
        }
    }

    /// The night-ability category of this role, if any.
    pub const fn ability(self) -> Option<Ability> {
        match self {
            Self::Seer => Some(Ability::Divine),
            Self::Werewolf => Some(Ability::Attack),
            Self::Knight => Some(Ability::Guard),
            Self::Villager | Self::Medium | Self::Madman => None,
        }
    }

    /// Whether this is the wolf role itself.
    ///
    /// Team membership is not enough: the madman is on the werewolf team
    /// but is not a wolf for victory, divination or attack purposes.
    pub const fn is_wolf(self) -> bool {
        matches!(self, Self::Werewolf)
    }

    /// Canonical lowercase name, as used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Villager => "villager",
            Self::Seer => "seer",
            Self::Werewolf => "werewolf",
            Self::Knight => "knight",
            Self::Medium => "medium",
            Self::Madman => "madman",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name does not match any known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role name: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == needle)
            .ok_or_else(|| ParseRoleError(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Phase and liveness
// ---------------------------------------------------------------------------

/// The half of the game cycle currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Discussion, vote and execution.
    #[default]
    Day,
    /// Secret ability resolution.
    Night,
}

/// Whether a participant is still in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Status {
    /// Still playing.
    #[default]
    Alive,
    /// Executed or attacked. Terminal.
    Dead,
}

/// What a divination or medium reading revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Verdict {
    /// The participant holds the wolf role.
    Wolf,
    /// The participant does not hold the wolf role (madman included).
    NotWolf,
}

impl Verdict {
    /// Verdict for a participant holding `role`.
    pub const fn of(role: Role) -> Self {
        if role.is_wolf() { Self::Wolf } else { Self::NotWolf }
    }
}

/// How a participant died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DeathCause {
    /// Executed by the day vote.
    Execution,
    /// Killed by the night attack.
    Attack,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execution => write!(f, "execution"),
            Self::Attack => write!(f, "attack"),
        }
    }
}

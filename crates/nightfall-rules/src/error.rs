//! Error types for the nightfall-rules crate.
//!
//! These are contract errors: they signal caller misuse and are never
//! expected in a well-formed game. Illegal actions chosen by a participant
//! are not errors; see [`crate::eligibility::Ineligible`].

use nightfall_types::Role;

/// Errors raised by snapshot and assignment operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Attempted to kill a participant who is already dead.
    #[error("participant {name} is already dead")]
    AlreadyDead {
        /// The participant's name.
        name: String,
    },

    /// The number of names does not match the role composition.
    #[error("roster size mismatch: {names} names for {roles} roles")]
    RosterSize {
        /// Number of participant names supplied.
        names: usize,
        /// Number of roles in the composition.
        roles: usize,
    },

    /// The same participant name appears more than once.
    #[error("duplicate participant name: {0}")]
    DuplicateName(String),

    /// No participant with the given name exists.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),

    /// The requested role is not part of the composition.
    #[error("role {0} is not in the composition")]
    UnknownRole(Role),

    /// A replacement tried to change a participant's name or role.
    #[error("replacement for {name} must keep its name and role")]
    IdentityChanged {
        /// The participant being replaced.
        name: String,
    },

    /// A seer attempted to divine the same target twice.
    #[error("{seer} has already divined {target}")]
    DuplicateDivination {
        /// The seer.
        seer: String,
        /// The repeated target.
        target: String,
    },
}

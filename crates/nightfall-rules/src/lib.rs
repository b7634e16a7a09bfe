//! Game state and pure rules for the Nightfall social-deduction engine.
//!
//! Everything here is deterministic given its inputs. Randomness only
//! enters through a caller-supplied [`rand::Rng`], and nothing performs
//! I/O.
//!
//! # Modules
//!
//! - [`participant`] -- One role-bearing player and the kill transition
//! - [`snapshot`] -- The aggregate root: roster, log, ledgers, summary
//! - [`eligibility`] -- Staged preconditions for night actions
//! - [`assignment`] -- Role shuffling and game creation
//! - [`victory`] -- Win evaluation by wolf-role counts
//! - [`visibility`] -- Per-viewer and public log filters
//! - [`board`] -- Structural reduction of the log for summaries
//! - [`error`] -- Contract errors

pub mod assignment;
pub mod board;
pub mod eligibility;
pub mod error;
pub mod participant;
pub mod snapshot;
pub mod victory;
pub mod visibility;

pub use assignment::{DEFAULT_COMPOSITION, assign_roles, assign_roles_with_fixed, new_game};
pub use board::{Board, extract};
pub use eligibility::{Ineligible, validate};
pub use error::GameError;
pub use participant::Participant;
pub use snapshot::{Divination, GameSnapshot, Guard, MediumReading, Summary};
pub use victory::evaluate;

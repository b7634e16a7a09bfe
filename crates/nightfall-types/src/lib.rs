//! Shared type definitions for the Nightfall social-deduction engine.
//!
//! This crate is the single source of truth for the vocabulary shared by
//! the rules, the runners and any front-end. Types flow to `TypeScript`
//! via `ts-rs` for web clients.
//!
//! # Modules
//!
//! - [`enums`] -- Roles, factions, abilities, phases and verdicts
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`log`] -- Tagged game-log records and their text rendering

pub mod enums;
pub mod ids;
pub mod log;

// Re-export all public types at crate root for convenience.
pub use enums::{Ability, DeathCause, ParseRoleError, Phase, Role, Status, Team, Verdict};
pub use ids::GameId;
pub use log::{LogCategory, LogEntry, render};

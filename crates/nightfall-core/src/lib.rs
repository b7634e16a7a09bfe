//! Game flow for the Nightfall social-deduction engine.
//!
//! This crate turns the pure rules of `nightfall-rules` into playable
//! games. It owns the day/night cycle and two ways of driving it:
//!
//! - [`runner::run_game`] plays a whole game unattended.
//! - [`session::GameSession`] suspends whenever one external participant
//!   has to speak, vote or act at night.
//!
//! Both drive the same step functions in [`cycle`], so a seeded game plays
//! out identically whichever runner is used.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration and validation
//! - [`decision`] -- The [`ActionSource`] trait and built-in sources
//! - [`actions`] -- Speaking order, candidates, action execution, tally
//! - [`cycle`] -- Day and night steps shared by both runners
//! - [`observer`] -- Progress hooks for batch games
//! - [`runner`] -- Unattended game loop
//! - [`session`] -- Step-wise game with one external participant

pub mod actions;
pub mod config;
pub mod cycle;
pub mod decision;
pub mod observer;
pub mod runner;
pub mod session;

pub use config::{ConfigError, GameConfig};
pub use cycle::{CycleError, NightOutcome, PhaseSummary};
pub use decision::{ActionSource, ActionSources, RandomActionSource, ScriptedActionSource};
pub use observer::{GameObserver, NoOpObserver};
pub use runner::{EndReason, GameResult, RunnerError, log_game_end, run_game};
pub use session::{GameSession, SessionError, Step, Summarizer};

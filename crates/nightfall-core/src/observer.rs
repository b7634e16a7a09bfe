//! Progress hooks for front-ends.

use nightfall_rules::GameSnapshot;

use crate::cycle::PhaseSummary;

/// Callback invoked as a batch game progresses.
///
/// Implementations can stream statements to a UI or record per-phase
/// summaries. The callback receives the summary and the current snapshot.
pub trait GameObserver {
    /// Called after each discussion statement is logged.
    fn on_statement(&mut self, _speaker: &str, _text: &str) {}

    /// Called after each day or night phase completes.
    fn on_phase_end(&mut self, summary: &PhaseSummary, game: &GameSnapshot);
}

/// A no-op observer.
pub struct NoOpObserver;

impl GameObserver for NoOpObserver {
    fn on_phase_end(&mut self, _summary: &PhaseSummary, _game: &GameSnapshot) {}
}

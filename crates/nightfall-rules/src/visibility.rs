//! Per-viewer log filtering.
//!
//! Filtering rules, keyed on [`LogCategory`]:
//!
//! - role reveal: only the participant it names
//! - divine act and divine result: only a seer it names
//! - guard act: only a knight it names
//! - medium result: only a medium it names
//! - wolf allies: every wolf-role holder (not the madman)
//! - everything else, guard success included: everyone
//!
//! The public-only log drops every private category regardless of viewer.

use nightfall_types::{LogCategory, LogEntry, Role};

use crate::error::GameError;
use crate::participant::Participant;
use crate::snapshot::GameSnapshot;

/// Whether `viewer` may see `entry`.
pub fn visible_to(entry: &LogEntry, viewer: &Participant) -> bool {
    let named = || entry.names(&viewer.name);
    match entry.category() {
        LogCategory::RoleReveal => named(),
        LogCategory::DivineAct | LogCategory::DivineResult => viewer.role == Role::Seer && named(),
        LogCategory::GuardAct => viewer.role == Role::Knight && named(),
        LogCategory::MediumResult => viewer.role == Role::Medium && named(),
        LogCategory::WolfAlly => viewer.role.is_wolf(),
        LogCategory::GuardSuccess | LogCategory::Statement | LogCategory::Event => true,
    }
}

/// The subsequence of `entries` that `viewer` may see.
pub fn filter_for(entries: &[LogEntry], viewer: &Participant) -> Vec<LogEntry> {
    entries
        .iter()
        .filter(|e| visible_to(e, viewer))
        .cloned()
        .collect()
}

/// The subsequence visible to everyone, for the summary collaborator.
pub fn public_log(entries: &[LogEntry]) -> Vec<LogEntry> {
    entries
        .iter()
        .filter(|e| !e.category().is_private())
        .cloned()
        .collect()
}

/// Keep every non-statement entry and only the last `max_recent`
/// statements. A negative cap keeps all statements.
pub fn cap_statements(entries: Vec<LogEntry>, max_recent: i64) -> Vec<LogEntry> {
    let Ok(cap) = usize::try_from(max_recent) else {
        return entries;
    };
    let statements = entries
        .iter()
        .filter(|e| e.category() == LogCategory::Statement)
        .count();
    let mut skip = statements.saturating_sub(cap);

    entries
        .into_iter()
        .filter(|e| {
            if skip > 0 && e.category() == LogCategory::Statement {
                skip = skip.saturating_sub(1);
                false
            } else {
                true
            }
        })
        .collect()
}

/// The log as `viewer_name` sees it, with the statement cap applied.
pub fn context_for(
    game: &GameSnapshot,
    viewer_name: &str,
    max_recent: i64,
) -> Result<Vec<LogEntry>, GameError> {
    let viewer = game
        .find(viewer_name, false)
        .ok_or_else(|| GameError::UnknownParticipant(viewer_name.to_owned()))?;
    Ok(cap_statements(filter_for(game.log(), viewer), max_recent))
}

//! Integration tests for step-wise sessions with one external participant.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::too_many_lines
)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use nightfall_core::{
    ActionSource, ActionSources, CycleError, GameSession, ScriptedActionSource, SessionError,
    Step, Summarizer,
};
use nightfall_rules::{Board, GameSnapshot, Participant, new_game};
use nightfall_types::{Ability, LogEntry, Role, Team, Verdict};
use rand::SeedableRng;
use rand::rngs::StdRng;

const NAMES: [&str; 9] = [
    "Alice", "Bob", "Carol", "Dave", "Eve", "Frank", "Grace", "Heidi", "Ivan",
];

fn fixed_roster() -> Vec<Participant> {
    vec![
        Participant::new("Alice", Role::Seer),
        Participant::new("Bob", Role::Werewolf),
        Participant::new("Carol", Role::Villager),
        Participant::new("Dave", Role::Knight),
        Participant::new("Eve", Role::Villager),
        Participant::new("Frank", Role::Werewolf),
        Participant::new("Grace", Role::Medium),
        Participant::new("Heidi", Role::Madman),
        Participant::new("Ivan", Role::Villager),
    ]
}

/// Scripted sources for everyone but `external`, with overrides.
fn scripted(external: &str, overrides: Vec<(&str, ScriptedActionSource)>) -> ActionSources {
    let mut plans: BTreeMap<String, ScriptedActionSource> = NAMES
        .iter()
        .filter(|n| **n != external)
        .map(|n| ((*n).to_owned(), ScriptedActionSource::new()))
        .collect();
    for (name, plan) in overrides {
        plans.insert(name.to_owned(), plan);
    }
    plans
        .into_iter()
        .map(|(name, plan)| {
            let source: Box<dyn ActionSource> = Box::new(plan);
            (name, source)
        })
        .collect()
}

/// Everyone votes for `targets` in turn, except that a voter whose own name
/// comes up votes for `fallback` instead.
fn voting(external: &str, targets: &[&str], fallback: &str) -> Vec<(String, ScriptedActionSource)> {
    NAMES
        .iter()
        .filter(|n| **n != external)
        .map(|n| {
            let votes: Vec<&str> = targets
                .iter()
                .map(|t| if t == n { fallback } else { *t })
                .collect();
            ((*n).to_owned(), ScriptedActionSource::new().with_votes(votes))
        })
        .collect()
}

fn session(external: &str, sources: ActionSources, seed: u64) -> GameSession<StdRng> {
    let mut rng = StdRng::seed_from_u64(seed);
    let game = new_game(fixed_roster(), &mut rng);
    GameSession::new(game, sources, external, rng).unwrap()
}

fn statements_on_day(game: &GameSnapshot, wanted: u32) -> usize {
    let mut day = 0;
    game.log()
        .iter()
        .filter(|e| {
            if let LogEntry::DayHeader { day: d } = e {
                day = *d;
            }
            day == wanted && matches!(e, LogEntry::Statement { .. })
        })
        .count()
}

/// Drive a whole discussion, speaking `text` whenever asked.
fn discuss(s: &mut GameSession<StdRng>, text: &str) {
    s.start_discussion().unwrap();
    while !s.submit_statement(text).unwrap().vote_ready {}
    assert_eq!(s.step(), Step::Vote);
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn unknown_external_is_rejected() {
    let mut rng = StdRng::seed_from_u64(1);
    let game = new_game(fixed_roster(), &mut rng);
    let err = GameSession::new(game, scripted("Carol", vec![]), "Zed", rng).err();
    assert!(matches!(err, Some(SessionError::Game { .. })));
}

#[test]
fn missing_source_is_rejected() {
    let mut rng = StdRng::seed_from_u64(1);
    let game = new_game(fixed_roster(), &mut rng);
    let mut sources = scripted("Carol", vec![]);
    sources.remove("Ivan");
    let err = GameSession::new(game, sources, "Carol", rng).err();
    assert!(matches!(
        err,
        Some(SessionError::Cycle {
            source: CycleError::MissingActionSource { name }
        }) if name == "Ivan"
    ));
}

#[test]
fn new_session_waits_at_role_reveal() {
    let s = session("Carol", scripted("Carol", vec![]), 2);
    assert_eq!(s.step(), Step::RoleReveal);
    assert_eq!(s.external(), "Carol");
    assert_eq!(s.order().len(), 9);
    assert_eq!(s.round(), 0);
    assert_eq!(s.winner(), None);
}

// =============================================================================
// Transitions
// =============================================================================

#[test]
fn out_of_order_calls_change_nothing() {
    let mut s = session("Carol", scripted("Carol", vec![]), 3);
    let before = s.game().clone();

    assert!(matches!(
        s.submit_statement("hello"),
        Err(SessionError::InvalidTransition {
            step: Step::RoleReveal,
            ..
        })
    ));
    assert!(s.submit_vote(Some("Bob")).is_err());
    assert!(s.begin_night().is_err());
    assert!(s.submit_night_action(Some("Bob")).is_err());
    assert_eq!(s.game(), &before);
    assert_eq!(s.step(), Step::RoleReveal);

    s.start_discussion().unwrap();
    let during = s.game().clone();
    assert!(s.start_discussion().is_err());
    assert!(s.submit_vote(None).is_err());
    assert_eq!(s.game(), &during);
    assert_eq!(s.step(), Step::Discussion);
}

#[test]
fn transition_error_names_the_step() {
    let mut s = session("Carol", scripted("Carol", vec![]), 3);
    let err = s.begin_night().unwrap_err();
    assert_eq!(err.to_string(), "cannot begin the night during role_reveal");
}

// =============================================================================
// A villager plays two days
// =============================================================================

#[test]
fn villager_plays_through_two_days() {
    let mut overrides = voting("Carol", &["Bob", "Ivan"], "Carol");
    overrides.push((
        "Frank".to_owned(),
        ScriptedActionSource::new()
            .with_votes(["Bob", "Ivan"])
            .with_night_targets(["Eve"]),
    ));
    let sources = scripted(
        "Carol",
        overrides
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let mut s = session("Carol", sources, 4);

    // day 1: one round
    let opening = s.start_discussion().unwrap();
    assert_eq!(s.step(), Step::Discussion);
    assert_eq!(s.round(), 1);
    assert!(!opening.vote_ready);
    let rest = s.submit_statement("I am just a villager").unwrap();
    assert!(rest.vote_ready);
    assert_eq!(s.step(), Step::Vote);
    assert_eq!(opening.statements.len().saturating_add(rest.statements.len()), 8);
    assert_eq!(statements_on_day(s.game(), 1), 9);
    assert!(s.game().log().contains(&LogEntry::Statement {
        speaker: "Carol".into(),
        text: "I am just a villager".into(),
    }));

    // vote: Carol first, then everyone else in roster order
    assert_eq!(s.vote_candidates().len(), 8);
    let vote = s.submit_vote(Some("Bob")).unwrap();
    assert_eq!(vote.ballots.len(), 9);
    assert_eq!(vote.ballots[0].voter, "Carol");
    let executed = vote.executed.unwrap();
    assert_eq!(executed.target, "Bob");
    assert_eq!(executed.votes, 8);
    assert_eq!(vote.winner, None);
    assert_eq!(s.step(), Step::ExecutionResult);

    // night: a villager has nothing to do, so it resolves at once
    assert_eq!(s.night_ability(), None);
    let report = s.begin_night().unwrap().unwrap();
    assert_eq!(report.outcome.killed.as_deref(), Some("Eve"));
    assert_eq!(report.winner, None);
    assert_eq!(s.step(), Step::NightResult);
    assert_eq!(s.game().day(), 2);
    assert!(!s.order().iter().any(|n| n == "Eve"));

    // day 2: two rounds
    s.start_discussion().unwrap();
    assert_eq!(s.round(), 1);
    let first = s.submit_statement("round one").unwrap();
    assert!(!first.vote_ready);
    assert_eq!(s.round(), 2);
    let second = s.submit_statement("round two").unwrap();
    assert!(second.vote_ready);
    assert_eq!(s.round(), 0);
    assert_eq!(statements_on_day(s.game(), 2), 14);

    // the medium heard about Bob; Carol's view leaves that out
    assert!(s.game().log().contains(&LogEntry::MediumResult {
        medium: "Grace".into(),
        executed: "Bob".into(),
        verdict: Verdict::Wolf,
    }));
    let context = s.context(-1).unwrap();
    assert!(!context.iter().any(|e| matches!(e, LogEntry::MediumResult { .. })));
    assert!(!context.iter().any(|e| matches!(e, LogEntry::WolfAllies { .. })));
    let reveals: Vec<&LogEntry> = context
        .iter()
        .filter(|e| matches!(e, LogEntry::RoleReveal { .. }))
        .collect();
    assert_eq!(
        reveals,
        vec![&LogEntry::RoleReveal {
            name: "Carol".into(),
            role: Role::Villager
        }]
    );
    let capped = s.context(3).unwrap();
    assert_eq!(
        capped
            .iter()
            .filter(|e| matches!(e, LogEntry::Statement { .. }))
            .count(),
        3
    );

    let vote = s.submit_vote(Some("Ivan")).unwrap();
    assert_eq!(vote.executed.unwrap().target, "Ivan");
    assert_eq!(s.step(), Step::ExecutionResult);
}

#[test]
fn illegal_vote_is_dropped() {
    let sources = scripted(
        "Carol",
        voting("Carol", &["Bob"], "Carol")
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let mut s = session("Carol", sources, 5);
    discuss(&mut s, "...");

    let vote = s.submit_vote(Some("Carol")).unwrap();
    assert_eq!(vote.ballots.len(), 8);
    assert!(vote.ballots.iter().all(|b| b.voter != "Carol"));
    assert!(!s.game().log().iter().any(|e| matches!(
        e,
        LogEntry::Vote { voter, .. } if voter == "Carol"
    )));
}

// =============================================================================
// Night roles
// =============================================================================

#[test]
fn seer_divines_and_learns_next_morning() {
    let sources = scripted(
        "Alice",
        voting("Alice", &["Heidi"], "Ivan")
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let mut s = session("Alice", sources, 6);
    discuss(&mut s, "I have a feeling");
    s.submit_vote(Some("Heidi")).unwrap();

    assert!(s.begin_night().unwrap().is_none());
    assert_eq!(s.step(), Step::NightAction);
    assert_eq!(s.night_ability(), Some(Ability::Divine));
    let candidates: Vec<String> = s.night_candidates().into_iter().map(|p| p.name).collect();
    assert!(!candidates.contains(&"Alice".to_owned()));
    assert!(!candidates.contains(&"Heidi".to_owned()));

    let report = s.submit_night_action(Some("Frank")).unwrap();
    assert_eq!(report.winner, None);
    assert_eq!(s.step(), Step::NightResult);
    // the knight's default guard covers Alice against Bob's default attack
    assert!(report.outcome.attack_blocked);
    assert_eq!(s.game().divinations().len(), 1);

    s.start_discussion().unwrap();
    let context = s.context(-1).unwrap();
    assert!(context.contains(&LogEntry::DivineResult {
        seer: "Alice".into(),
        target: "Frank".into(),
        verdict: Verdict::Wolf,
    }));
    assert!(context.contains(&LogEntry::DivineAct {
        seer: "Alice".into(),
        target: "Frank".into(),
    }));
}

#[test]
fn knight_may_guard_the_same_person_twice() {
    let mut overrides = voting("Dave", &["Heidi", "Ivan"], "Carol");
    overrides.push((
        "Bob".to_owned(),
        ScriptedActionSource::new()
            .with_votes(["Heidi", "Ivan"])
            .with_night_targets(["Alice", "Alice"]),
    ));
    let sources = scripted(
        "Dave",
        overrides
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let mut s = session("Dave", sources, 7);

    discuss(&mut s, "day one");
    s.submit_vote(Some("Heidi")).unwrap();
    assert!(s.begin_night().unwrap().is_none());
    assert_eq!(s.night_ability(), Some(Ability::Guard));
    let report = s.submit_night_action(Some("Alice")).unwrap();
    assert!(report.outcome.attack_blocked);

    discuss(&mut s, "day two");
    s.submit_vote(Some("Ivan")).unwrap();
    assert!(s.begin_night().unwrap().is_none());
    let offered: Vec<String> = s.night_candidates().into_iter().map(|p| p.name).collect();
    assert!(!offered.contains(&"Alice".to_owned()));
    let report = s.submit_night_action(Some("Alice")).unwrap();
    assert!(report.outcome.attack_blocked);
    assert_eq!(report.outcome.killed, None);

    let guards = s.game().guards();
    assert_eq!(guards.len(), 2);
    assert!(guards.iter().all(|g| g.knight == "Dave" && g.target == "Alice"));
    assert_eq!(
        s.game()
            .log()
            .iter()
            .filter(|e| matches!(e, LogEntry::GuardSuccess { .. }))
            .count(),
        2
    );
}

#[test]
fn skipped_night_action_has_no_effect() {
    let sources = scripted(
        "Dave",
        voting("Dave", &["Heidi"], "Carol")
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let mut s = session("Dave", sources, 8);
    discuss(&mut s, "...");
    s.submit_vote(None).unwrap();
    assert!(s.begin_night().unwrap().is_none());
    s.submit_night_action(None).unwrap();
    assert!(s.game().guards().is_empty());
    assert!(!s.game().log().iter().any(|e| matches!(e, LogEntry::GuardAct { .. })));
}

#[test]
fn unknown_or_self_night_target_does_nothing() {
    let sources = scripted(
        "Dave",
        voting("Dave", &["Heidi", "Ivan"], "Carol")
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let mut s = session("Dave", sources, 12);

    discuss(&mut s, "day one");
    s.submit_vote(None).unwrap();
    assert!(s.begin_night().unwrap().is_none());
    let report = s.submit_night_action(Some("Zed")).unwrap();
    assert_eq!(s.step(), Step::NightResult);
    assert!(!report.outcome.attack_blocked);
    // nobody guarded Alice, so Bob's default attack lands
    assert_eq!(report.outcome.killed.as_deref(), Some("Alice"));
    assert!(s.game().guards().is_empty());
    assert!(s.game().divinations().is_empty());

    discuss(&mut s, "day two");
    s.submit_vote(None).unwrap();
    assert!(s.begin_night().unwrap().is_none());
    let report = s.submit_night_action(Some("Dave")).unwrap();
    assert_eq!(s.step(), Step::NightResult);
    assert_eq!(report.winner, None);
    assert_eq!(report.outcome.killed.as_deref(), Some("Carol"));
    assert!(s.game().guards().is_empty());
    assert!(!s.game().log().iter().any(|e| matches!(e, LogEntry::GuardAct { .. })));
}

#[test]
fn second_wolf_has_no_night_action() {
    let mut overrides = voting("Frank", &["Heidi"], "Ivan");
    overrides.push((
        "Bob".to_owned(),
        ScriptedActionSource::new()
            .with_votes(["Heidi"])
            .with_night_targets(["Carol"]),
    ));
    let sources = scripted(
        "Frank",
        overrides
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let mut s = session("Frank", sources, 13);

    discuss(&mut s, "not me");
    s.submit_vote(Some("Heidi")).unwrap();
    assert_eq!(s.night_ability(), None);
    assert!(s.night_candidates().is_empty());

    // Bob acts for the wolves, so the night resolves at once
    let report = s.begin_night().unwrap().unwrap();
    assert_eq!(s.step(), Step::NightResult);
    assert_eq!(report.outcome.killed.as_deref(), Some("Carol"));
    assert!(s.submit_night_action(Some("Ivan")).is_err());
}

// =============================================================================
// Dead external participant
// =============================================================================

#[test]
fn dead_external_participant_watches() {
    let sources = scripted(
        "Carol",
        voting("Carol", &["Carol", "Ivan"], "Eve")
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let mut s = session("Carol", sources, 9);
    discuss(&mut s, "please spare me");
    let vote = s.submit_vote(Some("Bob")).unwrap();
    assert_eq!(vote.executed.unwrap().target, "Carol");

    let report = s.begin_night().unwrap().unwrap();
    assert_eq!(report.winner, None);
    let alive = s.game().alive().count();

    let opening = s.start_discussion().unwrap();
    assert_eq!(opening.statements.len(), alive);
    let round_two = s.submit_statement("ghost words").unwrap();
    assert!(!round_two.vote_ready);
    assert_eq!(round_two.statements.len(), alive);
    assert!(s.submit_statement("ghost words").unwrap().vote_ready);
    assert!(!s.game().log().iter().any(|e| matches!(
        e,
        LogEntry::Statement { text, .. } if text == "ghost words"
    )));

    assert!(s.vote_candidates().is_empty());
    let vote = s.submit_vote(Some("Bob")).unwrap();
    assert!(vote.ballots.iter().all(|b| b.voter != "Carol"));
    assert_eq!(vote.ballots.len(), alive);
}

// =============================================================================
// Game over
// =============================================================================

#[test]
fn executing_the_last_wolf_ends_the_session() {
    let roster = vec![
        Participant::new("Alice", Role::Seer),
        Participant::new("Bob", Role::Werewolf),
        Participant::new("Carol", Role::Villager),
    ];
    let mut rng = StdRng::seed_from_u64(10);
    let game = new_game(roster, &mut rng);
    let mut sources: ActionSources = BTreeMap::new();
    let alice: Box<dyn ActionSource> = Box::new(ScriptedActionSource::new().with_votes(["Bob"]));
    let bob: Box<dyn ActionSource> = Box::new(ScriptedActionSource::new().with_votes(["Carol"]));
    sources.insert("Alice".to_owned(), alice);
    sources.insert("Bob".to_owned(), bob);

    let mut s = GameSession::new(game, sources, "Carol", rng).unwrap();
    discuss(&mut s, "it was Bob");
    let vote = s.submit_vote(Some("Bob")).unwrap();
    assert_eq!(vote.winner, Some(Team::Village));
    assert_eq!(s.step(), Step::GameOver);
    assert_eq!(s.winner(), Some(Team::Village));
    assert_eq!(
        s.game().log().last(),
        Some(&LogEntry::GameEnd {
            winner: Team::Village
        })
    );
    assert!(s.begin_night().is_err());
    assert!(s.start_discussion().is_err());
}

#[test]
fn a_night_kill_can_end_the_session() {
    let roster = vec![
        Participant::new("Alice", Role::Villager),
        Participant::new("Bob", Role::Werewolf),
        Participant::new("Carol", Role::Villager),
        Participant::new("Dave", Role::Villager),
    ];
    let mut rng = StdRng::seed_from_u64(14);
    let game = new_game(roster, &mut rng);
    let mut sources: ActionSources = BTreeMap::new();
    for (name, target) in [("Bob", "Carol"), ("Carol", "Dave"), ("Dave", "Carol")] {
        let source: Box<dyn ActionSource> =
            Box::new(ScriptedActionSource::new().with_votes([target]));
        sources.insert(name.to_owned(), source);
    }

    let mut s = GameSession::new(game, sources, "Alice", rng).unwrap();
    discuss(&mut s, "Carol is quiet");
    let vote = s.submit_vote(Some("Carol")).unwrap();
    assert_eq!(vote.executed.unwrap().target, "Carol");
    assert_eq!(vote.winner, None);
    assert_eq!(s.step(), Step::ExecutionResult);

    // Bob's default target is the first non-wolf: Alice
    let report = s.begin_night().unwrap().unwrap();
    assert_eq!(report.outcome.killed.as_deref(), Some("Alice"));
    assert_eq!(report.winner, Some(Team::Werewolf));
    assert_eq!(s.step(), Step::GameOver);
    assert_eq!(s.winner(), Some(Team::Werewolf));
    assert_eq!(
        s.game().log().last(),
        Some(&LogEntry::GameEnd {
            winner: Team::Werewolf
        })
    );
    assert!(s.start_discussion().is_err());
}

// =============================================================================
// Summaries
// =============================================================================

#[derive(Clone, Default)]
struct Notes {
    calls: Rc<RefCell<Vec<(u32, Vec<LogEntry>)>>>,
}

impl Summarizer for Notes {
    fn summarize(&mut self, game: &GameSnapshot, board: &Board, fresh: &[LogEntry]) -> String {
        self.calls.borrow_mut().push((game.day(), fresh.to_vec()));
        format!("day {} with {} dead", game.day(), board.dead.len())
    }
}

#[test]
fn summarizer_runs_from_the_second_day() {
    let sources = scripted(
        "Carol",
        voting("Carol", &["Heidi", "Ivan"], "Eve")
            .iter()
            .map(|(n, p)| (n.as_str(), p.clone()))
            .collect(),
    );
    let notes = Notes::default();
    let mut s = session("Carol", sources, 11).with_summarizer(Box::new(notes.clone()));

    discuss(&mut s, "...");
    assert!(notes.calls.borrow().is_empty());
    assert!(s.game().summary().is_none());
    s.submit_vote(Some("Heidi")).unwrap();
    s.begin_night().unwrap();
    s.start_discussion().unwrap();

    let calls = notes.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (day, fresh) = &calls[0];
    assert_eq!(*day, 2);
    assert!(fresh.iter().all(|e| !e.category().is_private()));
    assert!(fresh.contains(&LogEntry::GameStart));

    let summary = s.game().summary().unwrap();
    assert!(summary.text.starts_with("day 2 with "));
    assert!(summary.log_offset <= s.game().log().len());
    assert!(s.game().log_since_summary().len() < s.game().log().len());
}

//! Action source trait and built-in implementations.
//!
//! Whenever the cycle needs a participant to act, it asks that
//! participant's [`ActionSource`]. The trait abstracts where the choice
//! comes from -- a scripted bot, a text-generation agent, a relay for a
//! remote player. The cycle calls each method exactly once per decision
//! and never retries; whatever comes back is validated and, if illegal,
//! downgraded to no effect.
//!
//! Two sources ship with the crate: [`RandomActionSource`] for unattended
//! games and [`ScriptedActionSource`] for scenario tests.

use std::collections::{BTreeMap, VecDeque};

use nightfall_rules::{GameSnapshot, Participant};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// A source of participant decisions.
///
/// Every method must return a value. Returning a name that is not among
/// `candidates` is allowed; the cycle treats it as no choice.
pub trait ActionSource {
    /// Produce one discussion statement.
    fn discuss(&mut self, game: &GameSnapshot, me: &Participant) -> String;

    /// Pick whom to vote for. `candidates` is every other living participant.
    fn vote(&mut self, game: &GameSnapshot, me: &Participant, candidates: &[Participant])
    -> String;

    /// Pick whom to divine.
    fn divine(
        &mut self,
        game: &GameSnapshot,
        me: &Participant,
        candidates: &[Participant],
    ) -> String;

    /// Pick whom to attack.
    fn attack(
        &mut self,
        game: &GameSnapshot,
        me: &Participant,
        candidates: &[Participant],
    ) -> String;

    /// Pick whom to guard.
    fn guard(&mut self, game: &GameSnapshot, me: &Participant, candidates: &[Participant])
    -> String;
}

/// Action sources keyed by participant name.
pub type ActionSources = BTreeMap<String, Box<dyn ActionSource>>;

/// Filler lines for unattended discussion.
pub const FILLER_STATEMENTS: [&str; 8] = [
    "Hmm, who could the wolf be...",
    "Someone acted strangely last night, I think.",
    "I'd like to hear what everyone thinks.",
    "I'm a villager. Please trust me.",
    "There is someone I'm a little worried about.",
    "We don't know much yet, let's be careful.",
    "I feel like someone is lying.",
    "We need to decide who to vote for.",
];

/// Picks uniformly among the offered candidates.
///
/// Holds its own [`StdRng`] so that each participant's choices are
/// reproducible independently of the game's shared RNG.
#[derive(Debug, Clone)]
pub struct RandomActionSource {
    rng: StdRng,
}

impl RandomActionSource {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a source seeded from the caller's RNG.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random())
    }

    /// One source per name, each seeded in turn from `rng`.
    pub fn for_all<R: Rng + ?Sized>(names: &[String], rng: &mut R) -> ActionSources {
        names
            .iter()
            .map(|name| {
                let source: Box<dyn ActionSource> = Box::new(Self::from_rng(&mut *rng));
                (name.clone(), source)
            })
            .collect()
    }

    fn pick(&mut self, me: &Participant, candidates: &[Participant]) -> String {
        candidates
            .choose(&mut self.rng)
            .map_or_else(|| me.name.clone(), |p| p.name.clone())
    }
}

impl ActionSource for RandomActionSource {
    fn discuss(&mut self, _game: &GameSnapshot, _me: &Participant) -> String {
        FILLER_STATEMENTS
            .choose(&mut self.rng)
            .map_or_else(String::new, |s| (*s).to_owned())
    }

    fn vote(&mut self, _game: &GameSnapshot, me: &Participant, candidates: &[Participant]) -> String {
        self.pick(me, candidates)
    }

    fn divine(
        &mut self,
        _game: &GameSnapshot,
        me: &Participant,
        candidates: &[Participant],
    ) -> String {
        self.pick(me, candidates)
    }

    fn attack(
        &mut self,
        _game: &GameSnapshot,
        me: &Participant,
        candidates: &[Participant],
    ) -> String {
        self.pick(me, candidates)
    }

    fn guard(&mut self, _game: &GameSnapshot, me: &Participant, candidates: &[Participant]) -> String {
        self.pick(me, candidates)
    }
}

/// Replays a fixed plan.
///
/// Statements, votes and night targets are consumed in order. When a queue
/// runs dry the source falls back to a fixed statement or to the first
/// candidate.
#[derive(Debug, Clone, Default)]
pub struct ScriptedActionSource {
    statements: VecDeque<String>,
    votes: VecDeque<String>,
    night_targets: VecDeque<String>,
}

impl ScriptedActionSource {
    /// An empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue discussion statements.
    #[must_use]
    pub fn with_statements<I, S>(mut self, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statements.extend(statements.into_iter().map(Into::into));
        self
    }

    /// Queue vote targets, one per day.
    #[must_use]
    pub fn with_votes<I, S>(mut self, votes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.votes.extend(votes.into_iter().map(Into::into));
        self
    }

    /// Queue night targets, one per night, for whichever ability the
    /// participant holds.
    #[must_use]
    pub fn with_night_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.night_targets
            .extend(targets.into_iter().map(Into::into));
        self
    }

    fn first_or_self(me: &Participant, candidates: &[Participant]) -> String {
        candidates
            .first()
            .map_or_else(|| me.name.clone(), |p| p.name.clone())
    }

    fn next_night(&mut self, me: &Participant, candidates: &[Participant]) -> String {
        self.night_targets
            .pop_front()
            .unwrap_or_else(|| Self::first_or_self(me, candidates))
    }
}

impl ActionSource for ScriptedActionSource {
    fn discuss(&mut self, _game: &GameSnapshot, _me: &Participant) -> String {
        self.statements
            .pop_front()
            .unwrap_or_else(|| String::from("..."))
    }

    fn vote(&mut self, _game: &GameSnapshot, me: &Participant, candidates: &[Participant]) -> String {
        self.votes
            .pop_front()
            .unwrap_or_else(|| Self::first_or_self(me, candidates))
    }

    fn divine(
        &mut self,
        _game: &GameSnapshot,
        me: &Participant,
        candidates: &[Participant],
    ) -> String {
        self.next_night(me, candidates)
    }

    fn attack(
        &mut self,
        _game: &GameSnapshot,
        me: &Participant,
        candidates: &[Participant],
    ) -> String {
        self.next_night(me, candidates)
    }

    fn guard(&mut self, _game: &GameSnapshot, me: &Participant, candidates: &[Participant]) -> String {
        self.next_night(me, candidates)
    }
}

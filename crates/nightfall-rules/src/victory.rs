//! Victory evaluation.
//!
//! Counts are by the wolf role, not by team: a living madman neither keeps
//! the werewolf side alive nor counts toward its total.

use nightfall_types::Team;

use crate::snapshot::GameSnapshot;

/// Return the winning faction, or `None` while the game goes on.
///
/// - Village wins when no wolf-role holder is alive.
/// - Werewolf wins when the living non-wolves are no more than the living
///   wolves.
pub fn evaluate(game: &GameSnapshot) -> Option<Team> {
    let wolves = game.alive_wolves().count();
    let others = game.alive_non_wolves().count();

    if wolves == 0 {
        Some(Team::Village)
    } else if others <= wolves {
        Some(Team::Werewolf)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nightfall_types::{GameId, Role};

    use super::*;
    use crate::participant::Participant;

    fn game(roles: &[(&str, Role)]) -> GameSnapshot {
        GameSnapshot::new(
            GameId::from_random_bytes([3; 16]),
            roles
                .iter()
                .map(|(n, r)| Participant::new(*n, *r))
                .collect(),
        )
    }

    #[test]
    fn undecided_at_start() {
        let g = game(&[
            ("A", Role::Werewolf),
            ("B", Role::Villager),
            ("C", Role::Villager),
        ]);
        assert_eq!(evaluate(&g), None);
    }

    #[test]
    fn village_wins_with_living_madman() {
        let mut g = game(&[
            ("A", Role::Werewolf),
            ("B", Role::Madman),
            ("C", Role::Villager),
        ]);
        g.kill("A").unwrap();
        assert_eq!(evaluate(&g), Some(Team::Village));
    }

    #[test]
    fn werewolf_wins_at_parity() {
        let mut g = game(&[
            ("A", Role::Werewolf),
            ("B", Role::Villager),
            ("C", Role::Villager),
        ]);
        g.kill("C").unwrap();
        assert_eq!(evaluate(&g), Some(Team::Werewolf));
    }

    #[test]
    fn madman_counts_on_the_village_side_of_the_threshold() {
        let mut g = game(&[
            ("A", Role::Werewolf),
            ("B", Role::Madman),
            ("C", Role::Villager),
            ("D", Role::Villager),
        ]);
        g.kill("D").unwrap();
        // one wolf against madman + villager
        assert_eq!(evaluate(&g), None);
        g.kill("C").unwrap();
        assert_eq!(evaluate(&g), Some(Team::Werewolf));
    }

    /// Kill several rosters in many random orders. A winner appears the
    /// moment the last wolf dies or the non-wolves fall to the wolf count,
    /// and not a step earlier.
    #[test]
    fn winner_appears_exactly_at_the_threshold() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;

        let compositions: [&[Role]; 4] = [
            &crate::assignment::DEFAULT_COMPOSITION,
            &[
                Role::Werewolf,
                Role::Madman,
                Role::Villager,
                Role::Villager,
                Role::Villager,
            ],
            &[
                Role::Werewolf,
                Role::Werewolf,
                Role::Werewolf,
                Role::Seer,
                Role::Knight,
                Role::Medium,
                Role::Madman,
                Role::Villager,
                Role::Villager,
            ],
            &[Role::Werewolf, Role::Werewolf, Role::Seer, Role::Villager, Role::Villager],
        ];

        for roles in compositions {
            let names: Vec<String> = (0..roles.len()).map(|i| format!("P{i}")).collect();
            let seats: Vec<(&str, Role)> = names
                .iter()
                .map(String::as_str)
                .zip(roles.iter().copied())
                .collect();
            let base = game(&seats);
            let wolves = roles.iter().filter(|r| r.is_wolf()).count();
            let others = roles.len().saturating_sub(wolves);

            for seed in 0..200 {
                let mut order = seats.clone();
                order.shuffle(&mut StdRng::seed_from_u64(seed));

                let mut g = base.clone();
                let mut wolves_left = wolves;
                let mut others_left = others;
                for (name, role) in order {
                    g.kill(name).unwrap();
                    if role.is_wolf() {
                        wolves_left = wolves_left.saturating_sub(1);
                    } else {
                        others_left = others_left.saturating_sub(1);
                    }

                    let crossed = wolves_left == 0 || others_left <= wolves_left;
                    let result = evaluate(&g);
                    assert_eq!(result.is_some(), crossed, "{roles:?} seed {seed}");
                    if crossed {
                        let expected = if wolves_left == 0 {
                            Team::Village
                        } else {
                            Team::Werewolf
                        };
                        assert_eq!(result, Some(expected), "{roles:?} seed {seed}");
                        break;
                    }
                }
            }
        }
    }
}

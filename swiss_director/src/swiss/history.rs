//! Who has played whom, rebuilt from match records each round.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::tournament::models::{Match, PlayerId};

/// Opponents faced, byes received and pair-downs taken, per player
#[derive(Debug, Clone, Default)]
pub struct PairingHistory {
    opponents: HashMap<PlayerId, HashSet<PlayerId>>,
    byes: HashMap<PlayerId, u32>,
    pair_downs: HashMap<PlayerId, u32>,
}

impl PairingHistory {
    /// Build from every match so far, reported or not
    pub fn from_matches(matches: &[Match]) -> Self {
        let mut history = Self::default();

        let mut by_round: BTreeMap<u32, Vec<&Match>> = BTreeMap::new();
        for m in matches {
            by_round.entry(m.round_number).or_default().push(m);
        }

        // Points held entering each round, used to detect pair-downs
        let mut points: HashMap<PlayerId, u32> = HashMap::new();

        for round_matches in by_round.values() {
            for m in round_matches {
                if m.is_awarded_bye() {
                    *history.byes.entry(m.player_one).or_default() += 1;
                }

                let Some(player_two) = m.player_two else {
                    continue;
                };
                history.record_pairing(m.player_one, player_two);

                let p1_points = points.get(&m.player_one).copied().unwrap_or(0);
                let p2_points = points.get(&player_two).copied().unwrap_or(0);
                if p1_points > p2_points {
                    *history.pair_downs.entry(m.player_one).or_default() += 1;
                } else if p2_points > p1_points {
                    *history.pair_downs.entry(player_two).or_default() += 1;
                }
            }

            for m in round_matches.iter().filter(|m| m.is_complete()) {
                *points.entry(m.player_one).or_default() +=
                    m.outcome_for(m.player_one).match_points();
                if let Some(player_two) = m.player_two {
                    *points.entry(player_two).or_default() += m.outcome_for(player_two).match_points();
                }
            }
        }

        history
    }

    fn record_pairing(&mut self, a: PlayerId, b: PlayerId) {
        self.opponents.entry(a).or_default().insert(b);
        self.opponents.entry(b).or_default().insert(a);
    }

    /// Whether `a` and `b` have already been paired
    pub fn have_played(&self, a: PlayerId, b: PlayerId) -> bool {
        self.opponents.get(&a).is_some_and(|faced| faced.contains(&b))
    }

    /// Opponents `player` has faced
    pub fn opponents_of(&self, player: PlayerId) -> impl Iterator<Item = &PlayerId> {
        self.opponents.get(&player).into_iter().flatten()
    }

    /// Awarded byes received by `player`
    pub fn bye_count(&self, player: PlayerId) -> u32 {
        self.byes.get(&player).copied().unwrap_or(0)
    }

    /// Times `player` was paired against a lower-scored opponent
    pub fn pair_down_count(&self, player: PlayerId) -> u32 {
        self.pair_downs.get(&player).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::Round;
    use uuid::Uuid;

    fn round(n: u32) -> Round {
        Round::started(Uuid::new_v4(), Uuid::nil(), Uuid::nil(), n)
    }

    #[test]
    fn test_opponents_are_symmetric() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![Match::pairing(Uuid::new_v4(), &round(1), 1, a, b)];
        let history = PairingHistory::from_matches(&matches);

        assert!(history.have_played(a, b));
        assert!(history.have_played(b, a));
        assert!(!history.have_played(a, c));
        assert_eq!(history.opponents_of(a).count(), 1);
        assert_eq!(history.opponents_of(c).count(), 0);
    }

    #[test]
    fn test_byes_are_not_opponents() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![
            Match::bye(Uuid::new_v4(), &round(1), a, 2),
            Match::late_entry_loss(Uuid::new_v4(), &round(1), b, 2),
        ];
        let history = PairingHistory::from_matches(&matches);

        assert_eq!(history.bye_count(a), 1);
        assert_eq!(history.bye_count(b), 0);
        assert_eq!(history.opponents_of(a).count(), 0);
        assert!(!history.have_played(a, b));
    }

    #[test]
    fn test_pair_downs_detected() {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let r1 = round(1);
        let r2 = round(2);

        let mut m1 = Match::pairing(Uuid::new_v4(), &r1, 1, a, b);
        m1.submit_result(2, 0, 0).unwrap();
        let mut m2 = Match::pairing(Uuid::new_v4(), &r1, 2, c, d);
        m2.submit_result(2, 0, 0).unwrap();
        // a (3 points) meets d (0 points): a paired down
        let m3 = Match::pairing(Uuid::new_v4(), &r2, 1, a, d);
        let m4 = Match::pairing(Uuid::new_v4(), &r2, 2, c, b);

        let history = PairingHistory::from_matches(&[m1, m2, m3, m4]);
        assert_eq!(history.pair_down_count(a), 1);
        assert_eq!(history.pair_down_count(c), 1);
        assert_eq!(history.pair_down_count(b), 0);
        assert_eq!(history.pair_down_count(d), 0);
    }
}

//! Ranked standings table.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::tiebreakers::{PlayerRecord, build_records, tiebreakers_from_records};
use crate::tournament::config::{SwissConfig, Tiebreaker, TiebreakerProfile};
use crate::tournament::models::{Match, PlayerId, Registration, RegistrationStatus};

/// One row of the standings; derived on demand and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    /// 1-indexed position
    pub rank: u32,
    pub player_id: PlayerId,
    pub sequence_id: u32,
    pub status: RegistrationStatus,
    pub match_points: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub games_drawn: u32,
    pub matches_played: u32,
    pub bye_count: u32,
    pub match_win_pct: f64,
    pub opponent_match_win_pct: f64,
    pub game_win_pct: f64,
    pub opponent_game_win_pct: f64,
    pub opponents: Vec<PlayerId>,
}

impl StandingsEntry {
    fn new(registration: &Registration, record: &PlayerRecord) -> Self {
        Self {
            rank: 0,
            player_id: registration.player_id,
            sequence_id: registration.sequence_id,
            status: registration.status,
            match_points: record.match_points,
            wins: record.wins,
            losses: record.losses,
            draws: record.draws,
            games_won: record.games.won,
            games_lost: record.games.lost,
            games_drawn: record.games.drawn,
            matches_played: record.matches_played,
            bye_count: record.byes,
            match_win_pct: 0.0,
            opponent_match_win_pct: 0.0,
            game_win_pct: 0.0,
            opponent_game_win_pct: 0.0,
            opponents: record.opponents.clone(),
        }
    }

    /// Numeric value of one tiebreaker; `None` for the random step
    pub fn tiebreaker_value(&self, tiebreaker: Tiebreaker) -> Option<f64> {
        match tiebreaker {
            Tiebreaker::MatchPoints => Some(f64::from(self.match_points)),
            Tiebreaker::Omw => Some(self.opponent_match_win_pct),
            Tiebreaker::Ogw => Some(self.opponent_game_win_pct),
            Tiebreaker::Gw => Some(self.game_win_pct),
            Tiebreaker::Random => None,
        }
    }

    /// Ordered tiebreaker values for `profile`, random step omitted
    pub fn tiebreaker_values(&self, profile: &TiebreakerProfile) -> Vec<f64> {
        profile
            .chain()
            .into_iter()
            .filter_map(|tb| self.tiebreaker_value(tb))
            .collect()
    }
}

/// Compare two entries under the chain: match points first, then each
/// configured step, both descending. Stops at the first random step, which
/// only the ranking pass can settle.
pub fn compare_entries(a: &StandingsEntry, b: &StandingsEntry, chain: &[Tiebreaker]) -> Ordering {
    b.match_points.cmp(&a.match_points).then_with(|| {
        chain
            .iter()
            .map_while(|&tb| compare_step(a, b, tb))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Descending comparison on one numeric step; `None` for the random step
fn compare_step(
    a: &StandingsEntry,
    b: &StandingsEntry,
    tiebreaker: Tiebreaker,
) -> Option<Ordering> {
    Some(b.tiebreaker_value(tiebreaker)?.total_cmp(&a.tiebreaker_value(tiebreaker)?))
}

/// Full ranking order: the random step compares each entry's drawn key
/// where it sits in the chain, and a chain without one falls back to the
/// key after its last step.
fn compare_ranked(
    (a, a_key): (&StandingsEntry, u64),
    (b, b_key): (&StandingsEntry, u64),
    chain: &[Tiebreaker],
) -> Ordering {
    b.match_points
        .cmp(&a.match_points)
        .then_with(|| {
            chain
                .iter()
                .map(|&tb| compare_step(a, b, tb).unwrap_or_else(|| a_key.cmp(&b_key)))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a_key.cmp(&b_key))
        .then_with(|| a.sequence_id.cmp(&b.sequence_id))
}

/// Rank every registration with an RNG derived from `config.seed`
pub fn calculate_standings(
    registrations: &[Registration],
    matches: &[Match],
    config: &SwissConfig,
) -> Vec<StandingsEntry> {
    calculate_standings_with_rng(registrations, matches, config, &mut config.rng())
}

/// Rank every registration, dropped players included.
///
/// Entries are ordered by match points, then the configured chain. Each
/// entry draws a random key from `rng`, compared at the chain's random step
/// (or last, for true ties when the chain has none). Sequence id settles the
/// vanishingly rare case of two identical random keys, so the result is
/// always a total order.
pub fn calculate_standings_with_rng<R: Rng + ?Sized>(
    registrations: &[Registration],
    matches: &[Match],
    config: &SwissConfig,
    rng: &mut R,
) -> Vec<StandingsEntry> {
    let floor = config.percentage_floor;
    let records = build_records(matches);
    let empty = PlayerRecord::default();

    let mut keyed: Vec<(StandingsEntry, u64)> = registrations
        .iter()
        .map(|registration| {
            let record = records.get(&registration.player_id).unwrap_or(&empty);
            let values = tiebreakers_from_records(registration.player_id, &records, floor);

            let mut entry = StandingsEntry::new(registration, record);
            entry.match_win_pct = values.match_win_pct;
            entry.opponent_match_win_pct = values.opponent_match_win_pct;
            entry.game_win_pct = values.game_win_pct;
            entry.opponent_game_win_pct = values.opponent_game_win_pct;

            (entry, rng.random::<u64>())
        })
        .collect();

    let chain = config.tiebreakers.chain();
    keyed.sort_by(|(a, a_key), (b, b_key)| compare_ranked((a, *a_key), (b, *b_key), &chain));

    keyed
        .into_iter()
        .enumerate()
        .map(|(idx, (mut entry, _))| {
            entry.rank = idx as u32 + 1;
            entry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::Round;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uuid::Uuid;

    fn registrations(n: u32) -> Vec<Registration> {
        (1..=n).map(|seq| Registration::new(Uuid::new_v4(), seq)).collect()
    }

    fn played(round_number: u32, a: PlayerId, b: PlayerId, a_wins: u32, b_wins: u32) -> Match {
        let round = Round::started(Uuid::new_v4(), Uuid::nil(), Uuid::nil(), round_number);
        let mut m = Match::pairing(Uuid::new_v4(), &round, 1, a, b);
        m.submit_result(a_wins, b_wins, 0).unwrap();
        m
    }

    #[test]
    fn test_sorted_by_match_points() {
        let regs = registrations(4);
        let ids: Vec<PlayerId> = regs.iter().map(|r| r.player_id).collect();
        let matches = vec![
            played(1, ids[0], ids[1], 2, 0),
            played(1, ids[2], ids[3], 2, 1),
            played(2, ids[0], ids[2], 2, 1),
            played(2, ids[1], ids[3], 1, 2),
        ];

        let mut rng = StdRng::seed_from_u64(7);
        let standings = calculate_standings_with_rng(&regs, &matches, &SwissConfig::default(), &mut rng);

        assert_eq!(standings[0].player_id, ids[0]);
        assert_eq!(standings[0].match_points, 6);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[3].player_id, ids[1]);
        assert_eq!(standings[3].match_points, 0);
        // ids[2] and ids[3] both on 3 points; ids[2] lost only to the leader
        assert_eq!(standings[1].player_id, ids[2]);
        assert_eq!(standings[2].player_id, ids[3]);
    }

    #[test]
    fn test_dropped_players_remain_ranked() {
        let mut regs = registrations(2);
        regs[1].status = RegistrationStatus::Dropped;
        let matches = vec![played(1, regs[0].player_id, regs[1].player_id, 0, 2)];

        let mut rng = StdRng::seed_from_u64(1);
        let standings = calculate_standings_with_rng(&regs, &matches, &SwissConfig::default(), &mut rng);

        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].player_id, regs[1].player_id);
        assert_eq!(standings[0].status, RegistrationStatus::Dropped);
    }

    #[test]
    fn test_no_matches_all_floored() {
        let regs = registrations(3);
        let config = SwissConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let standings = calculate_standings_with_rng(&regs, &[], &config, &mut rng);

        assert_eq!(standings.len(), 3);
        for entry in &standings {
            assert_eq!(entry.match_points, 0);
            assert_eq!(entry.match_win_pct, config.percentage_floor);
            assert_eq!(entry.opponent_game_win_pct, config.percentage_floor);
        }
        let ranks: Vec<u32> = standings.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_same_seed_same_order() {
        let regs = registrations(6);
        let config = SwissConfig::default();
        let first = calculate_standings(&regs, &[], &config.clone().with_seed(42));
        let second = calculate_standings(&regs, &[], &config.with_seed(42));

        let order = |s: &[StandingsEntry]| s.iter().map(|e| e.player_id).collect::<Vec<_>>();
        assert_eq!(order(&first), order(&second));
    }

    #[test]
    fn test_profile_changes_order() {
        // a and b both on 3 points: a has the better GW%, b faced stronger opponents
        let regs = registrations(7);
        let ids: Vec<PlayerId> = regs.iter().map(|r| r.player_id).collect();
        let (a, b, c, d, e, f, g) = (ids[0], ids[1], ids[2], ids[3], ids[4], ids[5], ids[6]);
        let matches = vec![
            played(1, a, c, 2, 0),
            played(1, b, e, 2, 1),
            played(1, d, f, 0, 2),
            played(2, a, d, 0, 2),
            played(2, b, f, 0, 2),
            played(2, c, e, 0, 2),
            played(3, e, g, 2, 0),
        ];

        let position = |standings: &[StandingsEntry], player: PlayerId| {
            standings.iter().position(|e| e.player_id == player).unwrap()
        };

        let wotc = calculate_standings_with_rng(
            &regs,
            &matches,
            &SwissConfig::default(),
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(wotc[position(&wotc, a)].match_points, 3);
        assert_eq!(wotc[position(&wotc, b)].match_points, 3);
        assert!(position(&wotc, b) < position(&wotc, a));

        let gw_first = SwissConfig {
            tiebreakers: TiebreakerProfile::Custom(vec![Tiebreaker::Gw, Tiebreaker::Omw]),
            ..Default::default()
        };
        let by_games =
            calculate_standings_with_rng(&regs, &matches, &gw_first, &mut StdRng::seed_from_u64(0));
        assert!(position(&by_games, a) < position(&by_games, b));
    }

    #[test]
    fn test_tiebreaker_values_follow_profile() {
        let regs = registrations(2);
        let mut rng = StdRng::seed_from_u64(9);
        let standings = calculate_standings_with_rng(&regs, &[], &SwissConfig::default(), &mut rng);
        let values = standings[0].tiebreaker_values(&TiebreakerProfile::WotcStandard);
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], 0.0);
    }

    #[test]
    fn test_compare_entries_uses_chain_order() {
        let reg = Registration::new(Uuid::new_v4(), 1);
        let mut a = StandingsEntry::new(&reg, &PlayerRecord::default());
        let mut b = a.clone();
        a.opponent_match_win_pct = 0.6;
        a.game_win_pct = 0.4;
        b.opponent_match_win_pct = 0.5;
        b.game_win_pct = 0.9;

        assert_eq!(
            compare_entries(&a, &b, &[Tiebreaker::Omw, Tiebreaker::Gw]),
            Ordering::Less
        );
        assert_eq!(
            compare_entries(&a, &b, &[Tiebreaker::Gw, Tiebreaker::Omw]),
            Ordering::Greater
        );
    }

    #[test]
    fn test_random_step_applies_where_it_sits_in_the_chain() {
        // a and b both on 3 points; a won 2-0 (GW 1.0), b won 2-1 (GW 0.67)
        let regs = registrations(4);
        let ids: Vec<PlayerId> = regs.iter().map(|r| r.player_id).collect();
        let (a, b) = (ids[0], ids[1]);
        let matches = vec![played(1, a, ids[2], 2, 0), played(1, b, ids[3], 2, 1)];

        let random_first = SwissConfig {
            tiebreakers: TiebreakerProfile::Custom(vec![Tiebreaker::Random, Tiebreaker::Gw]),
            ..Default::default()
        };
        let games_first = SwissConfig {
            tiebreakers: TiebreakerProfile::Custom(vec![Tiebreaker::Gw, Tiebreaker::Random]),
            ..Default::default()
        };

        let mut a_leads = 0;
        for seed in 0..64 {
            let standings = calculate_standings_with_rng(
                &regs,
                &matches,
                &random_first,
                &mut StdRng::seed_from_u64(seed),
            );
            if standings[0].player_id == a {
                a_leads += 1;
            }
            assert!(standings[..2].iter().any(|e| e.player_id == b));

            let by_games = calculate_standings_with_rng(
                &regs,
                &matches,
                &games_first,
                &mut StdRng::seed_from_u64(seed),
            );
            assert_eq!(by_games[0].player_id, a);
        }
        assert!(a_leads > 0 && a_leads < 64, "a led {a_leads} of 64");
    }

    #[test]
    fn test_compare_entries_stops_at_random_step() {
        let reg = Registration::new(Uuid::new_v4(), 1);
        let a = StandingsEntry::new(&reg, &PlayerRecord::default());
        let mut b = a.clone();
        b.game_win_pct = 0.9;

        assert_eq!(
            compare_entries(&a, &b, &[Tiebreaker::Random, Tiebreaker::Gw]),
            Ordering::Equal
        );
        assert_eq!(
            compare_entries(&a, &b, &[Tiebreaker::Gw, Tiebreaker::Random]),
            Ordering::Greater
        );
    }
}

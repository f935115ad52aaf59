/// Property-based tests for pairing and standings using proptest
///
/// Whole events are simulated from a random field size, result seed and
/// optional mid-event drop, and every round's pairings and standings are
/// checked against the Swiss invariants.
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use swiss_director::swiss::standings::compare_entries;
use swiss_director::swiss::{PairingEngine, RoundPairings, StandingsEntry, calculate_standings};
use swiss_director::tournament::{Match, PlayerId, Registration, Round, SwissConfig, registration};
use uuid::Uuid;

const ROUNDS: u32 = 4;

// Fields of 10+ leave every player enough fresh opponents for four rounds
fn field_strategy() -> impl Strategy<Value = (u32, u64, Option<usize>)> {
    (10u32..=40, any::<u64>(), prop::option::of(0usize..10))
}

fn report(m: &mut Match, rng: &mut StdRng) {
    let (one, two, draws) = match rng.random_range(0..5) {
        0 => (2, 0, 0),
        1 => (2, 1, 0),
        2 => (0, 2, 0),
        3 => (1, 2, 0),
        _ => (1, 1, 1),
    };
    m.submit_result(one, two, draws).unwrap();
}

fn seats(pairings: &RoundPairings) -> Vec<PlayerId> {
    pairings
        .matches
        .iter()
        .flat_map(|m| std::iter::once(m.player_one).chain(m.player_two))
        .collect()
}

/// Run a full event, handing each round's pairings and the standings
/// entering that round to `check`
fn simulate(
    players: u32,
    seed: u64,
    drop_index: Option<usize>,
    mut check: impl FnMut(&[Registration], &[Match], &RoundPairings, &[StandingsEntry]),
) {
    let config = SwissConfig {
        max_rounds: ROUNDS,
        ..SwissConfig::default().with_seed(seed)
    };
    let mut regs: Vec<Registration> = (1..=players)
        .map(|seq| Registration::new(Uuid::new_v4(), seq))
        .collect();
    let mut engine = PairingEngine::new(config.clone());
    let mut results = StdRng::seed_from_u64(seed.wrapping_add(1));
    let (tid, cid) = (Uuid::new_v4(), Uuid::new_v4());
    let mut matches: Vec<Match> = Vec::new();

    for n in 1..=ROUNDS {
        if n == 3 {
            if let Some(idx) = drop_index {
                registration::drop_player(&mut regs[idx]).unwrap();
            }
        }

        let standings = calculate_standings(&regs, &matches, &config);
        let round = Round::started(Uuid::new_v4(), tid, cid, n);
        let pairings = if n == 1 {
            engine.pair_round_one(&regs, &round).unwrap()
        } else {
            engine.pair_round(&regs, &matches, &round, None).unwrap()
        };
        check(&regs, &matches, &pairings, &standings);

        let start = matches.len();
        matches.extend(pairings.matches);
        for m in matches[start..].iter_mut().filter(|m| !m.is_complete()) {
            report(m, &mut results);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_pairings_partition_active_players((players, seed, drop_index) in field_strategy()) {
        let mut violations = Vec::new();
        simulate(players, seed, drop_index, |regs, _, pairings, _| {
            let mut placed = seats(pairings);
            let unique: HashSet<PlayerId> = placed.iter().copied().collect();
            let mut active: Vec<PlayerId> =
                regs.iter().filter(|r| r.is_active()).map(|r| r.player_id).collect();
            placed.sort();
            active.sort();
            if unique.len() != placed.len() || placed != active {
                violations.push(pairings.round_number);
            }
            if (active.len() % 2 == 1) != pairings.bye.is_some() {
                violations.push(pairings.round_number);
            }
        });
        prop_assert!(violations.is_empty(), "bad partition in rounds {:?}", violations);
    }

    #[test]
    fn test_no_rematches((players, seed, drop_index) in field_strategy()) {
        let mut met: HashSet<(PlayerId, PlayerId)> = HashSet::new();
        let mut repeats = 0usize;
        let mut logged = 0usize;
        simulate(players, seed, drop_index, |_, _, pairings, _| {
            logged += pairings.rematches.len();
            for m in pairings.table_matches() {
                let (a, b) = (m.player_one, m.player_two.unwrap_or_default());
                let key = if a < b { (a, b) } else { (b, a) };
                if !met.insert(key) {
                    repeats += 1;
                }
            }
        });
        prop_assert_eq!(repeats, 0);
        prop_assert_eq!(logged, 0);
    }

    #[test]
    fn test_bye_cap_respected((players, seed, drop_index) in field_strategy()) {
        let mut byes: HashMap<PlayerId, u32> = HashMap::new();
        simulate(players, seed, drop_index, |_, _, pairings, _| {
            if let Some(player) = pairings.bye {
                *byes.entry(player).or_default() += 1;
            }
        });
        prop_assert!(byes.values().all(|&count| count <= 1), "byes: {:?}", byes);
    }

    #[test]
    fn test_standings_are_a_total_order((players, seed, drop_index) in field_strategy()) {
        let chain = SwissConfig::default().tiebreakers.chain();
        let floor = SwissConfig::default().percentage_floor;
        let mut failures = Vec::new();
        simulate(players, seed, drop_index, |regs, _, _, standings| {
            let ranks: Vec<u32> = standings.iter().map(|e| e.rank).collect();
            let expected: Vec<u32> = (1..=regs.len() as u32).collect();
            if ranks != expected {
                failures.push("ranks");
            }

            let ids: HashSet<PlayerId> = standings.iter().map(|e| e.player_id).collect();
            if ids.len() != regs.len() {
                failures.push("duplicate entries");
            }

            for pair in standings.windows(2) {
                if compare_entries(&pair[0], &pair[1], &chain) == Ordering::Greater {
                    failures.push("out of order");
                }
            }

            for entry in standings {
                let values = [
                    entry.match_win_pct,
                    entry.opponent_match_win_pct,
                    entry.game_win_pct,
                    entry.opponent_game_win_pct,
                ];
                if values.iter().any(|&v| v < floor || v > 1.0) {
                    failures.push("percentage out of range");
                }
            }
        });
        prop_assert!(failures.is_empty(), "failures: {:?}", failures);
    }

    #[test]
    fn test_pair_downs_come_from_higher_brackets((players, seed, drop_index) in field_strategy()) {
        let mut bad = 0usize;
        simulate(players, seed, drop_index, |_, _, pairings, standings| {
            let points: HashMap<PlayerId, u32> =
                standings.iter().map(|e| (e.player_id, e.match_points)).collect();
            for m in pairings.table_matches() {
                let one = points[&m.player_one];
                let two = m.player_two.map(|p| points[&p]).unwrap_or_default();
                let flagged = pairings.pair_downs.contains(&m.player_one);
                if one < two || flagged != (one > two) {
                    bad += 1;
                }
            }
        });
        prop_assert_eq!(bad, 0);
    }
}

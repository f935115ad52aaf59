//! Pairing engine.
//!
//! Round one is paired by seed or by shuffle. Later rounds pair players in
//! standings order inside match-point brackets: the top unpaired player
//! takes the highest-ranked opponent they have not met, and a player with
//! no such opponent left in their bracket cascades down to the next one.
//! A maximum matching over the fresh-opponent graph decides up front whether
//! a rematch-free round exists, and each greedy choice is only committed when
//! the players below it can still all be paired, so a rematch-free pairing is
//! found exactly when one exists.
//!
//! Pairing is all-or-nothing: either every active player is placed in a
//! match (or the bye) or an error is returned.

use log::{debug, info, warn};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

use super::errors::{ConfigurationError, ImpossiblePairing, PairingError, PairingResult};
use super::history::PairingHistory;
use super::matching::{Adjacency, Matching};
use super::standings::{StandingsEntry, calculate_standings_with_rng};
use crate::tournament::config::{FirstRoundPairing, SwissConfig};
use crate::tournament::models::{Match, PlayerId, Registration, Round, generate_id};

/// Two players who met again under a rematch override or policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rematch {
    pub player_one: PlayerId,
    pub player_two: PlayerId,
}

/// Output of one pairing run
#[derive(Debug, Clone, PartialEq)]
pub struct RoundPairings {
    pub round_number: u32,
    /// Table matches in table order, followed by the bye if any
    pub matches: Vec<Match>,
    pub bye: Option<PlayerId>,
    /// Rematch log for this round
    pub rematches: Vec<Rematch>,
    /// Players paired against a lower bracket this round
    pub pair_downs: Vec<PlayerId>,
}

impl RoundPairings {
    /// Regular (non-bye) matches
    pub fn table_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| !m.is_bye())
    }
}

/// A player ready to be paired
#[derive(Debug, Clone, Copy)]
struct Seat {
    player_id: PlayerId,
    match_points: u32,
    rank: u32,
}

/// Pairs rounds for one Swiss component
pub struct PairingEngine<R: Rng = StdRng> {
    config: SwissConfig,
    rng: R,
}

impl PairingEngine<StdRng> {
    /// Create an engine seeded from the configuration
    pub fn new(config: SwissConfig) -> Self {
        let rng = config.rng();
        Self { config, rng }
    }
}

impl<R: Rng> PairingEngine<R> {
    /// Create an engine driven by the supplied RNG
    pub fn with_rng(config: SwissConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &SwissConfig {
        &self.config
    }

    /// Current standings with this engine's tiebreak randomness
    pub fn standings(
        &mut self,
        registrations: &[Registration],
        matches: &[Match],
    ) -> Vec<StandingsEntry> {
        calculate_standings_with_rng(registrations, matches, &self.config, &mut self.rng)
    }

    /// Pair round one by seed or shuffle
    pub fn pair_round_one(
        &mut self,
        registrations: &[Registration],
        round: &Round,
    ) -> PairingResult<RoundPairings> {
        if round.round_number != 1 {
            return Err(ConfigurationError::InvalidRoundNumber {
                round_number: round.round_number,
                reason: "round-one pairing requested for a later round".to_string(),
            }
            .into());
        }

        let mut players: Vec<&Registration> =
            registrations.iter().filter(|r| r.is_active()).collect();
        ensure_enough_players(players.len())?;

        match self.config.first_round {
            FirstRoundPairing::Seeded => players.sort_by_key(|r| r.sequence_id),
            FirstRoundPairing::Random => players.shuffle(&mut self.rng),
        }

        let mut pairings = RoundPairings {
            round_number: 1,
            matches: Vec::with_capacity(players.len() / 2 + 1),
            bye: None,
            rematches: Vec::new(),
            pair_downs: Vec::new(),
        };

        let mut chunks = players.chunks_exact(2);
        for (table, pair) in (1u32..).zip(chunks.by_ref()) {
            let id = generate_id(&mut self.rng);
            pairings.matches.push(Match::pairing(
                id,
                round,
                table,
                pair[0].player_id,
                pair[1].player_id,
            ));
        }
        if let [odd] = chunks.remainder() {
            let id = generate_id(&mut self.rng);
            pairings
                .matches
                .push(Match::bye(id, round, odd.player_id, self.config.bye_game_wins));
            pairings.bye = Some(odd.player_id);
        }

        info!(
            "Round 1 paired ({:?}): {} tables, bye: {}",
            self.config.first_round,
            pairings.matches.len() - usize::from(pairings.bye.is_some()),
            pairings.bye.is_some()
        );
        Ok(pairings)
    }

    /// Discard round-one pairings that have not started and draw new ones
    pub fn reissue_round_one(
        &mut self,
        registrations: &[Registration],
        round: &Round,
        existing: &[Match],
    ) -> PairingResult<RoundPairings> {
        if self.config.first_round != FirstRoundPairing::Random {
            return Err(ConfigurationError::InvalidConfig {
                field: "first_round".to_string(),
                reason: "only random round-one pairings can be re-issued".to_string(),
            }
            .into());
        }

        let started = existing
            .iter()
            .filter(|m| m.round_id == round.id && !m.is_bye())
            .any(|m| m.start_time.is_some() || m.is_complete());
        if started {
            return Err(PairingError::RoundInProgress {
                round_number: round.round_number,
            });
        }

        info!("Re-issuing round 1 pairings for round {}", round.id);
        self.pair_round_one(registrations, round)
    }

    /// Pair a round after the first.
    ///
    /// `rematch_override` takes precedence over the configured rematch policy
    /// for this round only.
    pub fn pair_round(
        &mut self,
        registrations: &[Registration],
        matches: &[Match],
        round: &Round,
        rematch_override: Option<bool>,
    ) -> PairingResult<RoundPairings> {
        let round_number = round.round_number;
        self.validate_round_number(round_number, matches)?;

        let active = registrations.iter().filter(|r| r.is_active()).count();
        ensure_enough_players(active)?;

        let standings = self.standings(registrations, matches);
        let seats: Vec<Seat> = standings
            .iter()
            .filter(|entry| entry.status.is_active())
            .map(|entry| Seat {
                player_id: entry.player_id,
                match_points: entry.match_points,
                rank: entry.rank,
            })
            .collect();
        let history = PairingHistory::from_matches(matches);
        let allow_rematches = rematch_override.unwrap_or(self.config.allow_rematches);
        let bye_order = if seats.len() % 2 == 1 {
            self.bye_candidates(&seats, &history)
        } else {
            Vec::new()
        };

        let adjacency = fresh_adjacency(&seats, &history);
        let mut matching = Matching::new(&adjacency);
        if matching.maximize() == seats.len() / 2 {
            // with an odd field the first candidate some maximum matching
            // leaves out takes the bye
            let bye = bye_order
                .iter()
                .copied()
                .find(|&idx| matching.can_leave_exposed(idx))
                .map(|idx| seats[idx].player_id);
            let order = pairing_order(&seats, bye, &history);
            if let Some(pairs) = pair_fresh(&order, &history) {
                return Ok(self.finish(round, &order, &pairs, bye, &history));
            }
        }

        let stranded = exhausted_players(&seats, &history, &matching);
        if !allow_rematches {
            warn!(
                "Round {} cannot be paired without rematches; {} player(s) exhausted",
                round_number,
                stranded.len()
            );
            return Err(ImpossiblePairing::new(round_number, stranded).into());
        }

        let bye = bye_order.first().map(|&idx| seats[idx].player_id);
        let order = pairing_order(&seats, bye, &history);
        let pairs = pair_in_order(&order, &history);
        Ok(self.finish(round, &order, &pairs, bye, &history))
    }

    fn validate_round_number(&self, round_number: u32, matches: &[Match]) -> PairingResult<()> {
        if round_number < 2 {
            return Err(ConfigurationError::InvalidRoundNumber {
                round_number,
                reason: "rounds after the first start at 2".to_string(),
            }
            .into());
        }

        if round_number > self.config.max_rounds {
            return Err(ConfigurationError::InvalidRoundNumber {
                round_number,
                reason: format!("exceeds max_rounds ({})", self.config.max_rounds),
            }
            .into());
        }

        if matches.iter().any(|m| m.round_number >= round_number) {
            return Err(ConfigurationError::InvalidRoundNumber {
                round_number,
                reason: "round already has pairings".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Seat indices in bye order: fewest byes first, then worst standing.
    /// Players at the cap only follow once every eligible player has been
    /// tried.
    fn bye_candidates(&self, seats: &[Seat], history: &PairingHistory) -> Vec<usize> {
        let mut ordered: Vec<usize> = (0..seats.len()).collect();
        ordered.sort_by(|&a, &b| {
            history
                .bye_count(seats[a].player_id)
                .cmp(&history.bye_count(seats[b].player_id))
                .then_with(|| seats[b].rank.cmp(&seats[a].rank))
        });

        let cap = self.config.max_byes_per_player;
        let (under_cap, at_cap): (Vec<usize>, Vec<usize>) = ordered
            .into_iter()
            .partition(|&idx| history.bye_count(seats[idx].player_id) < cap);

        if under_cap.is_empty() {
            warn!("Every active player has reached the bye cap of {cap}; cap will be exceeded");
        }

        under_cap.into_iter().chain(at_cap).collect()
    }

    fn finish(
        &mut self,
        round: &Round,
        order: &[Seat],
        pairs: &[(usize, usize)],
        bye: Option<PlayerId>,
        history: &PairingHistory,
    ) -> RoundPairings {
        let mut pairings = RoundPairings {
            round_number: round.round_number,
            matches: Vec::with_capacity(pairs.len() + 1),
            bye,
            rematches: Vec::new(),
            pair_downs: Vec::new(),
        };

        for (table, &(i, j)) in (1u32..).zip(pairs) {
            let (one, two) = (order[i], order[j]);

            if history.have_played(one.player_id, two.player_id) {
                warn!(
                    "Round {} table {}: rematch {} vs {}",
                    round.round_number, table, one.player_id, two.player_id
                );
                pairings.rematches.push(Rematch {
                    player_one: one.player_id,
                    player_two: two.player_id,
                });
            }

            if one.match_points > two.match_points {
                debug!(
                    "Round {}: {} ({} pts) paired down to {} ({} pts)",
                    round.round_number,
                    one.player_id,
                    one.match_points,
                    two.player_id,
                    two.match_points
                );
                pairings.pair_downs.push(one.player_id);
            }

            let id = generate_id(&mut self.rng);
            pairings
                .matches
                .push(Match::pairing(id, round, table, one.player_id, two.player_id));
        }

        if let Some(player) = bye {
            if history.bye_count(player) >= self.config.max_byes_per_player {
                warn!(
                    "Round {}: bye to {} exceeds cap of {} (no eligible alternative)",
                    round.round_number, player, self.config.max_byes_per_player
                );
            }
            let id = generate_id(&mut self.rng);
            pairings
                .matches
                .push(Match::bye(id, round, player, self.config.bye_game_wins));
        }

        info!(
            "Round {} paired: {} tables, {} pair-down(s), {} rematch(es), bye: {}",
            round.round_number,
            pairs.len(),
            pairings.pair_downs.len(),
            pairings.rematches.len(),
            bye.is_some()
        );
        pairings
    }
}

fn ensure_enough_players(active: usize) -> Result<(), ConfigurationError> {
    if active < 2 {
        return Err(ConfigurationError::InsufficientPlayers { needed: 2, active });
    }
    Ok(())
}

/// Seats in pairing order: brackets from most to fewest match points, each
/// bracket in standings order. When a bracket will send one player down,
/// the member who has paired down least (worst ranked among equals) is moved
/// to the bracket's tail so the cascade picks them.
fn pairing_order(seats: &[Seat], bye: Option<PlayerId>, history: &PairingHistory) -> Vec<Seat> {
    let mut brackets: BTreeMap<u32, Vec<Seat>> = BTreeMap::new();
    for seat in seats.iter().filter(|s| Some(s.player_id) != bye) {
        brackets.entry(seat.match_points).or_default().push(*seat);
    }

    let mut order = Vec::with_capacity(seats.len());
    let mut carried = 0usize;
    for (_, mut bracket) in brackets.into_iter().rev() {
        bracket.sort_by_key(|s| s.rank);

        if (bracket.len() + carried) % 2 == 1 {
            let floater = bracket
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    history
                        .pair_down_count(a.player_id)
                        .cmp(&history.pair_down_count(b.player_id))
                        .then_with(|| b.rank.cmp(&a.rank))
                })
                .map(|(idx, _)| idx);
            if let Some(idx) = floater {
                let seat = bracket.remove(idx);
                bracket.push(seat);
            }
            carried = 1;
        } else {
            carried = 0;
        }

        order.extend(bracket);
    }

    order
}

/// Edges between seats that have not met, each list in seat order
fn fresh_adjacency(seats: &[Seat], history: &PairingHistory) -> Adjacency {
    seats
        .iter()
        .enumerate()
        .map(|(i, a)| {
            seats
                .iter()
                .enumerate()
                .filter(|&(j, b)| i != j && !history.have_played(a.player_id, b.player_id))
                .map(|(j, _)| j)
                .collect()
        })
        .collect()
}

/// Pair `order` without rematches. The top unpaired seat takes the first
/// fresh opponent in seat order that leaves everyone below pairable.
fn pair_fresh(order: &[Seat], history: &PairingHistory) -> Option<Vec<(usize, usize)>> {
    let adjacency = fresh_adjacency(order, history);
    let mut matching = Matching::new(&adjacency);
    if matching.maximize() * 2 != order.len() {
        return None;
    }

    let mut pairs = Vec::with_capacity(order.len() / 2);
    for top in 0..order.len() {
        if !matching.is_alive(top) {
            continue;
        }
        let mut placed = false;
        for &idx in &adjacency[top] {
            if idx > top && matching.is_alive(idx) && matching.take_pair(top, idx) {
                pairs.push((top, idx));
                placed = true;
                break;
            }
        }
        if !placed {
            return None;
        }
    }
    Some(pairs)
}

/// Pair `order` preferring fresh opponents but accepting rematches
fn pair_in_order(order: &[Seat], history: &PairingHistory) -> Vec<(usize, usize)> {
    let mut paired = vec![false; order.len()];
    let mut pairs = Vec::with_capacity(order.len() / 2);

    for top in 0..order.len() {
        if paired[top] {
            continue;
        }
        let player = order[top].player_id;
        let open = || (top + 1..order.len()).filter(|&idx| !paired[idx]);
        let next = open()
            .find(|&idx| !history.have_played(player, order[idx].player_id))
            .or_else(|| open().next());
        if let Some(next) = next {
            paired[top] = true;
            paired[next] = true;
            pairs.push((top, next));
        }
    }
    pairs
}

/// Players who cannot be placed without a rematch: those with no fresh
/// opponent left in the field, or failing that, those a maximum matching
/// leaves unpaired.
fn exhausted_players(
    seats: &[Seat],
    history: &PairingHistory,
    matching: &Matching<'_>,
) -> Vec<PlayerId> {
    let isolated: Vec<PlayerId> = seats
        .iter()
        .filter(|a| {
            seats.iter().all(|b| {
                a.player_id == b.player_id || history.have_played(a.player_id, b.player_id)
            })
        })
        .map(|seat| seat.player_id)
        .collect();
    if !isolated.is_empty() {
        return isolated;
    }

    matching.exposed().map(|idx| seats[idx].player_id).collect()
}

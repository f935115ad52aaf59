//! Match-win, game-win and opponent percentages.
//!
//! All four values are floored (0.3333 by default) so a winless player is
//! never ranked below the floor and never drags their opponents below it
//! either. Byes and late-entry losses count toward a player's own record but
//! never appear as opponents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tournament::models::{GameCounts, Match, MatchOutcome, PlayerId};

/// Aggregated record of one player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub match_points: u32,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub games: GameCounts,
    /// Awarded byes (late-entry losses excluded)
    pub byes: u32,
    /// Opponents in the order faced, byes excluded; repeats kept for rematches
    pub opponents: Vec<PlayerId>,
}

impl PlayerRecord {
    fn add(&mut self, m: &Match, player: PlayerId) {
        let outcome = m.outcome_for(player);
        let games = m.games_for(player);

        self.matches_played += 1;
        self.match_points += outcome.match_points();
        match outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Loss => self.losses += 1,
            MatchOutcome::Draw => self.draws += 1,
        }
        self.games.won += games.won;
        self.games.lost += games.lost;
        self.games.drawn += games.drawn;

        if m.is_awarded_bye() {
            self.byes += 1;
        }
        if let Some(opponent) = m.opponent_of(player) {
            self.opponents.push(opponent);
        }
    }

    /// Match points over the maximum available, floored
    pub fn match_win_percentage(&self, floor: f64) -> f64 {
        if self.matches_played == 0 {
            return floor;
        }
        let pct = f64::from(self.match_points) / f64::from(self.matches_played * 3);
        pct.max(floor)
    }

    /// Games won over games played, floored
    pub fn game_win_percentage(&self, floor: f64) -> f64 {
        let total = self.games.total();
        if total == 0 {
            return floor;
        }
        let pct = f64::from(self.games.won) / f64::from(total);
        pct.max(floor)
    }
}

/// Build every player's record from the completed matches.
///
/// Unreported regular matches are skipped so standings stay meaningful
/// mid-round.
pub fn build_records(matches: &[Match]) -> HashMap<PlayerId, PlayerRecord> {
    let mut records: HashMap<PlayerId, PlayerRecord> = HashMap::new();

    for m in matches.iter().filter(|m| m.is_complete()) {
        records.entry(m.player_one).or_default().add(m, m.player_one);
        if let Some(player_two) = m.player_two {
            records.entry(player_two).or_default().add(m, player_two);
        }
    }

    records
}

/// The four tiebreaker percentages of one player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiebreakerValues {
    pub match_win_pct: f64,
    pub opponent_match_win_pct: f64,
    pub game_win_pct: f64,
    pub opponent_game_win_pct: f64,
}

impl TiebreakerValues {
    /// Values of a player with no record at all
    pub fn floored(floor: f64) -> Self {
        Self {
            match_win_pct: floor,
            opponent_match_win_pct: floor,
            game_win_pct: floor,
            opponent_game_win_pct: floor,
        }
    }
}

/// Tiebreakers for `player` from precomputed records
pub fn tiebreakers_from_records(
    player: PlayerId,
    records: &HashMap<PlayerId, PlayerRecord>,
    floor: f64,
) -> TiebreakerValues {
    let Some(record) = records.get(&player) else {
        return TiebreakerValues::floored(floor);
    };

    let (omw, ogw) = opponent_averages(record, records, floor);

    TiebreakerValues {
        match_win_pct: record.match_win_percentage(floor),
        opponent_match_win_pct: omw,
        game_win_pct: record.game_win_percentage(floor),
        opponent_game_win_pct: ogw,
    }
}

fn opponent_averages(
    record: &PlayerRecord,
    records: &HashMap<PlayerId, PlayerRecord>,
    floor: f64,
) -> (f64, f64) {
    if record.opponents.is_empty() {
        return (floor, floor);
    }

    let empty = PlayerRecord::default();
    let (mw_sum, gw_sum) = record
        .opponents
        .iter()
        .map(|opponent| records.get(opponent).unwrap_or(&empty))
        .fold((0.0, 0.0), |(mw, gw), opp| {
            (
                mw + opp.match_win_percentage(floor),
                gw + opp.game_win_percentage(floor),
            )
        });

    let count = record.opponents.len() as f64;
    ((mw_sum / count).max(floor), (gw_sum / count).max(floor))
}

/// Compute the four percentages for one player from the tournament's matches
pub fn calculate_tiebreakers(player: PlayerId, matches: &[Match], floor: f64) -> TiebreakerValues {
    let records = build_records(matches);
    tiebreakers_from_records(player, &records, floor)
}

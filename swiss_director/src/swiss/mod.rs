//! Swiss pairing and standings.
//!
//! This module implements:
//! - Match-win, game-win and opponent tiebreaker percentages with a floor
//! - Ranked standings under a configurable tiebreaker chain
//! - Round-one pairing by seed or shuffle
//! - Later-round pairing by match-point bracket with pair-downs, bye
//!   allocation and rematch avoidance
//!
//! ## Example
//!
//! ```
//! use swiss_director::swiss::{pair_round, pair_round_one};
//! use swiss_director::tournament::{Registration, Round, SwissConfig};
//! use uuid::Uuid;
//!
//! let config = SwissConfig::for_players(8).with_seed(7);
//! let registrations: Vec<Registration> = (1..=8)
//!     .map(|seq| Registration::new(Uuid::new_v4(), seq))
//!     .collect();
//!
//! let round_one = Round::started(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 1);
//! let mut matches = pair_round_one(&registrations, &round_one, &config).unwrap().matches;
//! for m in &mut matches {
//!     m.submit_result(2, 1, 0).unwrap();
//! }
//!
//! let round_two = Round::started(Uuid::new_v4(), round_one.tournament_id, round_one.component_id, 2);
//! let pairings = pair_round(&registrations, &matches, &round_two, &config, None).unwrap();
//! assert_eq!(pairings.matches.len(), 4);
//! assert!(pairings.rematches.is_empty());
//! ```

pub mod errors;
pub mod history;
mod matching;
pub mod pairing;
pub mod standings;
pub mod tiebreakers;

pub use errors::{
    ConfigurationError, ConfigurationResult, ImpossiblePairing, PairingError, PairingRemedy,
    PairingResult,
};
pub use history::PairingHistory;
pub use pairing::{PairingEngine, Rematch, RoundPairings};
pub use standings::{StandingsEntry, calculate_standings, calculate_standings_with_rng};
pub use tiebreakers::{PlayerRecord, TiebreakerValues, calculate_tiebreakers};

use crate::tournament::config::SwissConfig;
use crate::tournament::models::{Match, Registration, Round};

/// Pair round one with an engine seeded from `config`
pub fn pair_round_one(
    registrations: &[Registration],
    round: &Round,
    config: &SwissConfig,
) -> PairingResult<RoundPairings> {
    PairingEngine::new(config.clone()).pair_round_one(registrations, round)
}

/// Pair a later round with an engine seeded from `config`
pub fn pair_round(
    registrations: &[Registration],
    matches: &[Match],
    round: &Round,
    config: &SwissConfig,
    rematch_override: Option<bool>,
) -> PairingResult<RoundPairings> {
    PairingEngine::new(config.clone()).pair_round(registrations, matches, round, rematch_override)
}

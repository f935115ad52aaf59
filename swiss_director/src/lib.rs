//! # Swiss Director
//!
//! Pairing, standings and lifecycle engine for Swiss-system tournaments.
//!
//! The library is a pure core: it takes plain records (registrations,
//! matches, rounds and a configuration), computes pairings or standings,
//! and hands back new or updated records for the caller to persist. It
//! performs no I/O.
//!
//! ## Pairing
//!
//! - **Round one**: players in sequence order (seeded) or shuffled (random),
//!   paired down the list, with the odd player out receiving a bye
//! - **Later rounds**: players grouped into match-point brackets, paired in
//!   standings order without rematches, pairing down when a bracket is odd
//!   or exhausted
//! - **Byes**: to the player with the fewest byes, lowest-ranked first, never
//!   above the per-player cap unless nothing else works
//! - **Impossible pairings**: reported with the stranded players and the
//!   organizer's options instead of silently forcing a rematch
//!
//! ## Standings
//!
//! Match points (3 win, 1 draw, 0 loss), then a tiebreaker chain over
//! OMW%, GW% and OGW%, all floored at 33%, then a random key that a seed
//! makes reproducible.
//!
//! ## Core Modules
//!
//! - [`swiss`]: tiebreakers, standings, pairing history and the pairing engine
//! - [`tournament`]: records, configuration, lifecycle and registration changes
//!
//! ## Example
//!
//! ```
//! use swiss_director::{PairingEngine, Registration, Round, SwissConfig};
//! use uuid::Uuid;
//!
//! let registrations: Vec<Registration> = (1..=7)
//!     .map(|seq| Registration::new(Uuid::new_v4(), seq))
//!     .collect();
//! let round = Round::started(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 1);
//!
//! let mut engine = PairingEngine::new(SwissConfig::default().with_seed(1));
//! let pairings = engine.pair_round_one(&registrations, &round).unwrap();
//! assert_eq!(pairings.table_matches().count(), 3);
//! assert_eq!(pairings.bye, Some(registrations[6].player_id));
//! ```

/// Tiebreakers, standings and pairing.
pub mod swiss;
pub use swiss::{
    ConfigurationError, ImpossiblePairing, PairingEngine, PairingError, PairingRemedy,
    PairingResult, RoundPairings, StandingsEntry, calculate_standings, calculate_tiebreakers,
    pair_round, pair_round_one,
};

/// Tournament records, configuration and lifecycle.
pub mod tournament;
pub use tournament::{
    Component, LifecycleError, LifecycleResult, Match, MatchKind, PlayerId, Registration,
    RegistrationStatus, Round, SwissConfig, Tournament, TournamentStatus,
};

//! Tournament records, configuration and lifecycle.
//!
//! This module provides:
//! - Plain records for tournaments, components, rounds, registrations and matches
//! - The closed Swiss configuration with validation and presets
//! - State transitions from draft through completion or cancellation
//! - Player drops and late entries
//!
//! ## Example
//!
//! ```
//! use swiss_director::tournament::{
//!     Component, Registration, SwissConfig, Tournament, TournamentStatus, lifecycle,
//! };
//! use uuid::Uuid;
//!
//! let mut tournament = Tournament::new(Uuid::new_v4(), "Friday Night Swiss");
//! let mut component = Component::new(
//!     Uuid::new_v4(),
//!     tournament.id,
//!     "Swiss Rounds",
//!     SwissConfig::for_players(4),
//! );
//! let registrations: Vec<Registration> = (1..=4)
//!     .map(|seq| Registration::new(Uuid::new_v4(), seq))
//!     .collect();
//!
//! let round = lifecycle::start_tournament(&mut tournament, &mut component, &registrations).unwrap();
//! assert_eq!(tournament.status, TournamentStatus::InProgress);
//! assert_eq!(round.round_number, 1);
//! ```

pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod registration;

pub use config::{
    DEFAULT_PERCENTAGE_FLOOR, FirstRoundPairing, MatchLength, SwissConfig, Tiebreaker,
    TiebreakerProfile, recommended_rounds,
};
pub use errors::{LifecycleError, LifecycleResult};
pub use lifecycle::{
    advance_to_next_round, cancel_tournament, close_registration, end_tournament,
    force_complete_round, is_round_complete, open_registration, request_early_end,
    should_tournament_end, start_tournament,
};
pub use models::{
    Component, ComponentId, ComponentStatus, GameCounts, Match, MatchId, MatchKind, MatchOutcome,
    PlayerId, Registration, RegistrationStatus, Round, RoundId, RoundStatus, Tournament,
    TournamentId, TournamentStatus,
};
pub use registration::{drop_player, next_sequence_id, register_late_entry};

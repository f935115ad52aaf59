//! Swiss component configuration.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::swiss::errors::{ConfigurationError, ConfigurationResult};

/// Default lower bound applied to MW%, GW% and their opponent averages
pub const DEFAULT_PERCENTAGE_FLOOR: f64 = 0.3333;

/// A single step of the ranking chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tiebreaker {
    MatchPoints,
    /// Opponent match-win percentage
    Omw,
    /// Opponent game-win percentage
    Ogw,
    /// Game-win percentage
    Gw,
    /// Seeded coin flip for true ties
    Random,
}

impl fmt::Display for Tiebreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tiebreaker::MatchPoints => write!(f, "match_points"),
            Tiebreaker::Omw => write!(f, "omw"),
            Tiebreaker::Ogw => write!(f, "ogw"),
            Tiebreaker::Gw => write!(f, "gw"),
            Tiebreaker::Random => write!(f, "random"),
        }
    }
}

/// Ordered tiebreaker chain used for both pairing order and final standings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiebreakerProfile {
    /// Match points, OMW%, GW%, OGW%, random
    #[default]
    WotcStandard,
    /// Match points, OMW%, OGW%, GW%, random
    OpponentHeavy,
    /// Organizer supplied order
    Custom(Vec<Tiebreaker>),
}

impl TiebreakerProfile {
    /// The ordered chain for this profile
    pub fn chain(&self) -> Vec<Tiebreaker> {
        match self {
            TiebreakerProfile::WotcStandard => vec![
                Tiebreaker::MatchPoints,
                Tiebreaker::Omw,
                Tiebreaker::Gw,
                Tiebreaker::Ogw,
                Tiebreaker::Random,
            ],
            TiebreakerProfile::OpponentHeavy => vec![
                Tiebreaker::MatchPoints,
                Tiebreaker::Omw,
                Tiebreaker::Ogw,
                Tiebreaker::Gw,
                Tiebreaker::Random,
            ],
            TiebreakerProfile::Custom(chain) => chain.clone(),
        }
    }
}

/// How round one is paired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstRoundPairing {
    /// By ascending sequence id: 1v2, 3v4, ...
    #[default]
    Seeded,
    /// Shuffle, then pair sequentially
    Random,
}

/// Number of games in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLength {
    /// Must be odd (BO1, BO3, BO5, ...)
    pub best_of: u32,
}

impl MatchLength {
    pub fn best_of(best_of: u32) -> Self {
        Self { best_of }
    }

    /// Games needed to take the match; also the games a forfeit loses by
    pub fn games_to_win(&self) -> u32 {
        self.best_of / 2 + 1
    }
}

impl Default for MatchLength {
    fn default() -> Self {
        Self { best_of: 3 }
    }
}

/// Swiss component configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwissConfig {
    /// Number of Swiss rounds to play
    pub max_rounds: u32,
    /// Rounds that must be played before an early end is honoured
    pub min_rounds: Option<u32>,
    /// Ranking chain for pairing order and standings
    pub tiebreakers: TiebreakerProfile,
    /// Round-one pairing mode
    pub first_round: FirstRoundPairing,
    /// Match length
    pub match_length: MatchLength,
    /// Games credited to a player receiving a bye
    pub bye_game_wins: u32,
    /// Byes a player may receive before the cap is only broken when forced
    pub max_byes_per_player: u32,
    /// Pair previous opponents instead of failing when no other pairing exists
    pub allow_rematches: bool,
    /// Lower bound for MW%, GW% and the opponent averages
    pub percentage_floor: f64,
    /// RNG seed for reproducible shuffles and random tiebreaks
    pub seed: Option<u64>,
}

impl Default for SwissConfig {
    fn default() -> Self {
        let match_length = MatchLength::default();
        Self {
            max_rounds: 3,
            min_rounds: None,
            tiebreakers: TiebreakerProfile::WotcStandard,
            first_round: FirstRoundPairing::Seeded,
            match_length,
            bye_game_wins: match_length.games_to_win(),
            max_byes_per_player: 1,
            allow_rematches: false,
            percentage_floor: DEFAULT_PERCENTAGE_FLOOR,
            seed: None,
        }
    }
}

impl SwissConfig {
    /// Default configuration with the recommended round count for `player_count`
    pub fn for_players(player_count: usize) -> Self {
        Self {
            max_rounds: recommended_rounds(player_count),
            ..Self::default()
        }
    }

    /// Builder-style seed override
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// RNG for shuffles, random tiebreaks and record ids
    ///
    /// Seeded from `seed` when set, otherwise from the operating system.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> ConfigurationResult<Self> {
        let config: SwissConfig =
            serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidConfig {
                field: "json".to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.max_rounds == 0 {
            return Err(invalid("max_rounds", "Must be at least 1"));
        }

        if self.min_rounds.is_some_and(|min_rounds| min_rounds > self.max_rounds) {
            return Err(invalid(
                "min_rounds",
                format!("Cannot exceed max_rounds ({})", self.max_rounds),
            ));
        }

        if self.match_length.best_of == 0 || self.match_length.best_of % 2 == 0 {
            return Err(invalid("match_length.best_of", "Must be a positive odd number"));
        }

        if self.bye_game_wins > self.match_length.games_to_win() {
            return Err(invalid(
                "bye_game_wins",
                format!(
                    "Cannot exceed games needed to win ({})",
                    self.match_length.games_to_win()
                ),
            ));
        }

        if !(0.0..=1.0).contains(&self.percentage_floor) {
            return Err(invalid("percentage_floor", "Must be between 0 and 1"));
        }

        if matches!(&self.tiebreakers, TiebreakerProfile::Custom(chain) if chain.is_empty()) {
            return Err(invalid("tiebreakers", "Custom profile needs at least one entry"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidConfig {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Rounds needed to leave a single undefeated player: `ceil(log2(n))`
pub fn recommended_rounds(player_count: usize) -> u32 {
    if player_count <= 2 {
        return 1;
    }
    usize::BITS - (player_count - 1).leading_zeros()
}

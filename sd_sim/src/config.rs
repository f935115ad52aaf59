//! Simulator configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::path::PathBuf;
use swiss_director::tournament::{FirstRoundPairing, SwissConfig, TiebreakerProfile, recommended_rounds};

/// Complete simulator configuration loaded from CLI overrides and environment variables
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of registered players
    pub players: u32,
    /// Swiss rounds to play; recommended count for the field when absent
    pub rounds: Option<u32>,
    /// Seed for pairings and simulated results
    pub seed: Option<u64>,
    /// Round-one pairing mode
    pub first_round: FirstRoundPairing,
    /// Tiebreaker chain
    pub tiebreakers: TiebreakerProfile,
    /// Allow rematches without organizer intervention
    pub allow_rematches: bool,
    /// Byes a player may receive before the cap is enforced
    pub max_byes_per_player: u32,
    /// Chance a reported match is drawn
    pub draw_rate: f64,
    /// Chance each active player drops after a round
    pub drop_rate: f64,
    /// Full Swiss configuration as JSON, overriding the individual settings above
    pub swiss_config_path: Option<PathBuf>,
    /// Print final standings as JSON instead of a table
    pub json: bool,
}

impl SimConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `players_override` - Optional field size override (from CLI args)
    /// * `rounds_override` - Optional round count override (from CLI args)
    /// * `seed_override` - Optional seed override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an unrecognised value
    pub fn from_env(
        players_override: Option<u32>,
        rounds_override: Option<u32>,
        seed_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let first_round = match std::env::var("SD_FIRST_ROUND").ok().as_deref() {
            None | Some("seeded") => FirstRoundPairing::Seeded,
            Some("random") => FirstRoundPairing::Random,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "SD_FIRST_ROUND".to_string(),
                    reason: format!("expected 'seeded' or 'random', got '{other}'"),
                });
            }
        };

        let tiebreakers = match std::env::var("SD_TIEBREAKERS").ok().as_deref() {
            None | Some("wotc") => TiebreakerProfile::WotcStandard,
            Some("opponent_heavy") => TiebreakerProfile::OpponentHeavy,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "SD_TIEBREAKERS".to_string(),
                    reason: format!("expected 'wotc' or 'opponent_heavy', got '{other}'"),
                });
            }
        };

        Ok(SimConfig {
            players: players_override.unwrap_or_else(|| parse_env_or("SD_PLAYERS", 8)),
            rounds: rounds_override.or_else(|| parse_env("SD_ROUNDS")),
            seed: seed_override.or_else(|| parse_env("SD_SEED")),
            first_round,
            tiebreakers,
            allow_rematches: parse_env_or("SD_ALLOW_REMATCHES", false),
            max_byes_per_player: parse_env_or("SD_MAX_BYES", 1),
            draw_rate: parse_env_or("SD_DRAW_RATE", 0.05),
            drop_rate: parse_env_or("SD_DROP_RATE", 0.0),
            swiss_config_path: std::env::var("SD_SWISS_CONFIG").ok().map(PathBuf::from),
            json: false,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players < 2 {
            return Err(ConfigError::Invalid {
                var: "SD_PLAYERS".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }

        if self.rounds == Some(0) {
            return Err(ConfigError::Invalid {
                var: "SD_ROUNDS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.draw_rate) {
            return Err(ConfigError::Invalid {
                var: "SD_DRAW_RATE".to_string(),
                reason: "Must be between 0 and 1".to_string(),
            });
        }

        if !(0.0..1.0).contains(&self.drop_rate) {
            return Err(ConfigError::Invalid {
                var: "SD_DROP_RATE".to_string(),
                reason: "Must be at least 0 and below 1".to_string(),
            });
        }

        Ok(())
    }

    /// Pairing configuration for the simulated event
    pub fn swiss_config(&self) -> SwissConfig {
        SwissConfig {
            max_rounds: self
                .rounds
                .unwrap_or_else(|| recommended_rounds(self.players as usize)),
            tiebreakers: self.tiebreakers.clone(),
            first_round: self.first_round,
            max_byes_per_player: self.max_byes_per_player,
            allow_rematches: self.allow_rematches,
            seed: self.seed,
            ..SwissConfig::default()
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable, ignoring unparsable values
fn parse_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    parse_env(key).unwrap_or(default)
}

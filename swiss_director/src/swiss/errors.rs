//! Error types for pairing and configuration.

use std::fmt;
use thiserror::Error;

use crate::tournament::models::PlayerId;

/// Result type for configuration checks
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// Result type for pairing operations
pub type PairingResult<T> = Result<T, PairingError>;

/// Caller misuse; fatal and never retried
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Too few players left to pair
    #[error("Insufficient players: need {needed}, have {active} active")]
    InsufficientPlayers { needed: usize, active: usize },

    /// Round number does not fit the tournament so far
    #[error("Invalid round number {round_number}: {reason}")]
    InvalidRoundNumber { round_number: u32, reason: String },

    /// Configuration value out of range
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },
}

/// Organizer actions that unblock an impossible pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingRemedy {
    /// End Swiss now and cut to a single-elimination top bracket
    CutToElimination,
    /// Re-run pairing for this round with a rematch override
    ForceRematch,
    /// Lower the planned round count
    ReduceRounds,
}

impl fmt::Display for PairingRemedy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairingRemedy::CutToElimination => {
                write!(f, "end Swiss rounds early and cut to elimination")
            }
            PairingRemedy::ForceRematch => write!(f, "manually allow a rematch for this round"),
            PairingRemedy::ReduceRounds => write!(f, "reduce the planned round count"),
        }
    }
}

/// No rematch-free pairing exists for the remaining players
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpossiblePairing {
    /// Round that could not be paired
    pub round_number: u32,
    /// Players who have already played every other player left to pair them with
    pub players: Vec<PlayerId>,
    /// What the organizer can do about it
    pub suggestions: Vec<PairingRemedy>,
}

impl ImpossiblePairing {
    pub fn new(round_number: u32, players: Vec<PlayerId>) -> Self {
        Self {
            round_number,
            players,
            suggestions: vec![
                PairingRemedy::CutToElimination,
                PairingRemedy::ForceRematch,
                PairingRemedy::ReduceRounds,
            ],
        }
    }
}

impl fmt::Display for ImpossiblePairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let players: Vec<String> = self.players.iter().map(|p| p.to_string()).collect();
        let remedies: Vec<String> = self.suggestions.iter().map(|r| r.to_string()).collect();
        write!(
            f,
            "cannot pair round {} without rematches; players [{}] have already faced each other. Options: {}",
            self.round_number,
            players.join(", "),
            remedies.join("; ")
        )
    }
}

/// Pairing failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairingError {
    /// Fatal caller error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Organizer-actionable; retry with a rematch override
    #[error("Impossible pairing: {0}")]
    Impossible(ImpossiblePairing),

    /// Pairings can no longer be replaced once play has begun
    #[error("Round {round_number} already has matches in play")]
    RoundInProgress { round_number: u32 },
}

impl PairingError {
    /// Whether the caller may retry after organizer intervention
    pub fn is_retryable(&self) -> bool {
        match self {
            PairingError::Configuration(_) | PairingError::RoundInProgress { .. } => false,
            PairingError::Impossible(_) => true,
        }
    }
}

impl From<ImpossiblePairing> for PairingError {
    fn from(err: ImpossiblePairing) -> Self {
        PairingError::Impossible(err)
    }
}

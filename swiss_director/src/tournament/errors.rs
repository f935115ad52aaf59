//! Lifecycle error types.

use thiserror::Error;
use uuid::Uuid;

use crate::swiss::errors::ConfigurationError;

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Lifecycle errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    /// Operation not permitted from the entity's current state
    #[error("Cannot {operation} {entity} {id} in state {from}")]
    InvalidStateTransition {
        entity: &'static str,
        id: Uuid,
        from: String,
        operation: &'static str,
    },

    /// Round still has unreported matches
    #[error("Round {round_number} is not complete: {} match(es) unreported", pending.len())]
    RoundIncomplete { round_number: u32, pending: Vec<Uuid> },

    /// Player already holds a registration in this tournament
    #[error("Player {player_id} is already registered")]
    AlreadyRegistered { player_id: Uuid },

    /// Precondition on players or rounds not met
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl LifecycleError {
    pub(crate) fn transition(
        entity: &'static str,
        id: Uuid,
        from: impl ToString,
        operation: &'static str,
    ) -> Self {
        LifecycleError::InvalidStateTransition {
            entity,
            id,
            from: from.to_string(),
            operation,
        }
    }
}

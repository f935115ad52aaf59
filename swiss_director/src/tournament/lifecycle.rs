//! Tournament, component and round state transitions.
//!
//! Every operation checks all of its preconditions before touching any
//! record, so a failed call leaves the caller's records exactly as they were.

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use super::errors::{LifecycleError, LifecycleResult};
use super::models::{
    Component, ComponentStatus, Match, Registration, Round, RoundStatus, Tournament,
    TournamentStatus,
};
use crate::swiss::errors::ConfigurationError;

fn require_tournament(
    tournament: &Tournament,
    next: TournamentStatus,
    operation: &'static str,
) -> LifecycleResult<()> {
    if tournament.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(LifecycleError::transition(
            "tournament",
            tournament.id,
            tournament.status,
            operation,
        ))
    }
}

fn require_component(
    component: &Component,
    expected: ComponentStatus,
    operation: &'static str,
) -> LifecycleResult<()> {
    if component.status == expected {
        Ok(())
    } else {
        Err(LifecycleError::transition(
            "component",
            component.id,
            component.status,
            operation,
        ))
    }
}

/// DRAFT -> REGISTRATION_OPEN
pub fn open_registration(tournament: &mut Tournament) -> LifecycleResult<()> {
    require_tournament(tournament, TournamentStatus::RegistrationOpen, "open_registration")?;
    tournament.status = TournamentStatus::RegistrationOpen;
    info!("Tournament {}: registration open", tournament.id);
    Ok(())
}

/// REGISTRATION_OPEN -> REGISTRATION_CLOSED
pub fn close_registration(tournament: &mut Tournament) -> LifecycleResult<()> {
    require_tournament(tournament, TournamentStatus::RegistrationClosed, "close_registration")?;
    tournament.status = TournamentStatus::RegistrationClosed;
    info!("Tournament {}: registration closed", tournament.id);
    Ok(())
}

/// Start the tournament and create round one.
///
/// Valid from DRAFT or REGISTRATION_CLOSED with a pending component and at
/// least two active registrations.
pub fn start_tournament(
    tournament: &mut Tournament,
    component: &mut Component,
    registrations: &[Registration],
) -> LifecycleResult<Round> {
    require_tournament(tournament, TournamentStatus::InProgress, "start_tournament")?;
    require_component(component, ComponentStatus::Pending, "start_tournament")?;
    component.config.validate()?;

    let active = registrations.iter().filter(|r| r.is_active()).count();
    if active < 2 {
        return Err(ConfigurationError::InsufficientPlayers { needed: 2, active }.into());
    }

    let now = Utc::now();
    tournament.status = TournamentStatus::InProgress;
    tournament.start_time = Some(now);
    component.status = ComponentStatus::Active;

    let round = Round::started(Uuid::new_v4(), tournament.id, component.id, 1);
    info!(
        "Tournament {} '{}' started with {} players; round 1 is {}",
        tournament.id, tournament.name, active, round.id
    );
    Ok(round)
}

/// Whether every match in the round has been reported, or an organizer has
/// forced the round closed
pub fn is_round_complete(round: &Round, matches: &[Match]) -> bool {
    if round.status == RoundStatus::Completed {
        return true;
    }

    let mut round_matches = matches.iter().filter(|m| m.round_id == round.id).peekable();
    if round_matches.peek().is_none() {
        debug!("Round {}: no matches, not complete", round.round_number);
        return false;
    }
    round_matches.all(Match::is_complete)
}

/// Organizer override: close the round regardless of unreported matches
pub fn force_complete_round(round: &mut Round) -> LifecycleResult<()> {
    if round.status == RoundStatus::Completed {
        return Err(LifecycleError::transition(
            "round",
            round.id,
            round.status,
            "force_complete_round",
        ));
    }
    round.status = RoundStatus::Completed;
    round.end_time = Some(Utc::now());
    info!("Round {} forced to completed", round.round_number);
    Ok(())
}

/// Close the current round and open the next one.
///
/// Returns `None` once `max_rounds` has been played; the tournament and
/// component are then completed.
pub fn advance_to_next_round(
    tournament: &mut Tournament,
    component: &mut Component,
    current_round: &mut Round,
    matches: &[Match],
) -> LifecycleResult<Option<Round>> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(LifecycleError::transition(
            "tournament",
            tournament.id,
            tournament.status,
            "advance_to_next_round",
        ));
    }
    require_component(component, ComponentStatus::Active, "advance_to_next_round")?;
    if current_round.status == RoundStatus::Pending {
        return Err(LifecycleError::transition(
            "round",
            current_round.id,
            current_round.status,
            "advance_to_next_round",
        ));
    }
    if !is_round_complete(current_round, matches) {
        let pending = matches
            .iter()
            .filter(|m| m.round_id == current_round.id && !m.is_complete())
            .map(|m| m.id)
            .collect();
        return Err(LifecycleError::RoundIncomplete {
            round_number: current_round.round_number,
            pending,
        });
    }

    current_round.status = RoundStatus::Completed;
    current_round.end_time.get_or_insert_with(Utc::now);
    info!("Round {} completed", current_round.round_number);

    let next_number = current_round.round_number + 1;
    if next_number > component.config.max_rounds {
        info!(
            "Reached max rounds ({}), not creating round {}",
            component.config.max_rounds, next_number
        );
        end_tournament(tournament, component)?;
        return Ok(None);
    }

    let next = Round::started(Uuid::new_v4(), tournament.id, component.id, next_number);
    info!("Round {} created: {}", next_number, next.id);
    Ok(Some(next))
}

/// IN_PROGRESS -> COMPLETED. Ending an already completed tournament is an error.
pub fn end_tournament(tournament: &mut Tournament, component: &mut Component) -> LifecycleResult<()> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(LifecycleError::transition(
            "tournament",
            tournament.id,
            tournament.status,
            "end_tournament",
        ));
    }

    tournament.status = TournamentStatus::Completed;
    tournament.end_time = Some(Utc::now());
    component.status = ComponentStatus::Completed;
    info!("Tournament {} '{}' completed", tournament.id, tournament.name);
    Ok(())
}

/// Any non-terminal state -> CANCELLED
pub fn cancel_tournament(
    tournament: &mut Tournament,
    component: &mut Component,
) -> LifecycleResult<()> {
    require_tournament(tournament, TournamentStatus::Cancelled, "cancel_tournament")?;

    tournament.status = TournamentStatus::Cancelled;
    tournament.end_time = Some(Utc::now());
    if component.status == ComponentStatus::Active {
        component.status = ComponentStatus::Completed;
    }
    info!("Tournament {} '{}' cancelled", tournament.id, tournament.name);
    Ok(())
}

/// Organizer asks to stop once the minimum round count has been played
pub fn request_early_end(tournament: &mut Tournament) -> LifecycleResult<()> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(LifecycleError::transition(
            "tournament",
            tournament.id,
            tournament.status,
            "request_early_end",
        ));
    }
    tournament.early_end_requested = true;
    info!("Tournament {}: early end requested", tournament.id);
    Ok(())
}

/// Advisory: true once `max_rounds` is reached, or when `min_rounds` is met
/// and the organizer has requested an early end
pub fn should_tournament_end(tournament: &Tournament, component: &Component, rounds: &[Round]) -> bool {
    let Some(current) = rounds.iter().map(|r| r.round_number).max() else {
        return false;
    };
    let config = &component.config;

    if current >= config.max_rounds {
        debug!("Should end: round {current} of {}", config.max_rounds);
        return true;
    }

    let min_met = current >= config.min_rounds.unwrap_or(0);
    min_met && tournament.early_end_requested
}

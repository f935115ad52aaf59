//! Registration changes after the field is set: drops and late entries.

use chrono::Utc;
use log::info;
use rand::Rng;

use super::errors::{LifecycleError, LifecycleResult};
use super::models::{
    Component, Match, PlayerId, Registration, RegistrationStatus, Round, Tournament,
    TournamentStatus, generate_id,
};
use crate::swiss::errors::ConfigurationError;

/// Next free per-tournament sequence id (1 for an empty field)
pub fn next_sequence_id(registrations: &[Registration]) -> u32 {
    registrations
        .iter()
        .map(|r| r.sequence_id)
        .max()
        .map_or(1, |max| max + 1)
}

/// ACTIVE or LATE_ENTRY -> DROPPED. The record is kept for standings.
pub fn drop_player(registration: &mut Registration) -> LifecycleResult<()> {
    if !registration.is_active() {
        return Err(LifecycleError::transition(
            "registration",
            registration.player_id,
            registration.status,
            "drop_player",
        ));
    }

    registration.status = RegistrationStatus::Dropped;
    registration.dropped_at = Some(Utc::now());
    info!(
        "Player {} (#{}) dropped",
        registration.player_id, registration.sequence_id
    );
    Ok(())
}

/// Register a player who joins before `entry_round` has been paired.
///
/// Every earlier round must already exist and `entry_round` must not have
/// any pairings among `matches` yet. The entrant receives one
/// synthetic loss per missed round, each conceding a full match worth of
/// games, so their record lines up with the rest of the field.
pub fn register_late_entry<R: Rng + ?Sized>(
    tournament: &Tournament,
    component: &Component,
    registrations: &[Registration],
    rounds: &[Round],
    matches: &[Match],
    player_id: PlayerId,
    entry_round: u32,
    rng: &mut R,
) -> LifecycleResult<(Registration, Vec<Match>)> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(LifecycleError::transition(
            "tournament",
            tournament.id,
            tournament.status,
            "register_late_entry",
        ));
    }
    if registrations.iter().any(|r| r.player_id == player_id) {
        return Err(LifecycleError::AlreadyRegistered { player_id });
    }

    let config = &component.config;
    if entry_round < 2 || entry_round > config.max_rounds {
        return Err(ConfigurationError::InvalidRoundNumber {
            round_number: entry_round,
            reason: format!("late entry must join between round 2 and {}", config.max_rounds),
        }
        .into());
    }

    let mut missed: Vec<&Round> = Vec::new();
    for round_number in 1..entry_round {
        let round = rounds
            .iter()
            .find(|r| r.component_id == component.id && r.round_number == round_number)
            .ok_or_else(|| ConfigurationError::InvalidRoundNumber {
                round_number: entry_round,
                reason: format!("round {round_number} has not been created yet"),
            })?;
        missed.push(round);
    }

    if let Some(paired) = matches.iter().find(|m| m.round_number >= entry_round) {
        return Err(ConfigurationError::InvalidRoundNumber {
            round_number: entry_round,
            reason: format!("round {} already has pairings", paired.round_number),
        }
        .into());
    }

    let games_lost = config.match_length.games_to_win();
    let losses: Vec<Match> = missed
        .into_iter()
        .map(|round| Match::late_entry_loss(generate_id(rng), round, player_id, games_lost))
        .collect();

    let mut registration = Registration::new(player_id, next_sequence_id(registrations));
    registration.status = RegistrationStatus::LateEntry;

    info!(
        "Late entry {} (#{}) joins at round {} with {} loss(es)",
        player_id,
        registration.sequence_id,
        entry_round,
        losses.len()
    );
    Ok((registration, losses))
}

//! Simulated Swiss event driven end to end through the library.

use anyhow::Error;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swiss_director::swiss::{PairingEngine, StandingsEntry, calculate_standings};
use swiss_director::tournament::{
    Component, Match, Registration, Round, SwissConfig, Tournament, lifecycle, registration,
};
use uuid::Uuid;

/// Everything a finished simulation produced
#[derive(Debug)]
pub struct SimulationReport {
    pub tournament: Tournament,
    pub rounds: Vec<Round>,
    pub registrations: Vec<Registration>,
    pub matches: Vec<Match>,
    pub standings: Vec<StandingsEntry>,
    /// Rounds that could only be paired by allowing rematches
    pub forced_rematch_rounds: Vec<u32>,
}

impl SimulationReport {
    /// Display number of a player
    pub fn sequence_of(&self, player: Uuid) -> u32 {
        self.registrations
            .iter()
            .find(|r| r.player_id == player)
            .map_or(0, |r| r.sequence_id)
    }
}

/// Drives one event with random results
pub struct Simulation {
    config: SwissConfig,
    draw_rate: f64,
    drop_rate: f64,
    results: StdRng,
}

impl Simulation {
    pub fn new(config: SwissConfig, draw_rate: f64, drop_rate: f64) -> Self {
        let results = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            draw_rate,
            drop_rate,
            results,
        }
    }

    /// Register `players`, play every round and compute final standings
    pub fn run(mut self, players: u32) -> Result<SimulationReport, Error> {
        let mut tournament = Tournament::new(Uuid::new_v4(), "Simulated Swiss");
        let mut component = Component::new(
            Uuid::new_v4(),
            tournament.id,
            "Swiss Rounds",
            self.config.clone(),
        );

        lifecycle::open_registration(&mut tournament)?;
        let mut registrations: Vec<Registration> = (1..=players)
            .map(|seq| Registration::new(Uuid::new_v4(), seq))
            .collect();
        lifecycle::close_registration(&mut tournament)?;

        let mut round = lifecycle::start_tournament(&mut tournament, &mut component, &registrations)?;
        let mut rounds = vec![round.clone()];
        let mut engine = PairingEngine::new(self.config.clone());
        let mut matches: Vec<Match> = Vec::new();
        let mut forced_rematch_rounds = Vec::new();

        loop {
            let pairings = if round.round_number == 1 {
                engine.pair_round_one(&registrations, &round)?
            } else {
                match engine.pair_round(&registrations, &matches, &round, None) {
                    Ok(pairings) => pairings,
                    Err(err) if err.is_retryable() => {
                        warn!("{err}; pairing with rematches allowed");
                        forced_rematch_rounds.push(round.round_number);
                        engine.pair_round(&registrations, &matches, &round, Some(true))?
                    }
                    Err(err) => return Err(err.into()),
                }
            };

            let start = matches.len();
            matches.extend(pairings.matches);
            for m in matches[start..].iter_mut().filter(|m| !m.is_complete()) {
                self.report(m)?;
            }

            self.drop_players(&mut registrations)?;

            match lifecycle::advance_to_next_round(&mut tournament, &mut component, &mut round, &matches)?
            {
                Some(next) => {
                    rounds.push(next.clone());
                    round = next;
                }
                None => break,
            }
        }

        let standings = calculate_standings(&registrations, &matches, &self.config);
        info!(
            "Simulation finished: {} players, {} rounds, {} matches",
            registrations.len(),
            rounds.len(),
            matches.len()
        );

        Ok(SimulationReport {
            tournament,
            rounds,
            registrations,
            matches,
            standings,
            forced_rematch_rounds,
        })
    }

    fn report(&mut self, m: &mut Match) -> Result<(), Error> {
        let to_win = self.config.match_length.games_to_win();

        if self.results.random_bool(self.draw_rate) {
            m.submit_result(1, 1, 1)?;
            return Ok(());
        }

        let loser_games = self.results.random_range(0..to_win);
        if self.results.random_bool(0.5) {
            m.submit_result(to_win, loser_games, 0)?;
        } else {
            m.submit_result(loser_games, to_win, 0)?;
        }
        Ok(())
    }

    fn drop_players(&mut self, registrations: &mut [Registration]) -> Result<(), Error> {
        if self.drop_rate <= 0.0 {
            return Ok(());
        }

        let mut active = registrations.iter().filter(|r| r.is_active()).count();
        for reg in registrations.iter_mut().filter(|r| r.is_active()) {
            if active > 2 && self.results.random_bool(self.drop_rate) {
                registration::drop_player(reg)?;
                active -= 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiss_director::tournament::{RegistrationStatus, TournamentStatus};

    #[test]
    fn test_simulation_completes() {
        let config = SwissConfig::for_players(9).with_seed(12);
        let report = Simulation::new(config, 0.1, 0.0).run(9).unwrap();

        assert_eq!(report.tournament.status, TournamentStatus::Completed);
        assert_eq!(report.rounds.len(), 4);
        assert_eq!(report.standings.len(), 9);
        assert!(report.matches.iter().all(Match::is_complete));
        // one bye per round with an odd field
        assert_eq!(report.matches.iter().filter(|m| m.is_bye()).count(), 4);
    }

    #[test]
    fn test_simulation_with_drops_keeps_two_players() {
        let config = SwissConfig::for_players(6).with_seed(3);
        let report = Simulation::new(config, 0.0, 0.9).run(6).unwrap();

        let active = report
            .registrations
            .iter()
            .filter(|r| r.status != RegistrationStatus::Dropped)
            .count();
        assert!(active >= 2);
        assert_eq!(report.tournament.status, TournamentStatus::Completed);
        assert_eq!(report.standings.len(), 6);
    }

    #[test]
    fn test_sequence_lookup() {
        let config = SwissConfig::default().with_seed(1);
        let report = Simulation::new(config, 0.0, 0.0).run(4).unwrap();
        let first = &report.registrations[0];
        assert_eq!(report.sequence_of(first.player_id), 1);
        assert_eq!(report.sequence_of(Uuid::nil()), 0);
    }
}

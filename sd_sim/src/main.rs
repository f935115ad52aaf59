//! Swiss tournament simulator.
//!
//! Registers a field of players, pairs and plays every round with random
//! results, then prints the pairings and final standings.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use swiss_director::tournament::{FirstRoundPairing, SwissConfig};

use config::SimConfig;
use simulation::{Simulation, SimulationReport};

const HELP: &str = "\
Simulate a Swiss-system tournament

USAGE:
  sd_sim [OPTIONS]

OPTIONS:
  --players      N       Number of registered players    [default: env SD_PLAYERS or 8]
  --rounds       N       Rounds to play                  [default: env SD_ROUNDS or ceil(log2(players))]
  --seed         N       Seed for pairings and results   [default: env SD_SEED or random]
  --swiss-config PATH    JSON Swiss configuration file   [default: env SD_SWISS_CONFIG]

FLAGS:
  --random-first-round   Shuffle round one instead of pairing by seat
  --json                 Print final standings as JSON
  -h, --help             Print help information

ENVIRONMENT:
  SD_FIRST_ROUND         seeded | random
  SD_TIEBREAKERS         wotc | opponent_heavy
  SD_ALLOW_REMATCHES     true | false
  SD_MAX_BYES            Byes per player before the cap applies
  SD_DRAW_RATE           Chance a match is drawn (0-1)
  SD_DROP_RATE           Chance a player drops after each round (0-1)
  RUST_LOG               Log filter [default: info]
";

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let random_first_round = pargs.contains("--random-first-round");
    let json = pargs.contains("--json");
    let players = pargs.opt_value_from_str("--players")?;
    let rounds = pargs.opt_value_from_str("--rounds")?;
    let seed = pargs.opt_value_from_str("--seed")?;
    let swiss_config_path: Option<PathBuf> = pargs.opt_value_from_str("--swiss-config")?;

    let mut sim_config = SimConfig::from_env(players, rounds, seed)?;
    sim_config.json = json;
    if random_first_round {
        sim_config.first_round = FirstRoundPairing::Random;
    }
    if swiss_config_path.is_some() {
        sim_config.swiss_config_path = swiss_config_path;
    }
    sim_config.validate()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let swiss_config = load_swiss_config(&sim_config)?;
    info!(
        "Simulating {} players over {} rounds ({:?} round one, {:?})",
        sim_config.players, swiss_config.max_rounds, swiss_config.first_round, swiss_config.tiebreakers
    );

    let report = Simulation::new(swiss_config, sim_config.draw_rate, sim_config.drop_rate)
        .run(sim_config.players)?;

    if sim_config.json {
        println!("{}", serde_json::to_string_pretty(&report.standings)?);
    } else {
        print_pairings(&report);
        print_standings(&report);
    }

    Ok(())
}

/// Swiss configuration from the JSON file if given, otherwise from the
/// individual settings
fn load_swiss_config(sim_config: &SimConfig) -> Result<SwissConfig, Error> {
    let Some(path) = &sim_config.swiss_config_path else {
        let config = sim_config.swiss_config();
        config.validate()?;
        return Ok(config);
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Swiss config {}", path.display()))?;
    let mut config = SwissConfig::from_json(&json)?;
    if sim_config.seed.is_some() {
        config.seed = sim_config.seed;
    }
    info!("Loaded Swiss config from {}", path.display());
    Ok(config)
}

fn print_pairings(report: &SimulationReport) {
    for round in &report.rounds {
        println!("Round {}", round.round_number);
        for m in report
            .matches
            .iter()
            .filter(|m| m.round_number == round.round_number)
        {
            let one = report.sequence_of(m.player_one);
            match (m.player_two, m.table_number) {
                (Some(two), Some(table)) => println!(
                    "  Table {:>3}: #{:<4} vs #{:<4} {}-{}-{}",
                    table,
                    one,
                    report.sequence_of(two),
                    m.player_one_wins,
                    m.player_two_wins,
                    m.draws
                ),
                _ => println!("  {:>9}: #{:<4} ({:?})", "-", one, m.kind),
            }
        }
        if report.forced_rematch_rounds.contains(&round.round_number) {
            println!("  (rematches allowed to complete this round)");
        }
    }
    println!();
}

fn print_standings(report: &SimulationReport) {
    println!(
        "{:>4}  {:<6} {:>3}  {:>7}  {:>6}  {:>6}  {:>6}  {}",
        "Rank", "Player", "Pts", "W-L-D", "OMW%", "GW%", "OGW%", "Status"
    );
    for entry in &report.standings {
        let record = format!("{}-{}-{}", entry.wins, entry.losses, entry.draws);
        println!(
            "{:>4}  #{:<5} {:>3}  {:>7}  {:>6.2}  {:>6.2}  {:>6.2}  {}",
            entry.rank,
            entry.sequence_id,
            entry.match_points,
            record,
            entry.opponent_match_win_pct * 100.0,
            entry.game_win_pct * 100.0,
            entry.opponent_game_win_pct * 100.0,
            entry.status
        );
    }
}

//! Tournament records consumed and produced by the core.
//!
//! These are plain data: the persistence layer owns storage, the core only
//! reads snapshots of them and hands back new or mutated copies.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::config::SwissConfig;
use super::errors::{LifecycleError, LifecycleResult};

/// Opaque player identifier
pub type PlayerId = Uuid;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Component ID type
pub type ComponentId = Uuid;

/// Round ID type
pub type RoundId = Uuid;

/// Match ID type
pub type MatchId = Uuid;

/// Build a record id from the supplied RNG so seeded runs stay reproducible.
pub(crate) fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

/// Tournament state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Being set up
    Draft,
    /// Accepting registrations
    RegistrationOpen,
    /// No new players
    RegistrationClosed,
    /// Rounds are being played
    InProgress,
    /// Finished
    Completed,
    /// Terminated by the organizer
    Cancelled,
}

impl TournamentStatus {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: TournamentStatus) -> bool {
        use TournamentStatus::*;

        match (self, next) {
            (Draft, RegistrationOpen) => true,
            (RegistrationOpen, RegistrationClosed) => true,
            (Draft | RegistrationClosed, InProgress) => true,
            (InProgress, Completed) => true,
            (Draft | RegistrationOpen | RegistrationClosed | InProgress, Cancelled) => true,
            (Draft | RegistrationOpen | RegistrationClosed | InProgress | Completed | Cancelled, _) => {
                false
            }
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentStatus::Draft => write!(f, "draft"),
            TournamentStatus::RegistrationOpen => write!(f, "registration_open"),
            TournamentStatus::RegistrationClosed => write!(f, "registration_closed"),
            TournamentStatus::InProgress => write!(f, "in_progress"),
            TournamentStatus::Completed => write!(f, "completed"),
            TournamentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Component state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Pending,
    Active,
    Completed,
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentStatus::Pending => write!(f, "pending"),
            ComponentStatus::Active => write!(f, "active"),
            ComponentStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Round state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Pending,
    Active,
    Completed,
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundStatus::Pending => write!(f, "pending"),
            RoundStatus::Active => write!(f, "active"),
            RoundStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Player participation status within one tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Active,
    Dropped,
    LateEntry,
}

impl RegistrationStatus {
    /// Whether the player takes part in pairings
    pub fn is_active(self) -> bool {
        match self {
            RegistrationStatus::Active | RegistrationStatus::LateEntry => true,
            RegistrationStatus::Dropped => false,
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStatus::Active => write!(f, "active"),
            RegistrationStatus::Dropped => write!(f, "dropped"),
            RegistrationStatus::LateEntry => write!(f, "late_entry"),
        }
    }
}

/// Tournament record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    /// Tournament ID
    pub id: TournamentId,
    /// Display name
    pub name: String,
    /// Current state
    pub status: TournamentStatus,
    /// Started at timestamp
    pub start_time: Option<DateTime<Utc>>,
    /// Finished or cancelled at timestamp
    pub end_time: Option<DateTime<Utc>>,
    /// Organizer asked to stop once the minimum round count is met
    pub early_end_requested: bool,
}

impl Tournament {
    /// Create a tournament in the draft state
    pub fn new(id: TournamentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: TournamentStatus::Draft,
            start_time: None,
            end_time: None,
            early_end_requested: false,
        }
    }
}

/// A pairing structure inside a tournament (here always Swiss rounds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Component ID
    pub id: ComponentId,
    /// Owning tournament
    pub tournament_id: TournamentId,
    /// Display name ("Swiss Rounds")
    pub name: String,
    /// Current state
    pub status: ComponentStatus,
    /// Pairing and scoring configuration
    pub config: SwissConfig,
}

impl Component {
    /// Create a pending Swiss component
    pub fn new(
        id: ComponentId,
        tournament_id: TournamentId,
        name: impl Into<String>,
        config: SwissConfig,
    ) -> Self {
        Self {
            id,
            tournament_id,
            name: name.into(),
            status: ComponentStatus::Pending,
            config,
        }
    }
}

/// One pairing cycle within a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub tournament_id: TournamentId,
    pub component_id: ComponentId,
    /// Round number (1-indexed, unique within the component)
    pub round_number: u32,
    pub status: RoundStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub time_limit_minutes: Option<u32>,
}

impl Round {
    /// Create an active, start-timestamped round
    pub fn started(
        id: RoundId,
        tournament_id: TournamentId,
        component_id: ComponentId,
        round_number: u32,
    ) -> Self {
        Self {
            id,
            tournament_id,
            component_id,
            round_number,
            status: RoundStatus::Active,
            start_time: Some(Utc::now()),
            end_time: None,
            time_limit_minutes: None,
        }
    }
}

/// A player's participation in one tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub player_id: PlayerId,
    /// Per-tournament display number (#1, #2, ...)
    pub sequence_id: u32,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    pub dropped_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// Create an active registration timestamped now
    pub fn new(player_id: PlayerId, sequence_id: u32) -> Self {
        Self {
            player_id,
            sequence_id,
            status: RegistrationStatus::Active,
            registered_at: Utc::now(),
            dropped_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// How a match record came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Two players sat down against each other
    Regular,
    /// Unpaired player credited with a win
    Bye,
    /// Synthetic loss for a round a late entrant missed
    LateEntryLoss,
}

/// Match result from one player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

impl MatchOutcome {
    /// Match points awarded for this outcome
    pub fn match_points(self) -> u32 {
        match self {
            MatchOutcome::Win => 3,
            MatchOutcome::Draw => 1,
            MatchOutcome::Loss => 0,
        }
    }
}

/// Games won, lost and drawn from one player's perspective
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameCounts {
    pub won: u32,
    pub lost: u32,
    pub drawn: u32,
}

impl GameCounts {
    pub fn total(&self) -> u32 {
        self.won + self.lost + self.drawn
    }
}

/// The atomic result record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub component_id: ComponentId,
    pub round_id: RoundId,
    pub round_number: u32,
    pub table_number: Option<u32>,
    pub kind: MatchKind,
    pub player_one: PlayerId,
    /// Absent for byes and late-entry losses
    pub player_two: Option<PlayerId>,
    pub player_one_wins: u32,
    pub player_two_wins: u32,
    /// Drawn games
    pub draws: u32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Match {
    /// Create a regular pairing with zeroed results
    pub fn pairing(
        id: MatchId,
        round: &Round,
        table_number: u32,
        player_one: PlayerId,
        player_two: PlayerId,
    ) -> Self {
        Self {
            id,
            tournament_id: round.tournament_id,
            component_id: round.component_id,
            round_id: round.id,
            round_number: round.round_number,
            table_number: Some(table_number),
            kind: MatchKind::Regular,
            player_one,
            player_two: Some(player_two),
            player_one_wins: 0,
            player_two_wins: 0,
            draws: 0,
            start_time: None,
            end_time: None,
            notes: None,
        }
    }

    /// Create a bye; it needs no result so it is completed on creation
    pub fn bye(id: MatchId, round: &Round, player: PlayerId, game_wins: u32) -> Self {
        let now = Utc::now();
        Self {
            id,
            tournament_id: round.tournament_id,
            component_id: round.component_id,
            round_id: round.id,
            round_number: round.round_number,
            table_number: None,
            kind: MatchKind::Bye,
            player_one: player,
            player_two: None,
            player_one_wins: game_wins,
            player_two_wins: 0,
            draws: 0,
            start_time: Some(now),
            end_time: Some(now),
            notes: Some("bye".to_string()),
        }
    }

    /// Create the synthetic loss for a round a late entrant missed
    pub fn late_entry_loss(id: MatchId, round: &Round, player: PlayerId, games_lost: u32) -> Self {
        let now = Utc::now();
        Self {
            id,
            tournament_id: round.tournament_id,
            component_id: round.component_id,
            round_id: round.id,
            round_number: round.round_number,
            table_number: None,
            kind: MatchKind::LateEntryLoss,
            player_one: player,
            player_two: None,
            player_one_wins: 0,
            player_two_wins: games_lost,
            draws: 0,
            start_time: Some(now),
            end_time: Some(now),
            notes: Some("late entry".to_string()),
        }
    }

    /// Whether there is no opponent (bye or late-entry loss)
    pub fn is_bye(&self) -> bool {
        self.player_two.is_none()
    }

    /// Whether this is an awarded bye, the kind that counts against the bye cap
    pub fn is_awarded_bye(&self) -> bool {
        self.kind == MatchKind::Bye
    }

    pub fn is_complete(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player_one == player || self.player_two == Some(player)
    }

    /// The other side of the table, `None` for byes or non-participants
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let opponent = self.player_two?;
        if self.player_one == player {
            Some(opponent)
        } else if opponent == player {
            Some(self.player_one)
        } else {
            None
        }
    }

    /// Game counts seen from `player`'s seat
    pub fn games_for(&self, player: PlayerId) -> GameCounts {
        if self.player_one == player {
            GameCounts {
                won: self.player_one_wins,
                lost: self.player_two_wins,
                drawn: self.draws,
            }
        } else {
            GameCounts {
                won: self.player_two_wins,
                lost: self.player_one_wins,
                drawn: self.draws,
            }
        }
    }

    /// Match outcome from `player`'s perspective
    pub fn outcome_for(&self, player: PlayerId) -> MatchOutcome {
        match self.kind {
            MatchKind::Bye => MatchOutcome::Win,
            MatchKind::LateEntryLoss => MatchOutcome::Loss,
            MatchKind::Regular => {
                let games = self.games_for(player);
                match games.won.cmp(&games.lost) {
                    std::cmp::Ordering::Greater => MatchOutcome::Win,
                    std::cmp::Ordering::Less => MatchOutcome::Loss,
                    std::cmp::Ordering::Equal => MatchOutcome::Draw,
                }
            }
        }
    }

    /// Record the result reported at the table
    ///
    /// A result can only be submitted once; later changes go through
    /// [`Match::correct_result`].
    pub fn submit_result(
        &mut self,
        player_one_wins: u32,
        player_two_wins: u32,
        draws: u32,
    ) -> LifecycleResult<()> {
        if self.kind != MatchKind::Regular || self.is_complete() {
            return Err(LifecycleError::InvalidStateTransition {
                entity: "match",
                id: self.id,
                from: if self.is_complete() { "reported" } else { "unreported" }.to_string(),
                operation: "submit_result",
            });
        }

        let now = Utc::now();
        self.player_one_wins = player_one_wins;
        self.player_two_wins = player_two_wins;
        self.draws = draws;
        self.start_time.get_or_insert(now);
        self.end_time = Some(now);
        Ok(())
    }

    /// Administrative correction of an already reported result
    pub fn correct_result(
        &mut self,
        player_one_wins: u32,
        player_two_wins: u32,
        draws: u32,
        note: impl Into<String>,
    ) -> LifecycleResult<()> {
        if self.kind != MatchKind::Regular || !self.is_complete() {
            return Err(LifecycleError::InvalidStateTransition {
                entity: "match",
                id: self.id,
                from: "unreported".to_string(),
                operation: "correct_result",
            });
        }

        log::info!(
            "Correcting match {} (round {}): {}-{}-{} -> {}-{}-{}",
            self.id,
            self.round_number,
            self.player_one_wins,
            self.player_two_wins,
            self.draws,
            player_one_wins,
            player_two_wins,
            draws
        );
        self.player_one_wins = player_one_wins;
        self.player_two_wins = player_two_wins;
        self.draws = draws;
        self.notes = Some(note.into());
        Ok(())
    }
}

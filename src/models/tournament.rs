//! Tournament aggregate, Phase and TournamentError.

use crate::models::game::{BracketMatch, GameMatch, MatchId, Round};
use crate::models::player::{NewPlayer, Player, PlayerId};
use crate::models::settings::{TournamentSettings, MIN_PLAYERS};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// The roster already holds `limit` players.
    PlayerLimitReached { limit: usize },
    /// Player limit below the minimum of 4.
    PlayerLimitTooLow { minimum: usize },
    /// Player limit below the number of players already registered.
    PlayerLimitBelowRegistered { registered: usize },
    InvalidCourtCount(u8),
    /// Not an `HH:MM` string.
    InvalidTimeSlot(String),
    DuplicateTimeSlot(String),
    EmptyTimeSlots,
    EmptyPlayerName,
    /// Settings cannot change in the current phase or after the draw.
    SettingsLocked,
    /// Tournament is not in a state that allows this action.
    InvalidState,
    MatchNotFound(MatchId),
    TournamentNotFound(Uuid),
    /// Draw preconditions not met (full roster, at least 4 players, not drawn yet).
    CannotDrawMatches,
    /// Redraw needs an existing draw with no completed match.
    CannotRedrawMatches,
    /// Phase transition preconditions not met.
    CannotAdvancePhase,
    /// Not enough ranked players to build a knockout bracket.
    BracketUnavailable,
    /// Knockout match still waiting for upstream results.
    BracketSlotsPending,
    /// Knockout matches need a winner.
    TiedKnockoutScore,
    /// Group scores are frozen once the knockout stage has started.
    ScoresLocked,
    /// The document store failed.
    Store(StoreError),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::PlayerLimitReached { limit } => {
                write!(f, "Player limit of {} reached", limit)
            }
            TournamentError::PlayerLimitTooLow { minimum } => {
                write!(f, "Player limit must be at least {}", minimum)
            }
            TournamentError::PlayerLimitBelowRegistered { registered } => write!(
                f,
                "Player limit cannot be lower than the current number of players ({})",
                registered
            ),
            TournamentError::InvalidCourtCount(courts) => {
                write!(f, "Number of courts must be between 1 and 10 (got {})", courts)
            }
            TournamentError::InvalidTimeSlot(raw) => {
                write!(f, "Invalid time slot '{}', use HH:MM (e.g. 08:30)", raw)
            }
            TournamentError::DuplicateTimeSlot(slot) => write!(f, "Time slot {} already exists", slot),
            TournamentError::EmptyTimeSlots => write!(f, "At least one time slot is required"),
            TournamentError::EmptyPlayerName => write!(f, "Player name cannot be empty"),
            TournamentError::SettingsLocked => {
                write!(f, "Settings can only change during the group phase before the draw")
            }
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::MatchNotFound(_) => write!(f, "Match not found"),
            TournamentError::TournamentNotFound(_) => write!(f, "Tournament not found"),
            TournamentError::CannotDrawMatches => write!(f, "Matches cannot be drawn yet"),
            TournamentError::CannotRedrawMatches => {
                write!(f, "Matches can only be redrawn before any result is entered")
            }
            TournamentError::CannotAdvancePhase => write!(f, "The tournament cannot advance yet"),
            TournamentError::BracketUnavailable => {
                write!(f, "Not enough ranked players to build the bracket")
            }
            TournamentError::BracketSlotsPending => {
                write!(f, "This match is waiting for earlier results")
            }
            TournamentError::TiedKnockoutScore => write!(f, "Knockout matches cannot end in a tie"),
            TournamentError::ScoresLocked => {
                write!(f, "Group scores are locked once the knockout stage starts")
            }
            TournamentError::Store(_) => write!(f, "Operation failed"),
        }
    }
}

impl std::error::Error for TournamentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TournamentError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for TournamentError {
    fn from(e: StoreError) -> Self {
        TournamentError::Store(e)
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Macro-stage of the tournament. Only moves forward; reset is the way back.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Round-robin play.
    #[default]
    Group,
    /// Two semifinals; only reached with the semifinal bracket format.
    Semifinals,
    /// Final (and third-place match, depending on the format). Terminal.
    Final,
}

/// Full tournament state: roster, matches, bracket, phase and settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    /// Registration order.
    pub players: Vec<Player>,
    /// Group-stage matches.
    pub matches: Vec<GameMatch>,
    pub bracket_matches: Vec<BracketMatch>,
    pub phase: Phase,
    /// Set once the scheduler has produced the group-stage draw.
    pub matches_drawn: bool,
    pub settings: TournamentSettings,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}

impl Tournament {
    /// Create a new tournament in the group phase with no players.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: TournamentId) -> Self {
        Self {
            id,
            players: Vec::new(),
            matches: Vec::new(),
            bracket_matches: Vec::new(),
            phase: Phase::Group,
            matches_drawn: false,
            settings: TournamentSettings::default(),
        }
    }

    /// Create a tournament with an initial roster; the limit is set to the roster size (min 4).
    pub fn with_players(players: Vec<Player>) -> Self {
        let mut t = Self::new();
        t.settings.player_limit = players.len().max(MIN_PLAYERS);
        t.players = players;
        t
    }

    pub fn number_of_courts(&self) -> u8 {
        self.settings.number_of_courts
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Display name of a player, or "Unknown".
    pub fn player_name(&self, id: PlayerId) -> &str {
        self.player(id).map(|p| p.name.as_str()).unwrap_or("Unknown")
    }

    pub fn has_completed_matches(&self) -> bool {
        self.matches.iter().any(|m| m.completed)
    }

    fn roster_complete(&self) -> bool {
        self.players.len() == self.settings.player_limit && self.players.len() >= MIN_PLAYERS
    }

    /// Full roster of at least 4 players, not drawn yet, at least one court.
    pub fn can_draw_matches(&self) -> bool {
        self.roster_complete() && !self.matches_drawn && self.settings.number_of_courts > 0
    }

    /// A draw exists and no result has been entered.
    pub fn can_redraw_matches(&self) -> bool {
        self.phase == Phase::Group && self.matches_drawn && !self.has_completed_matches()
    }

    pub fn can_advance_phase(&self) -> bool {
        match self.phase {
            Phase::Group => {
                self.matches_drawn
                    && !self.matches.is_empty()
                    && self.matches.iter().all(|m| m.completed)
                    && self.roster_complete()
            }
            Phase::Semifinals => {
                let mut semis = self
                    .bracket_matches
                    .iter()
                    .filter(|m| m.round == Round::Semifinals)
                    .peekable();
                semis.peek().is_some() && semis.all(|m| m.completed)
            }
            Phase::Final => false,
        }
    }

    fn settings_editable(&self) -> bool {
        self.phase == Phase::Group && !self.matches_drawn
    }

    /// Register a player (group phase only, up to the player limit).
    ///
    /// Names and nicknames are trimmed; an empty nickname falls back to the name.
    /// After a draw, registration is refused once any result exists.
    pub fn add_player(&mut self, new_player: NewPlayer) -> Result<PlayerId, TournamentError> {
        if self.phase != Phase::Group {
            return Err(TournamentError::InvalidState);
        }
        if self.players.len() >= self.settings.player_limit {
            return Err(TournamentError::PlayerLimitReached {
                limit: self.settings.player_limit,
            });
        }
        if self.has_completed_matches() {
            return Err(TournamentError::InvalidState);
        }
        let name = new_player.name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        let nickname = match new_player.nickname.trim() {
            "" => name,
            nick => nick,
        };
        let mut player = Player::new(name, nickname);
        player.photo_url = new_player.photo_url.filter(|url| !url.trim().is_empty());
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Set the player limit (group phase only; at least 4 and at least the roster size).
    pub fn set_player_limit(&mut self, limit: usize) -> Result<(), TournamentError> {
        if self.phase != Phase::Group {
            return Err(TournamentError::SettingsLocked);
        }
        TournamentSettings::validate_player_limit(limit, self.players.len())?;
        self.settings.player_limit = limit;
        Ok(())
    }

    /// Set the number of courts (1..=10, before the draw).
    pub fn set_number_of_courts(&mut self, courts: u8) -> Result<(), TournamentError> {
        if !self.settings_editable() {
            return Err(TournamentError::SettingsLocked);
        }
        TournamentSettings::validate_number_of_courts(courts)?;
        self.settings.number_of_courts = courts;
        Ok(())
    }

    /// Replace the time-slot grid (before the draw).
    pub fn set_time_slots<S: AsRef<str>>(&mut self, raw: &[S]) -> Result<(), TournamentError> {
        if !self.settings_editable() {
            return Err(TournamentError::SettingsLocked);
        }
        self.settings.time_slots = TournamentSettings::parse_time_slots(raw)?;
        Ok(())
    }

    /// Group or bracket match with this id exists.
    pub fn has_match(&self, id: MatchId) -> bool {
        self.matches.iter().any(|m| m.id == id) || self.bracket_matches.iter().any(|m| m.id == id)
    }

    /// Winner of the completed final, if any.
    pub fn champion(&self) -> Option<&Player> {
        self.bracket_matches
            .iter()
            .find(|m| m.round == Round::Final)
            .and_then(BracketMatch::winner)
            .and_then(|id| self.player(id))
    }

    /// Clear everything back to an empty group phase, keeping the id.
    pub fn reset(&mut self) {
        *self = Self::with_id(self.id);
    }
}

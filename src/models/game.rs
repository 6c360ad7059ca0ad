//! Group-stage matches, knockout matches and their rounds.

use crate::models::player::PlayerId;
use crate::models::settings::TimeSlot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Knockout round a bracket match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Round {
    Semifinals,
    Final,
    ThirdPlace,
}

/// Compare two game counts; `None` on a tie.
fn winning_side(player1_games: u32, player2_games: u32) -> Option<bool> {
    match player1_games.cmp(&player2_games) {
        std::cmp::Ordering::Greater => Some(true),
        std::cmp::Ordering::Less => Some(false),
        std::cmp::Ordering::Equal => None,
    }
}

/// A round-robin match between two players.
///
/// `player1`/`player2` are interchangeable for pairing purposes but fix which
/// side each game count is attributed to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMatch {
    pub id: MatchId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub player1_games: u32,
    pub player2_games: u32,
    /// Flipped to true by the first score submission and never reset.
    pub completed: bool,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<TimeSlot>,
}

impl GameMatch {
    pub fn new(player1_id: PlayerId, player2_id: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            player1_id,
            player2_id,
            player1_games: 0,
            player2_games: 0,
            completed: false,
            date: Utc::now(),
            court_number: None,
            time_slot: None,
        }
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1_id == player || self.player2_id == player
    }

    /// `(won, lost)` games from the point of view of `player`.
    pub fn games_for(&self, player: PlayerId) -> Option<(u32, u32)> {
        if self.player1_id == player {
            Some((self.player1_games, self.player2_games))
        } else if self.player2_id == player {
            Some((self.player2_games, self.player1_games))
        } else {
            None
        }
    }

    /// Winner of a completed match; ties have none.
    pub fn winner(&self) -> Option<PlayerId> {
        if !self.completed {
            return None;
        }
        winning_side(self.player1_games, self.player2_games).map(|first| {
            if first {
                self.player1_id
            } else {
                self.player2_id
            }
        })
    }

    pub fn is_scheduled(&self) -> bool {
        self.time_slot.is_some() && self.court_number.is_some()
    }

    pub fn record_score(&mut self, player1_games: u32, player2_games: u32) {
        self.player1_games = player1_games;
        self.player2_games = player2_games;
        self.completed = true;
    }
}

/// A knockout match. Player slots stay empty until upstream results fill them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketMatch {
    pub id: MatchId,
    pub round: Round,
    #[serde(default)]
    pub player1_id: Option<PlayerId>,
    #[serde(default)]
    pub player2_id: Option<PlayerId>,
    pub player1_games: u32,
    pub player2_games: u32,
    pub completed: bool,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<TimeSlot>,
}

impl BracketMatch {
    pub fn new(round: Round, player1_id: Option<PlayerId>, player2_id: Option<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            player1_id,
            player2_id,
            player1_games: 0,
            player2_games: 0,
            completed: false,
            date: Utc::now(),
            court_number: None,
            time_slot: None,
        }
    }

    /// Both player slots are filled.
    pub fn is_ready(&self) -> bool {
        self.player1_id.is_some() && self.player2_id.is_some()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        if !self.completed {
            return None;
        }
        match winning_side(self.player1_games, self.player2_games)? {
            true => self.player1_id,
            false => self.player2_id,
        }
    }

    pub fn record_score(&mut self, player1_games: u32, player2_games: u32) {
        self.player1_games = player1_games;
        self.player2_games = player2_games;
        self.completed = true;
    }
}

//! Player and PlayerStats data structures.

use crate::models::game::MatchId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Derived standings of a player. Always recomputed from the match set.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStats {
    /// Matches won (strictly more games than the opponent).
    pub points: u32,
    pub games_won: u32,
    pub games_lost: u32,
    /// Completed matches touching the player, in match order.
    pub matches_played: Vec<MatchId>,
}

impl PlayerStats {
    /// Games won minus games lost; the secondary ranking key.
    pub fn game_difference(&self) -> i64 {
        i64::from(self.games_won) - i64::from(self.games_lost)
    }
}

/// A registered player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub nickname: String,
    /// Avatar reference, if one was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(flatten)]
    pub stats: PlayerStats,
}

impl Player {
    /// Create a new player with empty stats.
    pub fn new(name: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            nickname: nickname.into(),
            photo_url: None,
            stats: PlayerStats::default(),
        }
    }

    /// Same player with freshly derived stats.
    pub fn with_stats(&self, stats: PlayerStats) -> Self {
        Self {
            stats,
            ..self.clone()
        }
    }
}

/// Registration payload: what a user types in when adding a player.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl NewPlayer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

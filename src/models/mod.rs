//! Data structures for the tennis tournament: players, matches, settings, tournament state.

mod game;
mod player;
mod settings;
mod tournament;

pub use game::{BracketMatch, GameMatch, MatchId, Round};
pub use player::{NewPlayer, Player, PlayerId, PlayerStats};
pub use settings::{
    default_time_slots, TimeSlot, TournamentSettings, DEFAULT_NUMBER_OF_COURTS,
    DEFAULT_PLAYER_LIMIT, MAX_COURTS, MIN_PLAYERS,
};
pub use tournament::{Phase, Tournament, TournamentError, TournamentId};

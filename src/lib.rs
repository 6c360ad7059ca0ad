//! Tennis tournament organizer: round-robin group stage with court
//! scheduling, standings and a knockout bracket.

pub mod config;
pub mod export;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::ServerConfig;
pub use logic::{
    advance_phase, calculate_stats, draw_matches, find_conflicts, generate_round_robin,
    rank_players, ranking, record_bracket_score, redraw_matches, refresh_stats, register_player,
    schedule_by_slot, submit_score, BracketFormat, BracketStrategy, DrawSummary,
    FinalAndThirdPlace, Schedule, Scheduler, SemifinalsAndFinal, SlotConflict,
};
pub use models::{
    BracketMatch, GameMatch, MatchId, NewPlayer, Phase, Player, PlayerId, PlayerStats, Round,
    TimeSlot, Tournament, TournamentError, TournamentId, TournamentSettings,
};
pub use service::TournamentService;
pub use store::{DocumentStore, MemoryStore, StoreError};

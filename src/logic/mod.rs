//! Tournament business logic: pairing, scheduling, standings, bracket and phases.

mod finals;
mod group_play;
mod pairing;
mod phase;
mod ranking;
mod scheduling;
mod setup;

pub use finals::{
    record_bracket_score, BracketFormat, BracketStrategy, FinalAndThirdPlace, SemifinalsAndFinal,
};
pub use group_play::{draw_matches, redraw_matches, submit_score, DrawSummary};
pub use pairing::generate_round_robin;
pub use phase::advance_phase;
pub use ranking::{calculate_stats, rank_players, ranking, refresh_stats};
pub use scheduling::{
    find_conflicts, schedule_by_slot, Schedule, Scheduler, SlotConflict, EXTRA_SLOT_STEP_MINUTES,
    MAX_EXTRA_SLOTS,
};
pub use setup::register_player;

//! Group stage: drawing the round-robin schedule and entering scores.

use crate::logic::finals::record_bracket_score;
use crate::logic::pairing::generate_round_robin;
use crate::logic::scheduling::{Schedule, Scheduler, SlotConflict};
use crate::models::{MatchId, Phase, TimeSlot, Tournament, TournamentError};
use rand::Rng;
use serde::Serialize;

/// What a draw produced, for the caller to show or log.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSummary {
    pub matches: usize,
    pub time_slots_used: usize,
    /// Slots added past the configured grid.
    pub extra_slots: Vec<TimeSlot>,
    /// Double bookings from the forced fallback; empty when the draw is clean.
    pub conflicts: Vec<SlotConflict>,
}

impl From<&Schedule> for DrawSummary {
    fn from(schedule: &Schedule) -> Self {
        Self {
            matches: schedule.matches.len(),
            time_slots_used: schedule.slots_used(),
            extra_slots: schedule.extra_slots.clone(),
            conflicts: schedule.conflicts.clone(),
        }
    }
}

/// Pair the roster and schedule it with the tournament's courts and slots.
fn build_schedule<R: Rng + ?Sized>(tournament: &mut Tournament, rng: &mut R) -> DrawSummary {
    let matches = generate_round_robin(&tournament.players);
    let schedule = Scheduler::new(
        tournament.settings.number_of_courts,
        &tournament.settings.time_slots,
    )
    .schedule(matches, rng);
    let summary = DrawSummary::from(&schedule);
    if !schedule.is_conflict_free() {
        log::warn!(
            "Draw for tournament {} has {} double booking(s)",
            tournament.id,
            schedule.conflicts.len()
        );
    }
    tournament.matches = schedule.matches;
    tournament.matches_drawn = true;
    summary
}

/// Generate and schedule the group-stage matches.
///
/// Requires a full roster of at least 4 players and no previous draw.
pub fn draw_matches<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<DrawSummary, TournamentError> {
    if !tournament.can_draw_matches() {
        return Err(TournamentError::CannotDrawMatches);
    }
    let summary = build_schedule(tournament, rng);
    log::info!(
        "Drew {} match(es) in {} slot(s) for tournament {}",
        summary.matches,
        summary.time_slots_used,
        tournament.id
    );
    Ok(summary)
}

/// Throw away the current draw and schedule again.
///
/// Only while a draw exists and no match has a result.
pub fn redraw_matches<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<DrawSummary, TournamentError> {
    if !tournament.can_redraw_matches() {
        return Err(TournamentError::CannotRedrawMatches);
    }
    let summary = build_schedule(tournament, rng);
    log::info!(
        "Redrew {} match(es) for tournament {}",
        summary.matches,
        tournament.id
    );
    Ok(summary)
}

/// Record the games of a group or bracket match and mark it completed.
///
/// Group scores may be corrected until the knockout stage starts. Ties are
/// accepted in the group stage and give no point to either player.
pub fn submit_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    player1_games: u32,
    player2_games: u32,
) -> Result<(), TournamentError> {
    let phase = tournament.phase;
    if let Some(m) = tournament.matches.iter_mut().find(|m| m.id == match_id) {
        if phase != Phase::Group {
            return Err(TournamentError::ScoresLocked);
        }
        m.record_score(player1_games, player2_games);
        log::debug!(
            "Score {}-{} recorded for match {}",
            player1_games,
            player2_games,
            match_id
        );
        return Ok(());
    }
    record_bracket_score(tournament, match_id, player1_games, player2_games)
}

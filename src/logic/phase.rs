//! Phase progression: GROUP -> FINAL, or GROUP -> SEMIFINALS -> FINAL.

use crate::logic::finals::BracketStrategy;
use crate::logic::ranking::ranking;
use crate::models::{Phase, Tournament, TournamentError};

/// Move the tournament to its next phase and return it.
///
/// Leaving the group stage needs every group match completed and a full
/// roster of at least 4 players; the bracket is then built from the ranking.
/// Leaving the semifinals needs both semifinals completed. Nothing changes
/// when a precondition fails.
pub fn advance_phase(
    tournament: &mut Tournament,
    strategy: &dyn BracketStrategy,
) -> Result<Phase, TournamentError> {
    if !tournament.can_advance_phase() {
        return Err(TournamentError::CannotAdvancePhase);
    }
    let next = match tournament.phase {
        Phase::Group => {
            let bracket = strategy.generate(&ranking(tournament), tournament.settings.player_limit);
            if bracket.is_empty() {
                return Err(TournamentError::BracketUnavailable);
            }
            tournament.bracket_matches = bracket;
            strategy.knockout_phase()
        }
        Phase::Semifinals => Phase::Final,
        Phase::Final => return Err(TournamentError::InvalidState),
    };
    log::info!(
        "Tournament {} advanced from {:?} to {:?}",
        tournament.id,
        tournament.phase,
        next
    );
    tournament.phase = next;
    Ok(next)
}

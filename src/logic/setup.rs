//! Setup: player registration, keeping an existing draw in step with the roster.

use crate::logic::group_play::redraw_matches;
use crate::models::{NewPlayer, Player, Tournament, TournamentError};
use rand::Rng;

/// Register a player. If matches were already drawn (and none has a result),
/// the schedule is regenerated so the newcomer is paired with everyone.
pub fn register_player<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    new_player: NewPlayer,
    rng: &mut R,
) -> Result<Player, TournamentError> {
    let id = tournament.add_player(new_player)?;
    if tournament.matches_drawn {
        redraw_matches(tournament, rng)?;
    }
    let player = tournament
        .player(id)
        .cloned()
        .ok_or(TournamentError::InvalidState)?;
    log::info!(
        "Registered {} ({}/{}) in tournament {}",
        player.name,
        tournament.players.len(),
        tournament.settings.player_limit,
        tournament.id
    );
    Ok(player)
}

//! Standings: per-player stats derived from group matches, and the ranking order.

use crate::models::{GameMatch, Player, PlayerStats, Tournament};

/// Stats of `player` over the completed matches in `matches`.
///
/// Games are attributed by side, points count strict wins only (a tie gives
/// nobody a point), and `matches_played` keeps the order of `matches`.
pub fn calculate_stats(player: &Player, matches: &[GameMatch]) -> Player {
    let mut stats = PlayerStats::default();
    for m in matches.iter().filter(|m| m.completed) {
        let Some((won, lost)) = m.games_for(player.id) else {
            continue;
        };
        stats.games_won = stats.games_won.saturating_add(won);
        stats.games_lost = stats.games_lost.saturating_add(lost);
        if won > lost {
            stats.points += 1;
        }
        stats.matches_played.push(m.id);
    }
    player.with_stats(stats)
}

/// Players with fresh stats, sorted by points then game difference (both descending).
///
/// Remaining ties keep the input (registration) order.
pub fn rank_players(players: &[Player], matches: &[GameMatch]) -> Vec<Player> {
    let mut ranked: Vec<Player> = players.iter().map(|p| calculate_stats(p, matches)).collect();
    ranked.sort_by(|a, b| {
        b.stats
            .points
            .cmp(&a.stats.points)
            .then_with(|| b.stats.game_difference().cmp(&a.stats.game_difference()))
    });
    ranked
}

/// Current group-stage ranking of a tournament.
pub fn ranking(tournament: &Tournament) -> Vec<Player> {
    rank_players(&tournament.players, &tournament.matches)
}

/// Overwrite each player's stats with values derived from the group matches.
pub fn refresh_stats(tournament: &mut Tournament) {
    let matches = &tournament.matches;
    for player in &mut tournament.players {
        player.stats = calculate_stats(player, matches).stats;
    }
}

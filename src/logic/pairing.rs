//! Round-robin pairing: every player meets every other player once.

use crate::models::{GameMatch, Player};

/// One unscheduled match per unordered pair, in `(i, j)` index order with `i < j`.
///
/// Fewer than two players yields no matches.
pub fn generate_round_robin(players: &[Player]) -> Vec<GameMatch> {
    let n = players.len();
    let mut matches = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for (i, first) in players.iter().enumerate() {
        for second in &players[i + 1..] {
            matches.push(GameMatch::new(first.id, second.id));
        }
    }
    matches
}

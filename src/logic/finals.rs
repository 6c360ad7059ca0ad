//! Knockout stage: bracket formats and knockout score entry.

use crate::models::{
    BracketMatch, MatchId, Phase, Player, Round, Tournament, TournamentError, MIN_PLAYERS,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Builds the knockout matches from the final group ranking.
pub trait BracketStrategy: Send + Sync {
    /// Phase the tournament enters when the group stage closes.
    fn knockout_phase(&self) -> Phase;

    /// Knockout matches for `ranking` (best first). Empty when the ranking is too short.
    fn generate(&self, ranking: &[Player], player_limit: usize) -> Vec<BracketMatch>;
}

/// Top four: 1st vs 2nd in the final, 3rd vs 4th for third place.
#[derive(Clone, Copy, Debug, Default)]
pub struct FinalAndThirdPlace;

impl BracketStrategy for FinalAndThirdPlace {
    fn knockout_phase(&self) -> Phase {
        Phase::Final
    }

    fn generate(&self, ranking: &[Player], _player_limit: usize) -> Vec<BracketMatch> {
        let [first, second, third, fourth, ..] = ranking else {
            return Vec::new();
        };
        vec![
            BracketMatch::new(Round::ThirdPlace, Some(third.id), Some(fourth.id)),
            BracketMatch::new(Round::Final, Some(first.id), Some(second.id)),
        ]
    }
}

/// Two semifinals between consecutive seeds (1 v 2, 3 v 4) and a final
/// whose players are filled in from the semifinal winners.
///
/// Qualification needs `floor(player_limit * 0.8)` to reach four places.
#[derive(Clone, Copy, Debug, Default)]
pub struct SemifinalsAndFinal;

impl SemifinalsAndFinal {
    const SEATS: usize = 4;

    /// `floor(limit * 0.8)`.
    pub fn qualifying_places(player_limit: usize) -> usize {
        player_limit * 4 / 5
    }
}

impl BracketStrategy for SemifinalsAndFinal {
    fn knockout_phase(&self) -> Phase {
        Phase::Semifinals
    }

    fn generate(&self, ranking: &[Player], player_limit: usize) -> Vec<BracketMatch> {
        if Self::qualifying_places(player_limit) < Self::SEATS || ranking.len() < MIN_PLAYERS {
            return Vec::new();
        }
        let mut matches: Vec<BracketMatch> = ranking[..Self::SEATS]
            .chunks_exact(2)
            .map(|pair| BracketMatch::new(Round::Semifinals, Some(pair[0].id), Some(pair[1].id)))
            .collect();
        matches.push(BracketMatch::new(Round::Final, None, None));
        matches
    }
}

/// Configured bracket format.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketFormat {
    /// Final plus third-place match.
    #[default]
    Final,
    /// Semifinals, then a final.
    Semifinals,
}

impl BracketFormat {
    pub fn strategy(self) -> Box<dyn BracketStrategy> {
        match self {
            BracketFormat::Final => Box::new(FinalAndThirdPlace),
            BracketFormat::Semifinals => Box::new(SemifinalsAndFinal),
        }
    }
}

impl FromStr for BracketFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "final" => Ok(BracketFormat::Final),
            "semifinals" => Ok(BracketFormat::Semifinals),
            other => Err(format!("unknown bracket format '{}'", other)),
        }
    }
}

/// Put the semifinal winners into the final once both semifinals have a result.
/// A final that has been played is left alone.
fn fill_final_from_semifinals(tournament: &mut Tournament) {
    let semis: Vec<&BracketMatch> = tournament
        .bracket_matches
        .iter()
        .filter(|m| m.round == Round::Semifinals)
        .collect();
    if semis.len() != 2 {
        return;
    }
    let winners: Vec<_> = semis.iter().filter_map(|m| m.winner()).collect();
    let [first, second] = winners.as_slice() else {
        return;
    };
    if let Some(final_match) = tournament
        .bracket_matches
        .iter_mut()
        .find(|m| m.round == Round::Final && !m.completed)
    {
        final_match.player1_id = Some(*first);
        final_match.player2_id = Some(*second);
        log::info!("Final set for tournament {}", tournament.id);
    }
}

/// Record a knockout result. Ties are refused, matches can only be scored in
/// their own phase, and a final needs both players known. Semifinal results
/// are frozen once the final has been played.
pub fn record_bracket_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    player1_games: u32,
    player2_games: u32,
) -> Result<(), TournamentError> {
    let idx = tournament
        .bracket_matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    let round = tournament.bracket_matches[idx].round;

    let expected_phase = match round {
        Round::Semifinals => Phase::Semifinals,
        Round::Final | Round::ThirdPlace => Phase::Final,
    };
    if tournament.phase != expected_phase {
        return Err(TournamentError::InvalidState);
    }
    if !tournament.bracket_matches[idx].is_ready() {
        return Err(TournamentError::BracketSlotsPending);
    }
    if player1_games == player2_games {
        return Err(TournamentError::TiedKnockoutScore);
    }
    if round == Round::Semifinals {
        let final_played = tournament
            .bracket_matches
            .iter()
            .any(|m| m.round == Round::Final && m.completed);
        if final_played {
            return Err(TournamentError::InvalidState);
        }
    }

    tournament.bracket_matches[idx].record_score(player1_games, player2_games);
    log::debug!(
        "{:?} score {}-{} recorded for match {}",
        round,
        player1_games,
        player2_games,
        match_id
    );
    if round == Round::Semifinals {
        fill_final_from_semifinals(tournament);
    }
    Ok(())
}

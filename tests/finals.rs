//! Integration tests for the knockout stage and phase progression.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tennis_tournament_web::{
    advance_phase, draw_matches, submit_score, FinalAndThirdPlace, NewPlayer, Phase, PlayerId,
    Round, SemifinalsAndFinal, Tournament, TournamentError,
};

fn drawn(names: &[&str]) -> Tournament {
    let mut t = Tournament::new();
    t.set_player_limit(names.len()).unwrap();
    for name in names {
        t.add_player(NewPlayer::named(*name)).unwrap();
    }
    draw_matches(&mut t, &mut StdRng::seed_from_u64(11)).unwrap();
    t
}

fn id_of(t: &Tournament, name: &str) -> PlayerId {
    t.players.iter().find(|p| p.name == name).unwrap().id
}

/// Earlier registration wins every group match 6-3.
fn play_group(t: &mut Tournament) {
    let order: Vec<PlayerId> = t.players.iter().map(|p| p.id).collect();
    let seed = |id: PlayerId| order.iter().position(|p| *p == id).unwrap();
    let results: Vec<_> = t
        .matches
        .iter()
        .map(|m| {
            if seed(m.player1_id) < seed(m.player2_id) {
                (m.id, 6, 3)
            } else {
                (m.id, 3, 6)
            }
        })
        .collect();
    for (id, g1, g2) in results {
        submit_score(t, id, g1, g2).unwrap();
    }
}

fn bracket_players(t: &Tournament, round: Round) -> (Option<PlayerId>, Option<PlayerId>) {
    let m = t.bracket_matches.iter().find(|m| m.round == round).unwrap();
    (m.player1_id, m.player2_id)
}

#[test]
fn final_and_third_place_from_group_ranking() {
    let mut t = drawn(&["A", "B", "C", "D"]);
    play_group(&mut t);

    assert_eq!(advance_phase(&mut t, &FinalAndThirdPlace), Ok(Phase::Final));
    assert_eq!(t.phase, Phase::Final);
    assert_eq!(t.bracket_matches.len(), 2);
    assert_eq!(
        bracket_players(&t, Round::Final),
        (Some(id_of(&t, "A")), Some(id_of(&t, "B")))
    );
    assert_eq!(
        bracket_players(&t, Round::ThirdPlace),
        (Some(id_of(&t, "C")), Some(id_of(&t, "D")))
    );
    assert!(t.bracket_matches.iter().all(|m| !m.completed));
}

#[test]
fn advance_refused_with_open_group_matches() {
    let mut t = drawn(&["A", "B", "C", "D"]);
    let first = t.matches[0].id;
    submit_score(&mut t, first, 6, 0).unwrap();
    let before = t.clone();

    assert_eq!(
        advance_phase(&mut t, &FinalAndThirdPlace),
        Err(TournamentError::CannotAdvancePhase)
    );
    assert_eq!(t, before);
}

#[test]
fn advance_refused_before_the_draw() {
    let mut t = Tournament::new();
    t.set_player_limit(4).unwrap();
    for name in ["A", "B", "C", "D"] {
        t.add_player(NewPlayer::named(name)).unwrap();
    }
    assert!(t.can_draw_matches());
    assert!(!t.can_advance_phase());
    assert_eq!(
        advance_phase(&mut t, &FinalAndThirdPlace),
        Err(TournamentError::CannotAdvancePhase)
    );
    assert_eq!(t.phase, Phase::Group);
    assert!(t.bracket_matches.is_empty());
}

#[test]
fn advance_refused_below_player_limit() {
    let mut t = drawn(&["A", "B", "C", "D"]);
    play_group(&mut t);
    t.set_player_limit(5).unwrap();
    assert!(!t.can_advance_phase());
    assert_eq!(
        advance_phase(&mut t, &FinalAndThirdPlace),
        Err(TournamentError::CannotAdvancePhase)
    );
    assert_eq!(t.phase, Phase::Group);
    assert!(t.bracket_matches.is_empty());
}

#[test]
fn final_is_terminal_and_locks_group_scores() {
    let mut t = drawn(&["A", "B", "C", "D"]);
    play_group(&mut t);
    advance_phase(&mut t, &FinalAndThirdPlace).unwrap();

    assert_eq!(
        advance_phase(&mut t, &FinalAndThirdPlace),
        Err(TournamentError::CannotAdvancePhase)
    );
    let group_match = t.matches[0].id;
    assert_eq!(
        submit_score(&mut t, group_match, 0, 6),
        Err(TournamentError::ScoresLocked)
    );
}

#[test]
fn knockout_results_and_champion() {
    let mut t = drawn(&["A", "B", "C", "D"]);
    play_group(&mut t);
    advance_phase(&mut t, &FinalAndThirdPlace).unwrap();
    let final_id = t
        .bracket_matches
        .iter()
        .find(|m| m.round == Round::Final)
        .unwrap()
        .id;

    assert_eq!(
        submit_score(&mut t, final_id, 6, 6),
        Err(TournamentError::TiedKnockoutScore)
    );
    assert!(t.champion().is_none());
    submit_score(&mut t, final_id, 4, 6).unwrap();
    assert_eq!(t.champion().map(|p| p.name.as_str()), Some("B"));
}

#[test]
fn semifinal_variant_fills_the_final() {
    let mut t = drawn(&["A", "B", "C", "D", "E"]);
    play_group(&mut t);

    assert_eq!(advance_phase(&mut t, &SemifinalsAndFinal), Ok(Phase::Semifinals));
    let semis: Vec<_> = t
        .bracket_matches
        .iter()
        .filter(|m| m.round == Round::Semifinals)
        .map(|m| (m.id, m.player1_id, m.player2_id))
        .collect();
    assert_eq!(semis.len(), 2);
    assert_eq!((semis[0].1, semis[0].2), (Some(id_of(&t, "A")), Some(id_of(&t, "B"))));
    assert_eq!((semis[1].1, semis[1].2), (Some(id_of(&t, "C")), Some(id_of(&t, "D"))));
    assert_eq!(bracket_players(&t, Round::Final), (None, None));

    let final_id = t
        .bracket_matches
        .iter()
        .find(|m| m.round == Round::Final)
        .unwrap()
        .id;
    assert_eq!(
        submit_score(&mut t, final_id, 6, 1),
        Err(TournamentError::InvalidState)
    );
    assert_eq!(
        advance_phase(&mut t, &SemifinalsAndFinal),
        Err(TournamentError::CannotAdvancePhase)
    );

    submit_score(&mut t, semis[0].0, 6, 4).unwrap();
    assert_eq!(bracket_players(&t, Round::Final), (None, None));
    submit_score(&mut t, semis[1].0, 2, 6).unwrap();
    assert_eq!(
        bracket_players(&t, Round::Final),
        (Some(id_of(&t, "A")), Some(id_of(&t, "D")))
    );
    // a corrected semifinal moves the final along with it
    submit_score(&mut t, semis[0].0, 3, 6).unwrap();
    assert_eq!(
        bracket_players(&t, Round::Final),
        (Some(id_of(&t, "B")), Some(id_of(&t, "D")))
    );

    assert_eq!(advance_phase(&mut t, &SemifinalsAndFinal), Ok(Phase::Final));
    submit_score(&mut t, final_id, 6, 2).unwrap();
    assert_eq!(t.champion().map(|p| p.name.as_str()), Some("B"));
    assert_eq!(
        submit_score(&mut t, semis[1].0, 6, 0),
        Err(TournamentError::InvalidState)
    );
}

#[test]
fn semifinal_variant_needs_four_qualifiers() {
    let mut t = drawn(&["A", "B", "C", "D"]);
    play_group(&mut t);
    assert_eq!(
        advance_phase(&mut t, &SemifinalsAndFinal),
        Err(TournamentError::BracketUnavailable)
    );
    assert_eq!(t.phase, Phase::Group);
}

#[test]
fn reset_returns_to_an_empty_group_phase() {
    let mut t = drawn(&["A", "B", "C", "D"]);
    play_group(&mut t);
    advance_phase(&mut t, &FinalAndThirdPlace).unwrap();
    let id = t.id;
    t.reset();
    assert_eq!(t.id, id);
    assert_eq!(t.phase, Phase::Group);
    assert!(t.players.is_empty() && t.matches.is_empty() && t.bracket_matches.is_empty());
    assert!(!t.matches_drawn);
}

//! Integration tests for the service layer against the in-memory store.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tennis_tournament_web::store::{
    ChangeKind, Collection, DocumentStore, FieldFilter, StoreError, Subscription,
};
use tennis_tournament_web::{
    BracketFormat, MemoryStore, NewPlayer, Phase, PlayerId, Round, Tournament, TournamentError,
    TournamentId, TournamentService,
};

/// MemoryStore whose writes can be switched off.
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: AtomicBool::new(false),
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FlakyStore {
    fn create(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        self.check()?;
        self.inner.create(collection, data)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(collection, id)
    }

    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update(collection, id, patch)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(collection, id)
    }

    fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        self.inner.query_by_field(collection, field, value)
    }

    fn subscribe(&self, collection: Collection, filter: Option<FieldFilter>) -> Subscription {
        self.inner.subscribe(collection, filter)
    }
}

fn service() -> TournamentService<MemoryStore> {
    TournamentService::with_seed(MemoryStore::new(), BracketFormat::Final, 99)
}

fn with_players<S: DocumentStore>(svc: &TournamentService<S>, names: &[&str]) -> TournamentId {
    let t = svc.create_tournament().unwrap();
    svc.set_player_limit(t.id, names.len()).unwrap();
    for name in names {
        svc.add_player(t.id, NewPlayer::named(*name)).unwrap();
    }
    t.id
}

/// Earlier registration wins every group match.
fn play_group<S: DocumentStore>(svc: &TournamentService<S>, id: TournamentId) {
    let t = svc.get_tournament(id).unwrap();
    let seed = |pid: PlayerId| t.players.iter().position(|p| p.id == pid).unwrap();
    for m in &t.matches {
        let (g1, g2) = if seed(m.player1_id) < seed(m.player2_id) { (6, 1) } else { (1, 6) };
        svc.submit_score(id, m.id, g1, g2).unwrap();
    }
}

#[test]
fn full_tournament_through_the_store() {
    let svc = service();
    let id = with_players(&svc, &["A", "B", "C", "D"]);

    let summary = svc.draw_matches(id).unwrap();
    assert_eq!(summary.matches, 6);
    let t = svc.get_tournament(id).unwrap();
    assert!(t.matches_drawn);
    assert!(t.matches.iter().all(|m| m.is_scheduled()));

    play_group(&svc, id);
    let names: Vec<String> = svc.ranking(id).unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["A", "B", "C", "D"]);
    let stats = svc.get_tournament(id).unwrap();
    let a = stats.players.iter().find(|p| p.name == "A").unwrap();
    assert_eq!((a.stats.points, a.stats.games_won, a.stats.games_lost), (3, 18, 3));

    assert_eq!(svc.advance_phase(id), Ok(Phase::Final));
    let t = svc.get_tournament(id).unwrap();
    assert_eq!(t.phase, Phase::Final);
    let final_id = t
        .bracket_matches
        .iter()
        .find(|m| m.round == Round::Final)
        .unwrap()
        .id;
    svc.submit_score(id, final_id, 6, 3).unwrap();
    let t = svc.get_tournament(id).unwrap();
    assert_eq!(t.champion().map(|p| p.name.clone()), Some("A".to_string()));
}

#[test]
fn draw_and_advance_preconditions_surface_as_errors() {
    let svc = service();
    let id = with_players(&svc, &["A", "B", "C"]);
    assert_eq!(svc.draw_matches(id), Err(TournamentError::CannotDrawMatches));
    assert_eq!(svc.advance_phase(id), Err(TournamentError::CannotAdvancePhase));
    assert_eq!(svc.get_tournament(id).unwrap().phase, Phase::Group);
}

#[test]
fn large_roster_on_one_court_reloads() {
    let svc = service();
    let names: Vec<String> = (1..=50).map(|i| format!("P{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let id = with_players(&svc, &refs);
    svc.set_number_of_courts(id, 1).unwrap();

    assert_eq!(svc.draw_matches(id).unwrap().matches, 1225);
    let t = svc.get_tournament(id).unwrap();
    assert_eq!(t.matches.len(), 1225);
    let mut slots = HashSet::new();
    for m in &t.matches {
        assert_eq!(m.court_number, Some(1));
        assert!(slots.insert(m.time_slot.unwrap()), "one match per slot on one court");
    }
}

#[test]
fn settings_lock_after_draw() {
    let svc = service();
    let id = with_players(&svc, &["A", "B", "C", "D"]);
    svc.draw_matches(id).unwrap();
    assert_eq!(svc.set_number_of_courts(id, 4), Err(TournamentError::SettingsLocked));
    assert_eq!(
        svc.set_time_slots(id, &["09:00"]),
        Err(TournamentError::SettingsLocked)
    );
}

#[test]
fn late_player_is_scheduled_in_a_redraw() {
    let svc = service();
    let id = with_players(&svc, &["A", "B", "C", "D"]);
    svc.draw_matches(id).unwrap();
    svc.set_player_limit(id, 5).unwrap();
    let e = svc.add_player(id, NewPlayer::named("E")).unwrap();

    let t = svc.get_tournament(id).unwrap();
    assert_eq!(t.players.len(), 5);
    assert_eq!(t.matches.len(), 10);
    assert_eq!(t.matches.iter().filter(|m| m.involves(e.id)).count(), 4);
}

#[test]
fn reset_keeps_the_id_and_clears_the_rest() {
    let svc = service();
    let id = with_players(&svc, &["A", "B", "C", "D"]);
    svc.set_number_of_courts(id, 4).unwrap();
    svc.draw_matches(id).unwrap();

    let reset = svc.reset_tournament(id).unwrap();
    assert_eq!(reset, Tournament::with_id(id));
    assert_eq!(svc.get_tournament(id).unwrap(), Tournament::with_id(id));
    assert_eq!(svc.store().len(Collection::Players), 0);
    assert_eq!(svc.store().len(Collection::Matches), 0);
}

#[test]
fn failed_write_changes_nothing() {
    let store = Arc::new(FlakyStore::new());
    let svc = TournamentService::with_seed(store.clone(), BracketFormat::Final, 5);
    let id = with_players(&svc, &["A", "B", "C", "D"]);

    store.failing.store(true, Ordering::SeqCst);
    let err = svc.draw_matches(id).unwrap_err();
    assert!(matches!(err, TournamentError::Store(StoreError::Unavailable(_))));
    assert_eq!(err.to_string(), "Operation failed");
    let err = svc.add_player(id, NewPlayer::named("E")).unwrap_err();
    assert!(matches!(err, TournamentError::PlayerLimitReached { limit: 4 }));

    store.failing.store(false, Ordering::SeqCst);
    let t = svc.get_tournament(id).unwrap();
    assert!(!t.matches_drawn);
    assert!(t.matches.is_empty());
    assert!(svc.draw_matches(id).is_ok());
}

#[test]
fn subscribers_follow_one_tournament() {
    let svc = service();
    let watched = svc.create_tournament().unwrap().id;
    let other = svc.create_tournament().unwrap().id;
    let mut sub = svc.subscribe(watched, Collection::Players);

    svc.add_player(other, NewPlayer::named("Elsewhere")).unwrap();
    svc.add_player(watched, NewPlayer::named("Ana")).unwrap();

    let event = sub.try_next().unwrap();
    assert_eq!(event.kind, ChangeKind::Created);
    assert_eq!(event.document["name"], "Ana");
    assert!(sub.try_next().is_none());
}

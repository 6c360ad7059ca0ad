//! Maps a Tournament onto documents: one header, one settings document, and
//! player and match documents tagged with `tournamentId`.

use crate::models::{
    BracketMatch, GameMatch, Phase, Player, Tournament, TournamentId, TournamentSettings,
};
use crate::store::{Collection, DocumentStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const TOURNAMENT_ID_FIELD: &str = "tournamentId";
/// Only bracket match documents carry a round.
const ROUND_FIELD: &str = "round";

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TournamentHeader {
    id: TournamentId,
    phase: Phase,
    #[serde(default)]
    matches_drawn: bool,
}

/// Attach the owning tournament to a child document.
fn child_document<T: Serialize>(tournament_id: TournamentId, value: &T) -> Result<Value, StoreError> {
    let mut doc = serde_json::to_value(value)?;
    match doc.as_object_mut() {
        Some(object) => {
            object.insert(TOURNAMENT_ID_FIELD.to_string(), json!(tournament_id));
            Ok(doc)
        }
        None => Err(StoreError::Malformed("child document is not an object".to_string())),
    }
}

fn is_bracket_document(doc: &Value) -> bool {
    doc.get(ROUND_FIELD).is_some()
}

/// Tournament persistence over any DocumentStore.
pub struct TournamentRepository<S> {
    store: S,
}

impl<S: DocumentStore> TournamentRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn children(&self, collection: Collection, id: TournamentId) -> Result<Vec<Value>, StoreError> {
        self.store
            .query_by_field(collection, TOURNAMENT_ID_FIELD, &json!(id))
    }

    /// Write every document of a new tournament.
    pub fn insert(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let header = TournamentHeader {
            id: tournament.id,
            phase: tournament.phase,
            matches_drawn: tournament.matches_drawn,
        };
        self.store
            .create(Collection::Tournaments, serde_json::to_value(&header)?)?;

        let mut settings = child_document(tournament.id, &tournament.settings)?;
        if let Some(object) = settings.as_object_mut() {
            object.insert("id".to_string(), json!(tournament.id));
        }
        self.store.create(Collection::Settings, settings)?;

        for player in &tournament.players {
            self.insert_player(tournament.id, player)?;
        }
        for m in &tournament.matches {
            self.store
                .create(Collection::Matches, child_document(tournament.id, m)?)?;
        }
        self.insert_bracket_matches(tournament)
    }

    /// Rebuild a tournament from its documents. `None` when there is no header.
    pub fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        let Some(header) = self.store.get(Collection::Tournaments, &id.to_string())? else {
            return Ok(None);
        };
        let header: TournamentHeader = serde_json::from_value(header)?;

        let settings = match self.store.get(Collection::Settings, &id.to_string())? {
            Some(doc) => serde_json::from_value::<TournamentSettings>(doc)?,
            None => TournamentSettings::default(),
        };
        let players = self
            .children(Collection::Players, id)?
            .into_iter()
            .map(serde_json::from_value::<Player>)
            .collect::<Result<Vec<_>, _>>()?;

        let mut matches = Vec::new();
        let mut bracket_matches = Vec::new();
        for doc in self.children(Collection::Matches, id)? {
            if is_bracket_document(&doc) {
                bracket_matches.push(serde_json::from_value::<BracketMatch>(doc)?);
            } else {
                matches.push(serde_json::from_value::<GameMatch>(doc)?);
            }
        }

        Ok(Some(Tournament {
            id: header.id,
            players,
            matches,
            bracket_matches,
            phase: header.phase,
            matches_drawn: header.matches_drawn,
            settings,
        }))
    }

    /// Persist phase and draw flag.
    pub fn save_header(&self, tournament: &Tournament) -> Result<(), StoreError> {
        self.store.update(
            Collection::Tournaments,
            &tournament.id.to_string(),
            json!({ "phase": tournament.phase, "matchesDrawn": tournament.matches_drawn }),
        )
    }

    pub fn save_settings(&self, tournament: &Tournament) -> Result<(), StoreError> {
        self.store.update(
            Collection::Settings,
            &tournament.id.to_string(),
            serde_json::to_value(&tournament.settings)?,
        )
    }

    pub fn insert_player(&self, tournament_id: TournamentId, player: &Player) -> Result<(), StoreError> {
        self.store
            .create(Collection::Players, child_document(tournament_id, player)?)?;
        Ok(())
    }

    /// Swap the stored group matches for the tournament's current ones.
    pub fn replace_group_matches(&self, tournament: &Tournament) -> Result<(), StoreError> {
        for doc in self.children(Collection::Matches, tournament.id)? {
            if is_bracket_document(&doc) {
                continue;
            }
            if let Some(id) = doc.get("id").and_then(Value::as_str) {
                self.store.delete(Collection::Matches, id)?;
            }
        }
        for m in &tournament.matches {
            self.store
                .create(Collection::Matches, child_document(tournament.id, m)?)?;
        }
        Ok(())
    }

    pub fn insert_bracket_matches(&self, tournament: &Tournament) -> Result<(), StoreError> {
        for m in &tournament.bracket_matches {
            self.store
                .create(Collection::Matches, child_document(tournament.id, m)?)?;
        }
        Ok(())
    }

    /// Store the result of a group match.
    pub fn save_match_score(&self, m: &GameMatch) -> Result<(), StoreError> {
        self.store.update(
            Collection::Matches,
            &m.id.to_string(),
            json!({
                "player1Games": m.player1_games,
                "player2Games": m.player2_games,
                "completed": m.completed,
            }),
        )
    }

    /// Store a bracket match whole (players may have been filled in).
    pub fn save_bracket_match(&self, m: &BracketMatch) -> Result<(), StoreError> {
        self.store
            .update(Collection::Matches, &m.id.to_string(), serde_json::to_value(m)?)
    }

    /// Remove the tournament and all of its children.
    pub fn delete_all(&self, id: TournamentId) -> Result<(), StoreError> {
        for collection in [Collection::Players, Collection::Matches] {
            for doc in self.children(collection, id)? {
                if let Some(doc_id) = doc.get("id").and_then(Value::as_str) {
                    self.store.delete(collection, doc_id)?;
                }
            }
        }
        let key = id.to_string();
        if self.store.get(Collection::Settings, &key)?.is_some() {
            self.store.delete(Collection::Settings, &key)?;
        }
        self.store.delete(Collection::Tournaments, &key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPlayer, Round};
    use crate::store::MemoryStore;

    fn stored_tournament() -> (TournamentRepository<MemoryStore>, Tournament) {
        let repo = TournamentRepository::new(MemoryStore::new());
        let mut t = Tournament::new();
        for name in ["A", "B", "C", "D"] {
            t.add_player(NewPlayer::named(name)).unwrap();
        }
        let ids: Vec<_> = t.players.iter().map(|p| p.id).collect();
        t.matches.push(GameMatch::new(ids[0], ids[1]));
        t.bracket_matches
            .push(BracketMatch::new(Round::Final, Some(ids[0]), Some(ids[1])));
        repo.insert(&t).unwrap();
        (repo, t)
    }

    #[test]
    fn load_returns_what_was_inserted() {
        let (repo, t) = stored_tournament();
        let loaded = repo.load(t.id).unwrap().unwrap();
        assert_eq!(loaded, t);
        assert_eq!(repo.load(uuid::Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn children_carry_the_tournament_id() {
        let (repo, t) = stored_tournament();
        for doc in repo.children(Collection::Matches, t.id).unwrap() {
            assert_eq!(doc[TOURNAMENT_ID_FIELD], json!(t.id));
        }
        assert_eq!(repo.store().len(Collection::Players), 4);
    }

    #[test]
    fn replacing_group_matches_keeps_the_bracket() {
        let (repo, mut t) = stored_tournament();
        let ids: Vec<_> = t.players.iter().map(|p| p.id).collect();
        t.matches = vec![GameMatch::new(ids[2], ids[3]), GameMatch::new(ids[0], ids[3])];
        repo.replace_group_matches(&t).unwrap();
        let loaded = repo.load(t.id).unwrap().unwrap();
        assert_eq!(loaded.matches, t.matches);
        assert_eq!(loaded.bracket_matches.len(), 1);
    }

    #[test]
    fn scores_and_header_are_updated_in_place() {
        let (repo, mut t) = stored_tournament();
        t.matches[0].record_score(6, 2);
        t.phase = Phase::Final;
        t.matches_drawn = true;
        repo.save_match_score(&t.matches[0]).unwrap();
        repo.save_header(&t).unwrap();
        let loaded = repo.load(t.id).unwrap().unwrap();
        assert_eq!(loaded.matches[0].player1_games, 6);
        assert!(loaded.matches[0].completed);
        assert_eq!(loaded.phase, Phase::Final);
        assert!(loaded.matches_drawn);
    }

    #[test]
    fn delete_all_leaves_nothing_behind() {
        let (repo, t) = stored_tournament();
        repo.delete_all(t.id).unwrap();
        assert_eq!(repo.load(t.id).unwrap(), None);
        for collection in [
            Collection::Tournaments,
            Collection::Players,
            Collection::Matches,
            Collection::Settings,
        ] {
            assert_eq!(repo.store().len(collection), 0);
        }
    }
}

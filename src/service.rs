//! Tournament operations against a document store.
//!
//! Every call loads a fresh snapshot, applies the operation to it and writes
//! the changed documents back. Writes are serialized; reads are not.

use crate::logic::{self, BracketFormat, BracketStrategy, DrawSummary};
use crate::models::{
    MatchId, NewPlayer, Phase, Player, Tournament, TournamentError, TournamentId,
    TournamentSettings,
};
use crate::store::{
    Collection, DocumentStore, FieldFilter, StoreError, Subscription, TournamentRepository,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, MutexGuard};

pub struct TournamentService<S> {
    repository: TournamentRepository<S>,
    strategy: Box<dyn BracketStrategy>,
    /// Held for every write; also the scheduler's jitter source.
    writer: Mutex<StdRng>,
}

impl<S: DocumentStore> TournamentService<S> {
    pub fn new(store: S, format: BracketFormat) -> Self {
        Self::with_strategy(store, format.strategy(), None)
    }

    /// Same as `new`, with reproducible draws.
    pub fn with_seed(store: S, format: BracketFormat, seed: u64) -> Self {
        Self::with_strategy(store, format.strategy(), Some(seed))
    }

    pub fn with_strategy(store: S, strategy: Box<dyn BracketStrategy>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            repository: TournamentRepository::new(store),
            strategy,
            writer: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        self.repository.store()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StdRng>, TournamentError> {
        self.writer
            .lock()
            .map_err(|_| StoreError::Unavailable("lock error".to_string()).into())
    }

    fn load(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.repository
            .load(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    /// Log a failed write before handing it back.
    fn persisted(&self, id: TournamentId, result: Result<(), StoreError>) -> Result<(), TournamentError> {
        result.map_err(|e| {
            log::warn!("Store write for tournament {} failed: {}", id, e);
            TournamentError::Store(e)
        })
    }

    pub fn create_tournament(&self) -> Result<Tournament, TournamentError> {
        let _guard = self.lock()?;
        let tournament = Tournament::new();
        self.persisted(tournament.id, self.repository.insert(&tournament))?;
        log::info!("Created tournament {}", tournament.id);
        Ok(tournament)
    }

    /// Current state with stats derived from the group matches.
    pub fn get_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let mut tournament = self.load(id)?;
        logic::refresh_stats(&mut tournament);
        Ok(tournament)
    }

    pub fn ranking(&self, id: TournamentId) -> Result<Vec<Player>, TournamentError> {
        Ok(logic::ranking(&self.load(id)?))
    }

    pub fn add_player(&self, id: TournamentId, new_player: NewPlayer) -> Result<Player, TournamentError> {
        let mut rng = self.lock()?;
        let mut tournament = self.load(id)?;
        let player = logic::register_player(&mut tournament, new_player, &mut *rng)?;
        self.persisted(id, self.repository.insert_player(id, &player))?;
        if tournament.matches_drawn {
            self.persisted(id, self.repository.replace_group_matches(&tournament))?;
        }
        Ok(player)
    }

    pub fn set_player_limit(&self, id: TournamentId, limit: usize) -> Result<TournamentSettings, TournamentError> {
        self.update_settings(id, |t| t.set_player_limit(limit))
    }

    pub fn set_number_of_courts(&self, id: TournamentId, courts: u8) -> Result<TournamentSettings, TournamentError> {
        self.update_settings(id, |t| t.set_number_of_courts(courts))
    }

    pub fn set_time_slots<T: AsRef<str>>(
        &self,
        id: TournamentId,
        raw: &[T],
    ) -> Result<TournamentSettings, TournamentError> {
        self.update_settings(id, |t| t.set_time_slots(raw))
    }

    fn update_settings<F>(&self, id: TournamentId, change: F) -> Result<TournamentSettings, TournamentError>
    where
        F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
    {
        let _guard = self.lock()?;
        let mut tournament = self.load(id)?;
        change(&mut tournament)?;
        self.persisted(id, self.repository.save_settings(&tournament))?;
        log::info!("Updated settings of tournament {}", id);
        Ok(tournament.settings)
    }

    pub fn draw_matches(&self, id: TournamentId) -> Result<DrawSummary, TournamentError> {
        let mut rng = self.lock()?;
        let mut tournament = self.load(id)?;
        let summary = logic::draw_matches(&mut tournament, &mut *rng)?;
        self.save_draw(&tournament)?;
        Ok(summary)
    }

    pub fn redraw_matches(&self, id: TournamentId) -> Result<DrawSummary, TournamentError> {
        let mut rng = self.lock()?;
        let mut tournament = self.load(id)?;
        let summary = logic::redraw_matches(&mut tournament, &mut *rng)?;
        self.save_draw(&tournament)?;
        Ok(summary)
    }

    fn save_draw(&self, tournament: &Tournament) -> Result<(), TournamentError> {
        self.persisted(tournament.id, self.repository.replace_group_matches(tournament))?;
        self.persisted(tournament.id, self.repository.save_header(tournament))
    }

    /// Enter the games of a group or bracket match.
    pub fn submit_score(
        &self,
        id: TournamentId,
        match_id: MatchId,
        player1_games: u32,
        player2_games: u32,
    ) -> Result<(), TournamentError> {
        let _guard = self.lock()?;
        let before = self.load(id)?;
        let mut tournament = before.clone();
        logic::submit_score(&mut tournament, match_id, player1_games, player2_games)?;

        if let Some(m) = tournament.matches.iter().find(|m| m.id == match_id) {
            return self.persisted(id, self.repository.save_match_score(m));
        }
        // A semifinal result may also fill in the final.
        for (old, new) in before.bracket_matches.iter().zip(&tournament.bracket_matches) {
            if old != new {
                self.persisted(id, self.repository.save_bracket_match(new))?;
            }
        }
        Ok(())
    }

    pub fn advance_phase(&self, id: TournamentId) -> Result<Phase, TournamentError> {
        let _guard = self.lock()?;
        let mut tournament = self.load(id)?;
        let leaving_group = tournament.phase == Phase::Group;
        let phase = logic::advance_phase(&mut tournament, self.strategy.as_ref())?;
        if leaving_group {
            self.persisted(id, self.repository.insert_bracket_matches(&tournament))?;
        }
        self.persisted(id, self.repository.save_header(&tournament))?;
        Ok(phase)
    }

    /// Back to an empty group phase with default settings, same id.
    pub fn reset_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let _guard = self.lock()?;
        let mut tournament = self.load(id)?;
        tournament.reset();
        self.persisted(id, self.repository.delete_all(id))?;
        self.persisted(id, self.repository.insert(&tournament))?;
        log::info!("Reset tournament {}", id);
        Ok(tournament)
    }

    /// Changes to one tournament's documents in `collection`.
    pub fn subscribe(&self, id: TournamentId, collection: Collection) -> Subscription {
        let field = match collection {
            Collection::Tournaments => "id",
            _ => "tournamentId",
        };
        self.store()
            .subscribe(collection, Some(FieldFilter::new(field, id.to_string())))
    }
}

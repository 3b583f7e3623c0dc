//! In-memory store: maps keyed by id, change events on every match write.

use crate::models::{Bracket, BracketError, Entrant, EntrantId, GameMatch, MatchId, MatchUpdate};
use crate::store::feed::{ChangeFeed, ChangeKind, MATCHES_TABLE};
use crate::store::MatchStore;
use chrono::Utc;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    matches: HashMap<MatchId, GameMatch>,
    entrants: HashMap<EntrantId, Entrant>,
    feed: ChangeFeed,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store publishing to an existing feed (e.g. one the server already subscribed to).
    pub fn with_feed(feed: ChangeFeed) -> Self {
        Self {
            feed,
            ..Self::default()
        }
    }

    /// Store preloaded with a generated bracket.
    pub fn from_bracket(bracket: Bracket) -> Result<Self, BracketError> {
        let mut store = Self::new();
        store.load(bracket)?;
        Ok(store)
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Replace all contents with a new bracket. Publishes a delete for every old match.
    pub fn load(&mut self, bracket: Bracket) -> Result<(), BracketError> {
        self.clear();
        self.insert_entrants(bracket.entrants)?;
        self.insert_matches(bracket.matches)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        for (_, m) in self.matches.drain() {
            self.feed.publish_row(ChangeKind::Delete, MATCHES_TABLE, &m);
        }
        self.entrants.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get_entrant(&self, id: EntrantId) -> Result<Entrant, BracketError> {
        self.entrants
            .get(&id)
            .cloned()
            .ok_or(BracketError::EntrantNotFound(id))
    }
}

impl MatchStore for InMemoryStore {
    fn all_matches(&self) -> Vec<GameMatch> {
        let mut matches: Vec<GameMatch> = self.matches.values().cloned().collect();
        matches.sort_by_key(|m| (m.round, m.match_number));
        matches
    }

    fn all_entrants(&self) -> Vec<Entrant> {
        let mut entrants: Vec<Entrant> = self.entrants.values().cloned().collect();
        entrants.sort_by_key(|e| e.rank);
        entrants
    }

    fn get_match(&self, id: MatchId) -> Result<GameMatch, BracketError> {
        self.matches.get(&id).cloned().ok_or(BracketError::MatchNotFound(id))
    }

    fn update_match(&mut self, id: MatchId, update: &MatchUpdate) -> Result<GameMatch, BracketError> {
        let m = self.matches.get_mut(&id).ok_or(BracketError::MatchNotFound(id))?;
        m.apply(update);
        m.updated_at = Some(Utc::now());
        let row = m.clone();
        self.feed.publish_row(ChangeKind::Update, MATCHES_TABLE, &row);
        Ok(row)
    }

    fn insert_matches(&mut self, matches: Vec<GameMatch>) -> Result<Vec<GameMatch>, BracketError> {
        if let Some(dup) = matches.iter().find(|m| self.matches.contains_key(&m.id)) {
            return Err(BracketError::InconsistentState(format!("match {} already stored", dup.id)));
        }
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(matches.len());
        for mut m in matches {
            m.updated_at = Some(now);
            self.feed.publish_row(ChangeKind::Insert, MATCHES_TABLE, &m);
            self.matches.insert(m.id, m.clone());
            inserted.push(m);
        }
        Ok(inserted)
    }

    fn insert_entrants(&mut self, entrants: Vec<Entrant>) -> Result<Vec<Entrant>, BracketError> {
        if let Some(dup) = entrants.iter().find(|e| self.entrants.contains_key(&e.id)) {
            return Err(BracketError::InconsistentState(format!("entrant {} already stored", dup.id)));
        }
        for e in &entrants {
            self.entrants.insert(e.id, e.clone());
        }
        Ok(entrants)
    }
}

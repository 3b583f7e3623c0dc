//! Storage contract for entrants and matches, plus the in-memory implementation.
//!
//! Writes take `&mut self`: a caller holding the store exclusively performs each
//! read-modify-write transition without interleaving. Shared deployments wrap the store in a
//! lock and hold the write guard for a whole report or undo.

mod feed;
mod memory;

pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, MATCHES_TABLE};
pub use memory::InMemoryStore;

use crate::models::{BracketError, Entrant, GameMatch, MatchId, MatchUpdate};

pub trait MatchStore {
    /// All matches ordered by round, then match number.
    fn all_matches(&self) -> Vec<GameMatch>;

    /// All entrants ordered by rank.
    fn all_entrants(&self) -> Vec<Entrant>;

    fn get_match(&self, id: MatchId) -> Result<GameMatch, BracketError>;

    /// Apply a partial update atomically and return the stored row.
    fn update_match(&mut self, id: MatchId, update: &MatchUpdate) -> Result<GameMatch, BracketError>;

    fn insert_matches(&mut self, matches: Vec<GameMatch>) -> Result<Vec<GameMatch>, BracketError>;

    fn insert_entrants(&mut self, entrants: Vec<Entrant>) -> Result<Vec<Entrant>, BracketError>;
}

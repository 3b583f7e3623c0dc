//! Entrant and the seed table it is created from.

use crate::models::bracket::BracketError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for an entrant (used in match slots and lookups).
pub type EntrantId = Uuid;

/// Coarser seed shown to humans: ranks are grouped in bands of `group_size`.
pub fn display_seed(rank: u32, group_size: u32) -> u32 {
    rank.div_ceil(group_size.max(1))
}

/// A seeded participant. Immutable once the bracket is generated.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    /// Competitive ordering, 1..N, unique and dense.
    pub rank: u32,
    pub name: String,
    pub display_seed: u32,
    /// Region of the bracket the entrant starts in (None for brackets without an elite-8 round).
    pub quadrant: Option<u8>,
}

impl Entrant {
    pub fn new(id: EntrantId, rank: u32, name: impl Into<String>, group_size: u32) -> Self {
        Self {
            id,
            rank,
            name: name.into(),
            display_seed: display_seed(rank, group_size),
            quadrant: None,
        }
    }

    /// Name prefixed with display seed, e.g. "(3) Alice".
    pub fn label(&self) -> String {
        format!("({}) {}", self.display_seed, self.name)
    }
}

/// One row of the seed table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeedEntry {
    pub rank: u32,
    pub name: String,
}

impl SeedEntry {
    pub fn new(rank: u32, name: impl Into<String>) -> Self {
        Self {
            rank,
            name: name.into(),
        }
    }
}

/// Ordered list of entrants by rank. Construction validates that ranks are exactly 1..N
/// and names are unique (case-insensitive).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SeedEntry>", into = "Vec<SeedEntry>")]
pub struct SeedTable {
    entries: Vec<SeedEntry>,
}

impl SeedTable {
    pub fn new(mut entries: Vec<SeedEntry>) -> Result<Self, BracketError> {
        entries.sort_by_key(|e| e.rank);
        let mut names = HashSet::new();
        for (i, entry) in entries.iter_mut().enumerate() {
            let expected = i as u32 + 1;
            if entry.rank != expected {
                return Err(BracketError::Validation(format!(
                    "seed ranks must be dense from 1: expected rank {expected}, found {}",
                    entry.rank
                )));
            }
            let trimmed = entry.name.trim();
            if trimmed.is_empty() {
                return Err(BracketError::Validation(format!("rank {} has an empty name", entry.rank)));
            }
            if !names.insert(trimmed.to_lowercase()) {
                return Err(BracketError::Validation(format!("duplicate entrant name '{trimmed}'")));
            }
            entry.name = trimmed.to_string();
        }
        Ok(Self { entries })
    }

    /// Table with placeholder names "Player 1".."Player N".
    pub fn numbered(n: u32) -> Self {
        Self {
            entries: (1..=n).map(|r| SeedEntry::new(r, format!("Player {r}"))).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SeedEntry] {
        &self.entries
    }

    pub fn get(&self, rank: u32) -> Option<&SeedEntry> {
        rank.checked_sub(1).and_then(|i| self.entries.get(i as usize))
    }
}

impl TryFrom<Vec<SeedEntry>> for SeedTable {
    type Error = BracketError;

    fn try_from(entries: Vec<SeedEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<SeedTable> for Vec<SeedEntry> {
    fn from(table: SeedTable) -> Self {
        table.entries
    }
}

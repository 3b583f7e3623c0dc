//! Match (game) slots, status, feed descriptors and partial updates.

use crate::models::entrant::EntrantId;
use crate::models::round::Round;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two input positions of a match. Serialized as `1` / `2`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(format!("slot must be 1 or 2, got {other}")),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.number()
    }
}

/// Lifecycle of a match. Always derivable from slot occupancy and winner.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// At least one slot is empty.
    #[default]
    Pending,
    /// Both slots filled, no result yet.
    Ready,
    Completed,
}

/// Points scored by each side in a single game.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    pub p1: i32,
    pub p2: i32,
}

impl GameScore {
    pub fn new(p1: i32, p2: i32) -> Self {
        Self { p1, p2 }
    }
}

/// Where a match's winner goes. Computed once by the generator.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedDescriptor {
    /// Downstream match has both slots open; target picked by match-number parity.
    CounterAssigned { match_id: MatchId, slot: Slot },
    /// Schedule names this feeder for one specific open slot of the downstream match.
    StructurallyAssigned { match_id: MatchId, slot: Slot },
}

impl FeedDescriptor {
    pub fn match_id(&self) -> MatchId {
        match *self {
            FeedDescriptor::CounterAssigned { match_id, .. }
            | FeedDescriptor::StructurallyAssigned { match_id, .. } => match_id,
        }
    }

    pub fn slot(&self) -> Slot {
        match *self {
            FeedDescriptor::CounterAssigned { slot, .. }
            | FeedDescriptor::StructurallyAssigned { slot, .. } => slot,
        }
    }
}

/// A single bracket match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round: Round,
    /// 1-based, unique within the round.
    pub match_number: u32,
    pub quadrant: Option<u8>,
    /// 1-based position within (round, quadrant).
    pub quadrant_match_number: Option<u32>,
    pub slot1: Option<EntrantId>,
    pub slot2: Option<EntrantId>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub game_scores: Option<Vec<GameScore>>,
    /// None if not yet played.
    pub winner: Option<EntrantId>,
    /// None only for the championship.
    pub feed: Option<FeedDescriptor>,
    pub status: MatchStatus,
    /// Stamped by the store on every write.
    pub updated_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn new(id: MatchId, round: Round, match_number: u32) -> Self {
        Self {
            id,
            round,
            match_number,
            quadrant: None,
            quadrant_match_number: None,
            slot1: None,
            slot2: None,
            score1: None,
            score2: None,
            game_scores: None,
            winner: None,
            feed: None,
            status: MatchStatus::Pending,
            updated_at: None,
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<EntrantId> {
        match slot {
            Slot::One => self.slot1,
            Slot::Two => self.slot2,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<EntrantId> {
        match slot {
            Slot::One => &mut self.slot1,
            Slot::Two => &mut self.slot2,
        }
    }

    pub fn next_match_id(&self) -> Option<MatchId> {
        self.feed.map(|f| f.match_id())
    }

    pub fn next_match_slot(&self) -> Option<Slot> {
        self.feed.map(|f| f.slot())
    }

    pub fn is_filled(&self) -> bool {
        self.slot1.is_some() && self.slot2.is_some()
    }

    /// Status implied by the current winner and slot occupancy.
    pub fn derived_status(&self) -> MatchStatus {
        if self.winner.is_some() {
            MatchStatus::Completed
        } else if self.is_filled() {
            MatchStatus::Ready
        } else {
            MatchStatus::Pending
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Both slots filled and no result recorded.
    pub fn is_ready_to_play(&self) -> bool {
        self.is_filled() && !self.is_completed()
    }

    /// Which side the entrant occupies, if any.
    pub fn side_of(&self, entrant: EntrantId) -> Option<Slot> {
        if self.slot1 == Some(entrant) {
            Some(Slot::One)
        } else if self.slot2 == Some(entrant) {
            Some(Slot::Two)
        } else {
            None
        }
    }

    pub fn participants(&self) -> impl Iterator<Item = EntrantId> + '_ {
        self.slot1.iter().chain(self.slot2.iter()).copied()
    }

    /// The non-winning participant of a completed match.
    pub fn loser(&self) -> Option<EntrantId> {
        if !self.is_completed() {
            return None;
        }
        let winner = self.winner?;
        self.participants().find(|&id| id != winner)
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &MatchUpdate) {
        if let Some(v) = update.slot1 {
            self.slot1 = v;
        }
        if let Some(v) = update.slot2 {
            self.slot2 = v;
        }
        if let Some(v) = update.score1 {
            self.score1 = v;
        }
        if let Some(v) = update.score2 {
            self.score2 = v;
        }
        if let Some(v) = &update.game_scores {
            self.game_scores = v.clone();
        }
        if let Some(v) = update.winner {
            self.winner = v;
        }
        if let Some(v) = update.status {
            self.status = v;
        }
    }
}

/// Partial match write. Outer `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchUpdate {
    pub slot1: Option<Option<EntrantId>>,
    pub slot2: Option<Option<EntrantId>>,
    pub score1: Option<Option<u32>>,
    pub score2: Option<Option<u32>>,
    pub game_scores: Option<Option<Vec<GameScore>>>,
    pub winner: Option<Option<EntrantId>>,
    pub status: Option<MatchStatus>,
}

impl MatchUpdate {
    /// Clear scores and winner.
    pub fn clear_result() -> Self {
        Self {
            score1: Some(None),
            score2: Some(None),
            game_scores: Some(None),
            winner: Some(None),
            ..Self::default()
        }
    }

    pub fn with_slot(mut self, slot: Slot, entrant: Option<EntrantId>) -> Self {
        match slot {
            Slot::One => self.slot1 = Some(entrant),
            Slot::Two => self.slot2 = Some(entrant),
        }
        self
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

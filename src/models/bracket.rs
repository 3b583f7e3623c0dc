//! Bracket: the full entrant and match set of one tournament, plus the crate error type.

use crate::models::entrant::{Entrant, EntrantId};
use crate::models::game::{GameMatch, MatchId, MatchStatus, Slot};
use crate::models::round::Round;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Errors that can occur during bracket operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Malformed, tied or out-of-range scores; no determinable winner; bad seed input.
    Validation(String),
    MatchNotFound(MatchId),
    EntrantNotFound(EntrantId),
    /// Stored match data contradicts the bracket structure (missing target, conflicting slot).
    InconsistentState(String),
    /// Round schedule cannot produce a well-formed bracket.
    InvalidSchedule(String),
    /// CSV input could not be read.
    Ingest(String),
    Config(String),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::Validation(msg) => write!(f, "Validation error: {}", msg),
            BracketError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            BracketError::EntrantNotFound(id) => write!(f, "Entrant {} not found", id),
            BracketError::InconsistentState(msg) => write!(f, "Inconsistent bracket state: {}", msg),
            BracketError::InvalidSchedule(msg) => write!(f, "Invalid schedule: {}", msg),
            BracketError::Ingest(msg) => write!(f, "Ingest error: {}", msg),
            BracketError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for BracketError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Entrants plus the complete match graph, as produced by the generator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub tournament_id: TournamentId,
    /// Sorted by rank.
    pub entrants: Vec<Entrant>,
    /// Sorted by round, then match number.
    pub matches: Vec<GameMatch>,
}

impl Bracket {
    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn find_match(&self, round: Round, match_number: u32) -> Option<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.round == round && m.match_number == match_number)
    }

    pub fn round_matches(&self, round: Round) -> impl Iterator<Item = &GameMatch> + '_ {
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub fn entrant_by_rank(&self, rank: u32) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.rank == rank)
    }

    pub fn championship(&self) -> Option<&GameMatch> {
        self.round_matches(Round::Championship).next()
    }
}

/// Verify the structural and status invariants of a match set.
///
/// Checks feed targets (existence, next round), slot coverage, status vs occupancy, winner
/// membership and completed-score shape. Returns the first violation found.
///
/// Slot coverage: every slot is either seeded or fed by exactly one match. A slot no match
/// feeds must hold its seeded entrant; a fed slot that is occupied must hold the winner of its
/// completed feeder.
pub fn check_integrity(matches: &[GameMatch], entrants: &[Entrant]) -> Result<(), BracketError> {
    let by_id: HashMap<MatchId, &GameMatch> = matches.iter().map(|m| (m.id, m)).collect();
    let known: HashSet<EntrantId> = entrants.iter().map(|e| e.id).collect();
    let mut fed: HashMap<(MatchId, Slot), &GameMatch> = HashMap::new();
    let inconsistent = |m: &GameMatch, what: String| {
        BracketError::InconsistentState(format!("{} match {}: {}", m.round, m.match_number, what))
    };

    for m in matches {
        for id in m.participants().chain(m.winner) {
            if !known.contains(&id) {
                return Err(BracketError::EntrantNotFound(id));
            }
        }

        match (m.round, m.feed) {
            (Round::Championship, Some(_)) => {
                return Err(inconsistent(m, "championship must not feed another match".into()))
            }
            (Round::Championship, None) => {}
            (_, None) => return Err(inconsistent(m, "no downstream match".into())),
            (round, Some(feed)) => {
                let target = by_id
                    .get(&feed.match_id())
                    .copied()
                    .ok_or_else(|| inconsistent(m, format!("feed target {} missing", feed.match_id())))?;
                if round.next() != Some(target.round) {
                    return Err(inconsistent(m, format!("feeds {} instead of the next round", target.round)));
                }
                if fed.insert((target.id, feed.slot()), m).is_some() {
                    return Err(inconsistent(
                        target,
                        format!("slot {} is fed by more than one match", feed.slot().number()),
                    ));
                }
            }
        }

        if m.status != m.derived_status() {
            return Err(inconsistent(
                m,
                format!("status {:?} does not match occupancy ({:?})", m.status, m.derived_status()),
            ));
        }
        if m.status == MatchStatus::Completed {
            let winner_played = m.winner.and_then(|w| m.side_of(w)).is_some();
            let scores_ok = matches!((m.score1, m.score2), (Some(a), Some(b)) if a != b);
            if !winner_played || !scores_ok || !m.is_filled() {
                return Err(inconsistent(m, "completed without a valid result".into()));
            }
        }
    }

    for m in matches {
        for slot in [Slot::One, Slot::Two] {
            let held = m.slot(slot);
            match (fed.get(&(m.id, slot)), held) {
                (None, None) => {
                    return Err(inconsistent(
                        m,
                        format!("slot {} is neither seeded nor fed by any match", slot.number()),
                    ));
                }
                (Some(feeder), Some(entrant)) if !(feeder.is_completed() && feeder.winner == Some(entrant)) => {
                    return Err(inconsistent(
                        m,
                        format!(
                            "slot {} holds an entrant that {} match {} did not produce",
                            slot.number(),
                            feeder.round,
                            feeder.match_number
                        ),
                    ));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

//! Progression: record a result, advance the winner, undo with a forward cascade.
//!
//! Each step re-reads the target match and derives its status from the slots it observes.
//! Propagation is idempotent, so re-reporting the same result after a failed downstream
//! write completes the propagation.

use crate::models::{
    BracketError, EntrantId, GameMatch, GameScore, MatchId, MatchStatus, MatchUpdate, Slot,
};
use crate::store::MatchStore;
use serde::{Deserialize, Serialize};

/// A reported result: per-game scores or aggregate games won.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchResult {
    Games { game_scores: Vec<GameScore> },
    Aggregate { player1_score: i32, player2_score: i32 },
}

/// A result that passed validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidatedResult {
    pub score1: u32,
    pub score2: u32,
    /// Counted games only; None for aggregate reports.
    pub game_scores: Option<Vec<GameScore>>,
    pub winning_slot: Slot,
}

impl MatchResult {
    /// Check the result against a first-to-`games_to_win` format.
    pub fn validate(&self, games_to_win: u32) -> Result<ValidatedResult, BracketError> {
        match self {
            MatchResult::Games { game_scores } => validate_games(game_scores, games_to_win),
            MatchResult::Aggregate {
                player1_score,
                player2_score,
            } => validate_aggregate(*player1_score, *player2_score, games_to_win),
        }
    }
}

fn validate_games(games: &[GameScore], games_to_win: u32) -> Result<ValidatedResult, BracketError> {
    let mut counted = Vec::with_capacity(games.len());
    let (mut wins1, mut wins2) = (0u32, 0u32);

    for (i, game) in games.iter().enumerate() {
        let n = i + 1;
        if game.p1 < 0 || game.p2 < 0 {
            return Err(BracketError::Validation(format!("game {n} has a negative score")));
        }
        // Unplayed
        if game.p1 == 0 && game.p2 == 0 {
            continue;
        }
        if game.p1 == game.p2 {
            return Err(BracketError::Validation(format!("game {n} is tied {}-{}", game.p1, game.p2)));
        }
        if wins1 >= games_to_win || wins2 >= games_to_win {
            return Err(BracketError::Validation(format!(
                "game {n} was played after the match was decided"
            )));
        }
        if game.p1 > game.p2 {
            wins1 += 1;
        } else {
            wins2 += 1;
        }
        counted.push(*game);
    }

    let winning_slot = if wins1 >= games_to_win {
        Slot::One
    } else if wins2 >= games_to_win {
        Slot::Two
    } else {
        return Err(BracketError::Validation(format!(
            "no player won {games_to_win} games ({wins1}-{wins2} over {} counted games)",
            counted.len()
        )));
    };

    Ok(ValidatedResult {
        score1: wins1,
        score2: wins2,
        game_scores: Some(counted),
        winning_slot,
    })
}

fn validate_aggregate(score1: i32, score2: i32, games_to_win: u32) -> Result<ValidatedResult, BracketError> {
    if score1 < 0 || score2 < 0 {
        return Err(BracketError::Validation("scores cannot be negative".into()));
    }
    if score1 == score2 {
        return Err(BracketError::Validation("scores cannot be tied".into()));
    }
    let (score1, score2) = (score1 as u32, score2 as u32);
    let winning = score1.max(score2);
    if winning != games_to_win {
        return Err(BracketError::Validation(format!(
            "winner must have exactly {games_to_win} games, got {winning}"
        )));
    }
    Ok(ValidatedResult {
        score1,
        score2,
        game_scores: None,
        winning_slot: if score1 > score2 { Slot::One } else { Slot::Two },
    })
}

/// What `report_result` changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOutcome {
    pub completed: GameMatch,
    pub winner: EntrantId,
    /// Downstream match after the winner was written into it.
    pub next_match: Option<GameMatch>,
}

/// What `undo_result` changed, in cascade order (the undone match first).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoOutcome {
    pub reverted: Vec<MatchId>,
}

/// Record a result and advance the winner.
///
/// The match must have both slots filled. Reporting the same winner again re-applies the
/// scores and leaves downstream matches alone; reporting a different winner on a completed
/// match first undoes the old result, cascading, then propagates the new winner.
pub fn report_result<S: MatchStore + ?Sized>(
    store: &mut S,
    match_id: MatchId,
    result: &MatchResult,
    games_to_win: u32,
) -> Result<ReportOutcome, BracketError> {
    let current = store.get_match(match_id)?;
    if !current.is_filled() {
        return Err(BracketError::Validation(format!(
            "{} match {} is not ready: both players must be known",
            current.round, current.match_number
        )));
    }
    let validated = result.validate(games_to_win).map_err(|e| {
        log::warn!("Rejected result for match {}: {}", match_id, e);
        e
    })?;
    let winner = current
        .slot(validated.winning_slot)
        .ok_or_else(|| BracketError::InconsistentState(format!("match {match_id} lost a slot")))?;

    if current.is_completed() && current.winner != Some(winner) {
        log::info!(
            "Correcting {} match {}: winner changes, reverting downstream results",
            current.round,
            current.match_number
        );
        undo_result(store, match_id)?;
    }

    let update = MatchUpdate {
        score1: Some(Some(validated.score1)),
        score2: Some(Some(validated.score2)),
        game_scores: Some(validated.game_scores),
        winner: Some(Some(winner)),
        status: Some(MatchStatus::Completed),
        ..MatchUpdate::default()
    };
    let completed = store.update_match(match_id, &update)?;
    log::info!(
        "{} match {} completed {}-{}",
        completed.round,
        completed.match_number,
        validated.score1,
        validated.score2
    );

    let next_match = propagate_winner(store, &completed)?;
    Ok(ReportOutcome {
        completed,
        winner,
        next_match,
    })
}

/// Write a completed match's winner into its downstream slot and re-derive that match's status.
/// No-op when the slot already holds the winner.
pub fn propagate_winner<S: MatchStore + ?Sized>(
    store: &mut S,
    completed: &GameMatch,
) -> Result<Option<GameMatch>, BracketError> {
    let Some(feed) = completed.feed else {
        return Ok(None);
    };
    let winner = completed.winner.ok_or_else(|| {
        BracketError::InconsistentState(format!("match {} has no winner to propagate", completed.id))
    })?;
    let next = fetch_target(&*store, completed, feed.match_id())?;
    let slot = feed.slot();

    match next.slot(slot) {
        Some(held) if held == winner => {}
        Some(held) => {
            return Err(BracketError::InconsistentState(format!(
                "{} match {} slot {} already holds {} (expected {})",
                next.round,
                next.match_number,
                slot.number(),
                held,
                winner
            )));
        }
        None => {}
    }

    let mut after = next.clone();
    *after.slot_mut(slot) = Some(winner);
    let status = after.derived_status();
    if after.slot(slot) == next.slot(slot) && status == next.status {
        return Ok(Some(next));
    }

    let update = MatchUpdate::default().with_slot(slot, Some(winner)).with_status(status);
    let stored = store.update_match(next.id, &update)?;
    log::debug!(
        "Advanced {} into {} match {} slot {} ({:?})",
        winner,
        stored.round,
        stored.match_number,
        slot.number(),
        stored.status
    );
    Ok(Some(stored))
}

/// Revert a completed match to `Ready` and walk forward clearing what its winner fed.
///
/// Each downstream match loses the propagated slot, its result, and drops to `Pending`. The
/// walk continues while the reverted match had itself been completed, since its winner was
/// propagated one step further; it stops at the first match with no completed result.
/// The whole chain is checked before anything is written, so a conflicting slot leaves the
/// store untouched.
pub fn undo_result<S: MatchStore + ?Sized>(store: &mut S, match_id: MatchId) -> Result<UndoOutcome, BracketError> {
    let original = store.get_match(match_id)?;
    if !original.is_completed() {
        return Err(BracketError::Validation(format!(
            "{} match {} has no result to undo",
            original.round, original.match_number
        )));
    }

    let cascade = plan_undo(&*store, &original)?;

    let status = if original.is_filled() {
        MatchStatus::Ready
    } else {
        MatchStatus::Pending
    };
    store.update_match(match_id, &MatchUpdate::clear_result().with_status(status))?;
    let mut reverted = vec![match_id];

    for (next_id, slot) in cascade {
        let update = MatchUpdate::clear_result()
            .with_slot(slot, None)
            .with_status(MatchStatus::Pending);
        let stored = store.update_match(next_id, &update)?;
        reverted.push(next_id);
        log::debug!("Reverted {} match {}", stored.round, stored.match_number);
    }

    log::info!("Undid match {} ({} matches reverted)", match_id, reverted.len());
    Ok(UndoOutcome { reverted })
}

/// Downstream matches and slots an undo of `original` clears, in cascade order. Read-only.
fn plan_undo<S: MatchStore + ?Sized>(
    store: &S,
    original: &GameMatch,
) -> Result<Vec<(MatchId, Slot)>, BracketError> {
    let mut cascade = Vec::new();
    let mut cursor = original.clone();
    while let Some(feed) = cursor.feed {
        let next = fetch_target(store, &cursor, feed.match_id())?;
        let held = next.slot(feed.slot());
        if held.is_none() {
            // Winner never reached this match.
            break;
        }
        if held != cursor.winner {
            return Err(BracketError::InconsistentState(format!(
                "{} match {} slot {} holds a different entrant than {} match {} produced",
                next.round,
                next.match_number,
                feed.slot().number(),
                cursor.round,
                cursor.match_number
            )));
        }
        cascade.push((next.id, feed.slot()));
        if !next.is_completed() {
            break;
        }
        cursor = next;
    }
    Ok(cascade)
}

fn fetch_target<S: MatchStore + ?Sized>(
    store: &S,
    from: &GameMatch,
    target: MatchId,
) -> Result<GameMatch, BracketError> {
    store.get_match(target).map_err(|e| match e {
        BracketError::MatchNotFound(id) => BracketError::InconsistentState(format!(
            "{} match {} feeds missing match {}",
            from.round, from.match_number, id
        )),
        other => other,
    })
}

//! Shared fixtures: the reference bracket and helpers for playing it out.
#![allow(dead_code)]

use madness_bracket::logic::{entrant_id, match_id};
use madness_bracket::{
    generate_bracket, report_result, Bracket, EntrantId, GameMatch, GameScore, InMemoryStore,
    MatchResult, MatchStore, ReportOutcome, Round, SeedTable, Slot, TournamentConfig,
};
use uuid::Uuid;

pub const TOURNAMENT: Uuid = Uuid::from_u128(0x76);

pub fn reference_bracket() -> Bracket {
    generate_bracket(TOURNAMENT, &SeedTable::numbered(76), &TournamentConfig::default()).unwrap()
}

pub fn reference_store() -> InMemoryStore {
    InMemoryStore::from_bracket(reference_bracket()).unwrap()
}

pub fn entrant(rank: u32) -> EntrantId {
    entrant_id(TOURNAMENT, rank)
}

pub fn find(store: &InMemoryStore, round: Round, number: u32) -> GameMatch {
    store.get_match(match_id(TOURNAMENT, round, number)).unwrap()
}

pub fn games(scores: &[(i32, i32)]) -> MatchResult {
    MatchResult::Games {
        game_scores: scores.iter().map(|&(p1, p2)| GameScore::new(p1, p2)).collect(),
    }
}

/// 2-0 for the given side.
pub fn sweep(slot: Slot) -> MatchResult {
    let (player1_score, player2_score) = match slot {
        Slot::One => (2, 0),
        Slot::Two => (0, 2),
    };
    MatchResult::Aggregate {
        player1_score,
        player2_score,
    }
}

pub fn win(store: &mut InMemoryStore, round: Round, number: u32, slot: Slot) -> ReportOutcome {
    let id = match_id(TOURNAMENT, round, number);
    report_result(store, id, &sweep(slot), 2).unwrap()
}

pub fn without_timestamp(mut m: GameMatch) -> GameMatch {
    m.updated_at = None;
    m
}

/// Play every match to completion, earliest ready match first, letting `choose` pick winners.
/// Calls `after_each` with the store after every reported result.
pub fn play_out(
    store: &mut InMemoryStore,
    mut choose: impl FnMut(&GameMatch) -> Slot,
    mut after_each: impl FnMut(&InMemoryStore),
) {
    while let Some(m) = store.all_matches().into_iter().find(|m| m.is_ready_to_play()) {
        let slot = choose(&m);
        report_result(store, m.id, &sweep(slot), 2).unwrap();
        after_each(store);
    }
}

/// Winner picker: `rank` wins every match it plays except in `loses_in`; slot 1 wins elsewhere.
pub fn favour(rank: u32, loses_in: Option<Round>) -> impl FnMut(&GameMatch) -> Slot {
    let target = entrant(rank);
    move |m| match m.side_of(target) {
        Some(side) if Some(m.round) == loses_in => side.other(),
        Some(side) => side,
        None => Slot::One,
    }
}

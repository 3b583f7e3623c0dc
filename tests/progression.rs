//! Integration tests for result reporting, winner propagation and undo.

mod common;

use common::{entrant, find, games, play_out, reference_store, sweep, win, without_timestamp};
use madness_bracket::{
    check_integrity, report_result, undo_result, BracketError, MatchResult, MatchStatus, MatchStore,
    MatchUpdate, Round, Slot,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

#[test]
fn game_scores_best_of_three_completes_and_advances() {
    let mut store = reference_store();
    let m = find(&store, Round::PlayIn, 1);

    let outcome = report_result(&mut store, m.id, &games(&[(15, 10), (8, 15), (15, 12)]), 2).unwrap();

    assert_eq!(outcome.winner, entrant(53));
    let done = find(&store, Round::PlayIn, 1);
    assert_eq!((done.score1, done.score2), (Some(2), Some(1)));
    assert_eq!(done.status, MatchStatus::Completed);
    assert_eq!(done.winner, Some(entrant(53)));
    assert_eq!(done.game_scores.as_ref().map(Vec::len), Some(3));

    // Rank 53's play-in feeds round 2 match 12 against rank 44.
    let next = find(&store, Round::Round2, 12);
    assert_eq!(next.slot1, Some(entrant(44)));
    assert_eq!(next.slot2, Some(entrant(53)));
    assert_eq!(next.status, MatchStatus::Ready);
}

#[test]
fn single_game_has_no_majority() {
    let mut store = reference_store();
    let m = find(&store, Round::PlayIn, 1);
    let err = report_result(&mut store, m.id, &games(&[(15, 10)]), 2).unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));
    assert_eq!(without_timestamp(find(&store, Round::PlayIn, 1)), without_timestamp(m));
}

#[test]
fn malformed_game_scores_are_rejected() {
    let mut store = reference_store();
    let id = find(&store, Round::PlayIn, 2).id;
    for bad in [
        games(&[(15, 15), (15, 3)]),
        games(&[(-1, 15), (3, 15)]),
        games(&[(15, 1), (15, 2), (3, 15)]),
        games(&[]),
    ] {
        let err = report_result(&mut store, id, &bad, 2).unwrap_err();
        assert!(matches!(err, BracketError::Validation(_)), "{bad:?}");
    }
    assert_eq!(find(&store, Round::PlayIn, 2).status, MatchStatus::Ready);
}

#[test]
fn scoreless_games_are_not_counted() {
    let mut store = reference_store();
    let id = find(&store, Round::PlayIn, 3).id;
    let outcome = report_result(&mut store, id, &games(&[(3, 15), (0, 0), (10, 15)]), 2).unwrap();
    assert_eq!(outcome.winner, entrant(74));
    assert_eq!((outcome.completed.score1, outcome.completed.score2), (Some(0), Some(2)));
    assert_eq!(outcome.completed.game_scores.map(|g| g.len()), Some(2));
}

#[test]
fn aggregate_scores_must_name_a_best_of_three_winner() {
    let mut store = reference_store();
    let id = find(&store, Round::PlayIn, 4).id;
    for (a, b) in [(1, 1), (3, 1), (-1, 2), (1, 0)] {
        let result = MatchResult::Aggregate {
            player1_score: a,
            player2_score: b,
        };
        assert!(matches!(report_result(&mut store, id, &result, 2), Err(BracketError::Validation(_))));
    }
    let ok = MatchResult::Aggregate {
        player1_score: 1,
        player2_score: 2,
    };
    assert_eq!(report_result(&mut store, id, &ok, 2).unwrap().winner, entrant(73));
}

#[test]
fn pending_match_cannot_be_reported() {
    let mut store = reference_store();
    let id = find(&store, Round::Round2, 1).id;
    let err = report_result(&mut store, id, &sweep(Slot::One), 2).unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));
}

#[test]
fn unknown_match_is_not_found() {
    let mut store = reference_store();
    let id = Uuid::from_u128(42);
    assert_eq!(
        report_result(&mut store, id, &sweep(Slot::One), 2).unwrap_err(),
        BracketError::MatchNotFound(id)
    );
    assert_eq!(undo_result(&mut store, id).unwrap_err(), BracketError::MatchNotFound(id));
}

#[test]
fn report_then_undo_restores_both_matches() {
    let mut store = reference_store();
    let before = without_timestamp(find(&store, Round::PlayIn, 1));
    let before_next = without_timestamp(find(&store, Round::Round2, 12));

    report_result(&mut store, before.id, &games(&[(15, 10), (8, 15), (15, 12)]), 2).unwrap();
    let outcome = undo_result(&mut store, before.id).unwrap();

    assert_eq!(outcome.reverted, vec![before.id, before_next.id]);
    assert_eq!(without_timestamp(find(&store, Round::PlayIn, 1)), before);
    assert_eq!(without_timestamp(find(&store, Round::Round2, 12)), before_next);
}

#[test]
fn reporting_the_same_result_twice_is_stable() {
    let mut store = reference_store();
    let id = find(&store, Round::PlayIn, 5).id;
    let result = games(&[(15, 9), (15, 13)]);

    report_result(&mut store, id, &result, 2).unwrap();
    let first = (
        without_timestamp(find(&store, Round::PlayIn, 5)),
        without_timestamp(find(&store, Round::Round2, 8)),
    );
    report_result(&mut store, id, &result, 2).unwrap();
    let second = (
        without_timestamp(find(&store, Round::PlayIn, 5)),
        without_timestamp(find(&store, Round::Round2, 8)),
    );
    assert_eq!(first, second);
}

#[test]
fn correcting_a_winner_clears_stale_downstream_results() {
    let mut store = reference_store();
    // Play-in 12 (64 v 65) feeds round 2 match 1 (rank 33), which feeds round 3 match 16.
    win(&mut store, Round::PlayIn, 12, Slot::One);
    win(&mut store, Round::Round2, 1, Slot::One);
    assert_eq!(find(&store, Round::Round3, 16).slot2, Some(entrant(33)));

    win(&mut store, Round::PlayIn, 12, Slot::Two);

    let r2 = find(&store, Round::Round2, 1);
    assert_eq!(r2.slot2, Some(entrant(65)));
    assert_eq!(r2.winner, None);
    assert_eq!(r2.score1, None);
    assert_eq!(r2.status, MatchStatus::Ready);

    let r3 = find(&store, Round::Round3, 16);
    assert_eq!(r3.slot2, None);
    assert_eq!(r3.status, MatchStatus::Pending);
    check_integrity(&store.all_matches(), &store.all_entrants()).unwrap();
}

#[test]
fn undo_walks_forward_through_completed_matches() {
    let mut store = reference_store();
    win(&mut store, Round::PlayIn, 12, Slot::One);
    win(&mut store, Round::Round2, 1, Slot::One);
    win(&mut store, Round::Round3, 16, Slot::Two);
    assert_eq!(find(&store, Round::Round4, 1).slot2, Some(entrant(33)));

    let play_in = find(&store, Round::PlayIn, 12);
    let outcome = undo_result(&mut store, play_in.id).unwrap();

    let expected = vec![
        play_in.id,
        find(&store, Round::Round2, 1).id,
        find(&store, Round::Round3, 16).id,
        find(&store, Round::Round4, 1).id,
    ];
    assert_eq!(outcome.reverted, expected);
    assert_eq!(find(&store, Round::PlayIn, 12).status, MatchStatus::Ready);
    let r3 = find(&store, Round::Round3, 16);
    assert_eq!((r3.slot2, r3.winner, r3.status), (None, None, MatchStatus::Pending));
    let r4 = find(&store, Round::Round4, 1);
    assert_eq!((r4.slot1, r4.slot2, r4.status), (Some(entrant(1)), None, MatchStatus::Pending));
    check_integrity(&store.all_matches(), &store.all_entrants()).unwrap();
}

#[test]
fn undo_requires_a_completed_match() {
    let mut store = reference_store();
    let id = find(&store, Round::PlayIn, 1).id;
    assert!(matches!(undo_result(&mut store, id), Err(BracketError::Validation(_))));
}

#[test]
fn conflicting_downstream_slot_is_an_integrity_error() {
    let mut store = reference_store();
    let target = find(&store, Round::Round2, 12);
    store
        .update_match(target.id, &MatchUpdate::default().with_slot(Slot::Two, Some(entrant(70))))
        .unwrap();

    let id = find(&store, Round::PlayIn, 1).id;
    let err = report_result(&mut store, id, &sweep(Slot::One), 2).unwrap_err();
    assert!(matches!(err, BracketError::InconsistentState(_)));
    assert_eq!(find(&store, Round::Round2, 12).slot2, Some(entrant(70)));
}

#[test]
fn failed_undo_keeps_the_recorded_result() {
    let mut store = reference_store();
    win(&mut store, Round::PlayIn, 1, Slot::One);
    let target = find(&store, Round::Round2, 12);
    store
        .update_match(target.id, &MatchUpdate::default().with_slot(Slot::Two, Some(entrant(70))))
        .unwrap();
    let before = without_timestamp(find(&store, Round::PlayIn, 1));

    let err = undo_result(&mut store, before.id).unwrap_err();
    assert!(matches!(err, BracketError::InconsistentState(_)));

    let after = without_timestamp(find(&store, Round::PlayIn, 1));
    assert_eq!(after.status, MatchStatus::Completed);
    assert_eq!(after.winner, Some(entrant(53)));
    assert_eq!(after, before);
    assert_eq!(find(&store, Round::Round2, 12).slot2, Some(entrant(70)));
}

#[test]
fn failed_correction_deep_in_the_cascade_writes_nothing() {
    let mut store = reference_store();
    win(&mut store, Round::PlayIn, 12, Slot::One);
    win(&mut store, Round::Round2, 1, Slot::One);
    let r3 = find(&store, Round::Round3, 16);
    store
        .update_match(r3.id, &MatchUpdate::default().with_slot(Slot::Two, Some(entrant(40))))
        .unwrap();
    let snapshot: Vec<_> = store.all_matches().into_iter().map(without_timestamp).collect();

    let id = find(&store, Round::PlayIn, 12).id;
    let err = report_result(&mut store, id, &sweep(Slot::Two), 2).unwrap_err();
    assert!(matches!(err, BracketError::InconsistentState(_)));

    let now: Vec<_> = store.all_matches().into_iter().map(without_timestamp).collect();
    assert_eq!(now, snapshot);
}

#[test]
fn re_reporting_finishes_an_interrupted_propagation() {
    let mut store = reference_store();
    let id = find(&store, Round::PlayIn, 1).id;
    // Result written but never propagated.
    let partial = MatchUpdate {
        score1: Some(Some(2)),
        score2: Some(Some(0)),
        winner: Some(Some(entrant(53))),
        status: Some(MatchStatus::Completed),
        ..MatchUpdate::default()
    };
    store.update_match(id, &partial).unwrap();
    assert_eq!(find(&store, Round::Round2, 12).slot2, None);

    report_result(&mut store, id, &sweep(Slot::One), 2).unwrap();
    let next = find(&store, Round::Round2, 12);
    assert_eq!(next.slot2, Some(entrant(53)));
    assert_eq!(next.status, MatchStatus::Ready);
}

#[test]
fn random_full_tournament_crowns_exactly_one_champion() {
    let mut store = reference_store();
    let mut rng = StdRng::seed_from_u64(76);
    play_out(
        &mut store,
        |_| if rng.gen_bool(0.5) { Slot::One } else { Slot::Two },
        |s| check_integrity(&s.all_matches(), &s.all_entrants()).unwrap(),
    );

    let matches = store.all_matches();
    assert!(matches.iter().all(|m| m.status == MatchStatus::Completed));
    let championship = find(&store, Round::Championship, 1);
    let champion = championship.winner.unwrap();

    // One completed win per round from the champion's first round to the final.
    let won: Vec<Round> = matches
        .iter()
        .filter(|m| m.winner == Some(champion))
        .map(|m| m.round)
        .collect();
    let first = won[0];
    assert_eq!(won.len() as u32, first.rounds_to_championship());
    assert!(won.windows(2).all(|w| w[0].next() == Some(w[1])));
    let losers: Vec<_> = matches.iter().filter_map(|m| m.loser()).collect();
    assert!(!losers.contains(&champion));
    assert_eq!(losers.len(), 75);
}

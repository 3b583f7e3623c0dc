//! Bracket generation: seed table + round schedule → entrants and the complete match graph.
//!
//! Every match gets its feed descriptor here, once. A downstream slot named in the schedule
//! (`SlotSource::WinnerOf`) is wired structurally; only rounds whose matches have both slots
//! open are wired by the parity counter.

use crate::config::TournamentConfig;
use crate::models::{
    Bracket, BracketError, BracketSchedule, Entrant, EntrantId, FeedDescriptor, GameMatch, MatchId,
    MatchStatus, MatchTemplate, Round, SeedTable, Slot, SlotSource, TournamentId,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Deterministic entrant id within a tournament.
pub fn entrant_id(tournament_id: TournamentId, rank: u32) -> EntrantId {
    Uuid::new_v5(&tournament_id, format!("entrant:{rank}").as_bytes())
}

/// Deterministic match id within a tournament.
pub fn match_id(tournament_id: TournamentId, round: Round, match_number: u32) -> MatchId {
    Uuid::new_v5(&tournament_id, format!("match:{}:{}", round.as_str(), match_number).as_bytes())
}

/// Downstream target of one match, by match number in the next round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct FeedPlan {
    target: u32,
    slot: Slot,
    structural: bool,
}

/// Generate the full bracket. Pure: identical inputs give an identical bracket, ids included.
pub fn generate_bracket(
    tournament_id: TournamentId,
    seeds: &SeedTable,
    config: &TournamentConfig,
) -> Result<Bracket, BracketError> {
    let schedule = &config.schedule;
    let expected = schedule.entrant_count();
    if seeds.len() != expected {
        return Err(BracketError::Validation(format!(
            "schedule seeds {} entrants but the seed table has {}",
            expected,
            seeds.len()
        )));
    }

    let mut entrants: Vec<Entrant> = seeds
        .entries()
        .iter()
        .map(|s| Entrant::new(entrant_id(tournament_id, s.rank), s.rank, s.name.clone(), config.group_size))
        .collect();

    let feeds = plan_feeds(schedule)?;
    let rounds = schedule.rounds();
    let mut matches = Vec::with_capacity(schedule.match_count());

    for (r, round) in rounds.iter().enumerate() {
        for (i, template) in round.matches.iter().enumerate() {
            let number = i as u32 + 1;
            let mut m = GameMatch::new(match_id(tournament_id, round.round, number), round.round, number);
            m.slot1 = seeded_slot(tournament_id, template.slot1);
            m.slot2 = seeded_slot(tournament_id, template.slot2);
            m.status = if m.is_filled() {
                MatchStatus::Ready
            } else {
                MatchStatus::Pending
            };
            m.feed = feeds[r][i].map(|plan| {
                let next_round = rounds[r + 1].round;
                let target = match_id(tournament_id, next_round, plan.target);
                if plan.structural {
                    FeedDescriptor::StructurallyAssigned {
                        match_id: target,
                        slot: plan.slot,
                    }
                } else {
                    FeedDescriptor::CounterAssigned {
                        match_id: target,
                        slot: plan.slot,
                    }
                }
            });
            matches.push(m);
        }
    }

    assign_quadrants(&mut matches);
    for m in &matches {
        if m.quadrant.is_none() {
            continue;
        }
        for id in m.participants() {
            if let Some(e) = entrants.iter_mut().find(|e| e.id == id) {
                e.quadrant = m.quadrant;
            }
        }
    }

    log::info!(
        "Generated bracket {}: {} entrants, {} matches, first round {}",
        tournament_id,
        entrants.len(),
        matches.len(),
        schedule.first_round()
    );

    Ok(Bracket {
        tournament_id,
        entrants,
        matches,
    })
}

fn seeded_slot(tournament_id: TournamentId, source: SlotSource) -> Option<EntrantId> {
    source.seed().map(|rank| entrant_id(tournament_id, rank))
}

/// Compute every match's downstream target, indexed `[round][match]`. Championship is `None`.
fn plan_feeds(schedule: &BracketSchedule) -> Result<Vec<Vec<Option<FeedPlan>>>, BracketError> {
    let rounds = schedule.rounds();
    let mut plans = Vec::with_capacity(rounds.len());

    for pair in rounds.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let feeder_count = current.matches.len() as u32;

        // Slots the schedule names explicitly: feeder number -> (target, slot).
        let mut structural: HashMap<u32, (u32, Slot)> = HashMap::new();
        let mut unfed: HashSet<(u32, Slot)> = HashSet::new();
        for (t, template) in next.matches.iter().enumerate() {
            let target = t as u32 + 1;
            for (slot, source) in [(Slot::One, template.slot1), (Slot::Two, template.slot2)] {
                match source {
                    SlotSource::Seed(_) => {}
                    SlotSource::Open => {
                        unfed.insert((target, slot));
                    }
                    SlotSource::WinnerOf(feeder) => {
                        if feeder == 0 || feeder > feeder_count {
                            return Err(BracketError::InvalidSchedule(format!(
                                "{} match {} waits for {} match {}, which does not exist",
                                next.round, target, current.round, feeder
                            )));
                        }
                        if structural.insert(feeder, (target, slot)).is_some() {
                            return Err(BracketError::InvalidSchedule(format!(
                                "{} match {} feeds more than one slot",
                                current.round, feeder
                            )));
                        }
                        unfed.insert((target, slot));
                    }
                }
            }
        }

        let mut round_plans = Vec::with_capacity(current.matches.len());
        for number in 1..=feeder_count {
            let plan = match structural.get(&number) {
                Some(&(target, slot)) => FeedPlan {
                    target,
                    slot,
                    structural: true,
                },
                None => counter_plan(number, next.matches.get((number.div_ceil(2) - 1) as usize))
                    .ok_or_else(|| {
                        BracketError::InvalidSchedule(format!(
                            "{} match {} has no open slot to feed in {}",
                            current.round, number, next.round
                        ))
                    })?,
            };
            if !unfed.remove(&(plan.target, plan.slot)) {
                return Err(BracketError::InvalidSchedule(format!(
                    "{} match {} slot {} is fed twice",
                    next.round,
                    plan.target,
                    plan.slot.number()
                )));
            }
            round_plans.push(Some(plan));
        }

        if let Some(&(target, slot)) = unfed.iter().min() {
            return Err(BracketError::InvalidSchedule(format!(
                "{} match {} slot {} is never fed",
                next.round,
                target,
                slot.number()
            )));
        }
        plans.push(round_plans);
    }

    // Championship
    plans.push(vec![None]);
    Ok(plans)
}

/// Parity wiring: only valid when the target match has both slots open.
fn counter_plan(number: u32, target: Option<&MatchTemplate>) -> Option<FeedPlan> {
    let template = target?;
    if template.slot1 != SlotSource::Open || template.slot2 != SlotSource::Open {
        return None;
    }
    Some(FeedPlan {
        target: number.div_ceil(2),
        slot: if number % 2 == 1 { Slot::One } else { Slot::Two },
        structural: false,
    })
}

/// Elite-8 match q defines quadrant q; upstream matches inherit their target's quadrant.
/// Brackets without a four-match elite-8 round get no quadrants.
fn assign_quadrants(matches: &mut [GameMatch]) {
    let elite_8: Vec<usize> = (0..matches.len())
        .filter(|&i| matches[i].round == Round::Elite8)
        .collect();
    if elite_8.len() != 4 {
        return;
    }

    let mut quadrant_of: HashMap<MatchId, u8> = HashMap::new();
    for &i in &elite_8 {
        let q = matches[i].match_number as u8;
        matches[i].quadrant = Some(q);
        quadrant_of.insert(matches[i].id, q);
    }

    // Matches are in round order, so walking backwards visits every target before its feeders.
    for i in (0..matches.len()).rev() {
        if matches[i].round >= Round::Elite8 {
            continue;
        }
        let inherited = matches[i].next_match_id().and_then(|t| quadrant_of.get(&t).copied());
        if let Some(q) = inherited {
            matches[i].quadrant = Some(q);
            quadrant_of.insert(matches[i].id, q);
        }
    }

    let mut counters: HashMap<(Round, u8), u32> = HashMap::new();
    for m in matches.iter_mut() {
        if let Some(q) = m.quadrant {
            let n = counters.entry((m.round, q)).or_insert(0);
            *n += 1;
            m.quadrant_match_number = Some(*n);
        }
    }
}

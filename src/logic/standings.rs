//! Standings: per-entrant wins, points, milestone bonuses and maximum remaining points.

use crate::config::{Milestone, PointsSchedule};
use crate::models::{Entrant, EntrantId, GameMatch, Round};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Display status, most advanced first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingStatus {
    Champion,
    Finals,
    FinalFour,
    Eliminated,
    Active,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntrantStanding {
    pub entrant: Entrant,
    pub wins: u32,
    /// Win points plus earned bonus.
    pub points: u32,
    pub bonus_points: u32,
    /// Points still reachable; 0 once eliminated.
    pub max_remaining_points: u32,
    pub eliminated: bool,
    pub reached_final_four: bool,
    pub reached_championship: bool,
    pub is_champion: bool,
    pub starting_round: Round,
}

impl EntrantStanding {
    pub fn max_points(&self) -> u32 {
        self.points + self.max_remaining_points
    }

    pub fn status(&self) -> StandingStatus {
        if self.is_champion {
            StandingStatus::Champion
        } else if self.reached_championship {
            StandingStatus::Finals
        } else if self.reached_final_four {
            StandingStatus::FinalFour
        } else if self.eliminated {
            StandingStatus::Eliminated
        } else {
            StandingStatus::Active
        }
    }
}

/// Facts about every entrant gathered in one pass over the match set.
struct MatchFacts {
    wins: HashMap<EntrantId, u32>,
    eliminated: HashSet<EntrantId>,
    /// Rounds each entrant occupied a slot in.
    rounds: HashMap<EntrantId, HashSet<Round>>,
    champion: Option<EntrantId>,
}

impl MatchFacts {
    fn collect(matches: &[GameMatch]) -> Self {
        let mut facts = Self {
            wins: HashMap::new(),
            eliminated: HashSet::new(),
            rounds: HashMap::new(),
            champion: None,
        };
        for m in matches {
            for id in m.participants() {
                facts.rounds.entry(id).or_default().insert(m.round);
            }
            if !m.is_completed() {
                continue;
            }
            if let Some(winner) = m.winner {
                *facts.wins.entry(winner).or_insert(0) += 1;
                if m.round == Round::Championship {
                    facts.champion = Some(winner);
                }
            }
            if let Some(loser) = m.loser() {
                facts.eliminated.insert(loser);
            }
        }
        facts
    }

    fn reached(&self, id: EntrantId, round: Round) -> bool {
        self.rounds.get(&id).is_some_and(|r| r.contains(&round))
    }

    /// Earliest round the entrant appears in. Seeded slots are never cleared, so this is the
    /// round the entrant was seeded into.
    fn starting_round(&self, id: EntrantId) -> Option<Round> {
        self.rounds.get(&id).and_then(|r| r.iter().min().copied())
    }
}

/// Compute standings for every entrant, sorted for display: points desc, max remaining desc,
/// rank asc, name asc.
pub fn calculate_standings(
    matches: &[GameMatch],
    entrants: &[Entrant],
    points: &PointsSchedule,
) -> Vec<EntrantStanding> {
    let facts = MatchFacts::collect(matches);
    let first_round = matches.iter().map(|m| m.round).min().unwrap_or(Round::PlayIn);

    let mut standings: Vec<EntrantStanding> = entrants
        .iter()
        .map(|entrant| {
            let id = entrant.id;
            let wins = facts.wins.get(&id).copied().unwrap_or(0);
            let eliminated = facts.eliminated.contains(&id);
            let is_champion = facts.champion == Some(id);
            let starting_round = facts.starting_round(id).unwrap_or(first_round);

            let earned = |milestone: Milestone| match milestone {
                Milestone::Reached(round) => facts.reached(id, round),
                Milestone::Champion => is_champion,
            };

            let mut bonus_points = 0;
            let mut unearned_bonus = 0;
            for bonus in &points.bonuses {
                if earned(bonus.milestone) {
                    bonus_points += bonus.points;
                } else {
                    unearned_bonus += bonus.points;
                }
            }

            let max_remaining_points = if eliminated {
                0
            } else {
                let total_wins = starting_round.rounds_to_championship();
                points.win_points.sum(wins + 1, total_wins) + unearned_bonus
            };

            EntrantStanding {
                entrant: entrant.clone(),
                wins,
                points: points.win_points.total(wins) + bonus_points,
                bonus_points,
                max_remaining_points,
                eliminated,
                reached_final_four: facts.reached(id, Round::FinalFour),
                reached_championship: facts.reached(id, Round::Championship),
                is_champion,
                starting_round,
            }
        })
        .collect();

    standings.sort_by(compare_standings);
    standings
}

fn compare_standings(a: &EntrantStanding, b: &EntrantStanding) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.max_remaining_points.cmp(&a.max_remaining_points))
        .then(a.entrant.rank.cmp(&b.entrant.rank))
        .then_with(|| a.entrant.name.cmp(&b.entrant.name))
}

/// Standings keyed by entrant name, for portfolio lookups.
pub fn standings_by_name(standings: &[EntrantStanding]) -> HashMap<&str, &EntrantStanding> {
    standings.iter().map(|s| (s.entrant.name.as_str(), s)).collect()
}

//! Declarative round schedule: which seeds play where, and which slots wait for a winner.

use crate::models::bracket::BracketError;
use crate::models::round::Round;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Source of one input slot of a scheduled match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    /// Filled at generation time by the entrant with this rank.
    Seed(u32),
    /// Filled by the winner of this match number in the previous round.
    WinnerOf(u32),
    /// Filled by whichever previous-round match the parity counter assigns.
    Open,
}

impl SlotSource {
    pub fn seed(&self) -> Option<u32> {
        match *self {
            SlotSource::Seed(rank) => Some(rank),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchTemplate {
    pub slot1: SlotSource,
    pub slot2: SlotSource,
}

impl MatchTemplate {
    pub fn seeded(high: u32, low: u32) -> Self {
        Self {
            slot1: SlotSource::Seed(high),
            slot2: SlotSource::Seed(low),
        }
    }

    pub fn seed_vs_winner(rank: u32, feeder: u32) -> Self {
        Self {
            slot1: SlotSource::Seed(rank),
            slot2: SlotSource::WinnerOf(feeder),
        }
    }

    pub fn open() -> Self {
        Self {
            slot1: SlotSource::Open,
            slot2: SlotSource::Open,
        }
    }
}

/// All matches of one round; match number is position + 1.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundTemplate {
    pub round: Round,
    pub matches: Vec<MatchTemplate>,
}

/// Ordered round templates ending with a one-match championship.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RoundTemplate>", into = "Vec<RoundTemplate>")]
pub struct BracketSchedule {
    rounds: Vec<RoundTemplate>,
}

impl BracketSchedule {
    /// Validate round ordering and seed coverage. Feed wiring is checked by the generator.
    pub fn new(rounds: Vec<RoundTemplate>) -> Result<Self, BracketError> {
        let last = rounds
            .last()
            .ok_or_else(|| BracketError::InvalidSchedule("schedule has no rounds".into()))?;
        if last.round != Round::Championship || last.matches.len() != 1 {
            return Err(BracketError::InvalidSchedule(
                "schedule must end with a single championship match".into(),
            ));
        }
        for pair in rounds.windows(2) {
            if pair[0].round.next() != Some(pair[1].round) {
                return Err(BracketError::InvalidSchedule(format!(
                    "{} is not followed by {}",
                    pair[0].round, pair[1].round
                )));
            }
        }
        for (i, round) in rounds.iter().enumerate() {
            if round.matches.is_empty() {
                return Err(BracketError::InvalidSchedule(format!("{} has no matches", round.round)));
            }
            if i == 0 {
                let all_seeded = round
                    .matches
                    .iter()
                    .all(|m| m.slot1.seed().is_some() && m.slot2.seed().is_some());
                if !all_seeded {
                    return Err(BracketError::InvalidSchedule(format!(
                        "first round {} must be fully seeded",
                        round.round
                    )));
                }
            }
        }

        let mut ranks = BTreeSet::new();
        for m in rounds.iter().flat_map(|r| r.matches.iter()) {
            for rank in [m.slot1.seed(), m.slot2.seed()].into_iter().flatten() {
                if !ranks.insert(rank) {
                    return Err(BracketError::InvalidSchedule(format!("rank {rank} is seeded twice")));
                }
            }
        }
        if let Some((i, rank)) = ranks.iter().enumerate().find(|(i, r)| **r != *i as u32 + 1) {
            return Err(BracketError::InvalidSchedule(format!(
                "seeded ranks must be dense from 1: expected {}, found {rank}",
                i + 1
            )));
        }

        Ok(Self { rounds })
    }

    /// The 76-entrant, 75-match bracket: a 12-match play-in feeding round 2 unevenly,
    /// then seeds entering in bands of 16 through round 4, then standard halving.
    pub fn reference() -> Self {
        let play_in = (1..=12).map(|i| MatchTemplate::seeded(52 + i, 77 - i)).collect();

        // Play-in 12 (64v65) winner meets rank 33; play-in 1 (53v76) winner meets rank 44.
        let mut round_2: Vec<_> = (1..=12)
            .map(|j| MatchTemplate::seed_vs_winner(32 + j, 13 - j))
            .collect();
        round_2.extend([(45, 52), (46, 51), (47, 50), (48, 49)].map(|(a, b)| MatchTemplate::seeded(a, b)));

        // Round 2 match m is favoured by rank 32+m, so round 3 match i meets the favourite 49-i.
        let round_3 = (1..=16).map(|i| MatchTemplate::seed_vs_winner(16 + i, 17 - i)).collect();
        let round_4 = (1..=16).map(|i| MatchTemplate::seed_vs_winner(i, 17 - i)).collect();

        let halving = |round, n| RoundTemplate {
            round,
            matches: vec![MatchTemplate::open(); n],
        };

        Self {
            rounds: vec![
                RoundTemplate { round: Round::PlayIn, matches: play_in },
                RoundTemplate { round: Round::Round2, matches: round_2 },
                RoundTemplate { round: Round::Round3, matches: round_3 },
                RoundTemplate { round: Round::Round4, matches: round_4 },
                halving(Round::Sweet16, 8),
                halving(Round::Elite8, 4),
                halving(Round::FinalFour, 2),
                halving(Round::Championship, 1),
            ],
        }
    }

    /// Plain power-of-two bracket whose first round is `first`: match `i` of the first round is
    /// rank `i` vs rank `2n+1-i`, every later round halves with open slots.
    pub fn single_elimination(first: Round) -> Self {
        let depth = first.rounds_to_championship();
        let first_matches = 1u32 << (depth - 1);
        let entrants = first_matches * 2;
        let mut rounds = vec![RoundTemplate {
            round: first,
            matches: (1..=first_matches)
                .map(|i| MatchTemplate::seeded(i, entrants + 1 - i))
                .collect(),
        }];
        let mut size = first_matches / 2;
        let mut round = first;
        while let Some(next) = round.next() {
            rounds.push(RoundTemplate {
                round: next,
                matches: vec![MatchTemplate::open(); size as usize],
            });
            round = next;
            size /= 2;
        }
        Self { rounds }
    }

    pub fn rounds(&self) -> &[RoundTemplate] {
        &self.rounds
    }

    pub fn round(&self, round: Round) -> Option<&RoundTemplate> {
        self.rounds.iter().find(|r| r.round == round)
    }

    pub fn first_round(&self) -> Round {
        self.rounds[0].round
    }

    /// Number of directly seeded entrants.
    pub fn entrant_count(&self) -> usize {
        self.rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .map(|m| [m.slot1.seed(), m.slot2.seed()].into_iter().flatten().count())
            .sum()
    }

    pub fn match_count(&self) -> usize {
        self.rounds.iter().map(|r| r.matches.len()).sum()
    }

    /// Round in which the entrant with this rank plays its first match.
    pub fn starting_round(&self, rank: u32) -> Option<Round> {
        self.rounds
            .iter()
            .find(|r| {
                r.matches
                    .iter()
                    .any(|m| m.slot1 == SlotSource::Seed(rank) || m.slot2 == SlotSource::Seed(rank))
            })
            .map(|r| r.round)
    }
}

impl Default for BracketSchedule {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<Vec<RoundTemplate>> for BracketSchedule {
    type Error = BracketError;

    fn try_from(rounds: Vec<RoundTemplate>) -> Result<Self, Self::Error> {
        Self::new(rounds)
    }
}

impl From<BracketSchedule> for Vec<RoundTemplate> {
    fn from(schedule: BracketSchedule) -> Self {
        schedule.rounds
    }
}

//! Round enumeration: fixed, totally ordered bracket depth.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A round of the bracket. Declaration order is play order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    PlayIn,
    #[serde(rename = "round_2")]
    Round2,
    #[serde(rename = "round_3")]
    Round3,
    #[serde(rename = "round_4")]
    Round4,
    #[serde(rename = "sweet_16")]
    Sweet16,
    #[serde(rename = "elite_8")]
    Elite8,
    FinalFour,
    Championship,
}

impl Round {
    /// All rounds in play order.
    pub const ALL: [Round; 8] = [
        Round::PlayIn,
        Round::Round2,
        Round::Round3,
        Round::Round4,
        Round::Sweet16,
        Round::Elite8,
        Round::FinalFour,
        Round::Championship,
    ];

    /// Zero-based position in play order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Round> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Round> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Number of rounds from this one through the championship, inclusive.
    /// This is the most wins an entrant starting here can collect.
    pub fn rounds_to_championship(self) -> u32 {
        (Self::ALL.len() - self.index()) as u32
    }

    /// Human-facing name, e.g. "Sweet 16".
    pub fn display_name(self) -> &'static str {
        match self {
            Round::PlayIn => "Play-In",
            Round::Round2 => "Round 2",
            Round::Round3 => "Round 3",
            Round::Round4 => "Round 4",
            Round::Sweet16 => "Sweet 16",
            Round::Elite8 => "Elite 8",
            Round::FinalFour => "Final Four",
            Round::Championship => "Championship",
        }
    }

    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Round::PlayIn => "play_in",
            Round::Round2 => "round_2",
            Round::Round3 => "round_3",
            Round::Round4 => "round_4",
            Round::Sweet16 => "sweet_16",
            Round::Elite8 => "elite_8",
            Round::FinalFour => "final_four",
            Round::Championship => "championship",
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

//! Tournament configuration: seed grouping, match format, points schedule.
//! Loaded from a JSON file named by `BRACKET_CONFIG`; every field has a default.

use crate::models::{BracketError, BracketSchedule, Round};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Env var naming the JSON config file.
pub const CONFIG_ENV: &str = "BRACKET_CONFIG";

/// Value of the k-th win.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WinPoints {
    /// k-th win scores k points, so w wins total w(w+1)/2.
    #[default]
    Triangular,
    Flat { points: u32 },
}

impl WinPoints {
    /// Points for the k-th win (1-based).
    pub fn value(self, k: u32) -> u32 {
        match self {
            WinPoints::Triangular => k,
            WinPoints::Flat { points } => points,
        }
    }

    /// Sum of win values for wins `from..=to`. Empty when `to < from`.
    pub fn sum(self, from: u32, to: u32) -> u32 {
        (from.max(1)..=to).map(|k| self.value(k)).sum()
    }

    /// Total for the first `wins` wins.
    pub fn total(self, wins: u32) -> u32 {
        self.sum(1, wins)
    }
}

/// Named achievement that earns a bonus regardless of later results.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    /// Occupied a slot in some match of this round.
    Reached(Round),
    /// Won the championship.
    Champion,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MilestoneBonus {
    pub milestone: Milestone,
    pub points: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsSchedule {
    pub win_points: WinPoints,
    pub bonuses: Vec<MilestoneBonus>,
}

impl PointsSchedule {
    pub fn bonus_for(&self, milestone: Milestone) -> u32 {
        self.bonuses
            .iter()
            .filter(|b| b.milestone == milestone)
            .map(|b| b.points)
            .sum()
    }
}

impl Default for PointsSchedule {
    /// Triangular wins; final four +1, championship +2, champion +3.
    fn default() -> Self {
        Self {
            win_points: WinPoints::Triangular,
            bonuses: vec![
                MilestoneBonus {
                    milestone: Milestone::Reached(Round::FinalFour),
                    points: 1,
                },
                MilestoneBonus {
                    milestone: Milestone::Reached(Round::Championship),
                    points: 2,
                },
                MilestoneBonus {
                    milestone: Milestone::Champion,
                    points: 3,
                },
            ],
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Ranks per display seed.
    pub group_size: u32,
    /// Games needed to win a match (2 = best of 3).
    pub games_to_win: u32,
    pub points: PointsSchedule,
    pub schedule: BracketSchedule,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            group_size: 4,
            games_to_win: 2,
            points: PointsSchedule::default(),
            schedule: BracketSchedule::reference(),
        }
    }
}

impl TournamentConfig {
    pub fn from_json_str(s: &str) -> Result<Self, BracketError> {
        let config: Self = serde_json::from_str(s).map_err(|e| BracketError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BracketError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BracketError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Config from the file named by `BRACKET_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, BracketError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                log::info!("Loading tournament config from {}", path);
                Self::from_file(path)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), BracketError> {
        if self.group_size == 0 {
            return Err(BracketError::Config("group_size must be at least 1".into()));
        }
        if self.games_to_win == 0 {
            return Err(BracketError::Config("games_to_win must be at least 1".into()));
        }
        Ok(())
    }
}

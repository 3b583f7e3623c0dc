//! Portfolio aggregation: rank analysts' picks by the summed standings of their selections.

use crate::logic::standings::{standings_by_name, EntrantStanding};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One analyst's picks. Read-only; tournament progress never changes it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub analyst: String,
    /// Entrant names (fixed size per competition, typically 5).
    pub selections: Vec<String>,
    pub tiebreaker: String,
    pub predicted_winner: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStanding {
    pub entry: PortfolioEntry,
    pub points: u32,
    /// Points plus everything the selections can still earn.
    pub max_points: u32,
    /// Selections not yet eliminated.
    pub active_selections: u32,
    pub eliminated_selections: Vec<String>,
    /// Selection names with no matching entrant; they contribute nothing.
    pub unknown_selections: Vec<String>,
    pub tiebreaker_eliminated: bool,
    pub predicted_winner_eliminated: bool,
}

/// Sum standings over each entry's selections, sorted by points desc, max desc, analyst asc.
pub fn calculate_portfolio_standings(
    entries: &[PortfolioEntry],
    standings: &[EntrantStanding],
) -> Vec<PortfolioStanding> {
    let by_name = standings_by_name(standings);
    let is_eliminated = |name: &str| by_name.get(name).is_some_and(|s| s.eliminated);

    let mut result: Vec<PortfolioStanding> = entries
        .iter()
        .map(|entry| {
            let mut standing = PortfolioStanding {
                entry: entry.clone(),
                points: 0,
                max_points: 0,
                active_selections: 0,
                eliminated_selections: Vec::new(),
                unknown_selections: Vec::new(),
                tiebreaker_eliminated: is_eliminated(&entry.tiebreaker),
                predicted_winner_eliminated: is_eliminated(&entry.predicted_winner),
            };
            for name in &entry.selections {
                match by_name.get(name.as_str()) {
                    Some(s) => {
                        standing.points += s.points;
                        standing.max_points += s.max_points();
                        if s.eliminated {
                            standing.eliminated_selections.push(name.clone());
                        } else {
                            standing.active_selections += 1;
                        }
                    }
                    None => {
                        log::warn!("Portfolio '{}' selects unknown entrant '{}'", entry.analyst, name);
                        standing.unknown_selections.push(name.clone());
                    }
                }
            }
            standing
        })
        .collect();

    result.sort_by(compare_portfolios);
    result
}

fn compare_portfolios(a: &PortfolioStanding, b: &PortfolioStanding) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.max_points.cmp(&a.max_points))
        .then_with(|| a.entry.analyst.cmp(&b.entry.analyst))
}

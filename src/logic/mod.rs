//! Bracket business logic: generation, progression, standings, portfolios.

mod generator;
mod portfolio;
mod progression;
mod standings;

pub use generator::{entrant_id, generate_bracket, match_id};
pub use portfolio::{calculate_portfolio_standings, PortfolioEntry, PortfolioStanding};
pub use progression::{
    propagate_winner, report_result, undo_result, MatchResult, ReportOutcome, UndoOutcome,
    ValidatedResult,
};
pub use standings::{calculate_standings, standings_by_name, EntrantStanding, StandingStatus};

//! Single-elimination bracket tracker: library with models, bracket logic, standings,
//! storage contract and CSV ingestion.

pub mod config;
pub mod ingest;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{Milestone, MilestoneBonus, PointsSchedule, TournamentConfig, WinPoints};
pub use logic::{
    calculate_portfolio_standings, calculate_standings, generate_bracket, propagate_winner,
    report_result, undo_result, EntrantStanding, MatchResult, PortfolioEntry, PortfolioStanding,
    ReportOutcome, StandingStatus, UndoOutcome, ValidatedResult,
};
pub use models::{
    check_integrity, Bracket, BracketError, BracketSchedule, Entrant, EntrantId, FeedDescriptor,
    GameMatch, GameScore, MatchId, MatchStatus, MatchTemplate, MatchUpdate, Round, RoundTemplate,
    SeedEntry, SeedTable, Slot, SlotSource, TournamentId,
};
pub use store::{ChangeEvent, ChangeFeed, ChangeKind, InMemoryStore, MatchStore};

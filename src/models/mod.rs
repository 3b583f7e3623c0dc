//! Data structures for the bracket: entrants, rounds, matches, schedule.

mod bracket;
mod entrant;
mod game;
mod round;
mod schedule;

pub use bracket::{check_integrity, Bracket, BracketError, TournamentId};
pub use entrant::{display_seed, Entrant, EntrantId, SeedEntry, SeedTable};
pub use game::{FeedDescriptor, GameMatch, GameScore, MatchId, MatchStatus, MatchUpdate, Slot};
pub use round::Round;
pub use schedule::{BracketSchedule, MatchTemplate, RoundTemplate, SlotSource};

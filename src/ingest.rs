//! CSV ingestion of the seed table and portfolio entries.
//!
//! Seeds: `Rank,Name[,Seed,Quadrant]` with a header row; extra columns are ignored because
//! display seed and quadrant are derived from the bracket.
//! Portfolios: `Analyst,"Selections","Tiebreaker","Winner"`, selections `;`-separated, any
//! name optionally prefixed by `<rank>\t`.

use crate::logic::PortfolioEntry;
use crate::models::{BracketError, SeedEntry, SeedTable};
use std::io::Read;
use std::path::Path;

fn read_to_string<R: Read>(mut reader: R) -> Result<String, BracketError> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|e| BracketError::Ingest(e.to_string()))?;
    Ok(raw.trim_start_matches('\u{feff}').to_string())
}

fn csv_reader(raw: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes())
}

fn open(path: &Path) -> Result<std::fs::File, BracketError> {
    std::fs::File::open(path).map_err(|e| BracketError::Ingest(format!("{}: {}", path.display(), e)))
}

/// Drop a leading `<digits>\t`, e.g. "11\tDavid L" -> "David L".
pub fn strip_rank_prefix(s: &str) -> &str {
    let s = s.trim();
    match s.split_once('\t') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) => rest.trim(),
        _ => s,
    }
}

/// Parse a seed table. Blank names become "Player <rank>".
pub fn read_seed_table<R: Read>(reader: R) -> Result<SeedTable, BracketError> {
    let raw = read_to_string(reader)?;
    let mut entries = Vec::new();
    for (i, record) in csv_reader(&raw).records().enumerate() {
        let line = i + 2;
        let record = record.map_err(|e| BracketError::Ingest(format!("line {line}: {e}")))?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let rank_field = record.get(0).unwrap_or_default();
        let rank: u32 = rank_field
            .parse()
            .map_err(|_| BracketError::Ingest(format!("line {line}: rank '{rank_field}' is not a number")))?;
        let name = match record.get(1) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Player {rank}"),
        };
        entries.push(SeedEntry::new(rank, name));
    }
    log::info!("Read {} seeds", entries.len());
    SeedTable::new(entries)
}

pub fn load_seed_table(path: impl AsRef<Path>) -> Result<SeedTable, BracketError> {
    read_seed_table(open(path.as_ref())?)
}

/// Parse portfolio entries. Rows missing columns are kept with empty picks.
pub fn read_portfolios<R: Read>(reader: R) -> Result<Vec<PortfolioEntry>, BracketError> {
    let raw = read_to_string(reader)?;
    let mut entries = Vec::new();
    for (i, record) in csv_reader(&raw).records().enumerate() {
        let line = i + 2;
        let record = record.map_err(|e| BracketError::Ingest(format!("line {line}: {e}")))?;
        let analyst = record.get(0).unwrap_or_default();
        if analyst.is_empty() {
            continue;
        }
        if record.len() < 4 {
            log::warn!("Portfolio line {} ({}) has {} of 4 columns", line, analyst, record.len());
        }
        let selections = record
            .get(1)
            .unwrap_or_default()
            .split(';')
            .map(strip_rank_prefix)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        entries.push(PortfolioEntry {
            analyst: analyst.to_string(),
            selections,
            tiebreaker: strip_rank_prefix(record.get(2).unwrap_or_default()).to_string(),
            predicted_winner: strip_rank_prefix(record.get(3).unwrap_or_default()).to_string(),
        });
    }
    log::info!("Read {} portfolios", entries.len());
    Ok(entries)
}

pub fn load_portfolios(path: impl AsRef<Path>) -> Result<Vec<PortfolioEntry>, BracketError> {
    read_portfolios(open(path.as_ref())?)
}

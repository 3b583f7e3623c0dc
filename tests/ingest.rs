//! Integration tests for CSV ingestion of seeds and portfolios.

use madness_bracket::ingest::{read_portfolios, read_seed_table, strip_rank_prefix};
use madness_bracket::{BracketError, SeedEntry};

#[test]
fn seed_table_reads_ranks_and_names() {
    let csv = "\u{feff}Rank,Name,Seed,Quadrant\n2,Bea,1,2\n1,Al,1,1\n3,,1,3\n";
    let seeds = read_seed_table(csv.as_bytes()).unwrap();
    assert_eq!(
        seeds.entries(),
        &[
            SeedEntry::new(1, "Al"),
            SeedEntry::new(2, "Bea"),
            SeedEntry::new(3, "Player 3"),
        ]
    );
}

#[test]
fn seed_table_skips_blank_rows_and_ignores_missing_columns() {
    let csv = "Rank,Name\n1,Al\n,\n2,Bea\n";
    let seeds = read_seed_table(csv.as_bytes()).unwrap();
    assert_eq!(seeds.len(), 2);
    assert_eq!(seeds.get(2).unwrap().name, "Bea");
}

#[test]
fn seed_table_rejects_a_non_numeric_rank() {
    let err = read_seed_table("Rank,Name\none,Al\n".as_bytes()).unwrap_err();
    assert!(matches!(err, BracketError::Ingest(ref msg) if msg.contains("line 2")), "{err}");
}

#[test]
fn seed_table_rejects_gaps_and_duplicate_names() {
    let gap = read_seed_table("Rank,Name\n1,Al\n3,Cy\n".as_bytes()).unwrap_err();
    assert!(matches!(gap, BracketError::Validation(_)));

    let dup = read_seed_table("Rank,Name\n1,Al\n2,al\n".as_bytes()).unwrap_err();
    assert!(matches!(dup, BracketError::Validation(_)));
}

#[test]
fn portfolios_split_selections_and_strip_rank_prefixes() {
    let csv = "Analyst,Selections,Tiebreaker,Winner\n\
               Dana,\"11\tDavid L; 4\tMia;Ola\",\"7\tTom\",\"1\tAl\"\n\
               Short,\"Ola\"\n\
               ,\"Ignored\",x,y\n";
    let entries = read_portfolios(csv.as_bytes()).unwrap();
    assert_eq!(entries.len(), 2);

    let dana = &entries[0];
    assert_eq!(dana.analyst, "Dana");
    assert_eq!(dana.selections, vec!["David L", "Mia", "Ola"]);
    assert_eq!(dana.tiebreaker, "Tom");
    assert_eq!(dana.predicted_winner, "Al");

    let short = &entries[1];
    assert_eq!(short.selections, vec!["Ola"]);
    assert_eq!((short.tiebreaker.as_str(), short.predicted_winner.as_str()), ("", ""));
}

#[test]
fn rank_prefix_requires_digits_before_the_tab() {
    assert_eq!(strip_rank_prefix("11\tDavid L"), "David L");
    assert_eq!(strip_rank_prefix("  David L "), "David L");
    assert_eq!(strip_rank_prefix("A1\tDavid"), "A1\tDavid");
    assert_eq!(strip_rank_prefix("\tDavid"), "David");
}

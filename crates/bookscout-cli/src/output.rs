//! Console formatting for listings and machine-readable output.

use bookscout::{BookRecord, Catalog, SearchReport};
use serde::Serialize;

/// One listing line: `<index>. <title> - <author> (<source>)`, 1-based.
pub fn listing_line(index: usize, record: &BookRecord) -> String {
    format!(
        "{}. {} - {} ({})",
        index + 1,
        record.title(),
        record.author(),
        record.source()
    )
}

/// Numbered listing of all records.
pub fn format_listing(records: &[BookRecord]) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| listing_line(i, r))
        .collect()
}

/// Summary line for a search, mentioning failed catalogs.
pub fn format_summary(report: &SearchReport) -> String {
    let failed = report.failed_sources();
    if failed.is_empty() {
        format!("Found {} results", report.records.len())
    } else {
        format!(
            "Found {} results ({} unavailable: {})",
            report.records.len(),
            failed.len(),
            failed.join(", ")
        )
    }
}

/// One line per catalog: id, label, base URL.
pub fn format_sources(catalogs: &[Catalog]) -> Vec<String> {
    catalogs
        .iter()
        .map(|c| format!("{:<14} {:<14} {}", c.id().slug(), c.label(), c.base_url()))
        .collect()
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("  Error: could not encode JSON: {e}"),
    }
}

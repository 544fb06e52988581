//! Interactive session: prompt for a term, list results, download a selection.
//!
//! Launch with `bookscout` and no subcommand. Input comes through a
//! [`LineReader`] so the session runs the same over a rustyline editor or
//! a scripted reader.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use bookscout::{
    discover_download_link, download_path, download_to, BookRecord, Download, Scout, ScoutError,
    ScoutResult,
};

use crate::output::{format_listing, format_summary};

/// Shortest search term accepted.
pub const MIN_QUERY_CHARS: usize = 2;

/// Invalid selections tolerated before the session gives up.
pub const MAX_SELECTION_ATTEMPTS: usize = 3;

/// Source of prompted input lines. `None` means end of input.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Terminal input with line editing and history.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Some(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(e) => {
                debug!(error = %e, "readline failed");
                None
            }
        }
    }
}

/// Input from any buffered reader, one line per prompt.
pub struct ScriptedReader<R> {
    input: R,
}

impl<R: BufRead> ScriptedReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineReader for ScriptedReader<R> {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user stopped before a download was attempted.
    Cancelled,
    NoResults,
    Downloaded(Download),
    /// The download was attempted and failed.
    Failed(String),
}

/// Parse a 1-based selection against `count` results into a 0-based index.
pub fn parse_selection(input: &str, count: usize) -> ScoutResult<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(ScoutError::InvalidSelection {
            input: trimmed.to_string(),
            count,
        }),
    }
}

/// Run one search-and-download session.
pub async fn run_session<L, W>(
    scout: &Scout,
    reader: &mut L,
    out: &mut W,
    download_dir: &Path,
    follow_links: bool,
) -> Result<SessionOutcome>
where
    L: LineReader,
    W: Write,
{
    let Some(query) = prompt_query(reader, out)? else {
        return Ok(SessionOutcome::Cancelled);
    };

    let report = scout.search(&query).await;
    writeln!(out, "{}", format_summary(&report))?;
    for line in format_listing(&report.records) {
        writeln!(out, "{line}")?;
    }

    if report.records.is_empty() {
        return Ok(SessionOutcome::NoResults);
    }

    let Some(index) = prompt_selection(reader, out, report.records.len())? else {
        return Ok(SessionOutcome::Cancelled);
    };
    let record = &report.records[index];

    let url = match resolve_url(scout, record, follow_links).await {
        Ok(url) => url,
        Err(e) => {
            writeln!(out, "Download failed: {e}")?;
            return Ok(SessionOutcome::Failed(e.to_string()));
        }
    };

    let dest = download_path(download_dir, record.title());
    writeln!(out, "Downloading: {}", record.title())?;

    match download_to(scout.client(), &url, &dest).await {
        Ok(download) => {
            writeln!(out, "Downloaded: {}", download.path.display())?;
            Ok(SessionOutcome::Downloaded(download))
        }
        Err(e) => {
            writeln!(out, "Download failed: {e}")?;
            Ok(SessionOutcome::Failed(e.to_string()))
        }
    }
}

fn prompt_query<L: LineReader, W: Write>(reader: &mut L, out: &mut W) -> Result<Option<String>> {
    loop {
        let Some(line) = reader.read_line("Search term: ") else {
            return Ok(None);
        };
        let query = line.trim();
        if query.chars().count() >= MIN_QUERY_CHARS {
            return Ok(Some(query.to_string()));
        }
        writeln!(
            out,
            "Search term must be at least {MIN_QUERY_CHARS} characters"
        )?;
    }
}

fn prompt_selection<L: LineReader, W: Write>(
    reader: &mut L,
    out: &mut W,
    count: usize,
) -> Result<Option<usize>> {
    for _ in 0..MAX_SELECTION_ATTEMPTS {
        let Some(line) = reader.read_line("Book number to download (empty to quit): ") else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            return Ok(None);
        }
        match parse_selection(&line, count) {
            Ok(index) => return Ok(Some(index)),
            Err(e) => writeln!(out, "{e}")?,
        }
    }

    bail!("no valid selection after {MAX_SELECTION_ATTEMPTS} attempts")
}

/// The URL to download for a record, optionally following its page to a file link.
async fn resolve_url(scout: &Scout, record: &BookRecord, follow_links: bool) -> ScoutResult<String> {
    let page_url = record
        .url()
        .ok_or_else(|| ScoutError::MissingUrl(record.title().to_string()))?;

    if !follow_links {
        return Ok(page_url.to_string());
    }

    match discover_download_link(scout.client(), page_url).await? {
        Some(link) => Ok(link),
        None => {
            debug!(%page_url, "no file link found; using record URL");
            Ok(page_url.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection_bounds() {
        assert_eq!(parse_selection("1", 2).unwrap(), 0);
        assert_eq!(parse_selection(" 2 \n", 2).unwrap(), 1);
        assert!(parse_selection("0", 2).is_err());
        assert!(parse_selection("3", 2).is_err());
        assert!(parse_selection("-1", 2).is_err());
        assert!(parse_selection("two", 2).is_err());
    }

    #[test]
    fn test_selection_error_message() {
        let err = parse_selection("9", 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid selection '9': expected a number between 1 and 2"
        );
    }

    #[test]
    fn test_scripted_reader_strips_newlines() {
        let mut reader = ScriptedReader::new("history\r\n2\n".as_bytes());
        assert_eq!(reader.read_line("> ").as_deref(), Some("history"));
        assert_eq!(reader.read_line("> ").as_deref(), Some("2"));
        assert_eq!(reader.read_line("> "), None);
    }

    #[test]
    fn test_short_query_is_reprompted() {
        let mut reader = ScriptedReader::new("a\n  \nok\n".as_bytes());
        let mut out = Vec::new();
        let query = prompt_query(&mut reader, &mut out).unwrap();
        assert_eq!(query.as_deref(), Some("ok"));

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("at least 2 characters").count(), 2);
    }

    #[test]
    fn test_selection_gives_up_after_attempts() {
        let mut reader = ScriptedReader::new("7\nx\n0\n1\n".as_bytes());
        let mut out = Vec::new();
        assert!(prompt_selection(&mut reader, &mut out, 2).is_err());
    }
}

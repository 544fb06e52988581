//! Subcommand implementations for the `bookscout` binary.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use bookscout::{download_path, download_to, Catalog, CatalogId, HttpClient};

use crate::config::ScoutConfig;
use crate::interactive::{self, EditorReader, SessionOutcome};
use crate::output::{format_listing, format_sources, format_summary, print_json};

/// `bookscout search <query>`: list results from every selected catalog.
pub async fn run_search(config: &ScoutConfig, query: &str, json: bool) -> Result<()> {
    let query = query.trim();
    if query.chars().count() < interactive::MIN_QUERY_CHARS {
        bail!(
            "search term must be at least {} characters",
            interactive::MIN_QUERY_CHARS
        );
    }

    let scout = config.build_scout()?;
    let report = scout.search(query).await;

    if json {
        print_json(&report);
        return Ok(());
    }

    println!("{}", format_summary(&report));
    for line in format_listing(&report.records) {
        println!("{line}");
    }
    Ok(())
}

/// `bookscout download <url>`: stream one file to disk.
///
/// The destination is `output` when given, otherwise `<download-dir>/<title>.pdf`.
pub async fn run_download(
    config: &ScoutConfig,
    url: &str,
    title: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let dest: PathBuf = match (output, title) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(title)) => {
            ensure_dir(&config.download_dir)?;
            download_path(&config.download_dir, title)
        }
        (None, None) => bail!("either --title or --output is required"),
    };

    let client = HttpClient::new(config.client.clone())?;
    let download = download_to(&client, url, &dest)
        .await
        .with_context(|| format!("downloading {url}"))?;

    println!(
        "Downloaded: {} ({} bytes)",
        download.path.display(),
        download.bytes
    );
    Ok(())
}

/// `bookscout sources`: list the known catalogs.
pub fn run_sources(json: bool) -> Result<()> {
    let catalogs: Vec<Catalog> = CatalogId::ALL.into_iter().map(Catalog::for_id).collect();

    if json {
        let entries: Vec<serde_json::Value> = catalogs
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id().slug(),
                    "label": c.label(),
                    "base_url": c.base_url().as_str(),
                    "default": CatalogId::DEFAULTS.contains(&c.id()),
                })
            })
            .collect();
        print_json(&entries);
        return Ok(());
    }

    for line in format_sources(&catalogs) {
        println!("{line}");
    }
    Ok(())
}

/// No subcommand: run the interactive session on the terminal.
pub async fn run_interactive(config: &ScoutConfig) -> Result<()> {
    ensure_dir(&config.download_dir)?;

    let scout = config.build_scout()?;
    let mut reader = EditorReader::new()?;
    let mut stdout = std::io::stdout();

    let outcome = interactive::run_session(
        &scout,
        &mut reader,
        &mut stdout,
        &config.download_dir,
        config.follow_links,
    )
    .await?;
    stdout.flush()?;

    info!(?outcome, "session finished");
    match outcome {
        SessionOutcome::Failed(reason) => bail!("download failed: {reason}"),
        _ => Ok(()),
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating download directory {}", dir.display()))
}

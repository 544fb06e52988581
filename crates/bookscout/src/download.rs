//! Streamed file downloads.
//!
//! The body is written through a fixed-size buffer as it arrives. A failed
//! transfer removes whatever it had written, so a file at the destination
//! always holds a complete download.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use scraper::Html;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::parse_selector;
use crate::http_client::HttpClient;
use crate::types::{ScoutError, ScoutResult};

/// Write granularity for downloads.
pub const CHUNK_SIZE: usize = 8192;

/// Extension given to downloaded files.
const FILE_EXTENSION: &str = "pdf";

/// Link text that marks a download anchor on a book page.
const DOWNLOAD_WORDS: &[&str] = &["download", "تحميل"];

/// File extensions that mark a direct document link.
const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".epub", ".txt"];

/// A completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Replace characters that would split a title into path components.
pub fn sanitize_filename(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// Destination for a title inside `dir`: `<dir>/<sanitized-title>.pdf`.
pub fn download_path(dir: &Path, title: &str) -> PathBuf {
    dir.join(format!("{}.{FILE_EXTENSION}", sanitize_filename(title)))
}

/// Stream `url` into `dest`.
///
/// Only a `200 OK` response is written. The destination's parent directory
/// must already exist.
pub async fn download_to(client: &HttpClient, url: &str, dest: &Path) -> ScoutResult<Download> {
    let response = client.fetch_stream(url).await?;

    let status = response.status();
    if status != StatusCode::OK {
        warn!(%url, status = status.as_u16(), "download refused");
        return Err(ScoutError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let file = tokio::fs::File::create(dest).await?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

    let idle = client.config().download_timeout;
    match copy_body(response, &mut writer, idle).await {
        Ok(bytes) => {
            info!(%url, path = %dest.display(), bytes, "download complete");
            Ok(Download {
                path: dest.to_path_buf(),
                bytes,
            })
        }
        Err(e) => {
            drop(writer);
            if let Err(rm) = tokio::fs::remove_file(dest).await {
                warn!(path = %dest.display(), error = %rm, "could not remove partial download");
            }
            warn!(%url, error = %e, "download failed");
            Err(e)
        }
    }
}

/// Copy the body to `writer`, failing if no data arrives for `idle`.
async fn copy_body(
    mut response: reqwest::Response,
    writer: &mut BufWriter<tokio::fs::File>,
    idle: Duration,
) -> ScoutResult<u64> {
    let url = response.url().to_string();
    let mut total = 0u64;

    loop {
        let next = tokio::time::timeout(idle, response.chunk())
            .await
            .map_err(|_| ScoutError::Timeout {
                url: url.clone(),
                after: idle,
            })??;
        let Some(chunk) = next else {
            break;
        };
        for piece in chunk.chunks(CHUNK_SIZE) {
            writer.write_all(piece).await?;
        }
        total += chunk.len() as u64;
    }

    writer.flush().await?;
    writer.get_mut().sync_all().await?;
    Ok(total)
}

/// Find a direct file link on a book detail page.
///
/// Returns the first anchor whose text mentions a download or whose target
/// looks like a document, resolved against the page's final URL.
pub async fn discover_download_link(
    client: &HttpClient,
    page_url: &str,
) -> ScoutResult<Option<String>> {
    let page = client.fetch_page(page_url).await?;
    let base = Url::parse(&page.final_url)?;
    let link = find_download_link(&page.body, &base)?;

    debug!(%page_url, found = link.is_some(), "download link discovery");
    Ok(link)
}

fn find_download_link(html: &str, base: &Url) -> ScoutResult<Option<String>> {
    let anchors = parse_selector("a[href]")?;
    let document = Html::parse_document(html);

    let link = document.select(&anchors).find_map(|a| {
        let href = a.value().attr("href")?.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let text = a.text().collect::<String>().to_lowercase();
        let target = href.to_lowercase();
        let target_path = target.split(['?', '#']).next().unwrap_or_default();

        let is_download = DOWNLOAD_WORDS.iter().any(|w| text.contains(w))
            || DOCUMENT_EXTENSIONS.iter().any(|ext| target_path.ends_with(ext));

        if is_download {
            base.join(href).ok().map(String::from)
        } else {
            None
        }
    });

    Ok(link)
}

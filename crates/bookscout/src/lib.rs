//! bookscout: search public book catalogs, normalize listings, and download a chosen file.

pub mod catalog;
pub mod download;
pub mod http_client;
pub mod search;
pub mod types;

pub use catalog::{Catalog, CatalogId, RESULT_LIMIT};
pub use download::{
    discover_download_link, download_path, download_to, sanitize_filename, Download, CHUNK_SIZE,
};
pub use http_client::{ClientConfig, HttpClient, HttpResponse};
pub use search::{Scout, SearchReport, SourceOutcome, DEFAULT_SOURCE_DELAY};
pub use types::*;

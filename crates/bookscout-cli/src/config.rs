//! Configuration loading and resolution.

use std::path::PathBuf;
use std::time::Duration;

use bookscout::{Catalog, CatalogId, ClientConfig, HttpClient, Scout, ScoutResult};

/// Environment variable naming the download directory.
pub const DOWNLOAD_DIR_ENV: &str = "BOOKSCOUT_DOWNLOAD_DIR";

/// Download directory used when nothing else is configured.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub download_dir: PathBuf,
    /// Pause between catalog queries.
    pub delay: Duration,
    /// Catalogs to query, in order.
    pub catalogs: Vec<CatalogId>,
    /// Resolve book pages to direct file links before downloading.
    pub follow_links: bool,
    pub client: ClientConfig,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            delay: bookscout::DEFAULT_SOURCE_DELAY,
            catalogs: CatalogId::DEFAULTS.to_vec(),
            follow_links: false,
            client: ClientConfig::default(),
        }
    }
}

impl ScoutConfig {
    /// Build the orchestrator for the selected catalogs.
    pub fn build_scout(&self) -> ScoutResult<Scout> {
        let client = HttpClient::new(self.client.clone())?;
        let catalogs = self.catalogs.iter().copied().map(Catalog::for_id).collect();
        Ok(Scout::new(client, catalogs).with_delay(self.delay))
    }
}

/// Resolve the download directory: explicit flag, then environment, then default.
pub fn resolve_download_dir(explicit: Option<&str>) -> PathBuf {
    resolve_download_dir_from(explicit, std::env::var(DOWNLOAD_DIR_ENV).ok())
}

fn resolve_download_dir_from(explicit: Option<&str>, env_value: Option<String>) -> PathBuf {
    if let Some(dir) = explicit {
        return PathBuf::from(dir);
    }

    if let Some(dir) = env_value.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

/// Catalog selection: explicit ids in the order given, otherwise the defaults.
pub fn resolve_catalogs(selected: &[CatalogId]) -> Vec<CatalogId> {
    if selected.is_empty() {
        return CatalogId::DEFAULTS.to_vec();
    }

    let mut catalogs = Vec::with_capacity(selected.len());
    for id in selected {
        if !catalogs.contains(id) {
            catalogs.push(*id);
        }
    }
    catalogs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = resolve_download_dir_from(Some("/tmp/books"), Some("/env/books".into()));
        assert_eq!(dir, PathBuf::from("/tmp/books"));
    }

    #[test]
    fn test_env_dir_used_when_no_flag() {
        let dir = resolve_download_dir_from(None, Some("/env/books".into()));
        assert_eq!(dir, PathBuf::from("/env/books"));
    }

    #[test]
    fn test_default_dir() {
        assert_eq!(
            resolve_download_dir_from(None, None),
            PathBuf::from(DEFAULT_DOWNLOAD_DIR)
        );
        assert_eq!(
            resolve_download_dir_from(None, Some("  ".into())),
            PathBuf::from(DEFAULT_DOWNLOAD_DIR)
        );
    }

    #[test]
    fn test_catalog_selection() {
        assert_eq!(resolve_catalogs(&[]), CatalogId::DEFAULTS.to_vec());
        assert_eq!(
            resolve_catalogs(&[
                CatalogId::MillionBooks,
                CatalogId::NoorBook,
                CatalogId::MillionBooks
            ]),
            vec![CatalogId::MillionBooks, CatalogId::NoorBook]
        );
    }

    #[test]
    fn test_build_scout_uses_selection() {
        let config = ScoutConfig {
            catalogs: vec![CatalogId::ArabBooks],
            delay: Duration::ZERO,
            ..ScoutConfig::default()
        };
        let scout = config.build_scout().unwrap();
        assert_eq!(scout.catalogs().len(), 1);
        assert_eq!(scout.catalogs()[0].id(), CatalogId::ArabBooks);
    }
}

//! Orchestrator: run every configured catalog for one query and merge results.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::http_client::HttpClient;
use crate::types::BookRecord;

/// Pause between consecutive catalog queries.
pub const DEFAULT_SOURCE_DELAY: Duration = Duration::from_secs(1);

/// What one catalog contributed to a search.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub found: usize,
    /// Failure reason when the catalog contributed nothing because of an error.
    pub error: Option<String>,
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Merged results of one search across all catalogs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchReport {
    /// Records in catalog order, then document order within each catalog.
    pub records: Vec<BookRecord>,
    pub outcomes: Vec<SourceOutcome>,
}

impl SearchReport {
    /// Labels of catalogs whose query failed.
    pub fn failed_sources(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| o.source.as_str())
            .collect()
    }
}

/// Runs a fixed list of catalogs sequentially against one shared client.
#[derive(Debug, Clone)]
pub struct Scout {
    client: HttpClient,
    catalogs: Vec<Catalog>,
    delay: Duration,
}

impl Scout {
    pub fn new(client: HttpClient, catalogs: Vec<Catalog>) -> Self {
        Self {
            client,
            catalogs,
            delay: DEFAULT_SOURCE_DELAY,
        }
    }

    /// Override the pause between catalog queries.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn catalogs(&self) -> &[Catalog] {
        &self.catalogs
    }

    /// Query every catalog in order and concatenate the results.
    ///
    /// A failing catalog is logged and contributes no records; it never
    /// discards what other catalogs returned.
    pub async fn search(&self, query: &str) -> SearchReport {
        let mut report = SearchReport::default();

        for (i, catalog) in self.catalogs.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let outcome = match catalog.search(&self.client, query).await {
                Ok(records) => {
                    let found = records.len();
                    report.records.extend(records);
                    SourceOutcome {
                        source: catalog.label().to_string(),
                        found,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(source = catalog.label(), error = %e, "catalog search failed");
                    SourceOutcome {
                        source: catalog.label().to_string(),
                        found: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            %query,
            total = report.records.len(),
            failed = report.failed_sources().len(),
            "search finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::ClientConfig;

    #[tokio::test]
    async fn test_no_catalogs_yields_empty_report() {
        let client = HttpClient::new(ClientConfig::default()).unwrap();
        let scout = Scout::new(client, Vec::new());
        let report = scout.search("anything").await;
        assert!(report.records.is_empty());
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_failed_sources_lists_only_errors() {
        let report = SearchReport {
            records: Vec::new(),
            outcomes: vec![
                SourceOutcome {
                    source: "Noor Book".into(),
                    found: 3,
                    error: None,
                },
                SourceOutcome {
                    source: "Kutub PDF".into(),
                    found: 0,
                    error: Some("HTTP error: timed out".into()),
                },
            ],
        };
        assert_eq!(report.failed_sources(), vec!["Kutub PDF"]);
    }
}

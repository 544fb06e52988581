//! Catalog adapters: one fixed selector map per book-catalog site.
//!
//! Each [`Catalog`] turns a free-text query into a search URL, fetches it
//! once, and extracts up to [`RESULT_LIMIT`] [`BookRecord`]s from the
//! returned HTML using the `scraper` crate's CSS selectors.

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::http_client::HttpClient;
use crate::types::{BookRecord, ScoutError, ScoutResult};

/// Maximum number of records a single catalog returns per query.
pub const RESULT_LIMIT: usize = 10;

/// The closed set of supported catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogId {
    NoorBook,
    KutubPdf,
    ArabBooks,
    MillionBooks,
}

impl CatalogId {
    /// Every known catalog.
    pub const ALL: [CatalogId; 4] = [
        CatalogId::NoorBook,
        CatalogId::KutubPdf,
        CatalogId::ArabBooks,
        CatalogId::MillionBooks,
    ];

    /// Catalogs queried when none are selected explicitly, in query order.
    pub const DEFAULTS: [CatalogId; 2] = [CatalogId::NoorBook, CatalogId::KutubPdf];

    /// Short identifier used on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            CatalogId::NoorBook => "noor-book",
            CatalogId::KutubPdf => "kutub-pdf",
            CatalogId::ArabBooks => "arab-books",
            CatalogId::MillionBooks => "million-books",
        }
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for CatalogId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogId::ALL
            .into_iter()
            .find(|id| id.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = CatalogId::ALL.iter().map(|id| id.slug()).collect();
                format!("unknown catalog '{s}' (known: {})", known.join(", "))
            })
    }
}

/// Where the encoded query goes in a catalog's search URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPlacement {
    /// Appended as the last path segment after the given prefix segments.
    PathSegment { prefix: &'static [&'static str] },
    /// Sent as a query-string parameter on the given path.
    QueryParam {
        path: &'static str,
        name: &'static str,
    },
}

/// CSS selectors describing one catalog's result markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selectors {
    pub item: &'static str,
    pub title: &'static str,
    pub author: &'static str,
    pub link: &'static str,
    pub cover: &'static str,
    pub description: Option<&'static str>,
}

/// A catalog site bound to a base URL.
#[derive(Debug, Clone)]
pub struct Catalog {
    id: CatalogId,
    label: &'static str,
    base_url: Url,
    placement: QueryPlacement,
    selectors: Selectors,
}

impl Catalog {
    /// The built-in definition for a catalog.
    pub fn for_id(id: CatalogId) -> Self {
        let (label, base, placement, selectors) = match id {
            CatalogId::NoorBook => (
                "Noor Book",
                "https://www.noor-book.com",
                QueryPlacement::PathSegment {
                    prefix: &["بحث", "كتاب"],
                },
                Selectors {
                    item: ".book",
                    title: ".book-title a",
                    author: ".book-author",
                    link: "a",
                    cover: "img",
                    description: Some(".book-desc"),
                },
            ),
            CatalogId::KutubPdf => (
                "Kutub PDF",
                "https://www.kutub-pdf.net",
                QueryPlacement::QueryParam {
                    path: "/search",
                    name: "q",
                },
                Selectors {
                    item: ".book-item",
                    title: ".book-title",
                    author: ".book-author",
                    link: "a",
                    cover: "img",
                    description: Some(".book-description"),
                },
            ),
            CatalogId::ArabBooks => (
                "Arab Books",
                "https://www.arab-books.com",
                QueryPlacement::PathSegment { prefix: &["search"] },
                Selectors {
                    item: ".book",
                    title: ".title",
                    author: ".author",
                    link: "a",
                    cover: "img",
                    description: Some(".desc"),
                },
            ),
            CatalogId::MillionBooks => (
                "Million Books",
                "https://www.million-books.com",
                QueryPlacement::QueryParam {
                    path: "/search.php",
                    name: "q",
                },
                Selectors {
                    item: ".book",
                    title: "h3",
                    author: ".author",
                    link: "a",
                    cover: "img",
                    description: Some(".description"),
                },
            ),
        };

        Self {
            id,
            label,
            base_url: Url::parse(base).expect("built-in catalog base URLs are valid"),
            placement,
            selectors,
        }
    }

    /// The default catalogs in query order.
    pub fn defaults() -> Vec<Catalog> {
        CatalogId::DEFAULTS.into_iter().map(Catalog::for_id).collect()
    }

    /// Rebind this catalog to another base URL, keeping its markup rules.
    ///
    /// A path on the new base is kept as a prefix of the search path.
    pub fn with_base_url(mut self, base: &str) -> ScoutResult<Self> {
        self.base_url = Url::parse(base)?;
        Ok(self)
    }

    pub fn id(&self) -> CatalogId {
        self.id
    }

    /// Label stamped on every record this catalog produces.
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    /// Build the search URL for a query, percent-encoding the term.
    pub fn search_url(&self, query: &str) -> ScoutResult<Url> {
        let mut url = self.base_url.clone();

        match self.placement {
            QueryPlacement::PathSegment { prefix } => {
                url.path_segments_mut()
                    .map_err(|_| {
                        ScoutError::InvalidUrl(format!("{} cannot carry a path", self.base_url))
                    })?
                    .pop_if_empty()
                    .extend(prefix)
                    .push(query);
            }
            QueryPlacement::QueryParam { path, name } => {
                let joined = format!("{}{path}", url.path().trim_end_matches('/'));
                url.set_path(&joined);
                url.query_pairs_mut().clear().append_pair(name, query);
            }
        }

        Ok(url)
    }

    /// Query this catalog and return its normalized results.
    pub async fn search(&self, client: &HttpClient, query: &str) -> ScoutResult<Vec<BookRecord>> {
        let url = self.search_url(query)?;
        let page = client.fetch_page(url.as_str()).await?;
        let records = self.parse_results(&page.body)?;

        info!(source = self.label, count = records.len(), "catalog search finished");
        Ok(records)
    }

    /// Extract records from a search results page.
    ///
    /// Items without a title are skipped; at most [`RESULT_LIMIT`] records
    /// are returned, in document order.
    pub fn parse_results(&self, html: &str) -> ScoutResult<Vec<BookRecord>> {
        let item_sel = parse_selector(self.selectors.item)?;
        let title_sel = parse_selector(self.selectors.title)?;
        let author_sel = parse_selector(self.selectors.author)?;
        let link_sel = parse_selector(self.selectors.link)?;
        let cover_sel = parse_selector(self.selectors.cover)?;
        let desc_sel = self.selectors.description.map(parse_selector).transpose()?;

        let document = Html::parse_document(html);
        let mut skipped = 0usize;

        let records: Vec<BookRecord> = document
            .select(&item_sel)
            .filter_map(|item| {
                let record = self.extract_record(
                    item,
                    &title_sel,
                    &author_sel,
                    &link_sel,
                    &cover_sel,
                    desc_sel.as_ref(),
                );
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .take(RESULT_LIMIT)
            .collect();

        debug!(
            source = self.label,
            kept = records.len(),
            skipped,
            "parsed result items"
        );
        Ok(records)
    }

    fn extract_record(
        &self,
        item: ElementRef<'_>,
        title_sel: &Selector,
        author_sel: &Selector,
        link_sel: &Selector,
        cover_sel: &Selector,
        desc_sel: Option<&Selector>,
    ) -> Option<BookRecord> {
        let title = first_text(item, title_sel)?;
        let author = first_text(item, author_sel);
        let url = first_attr(item, link_sel, "href").and_then(|href| self.resolve(&href));
        let cover = first_attr(item, cover_sel, "src").and_then(|src| self.resolve(&src));
        let description = desc_sel.and_then(|sel| first_text(item, sel));

        BookRecord::new(&title, author.as_deref(), url, cover, self.label)
            .map(|r| r.with_description(description.as_deref()))
    }

    /// Resolve a possibly-relative reference against the base URL.
    fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        self.base_url.join(reference).ok().map(String::from)
    }
}

pub(crate) fn parse_selector(css: &str) -> ScoutResult<Selector> {
    Selector::parse(css).map_err(|e| ScoutError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn first_text(item: ElementRef<'_>, sel: &Selector) -> Option<String> {
    item.select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn first_attr(item: ElementRef<'_>, sel: &Selector, attr: &str) -> Option<String> {
    item.select(sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

//! Index constituent lists scraped from reference pages.
//!
//! Each supported index maps to one entry in a static registry: the page URL,
//! the position of the constituent table on that page, and the header names of
//! the symbol and company columns. Positional table lookup is brittle, so the
//! scraping lives behind the `ConstituentSource` trait and the page download
//! behind `PageFetcher`.

use super::provider::DataError;
use crate::config::FetchConfig;
use crate::domain::Instrument;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// A supported market index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexName {
    Cac40,
    Sp500,
    Ftse100,
}

impl IndexName {
    pub const ALL: [IndexName; 3] = [IndexName::Cac40, IndexName::Sp500, IndexName::Ftse100];

    /// Registry key, e.g. `"SP500"`.
    pub fn key(&self) -> &'static str {
        self.spec().key
    }

    /// Registry entry for this index.
    pub fn spec(&self) -> &'static IndexSpec {
        match self {
            IndexName::Cac40 => &INDEX_REGISTRY[0],
            IndexName::Sp500 => &INDEX_REGISTRY[1],
            IndexName::Ftse100 => &INDEX_REGISTRY[2],
        }
    }

    /// The constituent source for this index.
    pub fn source(&self) -> WikipediaTable {
        WikipediaTable::new(self.spec())
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for IndexName {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        INDEX_REGISTRY
            .iter()
            .find(|spec| spec.key.eq_ignore_ascii_case(s.trim()))
            .map(|spec| spec.index)
            .ok_or_else(|| DataError::UnknownIndex { name: s.to_string() })
    }
}

/// Where and how to find an index's constituents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub index: IndexName,
    pub key: &'static str,
    pub url: &'static str,
    /// Zero-based position of the constituent `<table>` on the page.
    pub table_position: usize,
    pub symbol_column: &'static str,
    pub name_column: &'static str,
    /// Market suffix appended to every raw ticker to match the pricing source.
    pub symbol_suffix: Option<&'static str>,
}

impl IndexSpec {
    fn map_symbol(&self, raw: &str) -> String {
        match self.symbol_suffix {
            Some(suffix) => format!("{raw}{suffix}"),
            None => raw.to_string(),
        }
    }
}

/// Read-only registry of supported indices.
pub static INDEX_REGISTRY: [IndexSpec; 3] = [
    IndexSpec {
        index: IndexName::Cac40,
        key: "CAC40",
        url: "https://en.wikipedia.org/wiki/CAC_40",
        table_position: 3,
        symbol_column: "Ticker",
        name_column: "Company",
        symbol_suffix: None,
    },
    IndexSpec {
        index: IndexName::Sp500,
        key: "SP500",
        url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies",
        table_position: 0,
        symbol_column: "Symbol",
        name_column: "Security",
        symbol_suffix: None,
    },
    IndexSpec {
        index: IndexName::Ftse100,
        key: "FTSE100",
        url: "https://en.wikipedia.org/wiki/FTSE_100_Index",
        table_position: 3,
        symbol_column: "EPIC",
        name_column: "Company",
        symbol_suffix: Some(".L"),
    },
];

/// Parallel symbol and display-name lists, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constituents {
    pub symbols: Vec<String>,
    pub names: Vec<String>,
}

impl Constituents {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn instruments(&self) -> Vec<Instrument> {
        self.symbols
            .iter()
            .zip(&self.names)
            .map(|(s, n)| Instrument::new(s.clone(), n.clone()))
            .collect()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.symbols, self.names)
    }
}

/// Downloads a page body. Errors are human-readable reasons.
pub trait PageFetcher {
    fn fetch_page(&self, url: &str) -> Result<String, String>;
}

/// Blocking HTTP page fetcher.
pub struct HttpPageFetcher {
    client: reqwest::blocking::Client,
}

impl HttpPageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, DataError> {
        let client = config
            .http_client()
            .map_err(|e| DataError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch_page(&self, url: &str) -> Result<String, String> {
        debug!(%url, "requesting reference page");
        let resp = self.client.get(url).send().map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status} for {url}"));
        }
        resp.text().map_err(|e| e.to_string())
    }
}

/// A named capability that lists an index's constituents.
pub trait ConstituentSource {
    fn index(&self) -> IndexName;

    fn list(&self, pages: &dyn PageFetcher) -> Result<Constituents, DataError>;
}

/// Constituents read from the Nth table of a Wikipedia article.
#[derive(Debug, Clone)]
pub struct WikipediaTable {
    spec: &'static IndexSpec,
}

impl WikipediaTable {
    pub fn new(spec: &'static IndexSpec) -> Self {
        Self { spec }
    }

    fn unavailable(&self, reason: impl Into<String>) -> DataError {
        DataError::SourceUnavailable {
            index: self.spec.key.to_string(),
            reason: reason.into(),
        }
    }

    /// Extract constituents from an already-downloaded page.
    pub fn parse(&self, html: &str) -> Result<Constituents, DataError> {
        let table = parse_table(html, self.spec.table_position)
            .map_err(|reason| self.unavailable(reason))?;

        let column = |name: &str| {
            table
                .header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| {
                    self.unavailable(format!(
                        "table {} has no '{name}' column (found: {})",
                        self.spec.table_position,
                        table.header.join(", ")
                    ))
                })
        };
        let symbol_idx = column(self.spec.symbol_column)?;
        let name_idx = column(self.spec.name_column)?;

        let mut out = Constituents::default();
        for row in &table.rows {
            let (Some(symbol), Some(name)) = (row.get(symbol_idx), row.get(name_idx)) else {
                continue;
            };
            if symbol.is_empty() {
                continue;
            }
            out.symbols.push(self.spec.map_symbol(symbol));
            out.names.push(name.clone());
        }

        if out.is_empty() {
            return Err(self.unavailable(format!(
                "table {} has no constituent rows",
                self.spec.table_position
            )));
        }

        Ok(out)
    }
}

impl ConstituentSource for WikipediaTable {
    fn index(&self) -> IndexName {
        self.spec.index
    }

    fn list(&self, pages: &dyn PageFetcher) -> Result<Constituents, DataError> {
        let html = pages
            .fetch_page(self.spec.url)
            .map_err(|reason| self.unavailable(reason))?;
        let constituents = self.parse(&html)?;
        info!(index = %self.index(), count = constituents.len(), "listed constituents");
        Ok(constituents)
    }
}

/// Header and body cell text of one HTML table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse the table at `position` (document order) into header and rows.
///
/// The header is the first row made only of `<th>` cells; every later row
/// with at least one cell is a body row.
pub fn parse_table(html: &str, position: usize) -> Result<HtmlTable, String> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td, th")?;

    let table = document
        .select(&table_sel)
        .nth(position)
        .ok_or_else(|| format!("page has no table at position {position}"))?;

    let mut out = HtmlTable::default();
    let mut header_found = false;

    for row in table.select(&row_sel) {
        let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
        if cells.is_empty() {
            continue;
        }
        let texts: Vec<String> = cells.iter().map(|c| cell_text(*c)).collect();

        if !header_found {
            if cells.iter().all(|c| c.value().name() == "th") {
                out.header = texts;
                header_found = true;
            }
            continue;
        }
        out.rows.push(texts);
    }

    if !header_found {
        return Err(format!("table at position {position} has no header row"));
    }

    Ok(out)
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector '{css}': {e:?}"))
}

/// Whitespace-normalized text content with footnote markers (`[1]`, `[a]`) removed.
fn cell_text(cell: ElementRef) -> String {
    let raw: String = cell.text().collect();
    let mut text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    while let Some(start) = text.rfind('[') {
        if !text.ends_with(']') {
            break;
        }
        text.truncate(start);
        text = text.trim_end().to_string();
    }
    text
}

/// List an index's constituents using the given page fetcher.
///
/// The index name is validated before any page is requested.
pub fn list_constituents_with(
    index_name: &str,
    pages: &dyn PageFetcher,
) -> Result<(Vec<String>, Vec<String>), DataError> {
    let index: IndexName = index_name.parse()?;
    Ok(index.source().list(pages)?.into_parts())
}

/// List an index's constituents over HTTP with default settings.
pub fn list_constituents(index_name: &str) -> Result<(Vec<String>, Vec<String>), DataError> {
    let index: IndexName = index_name.parse()?;
    let pages = HttpPageFetcher::new(&FetchConfig::default())?;
    Ok(index.source().list(&pages)?.into_parts())
}

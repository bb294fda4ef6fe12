//! Ticker reference table: ids, display names and market type.
//!
//! The table is loaded on first use and kept by a [`TickerCatalog`] that the
//! caller owns and can invalidate. There is no process-wide cache.

use crate::error::ReportError;

/// Market types a report can be generated for.
pub const SELECTABLE_MARKETS: [&str; 3] = ["上市", "上櫃", "興櫃"];

/// Maps the provider's market code to its display label.
///
/// Unknown codes are shown as they are.
pub fn market_label(code: &str) -> &str {
    match code {
        "twse" => "上市",
        "otc" => "上櫃",
        "rotc" => "興櫃",
        "ETF" => "ETF",
        other => other,
    }
}

#[derive(Debug, serde::Deserialize)]
struct TickerRecord {
    stock_id: String,
    stock_name: String,
    #[serde(rename = "type")]
    market: String,
    #[serde(default)]
    date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TickerInfo {
    pub id: String,
    pub name: String,
    /// Display label, e.g. `上市`.
    pub market: String,
    /// Listing date as given by the provider.
    pub listed: String,
}

/// Selectable tickers keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TickerTable {
    entries: std::collections::BTreeMap<String, TickerInfo>,
}

impl TickerTable {
    /// Reads a ticker list, keeping only selectable markets.
    ///
    /// The provider repeats ids across listing updates; the first row for an
    /// id wins.
    pub fn from_reader<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Self, ReportError> {
        let mut entries = std::collections::BTreeMap::new();

        for result in reader.deserialize::<TickerRecord>() {
            let record = result?;
            let market = market_label(record.market.trim());
            if !SELECTABLE_MARKETS.contains(&market) {
                continue;
            }
            let id = record.stock_id.trim().to_string();
            entries.entry(id.clone()).or_insert_with(|| TickerInfo {
                id,
                name: record.stock_name.trim().to_string(),
                market: market.to_string(),
                listed: record.date,
            });
        }

        Ok(TickerTable { entries })
    }

    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ReportError> {
        let file = std::fs::File::open(path.as_ref())?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
        let table = Self::from_reader(&mut reader)?;
        tracing::info!(path = %path.as_ref().display(), tickers = table.len(), "loaded ticker table");
        Ok(table)
    }

    pub fn get(&self, id: &str) -> Option<&TickerInfo> {
        self.entries.get(id)
    }

    /// Name shown in report titles, if the ticker is selectable.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.get(id).map(|info| info.name.as_str())
    }

    /// Picker entries formatted as `"{id} {name}"`.
    pub fn options(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|info| format!("{} {}", info.id, info.name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lazily loaded ticker table with explicit invalidation.
#[derive(Debug, Default)]
pub struct TickerCatalog {
    path: Option<std::path::PathBuf>,
    table: Option<TickerTable>,
}

impl TickerCatalog {
    /// Catalog backed by a ticker CSV, loaded on first use.
    pub fn new<P: Into<std::path::PathBuf>>(path: P) -> Self {
        TickerCatalog {
            path: Some(path.into()),
            table: None,
        }
    }

    /// Catalog with no backing file; every ticker is accepted and shown by id.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the table, loading it if it is not held yet.
    pub fn table(&mut self) -> Result<&TickerTable, ReportError> {
        let table = match self.table.take() {
            Some(table) => table,
            None => match &self.path {
                Some(path) => TickerTable::from_path(path)?,
                None => TickerTable::default(),
            },
        };
        Ok(self.table.insert(table))
    }

    /// Drops the held table; the next access reloads it.
    pub fn invalidate(&mut self) {
        self.table = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Resolves the title name for `id`.
    ///
    /// With a ticker file loaded, ids outside the selectable markets (ETFs,
    /// unknown codes) are refused.
    pub fn display_name(&mut self, id: &str) -> Result<String, ReportError> {
        if self.path.is_none() {
            return Ok(id.to_string());
        }
        self.table()?
            .display_name(id)
            .map(str::to_string)
            .ok_or_else(|| ReportError::InvalidInput(format!("{} is not a selectable ticker", id)))
    }
}

//! Bar sources: where daily bars for a ticker come from.
//!
//! The pipeline only sees the [`BarSource`] trait. [`CsvBarSource`] reads
//! one CSV file per ticker, [`InMemoryBarSource`] serves bars held in memory.

use crate::error::ReportError;
use crate::models::Bar;

/// Supplies daily bars for a ticker over an inclusive date window.
///
/// Implementations return `ReportError::NoData` when the ticker/window
/// yields nothing; an empty `Ok` is treated the same way by the pipeline.
/// Sources are read-only, so concurrent fetches of disjoint windows are safe.
pub trait BarSource: Send + Sync {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<Bar>, ReportError>;
}

/// Represents a single record from a daily bar CSV.
///
/// Accepts the provider's column names (`max`/`min`, `max_price`/`min_price`,
/// `Trading_Volume`) as well as plain `high`/`low`/`volume`.
#[derive(Debug, serde::Deserialize)]
struct CsvRecord {
    date: String,
    #[serde(rename = "max", alias = "max_price", alias = "high")]
    #[serde(with = "rust_decimal::serde::str")]
    high: rust_decimal::Decimal,
    #[serde(rename = "min", alias = "min_price", alias = "low")]
    #[serde(with = "rust_decimal::serde::str")]
    low: rust_decimal::Decimal,
    #[serde(rename = "Trading_Volume", alias = "volume")]
    volume: u64,
}

/// Reads every bar from a CSV reader.
///
/// Extra columns are ignored. A row with a missing or unparseable value is
/// rejected rather than skipped, so a hole in the data never turns into a
/// silently wrong aggregate.
///
/// # Arguments
/// * `reader` - CSV reader positioned before the header row.
///
/// # Returns
/// * `Result<Vec<Bar>, ReportError>` - Bars in file order, or `InvalidInput` naming the bad line.
pub fn read_bars<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<Bar>, ReportError> {
    let mut bars = Vec::new();

    for result in reader.deserialize::<CsvRecord>() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or_default();
            ReportError::InvalidInput(format!("bad bar row at line {line}: {e}"))
        })?;
        let date = chrono::NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d")
            .map_err(|e| ReportError::InvalidInput(format!("bad date {:?}: {}", record.date, e)))?;
        bars.push(Bar::new(date, record.high, record.low, record.volume));
    }

    Ok(bars)
}

/// Keeps the bars inside the inclusive `[start, end]` window.
pub fn filter_window(bars: Vec<Bar>, start: chrono::NaiveDate, end: chrono::NaiveDate) -> Vec<Bar> {
    bars.into_iter()
        .filter(|bar| start <= bar.date && bar.date <= end)
        .collect()
}

/// Bar source backed by a directory holding `{ticker}.csv` files.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    dir: std::path::PathBuf,
}

impl CsvBarSource {
    pub fn new<P: Into<std::path::PathBuf>>(dir: P) -> Self {
        CsvBarSource { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> std::path::PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }
}

impl BarSource for CsvBarSource {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<Bar>, ReportError> {
        let no_data = || ReportError::NoData {
            ticker: ticker.to_string(),
            start,
            end,
        };

        let path = self.path_for(ticker);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no bar file for ticker");
            return Err(no_data());
        }

        let file = std::fs::File::open(&path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);
        let bars = filter_window(read_bars(&mut reader)?, start, end);
        tracing::debug!(ticker, %start, %end, count = bars.len(), "fetched bars");

        if bars.is_empty() {
            return Err(no_data());
        }
        Ok(bars)
    }
}

/// Bar source serving bars held in memory, keyed by ticker.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBarSource {
    bars: std::collections::HashMap<String, Vec<Bar>>,
}

impl InMemoryBarSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bars for `ticker`, appending to any already present.
    pub fn insert<I: IntoIterator<Item = Bar>>(&mut self, ticker: &str, bars: I) {
        self.bars.entry(ticker.to_string()).or_default().extend(bars);
    }
}

impl BarSource for InMemoryBarSource {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<Bar>, ReportError> {
        let bars = self
            .bars
            .get(ticker)
            .map(|all| filter_window(all.clone(), start, end))
            .unwrap_or_default();

        if bars.is_empty() {
            return Err(ReportError::NoData {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new().has_headers(true).from_reader(data.as_bytes())
    }

    #[test]
    fn reads_provider_column_names() {
        let data = "date,stock_id,Trading_Volume,open,max,min,close\n\
                    2024-01-02,2330,1000,590,593,589,592\n\
                    2024-01-03,2330,1500,584,585,578.5,580\n";
        let bars = read_bars(&mut reader(data)).unwrap();
        assert_eq!(
            bars,
            vec![
                Bar::new(date(2024, 1, 2), dec!(593), dec!(589), 1000),
                Bar::new(date(2024, 1, 3), dec!(585), dec!(578.5), 1500),
            ]
        );
    }

    #[test]
    fn reads_price_suffixed_and_plain_names() {
        let suffixed = "date,max_price,min_price,Trading_Volume\n2024-01-02,10,9,5\n";
        let plain = "date,high,low,volume\n2024-01-02,10,9,5\n";
        assert_eq!(read_bars(&mut reader(suffixed)).unwrap(), read_bars(&mut reader(plain)).unwrap());
    }

    #[test]
    fn missing_value_is_invalid_input() {
        let data = "date,max,min,Trading_Volume\n2024-01-02,,9,5\n";
        let err = read_bars(&mut reader(data)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));
    }

    #[test]
    fn in_memory_source_filters_and_reports_no_data() {
        let mut source = InMemoryBarSource::new();
        source.insert(
            "2330",
            [
                Bar::new(date(2024, 1, 2), dec!(10), dec!(9), 1),
                Bar::new(date(2024, 1, 9), dec!(11), dec!(9), 1),
            ],
        );

        let bars = source.fetch_bars("2330", date(2024, 1, 1), date(2024, 1, 5)).unwrap();
        assert_eq!(bars.len(), 1);

        let err = source.fetch_bars("2330", date(2024, 2, 1), date(2024, 2, 5)).unwrap_err();
        assert!(err.is_no_data());
        assert!(source.fetch_bars("0050", date(2024, 1, 1), date(2024, 1, 5)).unwrap_err().is_no_data());
    }

    #[test]
    fn csv_source_missing_file_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvBarSource::new(dir.path());
        let err = source.fetch_bars("9999", date(2024, 1, 1), date(2024, 1, 5)).unwrap_err();
        assert!(err.is_no_data());
    }
}

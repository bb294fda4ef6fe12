use crate::models::Period;

/// The unified error type for the report pipeline.
///
/// Only the boundaries raise: the bar source, input validation and the
/// output writers. Aggregation, classification and layout are total over
/// well-formed input.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The bar source returned nothing for the requested window.
    #[error("no bars for {ticker} between {start} and {end}")]
    NoData {
        ticker: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// The requested end date is not after the start date.
    #[error("invalid range: end {end} is not after start {start}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Bars that cannot be aggregated without producing wrong numbers.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The period is not part of the configured period set.
    #[error("period {0} is not enabled for this report")]
    UnsupportedPeriod(Period),

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// True when the error means "nothing to report" rather than a fault.
    pub fn is_no_data(&self) -> bool {
        matches!(self, ReportError::NoData { .. })
    }
}

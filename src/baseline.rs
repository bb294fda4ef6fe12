//! Resolves the comparison point for the first row of a report.
//!
//! Week and month reports compare their first row against an aggregate of
//! the window just before the range. Day reports compare bar to bar: the
//! baseline is the single latest bar before the range, never an aggregate.

use crate::error::ReportError;
use crate::models::{Period, PeriodSummary};
use crate::resample;
use crate::source::{self, BarSource};
use crate::utils;

/// Calendar days searched for the previous trading day of a day report.
pub const DAY_LOOKBACK_DAYS: i64 = 14;
/// Calendar days aggregated as the previous week of a week report.
pub const WEEK_LOOKBACK_DAYS: i64 = 7;

/// The inclusive date window fetched to build the baseline.
///
/// Day reports fetch up to and including `requested_start` and keep only the
/// bars strictly before it.
pub fn lookback_window(
    period: Period,
    requested_start: chrono::NaiveDate,
) -> (chrono::NaiveDate, chrono::NaiveDate) {
    let day_before = requested_start - chrono::Duration::days(1);
    match period {
        Period::Day => (
            requested_start - chrono::Duration::days(DAY_LOOKBACK_DAYS),
            requested_start,
        ),
        Period::Week => (
            requested_start - chrono::Duration::days(WEEK_LOOKBACK_DAYS),
            day_before,
        ),
        Period::Month => (utils::first_day_of_month(day_before), day_before),
    }
}

/// Fetches and reduces the baseline preceding `requested_start`.
///
/// The fetched bars are re-filtered to the look-back window, so a source
/// handing back a wider range cannot leak in-range bars into the baseline.
///
/// # Arguments
///
/// * `source` - Where bars come from.
/// * `ticker` - Ticker id.
/// * `period` - Report period; decides the window and whether to aggregate.
/// * `requested_start` - First date of the (aligned) report range.
///
/// # Returns
///
/// * `Ok(Some(summary))` - Baseline found.
/// * `Ok(None)` - No bar in the look-back window.
/// * `Err(ReportError)` - The source failed for another reason, or returned bad bars.
pub fn resolve_baseline(
    source: &dyn BarSource,
    ticker: &str,
    period: Period,
    requested_start: chrono::NaiveDate,
) -> Result<Option<PeriodSummary>, ReportError> {
    let (start, end) = lookback_window(period, requested_start);

    let fetched = match source.fetch_bars(ticker, start, end) {
        Ok(bars) => bars,
        Err(e) if e.is_no_data() => {
            tracing::info!(ticker, %period, %start, %end, "no baseline data before range");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let window = resample::sanitize(&source::filter_window(fetched, start, end))?;

    let baseline = match period {
        Period::Day => window
            .iter()
            .filter(|bar| bar.date < requested_start)
            .max_by_key(|bar| bar.date)
            .map(PeriodSummary::from_bar),
        Period::Week | Period::Month => resample::summarize_window(&window),
    };
    tracing::debug!(ticker, %period, found = baseline.is_some(), "resolved baseline");
    Ok(baseline)
}

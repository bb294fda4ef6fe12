//! One report generation: fetch, aggregate, classify, flag, lay out.
//!
//! Data flows one way. Each stage returns fresh values, and any stage
//! failing aborts the whole report; there is no partial result.

use crate::baseline;
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::layout::{self, Page};
use crate::models::{Bar, ExtremumFlag, Period, PeriodSummary, TrendTag};
use crate::resample;
use crate::source::{self, BarSource};
use crate::trend;
use crate::utils;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub ticker_id: String,
    pub ticker_name: String,
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub period: Period,
}

/// One displayed row: a period with its trend and optional extremum flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ReportRow {
    pub summary: PeriodSummary,
    pub trend: TrendTag,
    /// Present only when the report shows extrema.
    pub extremum: Option<ExtremumFlag>,
}

/// A finished report, ready for a renderer.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Report {
    pub ticker_id: String,
    pub title: String,
    pub period: Period,
    /// Aligned range actually covered.
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub baseline: Option<PeriodSummary>,
    pub pages: Vec<Page<ReportRow>>,
}

impl Report {
    /// Rows in display order across all pages.
    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        layout::positions(&self.pages).map(|(_, row)| row)
    }

    pub fn row_count(&self) -> usize {
        self.pages.iter().map(Page::row_count).sum()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Turns in-range bars and a baseline into laid-out report rows.
///
/// Pure: no fetching, no clock. An empty `bars` slice yields zero pages.
pub fn assemble_rows(
    bars: &[Bar],
    baseline: Option<&PeriodSummary>,
    period: Period,
    config: &ReportConfig,
) -> Result<Vec<Page<ReportRow>>, ReportError> {
    let summaries = resample::aggregate(bars, period, config.week_rule)?;
    let classified = trend::classify(&summaries, baseline, config.first_row);

    let flags: Vec<Option<ExtremumFlag>> = if config.show_extrema {
        let grouping = period.extremum_grouping(config.week_rule);
        trend::flag_extrema(&summaries, grouping).into_iter().map(Some).collect()
    } else {
        vec![None; summaries.len()]
    };

    let rows: Vec<ReportRow> = classified
        .into_iter()
        .zip(flags)
        .map(|(row, extremum)| ReportRow {
            summary: row.summary,
            trend: row.trend,
            extremum,
        })
        .collect();

    Ok(layout::paginate(&rows, config.rows_per_block, config.blocks_per_page))
}

/// Generates a report for one ticker.
///
/// The range is widened to whole periods and capped at `today`, then
/// rejected only if it ends before it starts.
/// The main range and the baseline look-back window are fetched side by
/// side; they are read-only and disjoint. An empty main range is `NoData`.
///
/// # Arguments
/// * `source` - Bar source for the main range and the look-back window.
/// * `request` - Ticker, range and period.
/// * `config` - Layout and classification options.
/// * `today` - Upper bound for the range end.
///
/// # Returns
/// * `Result<Report, ReportError>` - The laid-out report.
pub fn generate(
    source: &dyn BarSource,
    request: &ReportRequest,
    config: &ReportConfig,
    today: chrono::NaiveDate,
) -> Result<Report, ReportError> {
    config.ensure_period(request.period)?;

    let (start, end) = utils::align_range(request.period, request.start, request.end, today);
    if end < start {
        return Err(ReportError::InvalidRange { start, end });
    }
    let ticker = request.ticker_id.as_str();
    tracing::info!(ticker, period = %request.period, %start, %end, "generating report");

    let (bars, baseline) = rayon::join(
        || source.fetch_bars(ticker, start, end),
        || baseline::resolve_baseline(source, ticker, request.period, start),
    );
    let bars = source::filter_window(bars?, start, end);
    if bars.is_empty() {
        return Err(ReportError::NoData {
            ticker: ticker.to_string(),
            start,
            end,
        });
    }
    let baseline = baseline?;

    let pages = assemble_rows(&bars, baseline.as_ref(), request.period, config)?;
    let report = Report {
        ticker_id: request.ticker_id.clone(),
        title: utils::report_title(&request.ticker_name, start, end, request.period),
        period: request.period,
        start,
        end,
        baseline,
        pages,
    };
    tracing::info!(ticker, rows = report.row_count(), pages = report.page_count(), "report ready");
    Ok(report)
}

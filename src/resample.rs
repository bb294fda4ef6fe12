use crate::error::ReportError;
use crate::models::{Bar, Grouping, Period, PeriodSummary, WeekRule};

/// Returns the bucketing rule for a report period.
pub fn grouping_for(period: Period, week_rule: WeekRule) -> Grouping {
    match period {
        Period::Day => Grouping::Day,
        Period::Week => Grouping::Week(week_rule),
        Period::Month => Grouping::Month,
    }
}

/// Sorts bars by date and rejects input that would aggregate wrongly.
///
/// Caller ordering is never trusted: the bars are re-sorted. Two bars on
/// the same date, or a bar whose high is below its low, cannot be
/// reconciled and fail fast.
///
/// # Arguments
///
/// * `bars` - Daily bars in any order.
///
/// # Returns
///
/// * `Result<Vec<Bar>, ReportError>` - Bars in strictly increasing date order, or `InvalidInput`.
pub fn sanitize(bars: &[Bar]) -> Result<Vec<Bar>, ReportError> {
    let mut sorted = bars.to_vec();
    sorted.sort_by_key(|bar| bar.date);

    for pair in sorted.windows(2) {
        if pair[0].date == pair[1].date {
            return Err(ReportError::InvalidInput(format!(
                "duplicate bar for {}",
                pair[0].date
            )));
        }
    }
    if let Some(bar) = sorted.iter().find(|bar| bar.high < bar.low) {
        return Err(ReportError::InvalidInput(format!(
            "bar for {} has high {} below low {}",
            bar.date, bar.high, bar.low
        )));
    }

    Ok(sorted)
}

/// Aggregates daily bars into one summary per period bucket.
///
/// Bars are sanitized first, then folded bucket by bucket:
/// - High: max high across the bucket
/// - Low: min low across the bucket
/// - Volume: sum of volumes
/// - Period end: date of the last bar in the bucket
///
/// Day buckets hold exactly one bar. Week buckets follow `week_rule`; month
/// buckets are calendar (year, month). A bucket cut by the edge of the input
/// only holds the bars actually present, it is never completed from outside.
///
/// # Arguments
///
/// * `bars` - Daily bars already filtered to the requested range.
/// * `period` - Target granularity.
/// * `week_rule` - Week bucketing rule, ignored for day and month.
///
/// # Returns
///
/// * `Result<Vec<PeriodSummary>, ReportError>` - Summaries in increasing date order.
pub fn aggregate(
    bars: &[Bar],
    period: Period,
    week_rule: WeekRule,
) -> Result<Vec<PeriodSummary>, ReportError> {
    let grouping = grouping_for(period, week_rule);
    let mut resampled = Vec::new();
    let mut current: Option<((i32, u32), PeriodSummary)> = None;

    for bar in sanitize(bars)? {
        let key = grouping.key(bar.date);

        match current {
            Some((current_key, ref mut summary)) if current_key == key => {
                summary.absorb(&bar);
            }
            Some((_, summary)) => {
                resampled.push(summary);
                current = Some((key, PeriodSummary::from_bar(&bar)));
            }
            None => {
                current = Some((key, PeriodSummary::from_bar(&bar)));
            }
        }
    }

    if let Some((_, summary)) = current {
        resampled.push(summary);
    }

    tracing::debug!(period = %period, bars = bars.len(), buckets = resampled.len(), "aggregated bars");
    Ok(resampled)
}

/// Folds a whole window of bars into a single summary.
///
/// Returns `None` for an empty window.
pub fn summarize_window(bars: &[Bar]) -> Option<PeriodSummary> {
    let (first, rest) = bars.split_first()?;
    let mut summary = PeriodSummary::from_bar(first);
    for bar in rest {
        summary.absorb(bar);
    }
    Some(summary)
}

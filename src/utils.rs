use crate::error::ReportError;
use crate::models::Period;

use chrono::Datelike;

/// Configures a custom Rayon thread pool with specified size.
///
/// Reports for different symbols are independent, so a batch run spreads
/// them over this pool instead of the global one when the user asks for an
/// explicit thread count.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("report-{i}"))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build report thread pool: {}", e))
}

/// Builds a date from user-chosen parts, falling back to the first day of the month.
///
/// A day that does not exist in the month (e.g. 30 February) is not an
/// error: the date is clamped to the 1st and the caller is told so through
/// the returned flag.
///
/// # Returns
/// * `Some((date, clamped))` - The date and whether the day was replaced.
/// * `None` - The year/month pair itself is not a valid month.
pub fn date_or_first_of_month(year: i32, month: u32, day: u32) -> Option<(chrono::NaiveDate, bool)> {
    match chrono::NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Some((date, false)),
        None => chrono::NaiveDate::from_ymd_opt(year, month, 1).map(|date| (date, true)),
    }
}

/// Parses a `YYYY-M-D` (or `YYYY/M/D`) string leniently.
///
/// Invalid days are clamped to the first of the month with a warning, the
/// same recovery the date pickers apply.
///
/// # Arguments
/// * `input` - Date string such as `"2024-2-30"` or `"2024/03/01"`.
///
/// # Returns
/// * `Result<NaiveDate, ReportError>` - Parsed date or `InvalidInput` when the parts are not numbers or the month is invalid.
pub fn parse_date_lenient(input: &str) -> Result<chrono::NaiveDate, ReportError> {
    let parts: Vec<&str> = input.trim().split(['-', '/']).collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(ReportError::InvalidInput(format!("expected YYYY-M-D, got {input:?}")));
    };
    let parse_err = |e: std::num::ParseIntError| ReportError::InvalidInput(format!("bad date {input:?}: {e}"));
    let year: i32 = year.parse().map_err(parse_err)?;
    let month: u32 = month.parse().map_err(parse_err)?;
    let day: u32 = day.parse().map_err(parse_err)?;

    let (date, clamped) = date_or_first_of_month(year, month, day)
        .ok_or_else(|| ReportError::InvalidInput(format!("no such month in {input:?}")))?;
    if clamped {
        tracing::warn!(input, %date, "day does not exist in month, using the 1st");
    }
    Ok(date)
}

/// Last calendar day of the month containing `date`.
pub fn last_day_of_month(date: chrono::NaiveDate) -> chrono::NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    chrono::NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// First calendar day of the month containing `date`.
pub fn first_day_of_month(date: chrono::NaiveDate) -> chrono::NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Widens `[start, end]` to whole periods and caps `end` at `today`.
///
/// Week reports run Monday through Sunday, month reports from the 1st to
/// the month's last day. Day reports are left as they are.
pub fn align_range(
    period: Period,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    today: chrono::NaiveDate,
) -> (chrono::NaiveDate, chrono::NaiveDate) {
    let (start, end) = match period {
        Period::Day => (start, end),
        Period::Week => {
            let back = i64::from(start.weekday().num_days_from_monday());
            let forward = 6 - i64::from(end.weekday().num_days_from_monday());
            (
                start - chrono::Duration::days(back),
                end + chrono::Duration::days(forward),
            )
        }
        Period::Month => (first_day_of_month(start), last_day_of_month(end)),
    };
    (start, end.min(today))
}

/// Checks a user-chosen range before any report is generated.
///
/// A day report needs `end` after `start`. Week and month reports are widened
/// to whole periods first, so a single day is enough; only a reversed range
/// is rejected.
pub fn validate_range(period: Period, start: chrono::NaiveDate, end: chrono::NaiveDate) -> Result<(), ReportError> {
    let invalid = match period {
        Period::Day => end <= start,
        Period::Week | Period::Month => end < start,
    };
    if invalid {
        return Err(ReportError::InvalidRange { start, end });
    }
    Ok(())
}

/// Formats a date as `%Y-%m-%d`.
pub fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Composes the externally visible report identifier.
///
/// # Examples
///
/// ```
/// use stock_trend_report::{models::Period, utils::report_title};
///
/// let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
/// assert_eq!(report_title("台積電", start, end, Period::Week), "台積電 2024-01-01～2024-03-31（週）");
/// ```
pub fn report_title(
    ticker_name: &str,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    period: Period,
) -> String {
    format!(
        "{} {}～{}（{}）",
        ticker_name,
        format_date(start),
        format_date(end),
        period.label()
    )
}

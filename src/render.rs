//! Turns a laid-out [`Report`] into sheet grids and writes them out.
//!
//! A sheet is the logical grid a spreadsheet would show: a title row, a
//! header row and the blocks of a page side by side. Cell colors and
//! emphasis are carried in the model; the CSV writer keeps values only,
//! the JSON writer keeps everything.

use chrono::Datelike;

use crate::error::ReportError;
use crate::models::{Direction, ExtremumFlag, Period};
use crate::pipeline::{Report, ReportRow};

/// Column headers of one block.
pub const BLOCK_HEADER: [&str; 7] = ["日期", "", "高", "低", "漲幅", "量", ""];
const WEEKDAYS: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Cell {
    pub value: String,
    pub color: Option<&'static str>,
    pub bold: bool,
}

impl Cell {
    fn plain<S: Into<String>>(value: S) -> Self {
        Cell {
            value: value.into(),
            ..Cell::default()
        }
    }

    fn colored<S: Into<String>>(value: S, direction: Direction) -> Self {
        Cell {
            value: value.into(),
            color: direction.color(),
            bold: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Sheet {
    pub name: String,
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Date and weekday labels for rows in display order.
///
/// Day rows show the day of month, with the month prefixed when it changes
/// from the previous row. Week rows show `m/d`, month rows `m`, each with
/// the year prefixed when it changes. Only day rows get a weekday label.
pub fn date_labels(period: Period, dates: &[chrono::NaiveDate]) -> Vec<(String, String)> {
    let mut previous: Option<chrono::NaiveDate> = None;
    let mut labels = Vec::with_capacity(dates.len());

    for &date in dates {
        let month_changed = previous.is_some_and(|p| p.month() != date.month());
        let year_changed = previous.is_some_and(|p| p.year() != date.year());
        let label = match period {
            Period::Day if month_changed => format!("{}/{}", date.month(), date.day()),
            Period::Day => date.day().to_string(),
            Period::Week if year_changed => format!("{}/{}/{}", date.year(), date.month(), date.day()),
            Period::Week => format!("{}/{}", date.month(), date.day()),
            Period::Month if year_changed => format!("{}/{}", date.year(), date.month()),
            Period::Month => date.month().to_string(),
        };
        let weekday = match period {
            Period::Day => WEEKDAYS[date.weekday().num_days_from_monday() as usize].to_string(),
            Period::Week | Period::Month => String::new(),
        };
        labels.push((label, weekday));
        previous = Some(date);
    }

    labels
}

fn extremum_cell(flag: Option<ExtremumFlag>) -> Cell {
    let value = match flag {
        Some(ExtremumFlag { is_period_high: true, is_period_low: true }) => "高低",
        Some(ExtremumFlag { is_period_high: true, .. }) => "高",
        Some(ExtremumFlag { is_period_low: true, .. }) => "低",
        _ => "",
    };
    Cell {
        value: value.to_string(),
        color: None,
        bold: !value.is_empty(),
    }
}

fn row_cells(row: &ReportRow, labels: &(String, String)) -> [Cell; 7] {
    let summary = &row.summary;
    let trend = &row.trend;
    let emphasis = row.extremum.unwrap_or_default();

    let mut high = Cell::colored(summary.high.to_string(), trend.high);
    high.bold = emphasis.is_period_high;
    let mut low = Cell::colored(summary.low.to_string(), trend.low);
    low.bold = emphasis.is_period_low;

    [
        Cell::plain(labels.0.clone()),
        Cell::plain(labels.1.clone()),
        high,
        low,
        Cell::colored(summary.range().round_dp(2).normalize().to_string(), trend.range),
        Cell::colored(trend.volume_marker(), trend.volume),
        extremum_cell(row.extremum),
    ]
}

/// Builds one sheet per report page.
pub fn build_sheets(report: &Report) -> Vec<Sheet> {
    let dates: Vec<chrono::NaiveDate> = report.rows().map(|row| row.summary.period_end).collect();
    let labels = date_labels(report.period, &dates);
    let total_pages = report.page_count();

    let mut label_iter = labels.iter();
    let mut sheets = Vec::with_capacity(total_pages);
    for page in &report.pages {
        let name = if page.index == 0 {
            format!("{}報表", report.period.label())
        } else {
            format!("{}報表{}", report.period.label(), page.index + 1)
        };
        let title = if total_pages > 1 {
            format!("{}（第 {}/{} 頁）", report.title, page.index + 1, total_pages)
        } else {
            report.title.clone()
        };
        let header = std::iter::repeat_n(BLOCK_HEADER, page.blocks.len())
            .flatten()
            .map(str::to_string)
            .collect();

        let height = page.blocks.iter().map(|b| b.rows.len()).max().unwrap_or(0);
        let mut rows = vec![Vec::with_capacity(page.blocks.len() * BLOCK_HEADER.len()); height];
        for block in &page.blocks {
            for (line, row) in rows.iter_mut().enumerate() {
                match block.rows.get(line) {
                    Some(report_row) => {
                        let row_labels = label_iter.next().cloned().unwrap_or_default();
                        row.extend(row_cells(report_row, &row_labels));
                    }
                    None => row.extend(std::iter::repeat_n(Cell::default(), BLOCK_HEADER.len())),
                }
            }
        }

        sheets.push(Sheet {
            name,
            title,
            header,
            rows,
        });
    }

    sheets
}

/// Writes cell values of every sheet as CSV, sheets separated by a blank line.
pub fn write_csv<W: std::io::Write>(sheets: &[Sheet], writer: W) -> Result<(), ReportError> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    for (i, sheet) in sheets.iter().enumerate() {
        if i > 0 {
            csv_writer.write_record([""])?;
        }
        csv_writer.write_record([sheet.title.as_str()])?;
        csv_writer.write_record(&sheet.header)?;
        for row in &sheet.rows {
            csv_writer.write_record(row.iter().map(|cell| cell.value.as_str()))?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes the full sheet model, colors included, as pretty JSON.
pub fn write_json<W: std::io::Write>(sheets: &[Sheet], writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, sheets)?;
    Ok(())
}

/// File name for a report: its title with path separators replaced.
pub fn file_name(report: &Report, format: OutputFormat) -> String {
    let stem: String = report
        .title
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.{}", stem, format.extension())
}

/// Renders `report` into `dir` and returns the written path.
pub fn write_report<P: AsRef<std::path::Path>>(
    report: &Report,
    dir: P,
    format: OutputFormat,
) -> Result<std::path::PathBuf, ReportError> {
    let sheets = build_sheets(report);
    let path = dir.as_ref().join(file_name(report, format));
    let mut staged = tempfile::NamedTempFile::new_in(dir.as_ref())?;

    {
        let mut file = std::io::BufWriter::new(staged.as_file_mut());
        match format {
            OutputFormat::Csv => write_csv(&sheets, &mut file)?,
            OutputFormat::Json => write_json(&sheets, &mut file)?,
        }
        std::io::Write::flush(&mut file)?;
    }
    // Only a complete report replaces `path`; a failed write drops the staged file.
    staged.persist(&path).map_err(|e| ReportError::Io(e.error))?;
    tracing::debug!(path = %path.display(), sheets = sheets.len(), "report written");
    Ok(path)
}

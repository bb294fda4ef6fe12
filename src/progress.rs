use crate::config::ReportConfig;
use crate::pipeline::{self, ReportRequest};
use crate::render::{self, OutputFormat};
use crate::source::BarSource;

use rayon::prelude::*;

/// Outcome of one report in a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Written(std::path::PathBuf),
    /// The ticker had no bars in the requested range.
    NoData(String),
}

/// Generates and writes one report per request, in parallel, with a progress bar.
///
/// Every request is an independent pipeline run. A ticker without data is
/// reported and skipped; any other failure stops the batch.
///
/// # Arguments
/// * `source` - Bar source shared by all reports.
/// * `requests` - One request per ticker.
/// * `config` - Report options.
/// * `today` - Cap for range ends.
/// * `output_dir` - Where report files are written.
/// * `format` - CSV values or JSON sheet model.
///
/// # Returns
/// * `anyhow::Result<Vec<BatchOutcome>>` - Outcomes in request order.
pub fn process_reports<P: AsRef<std::path::Path> + Sync>(
    source: &dyn BarSource,
    requests: &[ReportRequest],
    config: &ReportConfig,
    today: chrono::NaiveDate,
    output_dir: P,
    format: OutputFormat,
) -> anyhow::Result<Vec<BatchOutcome>> {
    let bar = indicatif::ProgressBar::new(requests.len() as u64);
    bar.set_style(
        indicatif::ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let outcomes = requests
        .par_iter()
        .map(|request| -> anyhow::Result<BatchOutcome> {
            bar.set_message(request.ticker_id.clone());
            let outcome = match pipeline::generate(source, request, config, today) {
                Ok(report) => {
                    let path = render::write_report(&report, output_dir.as_ref(), format)?;
                    BatchOutcome::Written(path)
                }
                Err(e) if e.is_no_data() => {
                    tracing::warn!(ticker = %request.ticker_id, "查無資料: {}", e);
                    BatchOutcome::NoData(request.ticker_id.clone())
                }
                Err(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("report for {} failed", request.ticker_id)));
                }
            };
            bar.inc(1);
            Ok(outcome)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    bar.finish_with_message("done");
    anyhow::Ok(outcomes)
}

use std::num::NonZeroUsize;

use crate::config::ReportConfig;
use crate::models::{Period, WeekRule};
use crate::render::OutputFormat;
use crate::trend::FirstRowPolicy;
use crate::utils;

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub input: std::path::PathBuf,
    pub output: std::path::PathBuf,
    pub symbols: Vec<String>,
    pub tickers: Option<std::path::PathBuf>,
    pub start: chrono::NaiveDate,
    pub end: Option<chrono::NaiveDate>,
    pub period: Period,
    pub config: Option<std::path::PathBuf>,
    pub extrema: bool,
    pub week_rule: Option<WeekRule>,
    pub rows_per_block: Option<NonZeroUsize>,
    pub blocks_per_page: Option<NonZeroUsize>,
    pub first_row: Option<FirstRowPolicy>,
    pub format: OutputFormat,
    pub threads: Option<usize>,
}

/// Command-line arguments parser using Clap.
///
/// Layout and classification flags override the values read from `--config`.
impl Args {
    /// Builds the `clap` command definition.
    pub fn command() -> clap::Command {
        clap::Command::new("stock-trend-report")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Aggregate daily bars into day/week/month trend reports")
            .arg(
                clap::Arg::new("input")
                    .short('i')
                    .long("input")
                    .help("Directory holding one <ticker>.csv bar file per ticker")
                    .required(true)
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory the report files are written to")
                .required(true)
                .num_args(1),
            )
            .arg(
                clap::Arg::new("symbols")
                .short('s')
                .long("symbols")
                .help("Comma-separated ticker ids, one report each")
                .required(true)
                .num_args(1)
                .value_delimiter(','),
            )
            .arg(
                clap::Arg::new("tickers")
                .long("tickers")
                .help("Ticker list CSV (stock_id, stock_name, type, date) used for display names")
                .num_args(1),
            )
            .arg(
                clap::Arg::new("start")
                .long("start")
                .help("First date, YYYY-M-D; an invalid day falls back to the 1st")
                .required(true)
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_date_arg)),
            )
            .arg(
                clap::Arg::new("end")
                .long("end")
                .help("Last date, YYYY-M-D (default: today)")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_date_arg)),
            )
            .arg(
                clap::Arg::new("period")
                .short('p')
                .long("period")
                .help("Aggregation period. Available: 日, 週, 月 (or day, week, month)")
                .num_args(1)
                .default_value("日")
                .value_parser(clap::builder::ValueParser::new(parse_period_arg)),
            )
            .arg(
                clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML file with report options")
                .num_args(1),
            )
            .arg(
                clap::Arg::new("extrema")
                .long("extrema")
                .help("Flag the highest high and lowest low of each coarser group")
                .action(clap::ArgAction::SetTrue),
            )
            .arg(
                clap::Arg::new("week-rule")
                .long("week-rule")
                .help("Week bucketing rule")
                .value_parser(["iso", "calendar"])
                .num_args(1),
            )
            .arg(
                clap::Arg::new("rows-per-block")
                .long("rows-per-block")
                .help("Rows in one block of a page")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
            )
            .arg(
                clap::Arg::new("blocks-per-page")
                .long("blocks-per-page")
                .help("Blocks laid out side by side on one page")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
            )
            .arg(
                clap::Arg::new("first-row")
                .long("first-row")
                .help("First row without prior data: marked up, or left neutral")
                .value_parser(["up", "neutral"])
                .num_args(1),
            )
            .arg(
                clap::Arg::new("format")
                .short('f')
                .long("format")
                .help("Output format. Available: csv, json")
                .value_parser(["csv", "json"])
                .default_value("csv")
                .num_args(1),
            )
            .arg(
                clap::Arg::new("threads")
                .short('t')
                .long("threads")
                .help("Number of threads to use (default: all available)")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
            )
    }

    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> anyhow::Result<Self> {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list.
    pub fn try_parse_from<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &clap::ArgMatches) -> anyhow::Result<Self> {
        let required = |name: &str| {
            matches
                .get_one::<String>(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("missing --{}", name))
        };
        let positive = |name: &str| matches.get_one::<usize>(name).copied().and_then(NonZeroUsize::new);

        let week_rule = match matches.get_one::<String>("week-rule").map(String::as_str) {
            Some("calendar") => Some(WeekRule::Calendar),
            Some(_) => Some(WeekRule::Iso),
            None => None,
        };
        let first_row = match matches.get_one::<String>("first-row").map(String::as_str) {
            Some("neutral") => Some(FirstRowPolicy::Neutral),
            Some(_) => Some(FirstRowPolicy::DefaultUp),
            None => None,
        };
        let format = required("format")?
            .parse::<OutputFormat>()
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(Args {
            input: std::path::PathBuf::from(required("input")?),
            output: std::path::PathBuf::from(required("output")?),
            symbols: matches
                .get_many::<String>("symbols")
                .map(|values| values.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or_default(),
            tickers: matches.get_one::<String>("tickers").map(std::path::PathBuf::from),
            start: matches
                .get_one::<chrono::NaiveDate>("start")
                .copied()
                .ok_or_else(|| anyhow::anyhow!("missing --start"))?,
            end: matches.get_one::<chrono::NaiveDate>("end").copied(),
            period: matches.get_one::<Period>("period").copied().unwrap_or(Period::Day),
            config: matches.get_one::<String>("config").map(std::path::PathBuf::from),
            extrema: matches.get_flag("extrema"),
            week_rule,
            rows_per_block: positive("rows-per-block"),
            blocks_per_page: positive("blocks-per-page"),
            first_row,
            format,
            threads: matches.get_one::<usize>("threads").cloned(),
        })
    }

    /// Report options: the `--config` file (or defaults) with flags applied on top.
    pub fn report_config(&self) -> anyhow::Result<ReportConfig> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::load(path)?,
            None => ReportConfig::default(),
        };
        if self.extrema {
            config.show_extrema = true;
        }
        if let Some(rule) = self.week_rule {
            config.week_rule = rule;
        }
        if let Some(rows) = self.rows_per_block {
            config.rows_per_block = rows;
        }
        if let Some(blocks) = self.blocks_per_page {
            config.blocks_per_page = blocks;
        }
        if let Some(policy) = self.first_row {
            config.first_row = policy;
        }
        Ok(config)
    }
}

/// Validates that a count is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the count.
///
/// # Returns
/// * `Result<usize>` - Validated count.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

fn parse_date_arg(s: &str) -> Result<chrono::NaiveDate, String> {
    utils::parse_date_lenient(s).map_err(|e| e.to_string())
}

fn parse_period_arg(s: &str) -> Result<Period, String> {
    s.parse::<Period>()
}

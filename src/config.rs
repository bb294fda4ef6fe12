//! Report variation points.
//!
//! Every knob the different report layouts used to hard-code lives in
//! [`ReportConfig`]. It can be read from a TOML file and is then overridden
//! by command-line flags.
//!
//! ```toml
//! period_set = "all"
//! show_extrema = true
//! week_rule = "iso"
//! blocks_per_page = 3
//! rows_per_block = 43
//! first_row = "default-up"
//! ```

use std::num::NonZeroUsize;

use crate::error::ReportError;
use crate::layout::{DEFAULT_BLOCKS_PER_PAGE, DEFAULT_ROWS_PER_BLOCK};
use crate::models::{Period, WeekRule};
use crate::trend::FirstRowPolicy;

/// Which periods a report may be generated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodSet {
    DayOnly,
    #[default]
    All,
}

impl PeriodSet {
    pub fn contains(self, period: Period) -> bool {
        match self {
            PeriodSet::DayOnly => period == Period::Day,
            PeriodSet::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub period_set: PeriodSet,
    /// Flag each group's high and low rows.
    pub show_extrema: bool,
    pub week_rule: WeekRule,
    pub blocks_per_page: NonZeroUsize,
    pub rows_per_block: NonZeroUsize,
    pub first_row: FirstRowPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            period_set: PeriodSet::All,
            show_extrema: false,
            week_rule: WeekRule::Iso,
            blocks_per_page: DEFAULT_BLOCKS_PER_PAGE,
            rows_per_block: DEFAULT_ROWS_PER_BLOCK,
            first_row: FirstRowPolicy::DefaultUp,
        }
    }
}

impl ReportConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ReportError> {
        toml::from_str(input).map_err(|e| ReportError::Config(e.to_string()))
    }

    /// Reads a TOML configuration file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ReportError::Config(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Fails with `UnsupportedPeriod` when `period` is outside the period set.
    pub fn ensure_period(&self, period: Period) -> Result<(), ReportError> {
        if self.period_set.contains(period) {
            Ok(())
        } else {
            Err(ReportError::UnsupportedPeriod(period))
        }
    }
}

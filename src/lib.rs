//! Day/week/month trend reports over daily price bars.
//!
//! A report run is one linear pipeline: a [`source::BarSource`] supplies
//! daily bars, [`resample`] buckets them into periods, [`baseline`] finds
//! the comparison point before the range, [`trend`] tags each period
//! against the one before it, and [`layout`] splits the rows into pages of
//! blocks for [`render`] to write out.

pub mod baseline;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod resample;
pub mod source;
pub mod ticker;
pub mod trend;
pub mod utils;

pub use config::ReportConfig;
pub use error::ReportError;
pub use pipeline::{Report, ReportRequest, generate};

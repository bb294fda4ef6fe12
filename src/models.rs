//! Plain data records flowing through the report pipeline.
//!
//! Every stage builds new values from these records; nothing here is
//! mutated after a later stage has read it.

use rust_decimal::Decimal;

/// Font color for a metric that rose (or held) against its baseline.
pub const COLOR_UP: &str = "FFCC3333";
/// Font color for a metric that fell against its baseline.
pub const COLOR_DOWN: &str = "FF3366CC";
/// Glyph shown in the volume column, colored by the volume direction.
pub const VOLUME_MARKER: &str = "■";
/// Shown instead of [`VOLUME_MARKER`] on an unmarked first row.
pub const NEUTRAL_MARKER: &str = "-";

/// One trading day of a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    pub date: chrono::NaiveDate,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: u64,
}

impl Bar {
    pub fn new(date: chrono::NaiveDate, high: Decimal, low: Decimal, volume: u64) -> Self {
        Bar { date, high, low, volume }
    }
}

/// Aggregation granularity of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// Label used in report titles and sheet names.
    pub fn label(self) -> &'static str {
        match self {
            Period::Day => "日",
            Period::Week => "週",
            Period::Month => "月",
        }
    }

    /// The grouping one level coarser than this period, used for extremum flags.
    pub fn extremum_grouping(self, week_rule: WeekRule) -> Grouping {
        match self {
            Period::Day => Grouping::Week(week_rule),
            Period::Week => Grouping::Month,
            Period::Month => Grouping::Year,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "日" | "day" | "d" | "D" => Ok(Period::Day),
            "週" | "week" | "w" | "W" => Ok(Period::Week),
            "月" | "month" | "m" | "M" => Ok(Period::Month),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

/// How daily bars are assigned to weeks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekRule {
    /// ISO (year, week); a week never splits at a year boundary.
    #[default]
    Iso,
    /// Monday-based week of the calendar year (`%W`); a week spanning
    /// 31 Dec / 1 Jan becomes two buckets.
    Calendar,
}

/// A bucketing rule over calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Day,
    Week(WeekRule),
    Month,
    Year,
}

impl Grouping {
    /// Bucket key of `date`. Keys grow monotonically with the date.
    pub fn key(self, date: chrono::NaiveDate) -> (i32, u32) {
        use chrono::Datelike;

        match self {
            Grouping::Day => (date.year(), date.ordinal()),
            Grouping::Week(WeekRule::Iso) => {
                let iso = date.iso_week();
                (iso.year(), iso.week())
            }
            Grouping::Week(WeekRule::Calendar) => {
                let weekday = date.weekday().num_days_from_monday();
                (date.year(), (date.ordinal0() + 7 - weekday) / 7)
            }
            Grouping::Month => (date.year(), date.month()),
            Grouping::Year => (date.year(), 0),
        }
    }
}

/// Reduced high/low/volume of one period bucket.
///
/// `period_end` is the last bar's date and is what a report row displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PeriodSummary {
    pub period_start: chrono::NaiveDate,
    pub period_end: chrono::NaiveDate,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: u64,
    pub bar_count: usize,
}

impl PeriodSummary {
    /// A one-bar bucket.
    pub fn from_bar(bar: &Bar) -> Self {
        PeriodSummary {
            period_start: bar.date,
            period_end: bar.date,
            high: bar.high,
            low: bar.low,
            volume: bar.volume,
            bar_count: 1,
        }
    }

    /// Folds a later bar into the bucket.
    pub fn absorb(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.volume = self.volume.saturating_add(bar.volume);
        self.period_end = self.period_end.max(bar.date);
        self.period_start = self.period_start.min(bar.date);
        self.bar_count += 1;
    }

    pub fn range(&self) -> Decimal {
        self.high - self.low
    }
}

/// Direction of one metric against its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    /// No baseline and the report leaves the first row unmarked.
    Neutral,
}

impl Direction {
    /// `current >= baseline` is Up; equality never reads as a fall.
    pub fn compare<T: PartialOrd>(current: T, baseline: T) -> Self {
        if current >= baseline {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn color(self) -> Option<&'static str> {
        match self {
            Direction::Up => Some(COLOR_UP),
            Direction::Down => Some(COLOR_DOWN),
            Direction::Neutral => None,
        }
    }
}

/// Per-row directions of high, low, range and volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TrendTag {
    pub high: Direction,
    pub low: Direction,
    pub range: Direction,
    pub volume: Direction,
}

impl TrendTag {
    pub fn uniform(direction: Direction) -> Self {
        TrendTag {
            high: direction,
            low: direction,
            range: direction,
            volume: direction,
        }
    }

    /// Compares every metric of `current` against `baseline` independently.
    pub fn between(current: &PeriodSummary, baseline: &PeriodSummary) -> Self {
        TrendTag {
            high: Direction::compare(current.high, baseline.high),
            low: Direction::compare(current.low, baseline.low),
            range: Direction::compare(current.range(), baseline.range()),
            volume: Direction::compare(current.volume, baseline.volume),
        }
    }

    pub fn volume_marker(&self) -> &'static str {
        match self.volume {
            Direction::Neutral => NEUTRAL_MARKER,
            _ => VOLUME_MARKER,
        }
    }
}

/// Marks the row holding a group's highest high and/or lowest low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExtremumFlag {
    pub is_period_high: bool,
    pub is_period_low: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn equal_metrics_resolve_up() {
        assert_eq!(Direction::compare(dec!(10), dec!(10)), Direction::Up);
        assert_eq!(Direction::compare(dec!(9.99), dec!(10)), Direction::Down);
        assert_eq!(Direction::compare(5u64, 5u64), Direction::Up);
    }

    #[test]
    fn period_parses_labels_and_names() {
        assert_eq!("週".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
        assert!("year".parse::<Period>().is_err());
        assert_eq!(Period::Day.to_string(), "日");
    }

    #[test]
    fn calendar_week_splits_at_new_year() {
        // 2024-12-30 (Mon) and 2025-01-02 (Thu) share ISO week 1 of 2025.
        let mon = date(2024, 12, 30);
        let thu = date(2025, 1, 2);
        let iso = Grouping::Week(WeekRule::Iso);
        let cal = Grouping::Week(WeekRule::Calendar);
        assert_eq!(iso.key(mon), iso.key(thu));
        assert_ne!(cal.key(mon), cal.key(thu));
    }

    #[test]
    fn calendar_week_starts_on_monday() {
        let cal = Grouping::Week(WeekRule::Calendar);
        // 2024-01-01 is a Monday: week 1 through Sunday 7th.
        assert_eq!(cal.key(date(2024, 1, 1)), (2024, 1));
        assert_eq!(cal.key(date(2024, 1, 7)), (2024, 1));
        assert_eq!(cal.key(date(2024, 1, 8)), (2024, 2));
        // 2023-01-01 is a Sunday, before the first Monday.
        assert_eq!(cal.key(date(2023, 1, 1)), (2023, 0));
    }

    #[test]
    fn absorb_keeps_extremes_and_sums_volume() {
        let mut summary = PeriodSummary::from_bar(&Bar::new(date(2024, 1, 2), dec!(10), dec!(9), 100));
        summary.absorb(&Bar::new(date(2024, 1, 3), dec!(12), dec!(8.5), 50));
        assert_eq!(summary.high, dec!(12));
        assert_eq!(summary.low, dec!(8.5));
        assert_eq!(summary.volume, 150);
        assert_eq!(summary.range(), dec!(3.5));
        assert_eq!(summary.period_end, date(2024, 1, 3));
        assert_eq!(summary.bar_count, 2);
    }

    #[test]
    fn neutral_volume_uses_dash_marker() {
        assert_eq!(TrendTag::uniform(Direction::Neutral).volume_marker(), NEUTRAL_MARKER);
        assert_eq!(TrendTag::uniform(Direction::Down).volume_marker(), VOLUME_MARKER);
        assert_eq!(Direction::Neutral.color(), None);
    }
}

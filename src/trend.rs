//! Trend classification and extremum flagging of period summaries.

use crate::models::{Direction, ExtremumFlag, Grouping, PeriodSummary, TrendTag};

/// What the first row shows when there is no baseline before the range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirstRowPolicy {
    /// A missing comparator counts as equal, which reads as Up.
    #[default]
    DefaultUp,
    /// Leave the row unmarked.
    Neutral,
}

/// A period summary with its directions against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ClassifiedRow {
    pub summary: PeriodSummary,
    pub trend: TrendTag,
}

/// Tags every summary with its direction against the one before it.
///
/// Row 0 is compared against `baseline`; without one, `policy` decides
/// between all-Up and unmarked. Each metric (high, low, range, volume) is
/// compared on its own with `current >= previous` meaning Up. Rows keep
/// their order and none are dropped.
pub fn classify(
    summaries: &[PeriodSummary],
    baseline: Option<&PeriodSummary>,
    policy: FirstRowPolicy,
) -> Vec<ClassifiedRow> {
    let mut previous = baseline;
    let mut rows = Vec::with_capacity(summaries.len());

    for summary in summaries {
        let trend = match previous {
            Some(prior) => TrendTag::between(summary, prior),
            None => match policy {
                FirstRowPolicy::DefaultUp => TrendTag::uniform(Direction::Up),
                FirstRowPolicy::Neutral => TrendTag::uniform(Direction::Neutral),
            },
        };
        rows.push(ClassifiedRow {
            summary: *summary,
            trend,
        });
        previous = Some(summary);
    }

    rows
}

/// Flags, within each group, the row holding the highest high and the row
/// holding the lowest low.
///
/// Ties go to the most recent row. A row can carry both flags. The result
/// is index-aligned with `rows`.
///
/// # Arguments
/// * `rows` - Period summaries to flag.
/// * `grouping` - Coarser bucketing applied to each row's `period_end`.
///
/// # Returns
/// * `Vec<ExtremumFlag>` - One flag per input row, in input order.
pub fn flag_extrema(rows: &[PeriodSummary], grouping: Grouping) -> Vec<ExtremumFlag> {
    let mut extremes: std::collections::BTreeMap<(i32, u32), (usize, usize)> =
        std::collections::BTreeMap::new();

    for (i, row) in rows.iter().enumerate() {
        let key = grouping.key(row.period_end);
        let (high_idx, low_idx) = extremes.entry(key).or_insert((i, i));

        let best_high = &rows[*high_idx];
        if (row.high, row.period_end) >= (best_high.high, best_high.period_end) {
            *high_idx = i;
        }
        let best_low = &rows[*low_idx];
        if row.low < best_low.low || (row.low == best_low.low && row.period_end >= best_low.period_end) {
            *low_idx = i;
        }
    }

    let mut flags = vec![ExtremumFlag::default(); rows.len()];
    for (high_idx, low_idx) in extremes.into_values() {
        flags[high_idx].is_period_high = true;
        flags[low_idx].is_period_low = true;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bar, WeekRule};
    use crate::models::Direction::{Down, Up};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn summary(d: chrono::NaiveDate, high: rust_decimal::Decimal, low: rust_decimal::Decimal, volume: u64) -> PeriodSummary {
        PeriodSummary::from_bar(&Bar::new(d, high, low, volume))
    }

    fn tag(high: Direction, low: Direction, range: Direction, volume: Direction) -> TrendTag {
        TrendTag { high, low, range, volume }
    }

    fn daily_rows() -> Vec<PeriodSummary> {
        vec![
            summary(date(2024, 1, 2), dec!(10), dec!(9), 100),
            summary(date(2024, 1, 3), dec!(12), dec!(10), 80),
            summary(date(2024, 1, 4), dec!(11), dec!(10), 80),
            summary(date(2024, 1, 5), dec!(13), dec!(11), 120),
        ]
    }

    #[test]
    fn day_rows_without_baseline() {
        let rows = classify(&daily_rows(), None, FirstRowPolicy::DefaultUp);
        let tags: Vec<TrendTag> = rows.iter().map(|r| r.trend).collect();
        assert_eq!(
            tags,
            vec![
                tag(Up, Up, Up, Up),
                // 12>=10, 10>=9, range 2>=1, volume 80<100
                tag(Up, Up, Up, Down),
                // 11<12, 10>=10, range 1<2, volume 80>=80
                tag(Down, Up, Down, Up),
                // 13>=11, 11>=10, range 2>=1, volume 120>=80
                tag(Up, Up, Up, Up),
            ]
        );
    }

    #[test]
    fn first_row_uses_baseline_when_present() {
        let baseline = summary(date(2023, 12, 29), dec!(10), dec!(9.5), 150);
        let rows = classify(&daily_rows(), Some(&baseline), FirstRowPolicy::DefaultUp);
        // high 10 == 10 ties Up, low 9 < 9.5, range 1 >= 0.5, volume 100 < 150
        assert_eq!(rows[0].trend, tag(Up, Down, Up, Down));
    }

    #[test]
    fn neutral_policy_leaves_first_row_unmarked() {
        let rows = classify(&daily_rows(), None, FirstRowPolicy::Neutral);
        assert_eq!(rows[0].trend, TrendTag::uniform(Direction::Neutral));
        assert_eq!(rows[1].trend.high, Up);
    }

    #[test]
    fn classify_keeps_order_and_length() {
        let input = daily_rows();
        let rows = classify(&input, None, FirstRowPolicy::DefaultUp);
        let dates: Vec<_> = rows.iter().map(|r| r.summary.period_end).collect();
        assert_eq!(dates, input.iter().map(|s| s.period_end).collect::<Vec<_>>());
    }

    #[test]
    fn extrema_within_iso_week_prefer_latest_tie() {
        let rows = vec![
            // week 1 of 2024
            summary(date(2024, 1, 2), dec!(12), dec!(9), 1),
            summary(date(2024, 1, 3), dec!(12), dec!(10), 1),
            summary(date(2024, 1, 4), dec!(11), dec!(9), 1),
            // week 2, single row carries both flags
            summary(date(2024, 1, 8), dec!(15), dec!(14), 1),
        ];
        let flags = flag_extrema(&rows, Grouping::Week(WeekRule::Iso));
        assert_eq!(
            flags,
            vec![
                ExtremumFlag { is_period_high: false, is_period_low: false },
                ExtremumFlag { is_period_high: true, is_period_low: false },
                ExtremumFlag { is_period_high: false, is_period_low: true },
                ExtremumFlag { is_period_high: true, is_period_low: true },
            ]
        );
    }

    #[test]
    fn extrema_by_month_and_year() {
        let rows = vec![
            summary(date(2023, 11, 30), dec!(20), dec!(5), 1),
            summary(date(2023, 12, 29), dec!(18), dec!(6), 1),
            summary(date(2024, 1, 31), dec!(10), dec!(8), 1),
        ];
        let by_year = flag_extrema(&rows, Grouping::Year);
        assert!(by_year[0].is_period_high && by_year[0].is_period_low);
        assert_eq!(by_year[1], ExtremumFlag::default());
        assert!(by_year[2].is_period_high && by_year[2].is_period_low);

        let by_month = flag_extrema(&rows, Grouping::Month);
        assert!(by_month.iter().all(|f| f.is_period_high && f.is_period_low));
    }

    #[test]
    fn flagging_is_repeatable() {
        let rows = daily_rows();
        let grouping = Grouping::Week(WeekRule::Calendar);
        assert_eq!(flag_extrema(&rows, grouping), flag_extrema(&rows, grouping));
    }
}

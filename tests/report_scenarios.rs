use rust_decimal_macros::dec;
use stock_trend_report::config::ReportConfig;
use stock_trend_report::error::ReportError;
use stock_trend_report::models::{Bar, Direction, Period, TrendTag};
use stock_trend_report::pipeline::{self, ReportRequest};
use stock_trend_report::render::{self, OutputFormat};
use stock_trend_report::source::{BarSource, CsvBarSource};
use stock_trend_report::trend::FirstRowPolicy;

fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(period: Period, start: chrono::NaiveDate, end: chrono::NaiveDate) -> ReportRequest {
    ReportRequest {
        ticker_id: "2330".to_string(),
        ticker_name: "台積電".to_string(),
        start,
        end,
        period,
    }
}

fn write_bars(dir: &std::path::Path, ticker: &str, rows: &str) {
    let body = format!("date,stock_id,Trading_Volume,max,min\n{rows}");
    std::fs::write(dir.join(format!("{ticker}.csv")), body).unwrap();
}

/// Returns every bar it holds whatever window is asked for.
struct SupersetSource {
    bars: Vec<Bar>,
}

impl BarSource for SupersetSource {
    fn fetch_bars(
        &self,
        _ticker: &str,
        _start: chrono::NaiveDate,
        _end: chrono::NaiveDate,
    ) -> Result<Vec<Bar>, ReportError> {
        Ok(self.bars.clone())
    }
}

#[test]
fn day_report_without_prior_bar() {
    let dir = tempfile::tempdir().unwrap();
    write_bars(
        dir.path(),
        "2330",
        "2024-01-02,2330,100,10,9\n\
         2024-01-03,2330,80,12,10\n\
         2024-01-04,2330,80,11,10\n\
         2024-01-05,2330,120,13,11\n",
    );
    let source = CsvBarSource::new(dir.path());

    let report = pipeline::generate(
        &source,
        &request(Period::Day, date(2024, 1, 2), date(2024, 1, 5)),
        &ReportConfig::default(),
        date(2030, 1, 1),
    )
    .unwrap();

    let tags: Vec<TrendTag> = report.rows().map(|row| row.trend).collect();
    let up = Direction::Up;
    let down = Direction::Down;
    assert_eq!(
        tags,
        vec![
            TrendTag { high: up, low: up, range: up, volume: up },
            TrendTag { high: up, low: up, range: up, volume: down },
            TrendTag { high: down, low: up, range: down, volume: up },
            TrendTag { high: up, low: up, range: up, volume: up },
        ]
    );
}

#[test]
fn neutral_first_row_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    write_bars(dir.path(), "2330", "2024-01-02,2330,100,10,9\n2024-01-03,2330,80,12,10\n");
    let config = ReportConfig {
        first_row: FirstRowPolicy::Neutral,
        ..ReportConfig::default()
    };

    let report = pipeline::generate(
        &CsvBarSource::new(dir.path()),
        &request(Period::Day, date(2024, 1, 2), date(2024, 1, 3)),
        &config,
        date(2030, 1, 1),
    )
    .unwrap();
    assert_eq!(report.rows().next().unwrap().trend, TrendTag::uniform(Direction::Neutral));
}

#[test]
fn day_report_compares_first_row_with_previous_trading_day() {
    let dir = tempfile::tempdir().unwrap();
    write_bars(
        dir.path(),
        "2330",
        "2023-12-29,2330,500,11,8\n\
         2024-01-02,2330,100,10,9\n\
         2024-01-03,2330,80,12,10\n",
    );

    let report = pipeline::generate(
        &CsvBarSource::new(dir.path()),
        &request(Period::Day, date(2024, 1, 2), date(2024, 1, 3)),
        &ReportConfig::default(),
        date(2030, 1, 1),
    )
    .unwrap();
    assert_eq!(report.baseline.unwrap().period_end, date(2023, 12, 29));
    let first = report.rows().next().unwrap().trend;
    assert_eq!(first.high, Direction::Down);
    assert_eq!(first.low, Direction::Up);
    assert_eq!(first.range, Direction::Down);
    assert_eq!(first.volume, Direction::Down);
}

#[test]
fn week_report_folds_iso_week_five() {
    let dir = tempfile::tempdir().unwrap();
    write_bars(
        dir.path(),
        "2330",
        "2024-01-29,2330,10,100,95\n\
         2024-01-30,2330,20,104,97\n\
         2024-01-31,2330,30,103,93\n\
         2024-02-01,2330,40,101,96\n\
         2024-02-02,2330,50,102,98\n",
    );

    let report = pipeline::generate(
        &CsvBarSource::new(dir.path()),
        &request(Period::Week, date(2024, 1, 30), date(2024, 2, 1)),
        &ReportConfig::default(),
        date(2030, 1, 1),
    )
    .unwrap();
    assert_eq!(report.start, date(2024, 1, 29));
    assert_eq!(report.end, date(2024, 2, 4));
    assert_eq!(report.title, "台積電 2024-01-29～2024-02-04（週）");

    let rows: Vec<_> = report.rows().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].summary.high, dec!(104));
    assert_eq!(rows[0].summary.low, dec!(93));
    assert_eq!(rows[0].summary.volume, 150);
    assert_eq!(rows[0].summary.period_end, date(2024, 2, 2));
}

#[test]
fn month_baseline_uses_only_february() {
    let source = SupersetSource {
        bars: vec![
            Bar::new(date(2024, 1, 31), dec!(500), dec!(1), 9_999),
            Bar::new(date(2024, 2, 1), dec!(20), dec!(15), 100),
            Bar::new(date(2024, 2, 29), dec!(22), dec!(16), 200),
            Bar::new(date(2024, 3, 1), dec!(30), dec!(25), 300),
            Bar::new(date(2024, 3, 4), dec!(31), dec!(24), 400),
        ],
    };

    let report = pipeline::generate(
        &source,
        &request(Period::Month, date(2024, 3, 1), date(2024, 3, 31)),
        &ReportConfig::default(),
        date(2030, 1, 1),
    )
    .unwrap();

    let baseline = report.baseline.unwrap();
    assert_eq!(baseline.high, dec!(22));
    assert_eq!(baseline.low, dec!(15));
    assert_eq!(baseline.volume, 300);
    assert_eq!(baseline.bar_count, 2);

    let rows: Vec<_> = report.rows().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].summary.volume, 700);
    // range 7 vs 7 ties up; low 24 vs 15 up
    assert_eq!(rows[0].trend, TrendTag::uniform(Direction::Up));
}

#[test]
fn empty_range_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    write_bars(dir.path(), "2330", "");

    let err = pipeline::generate(
        &CsvBarSource::new(dir.path()),
        &request(Period::Day, date(2024, 1, 2), date(2024, 1, 5)),
        &ReportConfig::default(),
        date(2030, 1, 1),
    )
    .unwrap_err();
    assert!(matches!(err, ReportError::NoData { .. }));
}

#[test]
fn one_hundred_thirty_days_make_two_sheets() {
    let start = date(2024, 1, 1);
    let bars: Vec<Bar> = (0..130)
        .map(|i| Bar::new(start + chrono::Duration::days(i), dec!(10), dec!(9), 1))
        .collect();
    let source = SupersetSource { bars };
    let end = start + chrono::Duration::days(129);

    let report = pipeline::generate(
        &source,
        &request(Period::Day, start, end),
        &ReportConfig::default(),
        date(2030, 1, 1),
    )
    .unwrap();
    assert_eq!(report.page_count(), 2);
    assert_eq!(report.pages[1].blocks.len(), 1);
    assert_eq!(report.pages[1].blocks[0].rows.len(), 1);

    let out = tempfile::tempdir().unwrap();
    let path = render::write_report(&report, out.path(), OutputFormat::Json).unwrap();
    let sheets: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(sheets.as_array().unwrap().len(), 2);
    assert_eq!(sheets[1]["name"], "日報表2");
    assert_eq!(sheets[0]["rows"][0][2]["color"], "FFCC3333");
}

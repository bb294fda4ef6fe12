use stock_trend_report::{cli, pipeline, progress, source, ticker, utils};

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments and the report configuration.
/// 2. Validates input/output paths and the requested range.
/// 3. Resolves display names from the ticker list.
/// 4. Determines the number of threads to use.
/// 5. Generates and writes one report per symbol.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let total_start = std::time::Instant::now();
    let args = cli::Args::parse()?;
    let config = args.report_config()?;

    if !args.input.is_dir() {
        return Err(anyhow::anyhow!("Input directory does not exist: {}", args.input.display()));
    }
    std::fs::create_dir_all(&args.output)?;
    if args.symbols.is_empty() {
        return Err(anyhow::anyhow!("No symbols given"));
    }

    let today = chrono::Local::now().date_naive();
    let end = args.end.unwrap_or(today);
    utils::validate_range(args.period, args.start, end)?;
    let mut catalog = match &args.tickers {
        Some(path) => ticker::TickerCatalog::new(path),
        None => ticker::TickerCatalog::empty(),
    };
    let requests = args
        .symbols
        .iter()
        .map(|symbol| -> anyhow::Result<pipeline::ReportRequest> {
            Ok(pipeline::ReportRequest {
                ticker_id: symbol.clone(),
                ticker_name: catalog.display_name(symbol)?,
                start: args.start,
                end,
                period: args.period,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let effective_threads = match args.threads {
        Some(n) => {
            let max_threads = num_cpus::get();
            if n > max_threads {
                tracing::warn!("Limiting thread count to {} (max available)", max_threads);
                max_threads
            } else { n }
        }
        None => rayon::current_num_threads(),
    };
    tracing::info!(
        "Generating {} {} report(s) from {} to {} on {} thread(s)",
        requests.len(),
        args.period,
        utils::format_date(args.start),
        utils::format_date(end),
        effective_threads
    );

    let bars = source::CsvBarSource::new(&args.input);
    let outcomes = if args.threads.is_some() {
        let local_pool = utils::configure_thread_pool(effective_threads)?;
        local_pool.install(|| progress::process_reports(&bars, &requests, &config, today, &args.output, args.format))?
    } else {
        progress::process_reports(&bars, &requests, &config, today, &args.output, args.format)?
    };

    for outcome in &outcomes {
        match outcome {
            progress::BatchOutcome::Written(path) => tracing::info!("✅ {}", path.display()),
            progress::BatchOutcome::NoData(symbol) => tracing::warn!("⚠️ No data for {}", symbol),
        }
    }
    tracing::info!(
        "Reports completed in {:?} seconds",
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}

use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{error, info, warn};

use nse_oi_tracker::analyzer::{self, OiByStrike};
use nse_oi_tracker::config::{self, Settings};
use nse_oi_tracker::error::TrackerError;
use nse_oi_tracker::logging;
use nse_oi_tracker::models::{OptionChain, OptionChainSnapshot};
use nse_oi_tracker::nse_client::NseClient;
use nse_oi_tracker::sinks::{self, ConsoleSink, LevelSink, PineScriptSink, TickReport};

/// One fetch-analyze-emit pass. Returns the OI state for the next tick; any
/// error aborts this tick only.
fn run_tick(
    settings: &Settings,
    snapshot: &OptionChainSnapshot,
    previous_oi: &OiByStrike,
    sinks: &mut [Box<dyn LevelSink>],
) -> Result<OiByStrike, TrackerError> {
    let analysis = analyzer::analyze(snapshot, settings.strike_gap, settings.strike_range)?;

    let rows = analyzer::collect_window(
        snapshot,
        analysis.atm_strike,
        settings.strike_gap,
        settings.strike_range,
    );
    let (next_oi, rows) = analyzer::track_oi_deltas(previous_oi, &rows);

    let report = TickReport {
        timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        symbol: settings.symbol.clone(),
        spot: snapshot.spot,
        analysis,
        rows,
    };

    // Sinks are independent: one failing must not starve the others
    for sink in sinks.iter_mut() {
        if let Err(e) = sink.emit(&report) {
            warn!(sink = sink.name(), error = %e, "sink write failed");
        }
    }

    Ok(next_oi)
}

/// Poll the NSE API on the refresh interval until interrupted.
async fn run_live(settings: &Settings) -> Result<()> {
    let client = NseClient::new()?;
    let mut sinks = sinks::default_sinks(settings);
    let mut previous_oi = OiByStrike::new();

    // Delay keeps ticks run-to-completion: a fetch outliving the interval
    // pushes the next tick back instead of overlapping it
    let mut ticker = tokio::time::interval(Duration::from_secs(settings.refresh_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    println!(
        "{}",
        format!("{} OI Signal Tracker running...", settings.symbol)
            .green()
            .bold()
    );
    info!(
        symbol = %settings.symbol,
        gap = settings.strike_gap,
        range = settings.strike_range,
        refresh_secs = settings.refresh_secs,
        "tracker started"
    );

    loop {
        ticker.tick().await;

        let snapshot = match client.fetch_snapshot(&settings.symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "option chain fetch failed, skipping tick");
                continue;
            }
        };

        match run_tick(settings, &snapshot, &previous_oi, &mut sinks) {
            Ok(next_oi) => previous_oi = next_oi,
            Err(e) => error!(error = %e, "analysis failed, skipping tick"),
        }
    }
}

/// Run one tick from a saved chain JSON (no network) and exit. Emits to the
/// console and Pine sinks only.
fn run_sample(settings: &Settings) -> Result<()> {
    let raw = std::fs::read_to_string(&settings.sample_file)
        .with_context(|| format!("Failed to read sample file {}", settings.sample_file))?;
    let chain: OptionChain =
        serde_json::from_str(&raw).context("Failed to parse sample option chain")?;

    let mut sinks: Vec<Box<dyn LevelSink>> = vec![
        Box::new(ConsoleSink),
        Box::new(PineScriptSink::new(settings.pine_file.clone())),
    ];

    run_tick(settings, &chain.to_snapshot(), &OiByStrike::new(), &mut sinks)?;

    println!("{} Pine script written to {}", "✓".green(), settings.pine_file);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let settings = Settings::from_env();
    let mode = config::get_execution_mode();

    println!("{}", "=".repeat(60).blue());
    println!("{}", "NSE OI Level Tracker".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    match mode.as_str() {
        "live" => run_live(&settings).await?,
        "sample" => run_sample(&settings)?,
        _ => {
            eprintln!("Invalid mode '{}'. Use 'live' or 'sample'", mode);
            eprintln!("Set NSE_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  NSE_MODE=live NSE_SYMBOL=NIFTY cargo run");
            eprintln!("  NSE_MODE=sample NSE_SAMPLE_FILE=sample_nifty.json cargo run");
            std::process::exit(1);
        }
    }

    Ok(())
}

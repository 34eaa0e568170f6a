//! pnl-tracker
//!
//! Reads trades and prices, writes the P&L report and logs a portfolio
//! summary. Configuration comes from the environment (see `TrackerConfig`).

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_tracker::{
    ConsoleListener, HoldingsCalculator, ReportFormatter, ThresholdAlertListener, TrackerConfig,
    TradeLedger, ingest, report,
};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = TrackerConfig::from_env()?;

    tracing::info!("=== Crypto Portfolio Tracker Started ===");
    run(&config);
    Ok(())
}

/// One full run. Failures are logged here and never escape.
fn run(config: &TrackerConfig) {
    let prices = Arc::new(ingest::load_prices(&config.prices_file));

    let mut calculator = HoldingsCalculator::new(prices);
    calculator.add_listener(ConsoleListener::new(config.conversion.clone()));
    calculator.add_listener(ThresholdAlertListener::new(
        &config.alerts_file,
        config.alert_threshold,
        config.conversion.clone(),
    ));
    tracing::info!("Registered {} price listeners: {:?}", calculator.alerts().len(), calculator.alerts().names());

    let mut ledger = TradeLedger::new();
    if let Err(e) = ingest::load_trades(&config.trades_file, &mut ledger) {
        tracing::error!(path = %config.trades_file.display(), "Error: {e}");
        return;
    }

    // Valued once; export and summary share the same pass
    let valuation = match calculator.compute_holdings(&ledger) {
        Ok(valuation) => valuation,
        Err(e) => {
            tracing::error!("Valuation failed: {e}");
            tracing::error!("No report generated");
            return;
        }
    };

    let formatter = ReportFormatter::new(config.conversion.clone());
    let lines = match formatter.format(&valuation) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::error!("Report formatting failed: {e}");
            tracing::error!("No report generated");
            return;
        }
    };

    match report::write_report(&config.report_file, &lines, config.report_format) {
        Ok(()) => tracing::info!("Report generated: {}", config.report_file.display()),
        Err(e) => tracing::error!("I/O error while exporting report: {e}"),
    }

    match formatter.summary(&valuation) {
        Ok(summary) => tracing::info!("{summary}"),
        Err(e) => tracing::error!("Portfolio summary failed: {e}"),
    }
}

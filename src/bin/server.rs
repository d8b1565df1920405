//! Rustscreen Server - Headless crypto screener
//!
//! Scans every tradable USDT perpetual on Bybit on a fixed interval, pushes
//! new signals to Telegram and prints the visible list as structured JSON
//! to stdout.
//!
//! # Usage
//! ```sh
//! cargo run --bin server              # periodic scanning until Ctrl+C
//! cargo run --bin server -- --once    # a single scan cycle
//! cargo run --bin server -- --mock    # scripted demo market, no network
//! ```
//!
//! # Environment Variables
//! - `BYBIT_TESTNET` / `BYBIT_BASE_URL` - Exchange endpoint
//! - `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID` - Notifications (optional)
//! - `SCAN_INTERVAL_SECONDS` - Seconds between scans (default: 300)
//! - `OBSERVABILITY_ENABLED` - Print signal snapshots (default: true)

use anyhow::Result;
use clap::Parser;
use rustscreen::application::agents::{ScanOutcome, ScreeningEngine};
use rustscreen::config::Config;
use rustscreen::domain::ports::{MarketDataService, SignalSubscriber};
use rustscreen::domain::signal::Signal;
use rustscreen::infrastructure::mock::MockMarketDataService;
use rustscreen::infrastructure::observability::SignalReporter;
use rustscreen::infrastructure::{BybitMarketDataService, TelegramNotifier};
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run a single scan cycle and exit
    #[arg(long)]
    once: bool,

    /// Use the scripted demo market instead of Bybit
    #[arg(long)]
    mock: bool,
}

/// Subscriber used when JSON reporting is disabled
struct QuietSubscriber;

impl SignalSubscriber for QuietSubscriber {
    fn on_signals(&self, signals: &[Signal]) {
        info!("{} signals visible", signals.len());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Rustscreen Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Category={}, Quote={}, Interval={}s, Telegram={}",
        config.bybit.category,
        config.bybit.quote_coin,
        config.screener.scan_interval_seconds,
        config.telegram.is_configured()
    );

    let market_data: Arc<dyn MarketDataService> = if args.mock {
        info!("Market data: MOCK (demo market)");
        Arc::new(MockMarketDataService::demo())
    } else {
        info!("Market data: Bybit ({})", config.bybit.base_url);
        Arc::new(
            BybitMarketDataService::builder()
                .base_url(config.bybit.base_url.clone())
                .category(config.bybit.category.clone())
                .quote_coin(config.bybit.quote_coin.clone())
                .build(),
        )
    };

    let notifier = Arc::new(TelegramNotifier::new(config.telegram.clone()));
    let subscriber: Arc<dyn SignalSubscriber> = if config.observability.enabled {
        Arc::new(SignalReporter::new())
    } else {
        info!("Signal reporting disabled.");
        Arc::new(QuietSubscriber)
    };

    let engine = Arc::new(ScreeningEngine::new(
        market_data,
        notifier,
        config.screener.analyzer_config(),
        config.screener.screener_config(),
    ));

    if args.once {
        engine.initialize().await?;
        match engine.run_scan_cycle().await {
            ScanOutcome::Completed(report) => info!(
                "Scan finished: {} symbols, {} signals, {} new",
                report.symbols_scanned, report.signals_found, report.new_signals
            ),
            other => warn!("Scan did not complete: {:?}", other),
        }
        subscriber.on_signals(&engine.get_visible_signals().await);
        return Ok(());
    }

    engine.start(subscriber).await;
    info!("Server running. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Waiting for the current scan...");
    engine.stop().await;

    Ok(())
}

use crate::application::agents::analyzer::{AnalyzerConfig, SymbolAnalyzer};
use crate::application::agents::signal_store::{SignalStore, SignalStoreConfig};
use crate::domain::ports::{MarketDataService, SignalNotifier, SignalSubscriber};
use crate::domain::signal::Signal;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    /// Symbols analysed concurrently
    pub batch_size: usize,
    /// Pause between batches to stay under exchange rate limits
    pub batch_delay: Duration,
    pub scan_interval: Duration,
    pub store: SignalStoreConfig,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_delay: Duration::from_millis(200),
            scan_interval: Duration::from_secs(5 * 60),
            store: SignalStoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub symbols_scanned: usize,
    pub signals_found: usize,
    pub new_signals: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanReport),
    /// Another scan was already running; this trigger was dropped
    Skipped,
    Failed,
}

struct Driver {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Clears the scan flag when the scan ends, however it ends.
struct ScanGuard<'a>(&'a AtomicBool);

impl<'a> ScanGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the instrument list, the signal store and the periodic scan loop.
pub struct ScreeningEngine {
    market_data: Arc<dyn MarketDataService>,
    notifier: Arc<dyn SignalNotifier>,
    analyzer: SymbolAnalyzer,
    config: ScreenerConfig,
    instruments: RwLock<Vec<String>>,
    store: RwLock<SignalStore>,
    is_scanning: AtomicBool,
    driver: Mutex<Option<Driver>>,
}

impl ScreeningEngine {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        notifier: Arc<dyn SignalNotifier>,
        analyzer_config: AnalyzerConfig,
        config: ScreenerConfig,
    ) -> Self {
        Self {
            analyzer: SymbolAnalyzer::new(market_data.clone(), analyzer_config),
            market_data,
            notifier,
            store: RwLock::new(SignalStore::new(config.store)),
            config,
            instruments: RwLock::new(Vec::new()),
            is_scanning: AtomicBool::new(false),
            driver: Mutex::new(None),
        }
    }

    /// Loads the tradable instrument list. Returns the number of symbols.
    pub async fn initialize(&self) -> Result<usize> {
        info!("ScreeningEngine: Loading tradable instruments...");
        let symbols = self
            .market_data
            .list_tradable_symbols()
            .await
            .context("Failed to load tradable instruments")?;

        let count = symbols.len();
        *self.instruments.write().await = symbols;
        info!("ScreeningEngine: Loaded {} instruments", count);
        Ok(count)
    }

    pub fn is_scanning(&self) -> bool {
        self.is_scanning.load(Ordering::Acquire)
    }

    /// Runs one scan cycle unless one is already in progress.
    pub async fn run_scan_cycle(&self) -> ScanOutcome {
        let Some(_guard) = ScanGuard::acquire(&self.is_scanning) else {
            info!("ScreeningEngine: Scan already in progress, skipping");
            return ScanOutcome::Skipped;
        };

        info!("ScreeningEngine: Starting market scan...");
        match self.scan().await {
            Ok(report) => {
                info!(
                    "ScreeningEngine: Scan completed. {} symbols, {} signals, {} new",
                    report.symbols_scanned, report.signals_found, report.new_signals
                );
                ScanOutcome::Completed(report)
            }
            Err(e) => {
                error!("ScreeningEngine: Market scan failed: {:#}", e);
                self.report_error(&e).await;
                ScanOutcome::Failed
            }
        }
    }

    /// Visible signals, strong first, then newest first.
    pub async fn get_visible_signals(&self) -> Vec<Signal> {
        self.store.read().await.ranked()
    }

    /// Starts periodic scanning. The first scan runs immediately; the
    /// subscriber receives the visible list after every cycle.
    pub async fn start(self: &Arc<Self>, subscriber: Arc<dyn SignalSubscriber>) {
        let mut driver = self.driver.lock().await;
        if driver.is_some() {
            warn!("ScreeningEngine: Already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let engine = Arc::clone(self);

        let handle = tokio::spawn(async move {
            if let Err(e) = engine.initialize().await {
                error!("ScreeningEngine: Failed to initialize: {:#}", e);
                engine.report_error(&e).await;
            }

            let mut interval = time::interval(engine.config.scan_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        engine.run_scan_cycle().await;
                        let signals = engine.get_visible_signals().await;
                        subscriber.on_signals(&signals);
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("ScreeningEngine: Stopped");
        });

        info!(
            "ScreeningEngine: Started with {:?} scan interval",
            self.config.scan_interval
        );
        *driver = Some(Driver {
            shutdown_tx,
            handle,
        });
    }

    /// Stops periodic scanning, letting an in-flight scan finish first.
    pub async fn stop(&self) {
        let Some(driver) = self.driver.lock().await.take() else {
            return;
        };

        let _ = driver.shutdown_tx.send(true);
        if let Err(e) = driver.handle.await {
            warn!("ScreeningEngine: Scan loop ended abnormally: {}", e);
        }
    }

    async fn scan(&self) -> Result<ScanReport> {
        if self.instruments.read().await.is_empty() {
            self.initialize().await?;
        }
        let symbols = self.instruments.read().await.clone();
        let batch_size = self.config.batch_size.max(1);
        let batch_count = symbols.len().div_ceil(batch_size);

        let mut found = Vec::new();
        for (i, batch) in symbols.chunks(batch_size).enumerate() {
            let results = join_all(batch.iter().map(|symbol| self.analyzer.analyze(symbol))).await;
            found.extend(results.into_iter().flatten());

            if i + 1 < batch_count && !self.config.batch_delay.is_zero() {
                time::sleep(self.config.batch_delay).await;
            }
        }

        let signals_found = found.len();
        let fresh = self.store.write().await.ingest(found);

        if !fresh.is_empty()
            && let Err(e) = self.notifier.notify_batch(&fresh).await
        {
            warn!("ScreeningEngine: Failed to send signal notifications: {:#}", e);
        }

        Ok(ScanReport {
            symbols_scanned: symbols.len(),
            signals_found,
            new_signals: fresh.len(),
        })
    }

    async fn report_error(&self, error: &anyhow::Error) {
        if let Err(e) = self.notifier.notify_error(&format!("{:#}", error)).await {
            warn!("ScreeningEngine: Failed to send error notification: {:#}", e);
        }
    }
}

//! Fixed-period scheduler driving the wallet scanner

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::wallet_scanner::{ScanReport, WalletScanner};

/// Monitoring statistics
#[derive(Debug, Clone)]
pub struct MonitorStats {
    pub start_time: Instant,
    pub scans: u64,
    pub failed_scans: u64,
    pub sells_attempted: u64,
    pub sells_succeeded: u64,
}

impl MonitorStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            scans: 0,
            failed_scans: 0,
            sells_attempted: 0,
            sells_succeeded: 0,
        }
    }

    pub fn record(&mut self, result: Option<&ScanReport>) {
        self.scans += 1;
        match result {
            Some(report) => {
                self.sells_attempted += report.outcomes.len() as u64;
                self.sells_succeeded += report.sells_succeeded() as u64;
            }
            None => self.failed_scans += 1,
        }
    }

    pub fn get_uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for MonitorStats {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Monitor {
    scanner: WalletScanner,
    interval: Duration,
    stats: MonitorStats,
}

impl Monitor {
    pub fn new(scanner: WalletScanner, interval: Duration) -> Self {
        Self {
            scanner,
            interval,
            stats: MonitorStats::new(),
        }
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Run a single scan; an enumeration failure is logged, not returned
    pub async fn run_once(&mut self) -> Option<ScanReport> {
        let report = match self.scanner.scan().await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Scan aborted, retrying next tick: {}", e);
                None
            }
        };
        self.stats.record(report.as_ref());
        report
    }

    /// Scan every `interval` until `shutdown` resolves.
    ///
    /// Each scan is awaited to completion before the next tick is taken, and
    /// ticks missed meanwhile are skipped, so two scans never overlap. The
    /// shutdown signal is only observed between scans; an in-flight sell is
    /// never cancelled.
    pub async fn run<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Monitoring every {:?}", self.interval);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested, stopping after {} scans", ticks);
                    break;
                }
                _ = interval.tick() => {}
            }

            ticks += 1;
            let scan_start = Instant::now();
            self.run_once().await;

            if scan_start.elapsed() > self.interval {
                warn!(
                    "Scan took {:?}, longer than the {:?} interval; missed ticks skipped",
                    scan_start.elapsed(),
                    self.interval
                );
            }
        }

        info!(
            scans = self.stats.scans,
            failed_scans = self.stats.failed_scans,
            sells_attempted = self.stats.sells_attempted,
            sells_succeeded = self.stats.sells_succeeded,
            uptime_secs = self.stats.get_uptime().as_secs(),
            "Monitor stopped"
        );
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::{AppContext, TradeSettings};
    use crate::infrastructure::blockchain::transaction_executor::ExecutionConfig;
    use crate::shared::errors::LedgerError;
    use crate::testing::{unsigned_swap_transaction, MockAggregator, MockLedger};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::{Keypair, Signer};
    use std::sync::Arc;

    fn monitor(
        wallet: Arc<Keypair>,
        ledger: Arc<MockLedger>,
        aggregator: Arc<MockAggregator>,
        watch_list: &[Pubkey],
        interval: Duration,
    ) -> Monitor {
        let ctx = AppContext {
            wallet,
            ledger,
            aggregator,
            settings: TradeSettings {
                target_mint: Pubkey::new_unique(),
                watch_list: watch_list.iter().copied().collect(),
                slippage_bps: 50,
                interval,
                only_direct_routes: true,
                decimals_timeout: Duration::from_millis(50),
            },
            execution: ExecutionConfig {
                confirm_timeout: Duration::from_millis(500),
                poll_interval: Duration::from_millis(5),
                ..ExecutionConfig::default()
            },
        };
        Monitor::new(WalletScanner::new(&ctx), interval)
    }

    async fn after_enumerations(ledger: Arc<MockLedger>, count: usize) {
        while ledger.enumerations() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn test_scans_never_overlap() {
        let wallet = Arc::new(Keypair::new());
        let x = Pubkey::new_unique();
        let ledger = Arc::new(MockLedger::new().with_balance(x, 10).with_decimals(x, 1));
        // each sell outlasts the interval
        let aggregator = Arc::new(
            MockAggregator::new()
                .with_routes(vec![(10, 1)])
                .with_swap_transaction(unsigned_swap_transaction(&wallet.pubkey()))
                .with_swap_delay(Duration::from_millis(30)),
        );
        let mut monitor = monitor(
            wallet,
            ledger.clone(),
            aggregator,
            &[x],
            Duration::from_millis(10),
        );

        let ticks = monitor.run(after_enumerations(ledger.clone(), 3)).await;

        assert_eq!(ticks, 3);
        assert_eq!(
            ledger.events(),
            vec![
                "enumerate", "submit", "confirmed",
                "enumerate", "submit", "confirmed",
                "enumerate", "submit", "confirmed",
            ]
        );
        assert_eq!(monitor.stats().sells_succeeded, 3);
    }

    #[tokio::test]
    async fn test_enumeration_failure_does_not_stop_monitor() {
        let wallet = Arc::new(Keypair::new());
        let ledger = Arc::new(MockLedger::new().with_enumeration_error(LedgerError::Timeout));
        let mut monitor = monitor(
            wallet,
            ledger.clone(),
            Arc::new(MockAggregator::new()),
            &[],
            Duration::from_millis(5),
        );

        let ticks = monitor.run(after_enumerations(ledger.clone(), 2)).await;

        assert_eq!(ticks, 2);
        assert_eq!(monitor.stats().scans, 2);
        assert_eq!(monitor.stats().failed_scans, 2);
    }

    #[tokio::test]
    async fn test_run_once_zero_sells_for_empty_holding() {
        let wallet = Arc::new(Keypair::new());
        let x = Pubkey::new_unique();
        let ledger = Arc::new(MockLedger::new().with_balance(x, 0).with_decimals(x, 6));
        let mut monitor = monitor(
            wallet,
            ledger,
            Arc::new(MockAggregator::new()),
            &[x],
            Duration::from_secs(60),
        );

        let report = monitor.run_once().await.unwrap();
        assert!(report.outcomes.is_empty());
        assert_eq!(monitor.stats().sells_attempted, 0);
    }
}

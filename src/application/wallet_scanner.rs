//! Wallet scan: enumerate balances and sell watch-listed holdings

use solana_sdk::{pubkey::Pubkey, signature::Signer};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, Instrument};

use super::context::AppContext;
use super::token_seller::TokenSeller;
use crate::infrastructure::blockchain::rpc_client::LedgerClient;
use crate::infrastructure::blockchain::token_metadata::DecimalsResolver;
use crate::shared::errors::{DecimalsError, ScanError};
use crate::shared::types::{Holding, SwapOutcome, TokenBalance};
use crate::shared::utils::{generate_id, short_pubkey};

/// What one scan saw and did
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub scan_id: String,
    pub enumerated: usize,
    pub watched: usize,
    pub skipped: Vec<DecimalsError>,
    pub outcomes: Vec<SwapOutcome>,
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn sells_succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }
}

/// A balance is worth selling when its mint is watched and it is non-empty
pub fn is_sell_candidate(balance: &TokenBalance, watch_list: &HashSet<Pubkey>) -> bool {
    balance.raw_amount > 0 && watch_list.contains(&balance.mint)
}

pub struct WalletScanner {
    ledger: Arc<dyn LedgerClient>,
    owner: Pubkey,
    watch_list: HashSet<Pubkey>,
    decimals: DecimalsResolver,
    seller: TokenSeller,
}

impl WalletScanner {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            ledger: ctx.ledger.clone(),
            owner: ctx.wallet.pubkey(),
            watch_list: ctx.settings.watch_list.clone(),
            decimals: DecimalsResolver::new(ctx.ledger.clone(), ctx.settings.decimals_timeout),
            seller: TokenSeller::new(ctx),
        }
    }

    /// Run one scan. Holdings are sold one after another; only a failed
    /// enumeration fails the scan as a whole.
    pub async fn scan(&self) -> Result<ScanReport, ScanError> {
        let scan_id = generate_id();
        let span = info_span!("scan", scan_id = %scan_id);
        self.scan_inner(scan_id).instrument(span).await
    }

    async fn scan_inner(&self, scan_id: String) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        info!("Scanning wallet {}", short_pubkey(&self.owner));

        let balances = self
            .ledger
            .token_balances(&self.owner)
            .await
            .map_err(ScanError::Enumeration)?;

        let mut report = ScanReport {
            scan_id,
            enumerated: balances.len(),
            watched: 0,
            skipped: Vec::new(),
            outcomes: Vec::new(),
            elapsed: Duration::ZERO,
        };

        for balance in &balances {
            if !is_sell_candidate(balance, &self.watch_list) {
                debug!(mint = %balance.mint, raw_amount = balance.raw_amount, "Not a sell candidate");
                continue;
            }
            report.watched += 1;

            let decimals = match self.decimals.resolve(&balance.mint).await {
                Ok(decimals) => decimals,
                Err(e) => {
                    report.skipped.push(e);
                    continue;
                }
            };

            let holding = Holding::new(balance.mint, balance.raw_amount, decimals);
            let display_amount = match holding.display_amount() {
                Ok(amount) => amount,
                Err(e) => {
                    error!(mint = %holding.mint, "Skipping holding: {}", e);
                    continue;
                }
            };
            if display_amount.is_zero() {
                continue;
            }

            info!(mint = %holding.mint, amount = %display_amount, "Watched holding found");
            let outcome = self.seller.sell(&holding.mint, display_amount).await;
            report.outcomes.push(outcome);
        }

        report.elapsed = start.elapsed();
        info!(
            enumerated = report.enumerated,
            watched = report.watched,
            skipped = report.skipped.len(),
            sold = report.sells_succeeded(),
            elapsed_secs = report.elapsed.as_secs_f64(),
            "Scan complete"
        );

        Ok(report)
    }
}

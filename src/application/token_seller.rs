//! Sell one holding into the target mint

use chrono::Utc;
use rust_decimal::Decimal;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

use super::context::AppContext;
use crate::exchanges::route_finder::RouteFinder;
use crate::infrastructure::blockchain::token_metadata::DecimalsResolver;
use crate::infrastructure::blockchain::transaction_executor::SwapExecutor;
use crate::shared::errors::{AmountError, SellError};
use crate::shared::types::SwapOutcome;
use crate::shared::utils::to_smallest_unit;

pub struct TokenSeller {
    decimals: DecimalsResolver,
    routes: RouteFinder,
    executor: SwapExecutor,
    target_mint: Pubkey,
    slippage_bps: u16,
}

impl TokenSeller {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            decimals: DecimalsResolver::new(ctx.ledger.clone(), ctx.settings.decimals_timeout),
            routes: RouteFinder::new(ctx.aggregator.clone(), ctx.settings.only_direct_routes),
            executor: SwapExecutor::new(
                ctx.ledger.clone(),
                ctx.aggregator.clone(),
                ctx.wallet.clone(),
                ctx.execution.clone(),
            ),
            target_mint: ctx.settings.target_mint,
            slippage_bps: ctx.settings.slippage_bps,
        }
    }

    /// One sell attempt for `display_amount` of `mint`; never retried here
    pub async fn sell(&self, mint: &Pubkey, display_amount: Decimal) -> SwapOutcome {
        let span = info_span!("sell", mint = %mint);
        async move {
            let started_at = Utc::now();
            let start = Instant::now();
            let mut amount_raw = None;

            info!("Selling {} of {} into {}", display_amount, mint, self.target_mint);
            let result = self.try_sell(mint, display_amount, &mut amount_raw).await;

            let (signature, failure) = match result {
                Ok(signature) => (Some(signature), None),
                Err(e) => (None, Some(e)),
            };
            let outcome = SwapOutcome {
                mint: *mint,
                amount_raw,
                signature,
                failure,
                started_at,
                elapsed: start.elapsed(),
            };

            match (&outcome.signature, &outcome.failure) {
                (Some(signature), None) => info!(
                    status = "SUCCESS",
                    %signature,
                    elapsed_secs = outcome.elapsed_seconds(),
                    "Sold {} of {}",
                    display_amount,
                    mint
                ),
                (_, Some(e)) => error!(
                    stage = e.stage(),
                    elapsed_secs = outcome.elapsed_seconds(),
                    "Sell of {} failed: {}",
                    mint,
                    e
                ),
                (None, None) => {}
            }

            outcome
        }
        .instrument(span)
        .await
    }

    async fn try_sell(
        &self,
        mint: &Pubkey,
        display_amount: Decimal,
        amount_raw: &mut Option<u64>,
    ) -> Result<Signature, SellError> {
        if *mint == self.target_mint {
            return Err(SellError::SameMint);
        }

        let decimals = self.decimals.resolve(mint).await?;
        let amount = to_smallest_unit(display_amount, decimals)?;
        if amount == 0 {
            return Err(AmountError::BelowSmallestUnit {
                amount: display_amount.to_string(),
                decimals,
            }
            .into());
        }
        *amount_raw = Some(amount);

        let route = self
            .routes
            .find_route(mint, &self.target_mint, amount, self.slippage_bps)
            .await?;

        Ok(self.executor.execute(route).await?)
    }
}

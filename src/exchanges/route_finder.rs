//! Best-route selection over the aggregator

use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::{error, info};

use crate::exchanges::api_clients::SwapAggregator;
use crate::exchanges::types::{QuoteRequest, Route};
use crate::shared::errors::RouteError;

pub struct RouteFinder {
    aggregator: Arc<dyn SwapAggregator>,
    only_direct_routes: bool,
}

impl RouteFinder {
    pub fn new(aggregator: Arc<dyn SwapAggregator>, only_direct_routes: bool) -> Self {
        Self {
            aggregator,
            only_direct_routes,
        }
    }

    /// Quote `amount` smallest units of `input_mint` and take the
    /// aggregator's top-ranked candidate as-is.
    pub async fn find_route(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<Route, RouteError> {
        let request = QuoteRequest {
            input_mint: *input_mint,
            output_mint: *output_mint,
            amount,
            slippage_bps,
            only_direct_routes: self.only_direct_routes,
        };

        let candidates = self.aggregator.quote(&request).await.map_err(|e| {
            log_route_error(input_mint, &e);
            e
        })?;
        let count = candidates.len();

        match candidates.into_iter().next() {
            Some(route) => {
                info!(
                    mint = %input_mint,
                    candidates = count,
                    in_amount = route.in_amount,
                    out_amount = route.out_amount,
                    price_impact_pct = route.price_impact_pct.unwrap_or_default(),
                    "Route found"
                );
                Ok(route)
            }
            None => {
                log_route_error(input_mint, &RouteError::NoRoute);
                Err(RouteError::NoRoute)
            }
        }
    }
}

fn log_route_error(mint: &Pubkey, err: &RouteError) {
    let kind = match err {
        RouteError::NoRoute => "no-route",
        RouteError::Timeout => "timeout",
        RouteError::Transport(_) => "transport",
        RouteError::Aggregator { .. } => "aggregator",
        RouteError::Malformed(_) => "malformed",
    };
    error!(%mint, stage = "route", kind, "{}", err);
}

pub mod jupiter_client;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::exchanges::types::{QuoteRequest, Route, SwapTransaction};
use crate::shared::errors::{AggregatorError, RouteError};

pub use jupiter_client::JupiterApiClient;

/// Swap aggregator consumed as an opaque HTTP API
#[async_trait]
pub trait SwapAggregator: Send + Sync {
    /// Candidate routes, best first
    async fn quote(&self, request: &QuoteRequest) -> Result<Vec<Route>, RouteError>;

    /// Unsigned transaction executing `route` for `user`
    async fn swap_transaction(
        &self,
        route: &Route,
        user: &Pubkey,
        wrap_unwrap_sol: bool,
    ) -> Result<SwapTransaction, AggregatorError>;
}

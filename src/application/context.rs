//! Process-wide collaborators, built once at startup

use solana_sdk::{pubkey::Pubkey, signature::Keypair};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::exchanges::api_clients::SwapAggregator;
use crate::infrastructure::blockchain::rpc_client::LedgerClient;
use crate::infrastructure::blockchain::transaction_executor::ExecutionConfig;

/// Fixed trading strategy
#[derive(Debug, Clone)]
pub struct TradeSettings {
    pub target_mint: Pubkey,
    pub watch_list: HashSet<Pubkey>,
    pub slippage_bps: u16,
    pub interval: Duration,
    pub only_direct_routes: bool,
    pub decimals_timeout: Duration,
}

/// Explicit context handed to every component instead of globals
#[derive(Clone)]
pub struct AppContext {
    pub wallet: Arc<Keypair>,
    pub ledger: Arc<dyn LedgerClient>,
    pub aggregator: Arc<dyn SwapAggregator>,
    pub settings: TradeSettings,
    pub execution: ExecutionConfig,
}

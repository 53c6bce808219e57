//! Token Sweeper - sells watched SPL tokens from a Solana wallet into a target asset

pub mod app;
pub mod application;
pub mod config;
pub mod exchanges;
pub mod infrastructure;
pub mod shared;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use application::{AppContext, Monitor, TokenSeller, WalletScanner};
pub use config::Config;
pub use exchanges::api_clients::JupiterApiClient;
pub use infrastructure::blockchain::{SolanaRpcClient, SwapExecutor};

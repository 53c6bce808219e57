//! Direct blockchain access: wallet reads, mint metadata and swap submission

pub mod rpc_client;
pub mod token_metadata;
pub mod transaction_executor;

pub use rpc_client::{LedgerClient, SolanaRpcClient};
pub use token_metadata::DecimalsResolver;
pub use transaction_executor::{ExecutionConfig, SwapExecutor};

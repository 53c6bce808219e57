//! Swap transaction executor for Solana

use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_sdk::{
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use super::rpc_client::LedgerClient;
use crate::exchanges::api_clients::SwapAggregator;
use crate::exchanges::types::Route;
use crate::shared::errors::ExecutionError;
use crate::shared::types::{Checkpoint, SignatureState};

/// Transaction execution configuration
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Forwarded to the RPC node as `maxRetries`
    pub max_retries: usize,
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
    pub wrap_unwrap_sol: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            confirm_timeout: Duration::from_secs(90),
            poll_interval: Duration::from_millis(500),
            wrap_unwrap_sol: true,
        }
    }
}

/// Turns a route into a confirmed transaction
pub struct SwapExecutor {
    ledger: Arc<dyn LedgerClient>,
    aggregator: Arc<dyn SwapAggregator>,
    wallet: Arc<Keypair>,
    config: ExecutionConfig,
}

impl SwapExecutor {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        aggregator: Arc<dyn SwapAggregator>,
        wallet: Arc<Keypair>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            ledger,
            aggregator,
            wallet,
            config,
        }
    }

    /// Execute `route`. The route is consumed; the transaction is signed
    /// exactly once and only resubmitted by the node itself.
    pub async fn execute(&self, route: Route) -> Result<Signature, ExecutionError> {
        let result = self.try_execute(route).await;
        if let Err(e) = &result {
            error!(stage = "execute", "Swap execution failed: {}", e);
        }
        result
    }

    async fn try_execute(&self, route: Route) -> Result<Signature, ExecutionError> {
        let swap = self
            .aggregator
            .swap_transaction(&route, &self.wallet.pubkey(), self.config.wrap_unwrap_sol)
            .await?;
        drop(route);

        let unsigned = decode_transaction(&swap.transaction)?;
        let signed = sign_transaction(unsigned, &self.wallet)?;

        let checkpoint = self
            .ledger
            .latest_checkpoint()
            .await
            .map_err(ExecutionError::Checkpoint)?;
        let checkpoint = bound_expiry(checkpoint, swap.last_valid_block_height);

        let signature = self
            .ledger
            .submit_transaction(&signed, self.config.max_retries)
            .await
            .map_err(ExecutionError::Submission)?;
        info!(%signature, "Transaction submitted, awaiting confirmation");

        self.await_confirmation(&signature, &checkpoint).await?;
        Ok(signature)
    }

    /// Poll until confirmed, rejected, expired or timed out
    async fn await_confirmation(
        &self,
        signature: &Signature,
        checkpoint: &Checkpoint,
    ) -> Result<(), ExecutionError> {
        let started = Instant::now();

        loop {
            match self.ledger.signature_state(signature).await {
                Ok(SignatureState::Confirmed) => {
                    info!(%signature, elapsed_ms = started.elapsed().as_millis() as u64, "Transaction confirmed");
                    return Ok(());
                }
                Ok(SignatureState::Failed(reason)) => {
                    return Err(ExecutionError::Rejected {
                        signature: signature.to_string(),
                        reason,
                    });
                }
                Ok(SignatureState::Pending) => {}
                Err(e) => warn!(%signature, "Signature status poll failed: {}", e),
            }

            match self.ledger.block_height().await {
                Ok(height) if height > checkpoint.last_valid_block_height => {
                    return Err(ExecutionError::Expired {
                        signature: signature.to_string(),
                        last_valid_block_height: checkpoint.last_valid_block_height,
                    });
                }
                Ok(_) => {}
                Err(e) => warn!(%signature, "Block height poll failed: {}", e),
            }

            let elapsed = started.elapsed();
            if elapsed >= self.config.confirm_timeout {
                return Err(ExecutionError::ConfirmationTimeout {
                    signature: signature.to_string(),
                    elapsed,
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

/// The transaction carries the aggregator's blockhash; never wait past its expiry
fn bound_expiry(checkpoint: Checkpoint, aggregator_last_valid: Option<u64>) -> Checkpoint {
    match aggregator_last_valid {
        Some(height) if height < checkpoint.last_valid_block_height => Checkpoint {
            last_valid_block_height: height,
            ..checkpoint
        },
        _ => checkpoint,
    }
}

/// Decode a base64 bincode `VersionedTransaction`
pub fn decode_transaction(encoded: &str) -> Result<VersionedTransaction, ExecutionError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ExecutionError::Decode(format!("invalid base64: {}", e)))?;
    bincode::deserialize(&bytes).map_err(|e| ExecutionError::Decode(format!("invalid transaction: {}", e)))
}

/// Sign with the wallet as the single signer
pub fn sign_transaction(
    unsigned: VersionedTransaction,
    wallet: &Keypair,
) -> Result<VersionedTransaction, ExecutionError> {
    VersionedTransaction::try_new(unsigned.message, &[wallet])
        .map_err(|e| ExecutionError::Signing(e.to_string()))
}

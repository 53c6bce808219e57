//! Mint decimals lookup

use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use super::rpc_client::LedgerClient;
use crate::shared::errors::{DecimalsError, LedgerError, UnavailableReason};

/// Reads a mint's decimals from the ledger on every call
pub struct DecimalsResolver {
    ledger: Arc<dyn LedgerClient>,
    timeout: Duration,
}

impl DecimalsResolver {
    pub fn new(ledger: Arc<dyn LedgerClient>, timeout: Duration) -> Self {
        Self { ledger, timeout }
    }

    /// Resolve decimals for `mint`. Failures are logged here; callers must
    /// skip the holding rather than guess a precision.
    pub async fn resolve(&self, mint: &Pubkey) -> Result<u8, DecimalsError> {
        let result = match tokio::time::timeout(self.timeout, self.ledger.mint_decimals(mint)).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout),
        };

        result.map_err(|e| {
            let reason = match &e {
                LedgerError::AccountNotFound(_) => UnavailableReason::NotFound,
                LedgerError::InvalidAccountData(_) => UnavailableReason::Malformed,
                LedgerError::Timeout => UnavailableReason::Timeout,
                LedgerError::Rpc(_) => UnavailableReason::Rpc,
            };
            error!(%mint, stage = "decimals", %reason, "Cannot resolve decimals: {}", e);
            DecimalsError::Unavailable {
                mint: *mint,
                reason,
                detail: e.to_string(),
            }
        })
    }
}

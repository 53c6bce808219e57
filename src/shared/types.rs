//! Common types used across the application

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};
use std::time::Duration;

use crate::shared::errors::{AmountError, SellError};
use crate::shared::utils::from_smallest_unit;

/// A token account balance as enumerated from the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub account: Pubkey,
    pub mint: Pubkey,
    pub raw_amount: u64,
}

/// A balance paired with the decimals of its mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub mint: Pubkey,
    pub raw_amount: u64,
    pub decimals: u8,
}

impl Holding {
    pub fn new(mint: Pubkey, raw_amount: u64, decimals: u8) -> Self {
        Self {
            mint,
            raw_amount,
            decimals,
        }
    }

    pub fn display_amount(&self) -> Result<Decimal, AmountError> {
        from_smallest_unit(self.raw_amount, self.decimals)
    }
}

/// Recent blockhash and the last block height at which it is valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Status of a submitted signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureState {
    /// Not seen yet, or seen below the required commitment
    Pending,
    Confirmed,
    Failed(String),
}

/// Result of one sell attempt
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub mint: Pubkey,
    pub amount_raw: Option<u64>,
    pub signature: Option<Signature>,
    pub failure: Option<SellError>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl SwapOutcome {
    pub fn succeeded(&self) -> bool {
        self.signature.is_some() && self.failure.is_none()
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

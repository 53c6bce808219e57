//! Error handling for the application

use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the ledger (Solana RPC) seam
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error("invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("request timed out")]
    Timeout,

    #[error("rpc error: {0}")]
    Rpc(String),
}

/// Why a mint's decimals could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    NotFound,
    Malformed,
    Timeout,
    Rpc,
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::NotFound => "mint account not found",
            UnavailableReason::Malformed => "malformed mint account",
            UnavailableReason::Timeout => "lookup timed out",
            UnavailableReason::Rpc => "rpc error",
        }
    }
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decimals lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalsError {
    #[error("decimals unavailable for {mint}: {reason} ({detail})")]
    Unavailable {
        mint: Pubkey,
        reason: UnavailableReason,
        detail: String,
    },
}

impl DecimalsError {
    pub fn reason(&self) -> UnavailableReason {
        match self {
            DecimalsError::Unavailable { reason, .. } => *reason,
        }
    }
}

/// Display <-> smallest-unit conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount cannot be negative: {0}")]
    Negative(String),

    #[error("{0} decimals exceeds supported precision")]
    UnsupportedDecimals(u8),

    #[error("amount {amount} with {decimals} decimals overflows u64")]
    Overflow { amount: String, decimals: u8 },

    #[error("amount {amount} is below the smallest unit for {decimals} decimals")]
    BelowSmallestUnit { amount: String, decimals: u8 },
}

/// Route lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no valid route found")]
    NoRoute,

    #[error("quote request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("aggregator returned status {status}: {body}")]
    Aggregator { status: u16, body: String },

    #[error("malformed quote response: {0}")]
    Malformed(String),
}

/// Errors returned by the aggregator's swap endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("swap request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("aggregator returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed swap response: {0}")]
    Malformed(String),
}

/// Execution-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("swap transaction request failed: {0}")]
    SwapRequest(#[from] AggregatorError),

    #[error("failed to decode swap transaction: {0}")]
    Decode(String),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error("failed to fetch latest blockhash: {0}")]
    Checkpoint(LedgerError),

    #[error("transaction submission failed: {0}")]
    Submission(LedgerError),

    #[error("transaction {signature} failed on chain: {reason}")]
    Rejected { signature: String, reason: String },

    #[error("transaction {signature} expired after block height {last_valid_block_height}")]
    Expired {
        signature: String,
        last_valid_block_height: u64,
    },

    #[error("transaction {signature} not confirmed within {elapsed:?}")]
    ConfirmationTimeout { signature: String, elapsed: Duration },
}

/// A failed sell attempt, tagged by the stage that failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SellError {
    #[error("refusing to sell the target mint into itself")]
    SameMint,

    #[error(transparent)]
    Decimals(#[from] DecimalsError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl SellError {
    /// Pipeline stage that produced the error
    pub fn stage(&self) -> &'static str {
        match self {
            SellError::SameMint => "validate",
            SellError::Decimals(_) => "decimals",
            SellError::Amount(_) => "amount",
            SellError::Route(_) => "route",
            SellError::Execution(_) => "execute",
        }
    }
}

/// Scan-level errors; only enumeration can fail a whole scan
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("failed to enumerate token accounts: {0}")]
    Enumeration(LedgerError),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Wallet error: {0}")]
    WalletError(String),
}

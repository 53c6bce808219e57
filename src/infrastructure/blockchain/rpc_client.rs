//! Solana RPC client used for wallet reads and transaction submission

use async_trait::async_trait;
use solana_account_decoder::UiAccountData;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::{
    commitment_config::CommitmentConfig, pubkey, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionStatus;
use spl_token::solana_program::program_pack::Pack;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error};

use crate::shared::errors::LedgerError;
use crate::shared::types::{Checkpoint, SignatureState, TokenBalance};

/// Token-2022 program ID
pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Token programs whose accounts are enumerated for the wallet
pub fn token_program_ids() -> [Pubkey; 2] {
    [spl_token::id(), TOKEN_2022_PROGRAM_ID]
}

/// Narrow view of the Solana node used by the sweeper
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// All token accounts owned by `owner`, across both token programs
    async fn token_balances(&self, owner: &Pubkey) -> Result<Vec<TokenBalance>, LedgerError>;

    /// Decimal precision stored in the mint account
    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, LedgerError>;

    async fn latest_checkpoint(&self) -> Result<Checkpoint, LedgerError>;

    /// Submit without preflight; `max_retries` is forwarded to the node
    async fn submit_transaction(
        &self,
        transaction: &VersionedTransaction,
        max_retries: usize,
    ) -> Result<Signature, LedgerError>;

    async fn signature_state(&self, signature: &Signature) -> Result<SignatureState, LedgerError>;

    async fn block_height(&self) -> Result<u64, LedgerError>;
}

/// Solana RPC client wrapper
pub struct SolanaRpcClient {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpcClient {
    /// Create new RPC client
    pub fn new(rpc_url: String, commitment: CommitmentConfig, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(rpc_url, timeout, commitment),
            commitment,
        }
    }

}

#[async_trait]
impl LedgerClient for SolanaRpcClient {
    async fn token_balances(&self, owner: &Pubkey) -> Result<Vec<TokenBalance>, LedgerError> {
        let mut balances = Vec::new();

        for program_id in token_program_ids() {
            let accounts = self
                .client
                .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(program_id))
                .await
                .map_err(map_client_error)?;

            debug!("{} token accounts under program {}", accounts.len(), program_id);
            balances.extend(parse_token_accounts(&accounts));
        }

        Ok(balances)
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, LedgerError> {
        let account = self
            .client
            .get_account_with_commitment(mint, self.commitment)
            .await
            .map_err(map_client_error)?
            .value
            .ok_or(LedgerError::AccountNotFound(*mint))?;

        if !token_program_ids().contains(&account.owner) {
            return Err(LedgerError::InvalidAccountData(format!(
                "{} is owned by {}, not a token program",
                mint, account.owner
            )));
        }

        decode_mint_decimals(&account.data)
    }

    async fn latest_checkpoint(&self) -> Result<Checkpoint, LedgerError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(map_client_error)?;

        Ok(Checkpoint {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn submit_transaction(
        &self,
        transaction: &VersionedTransaction,
        max_retries: usize,
    ) -> Result<Signature, LedgerError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: true,
            max_retries: Some(max_retries),
            ..RpcSendTransactionConfig::default()
        };

        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(map_client_error)
    }

    async fn signature_state(&self, signature: &Signature) -> Result<SignatureState, LedgerError> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(map_client_error)?;

        let status = response.value.into_iter().next().flatten();
        Ok(signature_state_from_status(status, self.commitment))
    }

    async fn block_height(&self) -> Result<u64, LedgerError> {
        self.client
            .get_block_height_with_commitment(self.commitment)
            .await
            .map_err(map_client_error)
    }
}

fn map_client_error(err: ClientError) -> LedgerError {
    match err.kind() {
        ClientErrorKind::Reqwest(e) if e.is_timeout() => LedgerError::Timeout,
        _ => LedgerError::Rpc(err.to_string()),
    }
}

/// Decode each account on its own; one undecodable account only drops itself
pub fn parse_token_accounts(accounts: &[RpcKeyedAccount]) -> Vec<TokenBalance> {
    accounts
        .iter()
        .filter_map(|keyed| match parse_token_account(keyed) {
            Ok(balance) => Some(balance),
            Err(e) => {
                error!(account = %keyed.pubkey, stage = "enumerate", "Skipping token account: {}", e);
                None
            }
        })
        .collect()
}

/// Extract mint and raw amount from a jsonParsed token account
pub fn parse_token_account(keyed: &RpcKeyedAccount) -> Result<TokenBalance, LedgerError> {
    let account = Pubkey::from_str(&keyed.pubkey)
        .map_err(|e| LedgerError::InvalidAccountData(format!("bad account key: {}", e)))?;

    let parsed = match &keyed.account.data {
        UiAccountData::Json(parsed) => &parsed.parsed,
        _ => {
            return Err(LedgerError::InvalidAccountData(format!(
                "token account {} was not returned as jsonParsed",
                account
            )))
        }
    };

    let info = &parsed["info"];
    let mint = info["mint"]
        .as_str()
        .and_then(|s| Pubkey::from_str(s).ok())
        .ok_or_else(|| LedgerError::InvalidAccountData(format!("{} has no mint", account)))?;
    let raw_amount = info["tokenAmount"]["amount"]
        .as_str()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| LedgerError::InvalidAccountData(format!("{} has no amount", account)))?;

    Ok(TokenBalance {
        account,
        mint,
        raw_amount,
    })
}

/// Read `decimals` from the base mint layout; Token-2022 extensions follow it
pub fn decode_mint_decimals(data: &[u8]) -> Result<u8, LedgerError> {
    if data.len() < spl_token::state::Mint::LEN {
        return Err(LedgerError::InvalidAccountData(format!(
            "mint data is {} bytes, expected at least {}",
            data.len(),
            spl_token::state::Mint::LEN
        )));
    }

    let mint = spl_token::state::Mint::unpack(&data[..spl_token::state::Mint::LEN])
        .map_err(|e| LedgerError::InvalidAccountData(format!("failed to unpack mint: {}", e)))?;

    Ok(mint.decimals)
}

pub fn signature_state_from_status(
    status: Option<TransactionStatus>,
    commitment: CommitmentConfig,
) -> SignatureState {
    match status {
        None => SignatureState::Pending,
        Some(status) => {
            if let Some(err) = &status.err {
                SignatureState::Failed(err.to_string())
            } else if status.satisfies_commitment(commitment) {
                SignatureState::Confirmed
            } else {
                SignatureState::Pending
            }
        }
    }
}

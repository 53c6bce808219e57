//! Scripted ledger and aggregator doubles for unit tests

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_sdk::{
    hash::Hash,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    system_instruction,
    transaction::VersionedTransaction,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::exchanges::api_clients::SwapAggregator;
use crate::exchanges::types::{QuoteRequest, Route, RouteFormat, SwapTransaction};
use crate::infrastructure::blockchain::rpc_client::LedgerClient;
use crate::shared::errors::{AggregatorError, LedgerError, RouteError};
use crate::shared::types::{Checkpoint, SignatureState, TokenBalance};

/// Base64 unsigned transaction with `payer` as the only required signer
pub fn unsigned_swap_transaction(payer: &Pubkey) -> String {
    let instruction = system_instruction::transfer(payer, &Pubkey::new_unique(), 1);
    let message = Message::new_with_blockhash(&[instruction], Some(payer), &Hash::new_unique());
    let transaction = VersionedTransaction {
        signatures: vec![Signature::default()],
        message: VersionedMessage::Legacy(message),
    };
    STANDARD.encode(bincode::serialize(&transaction).unwrap())
}

pub struct MockLedger {
    balances: Result<Vec<TokenBalance>, LedgerError>,
    decimals: HashMap<Pubkey, Result<u8, LedgerError>>,
    decimals_delay: Duration,
    checkpoint: Result<Checkpoint, LedgerError>,
    submit_error: Option<LedgerError>,
    states: Mutex<VecDeque<Result<SignatureState, LedgerError>>>,
    default_state: SignatureState,
    block_height: AtomicU64,
    block_height_step: u64,
    decimals_calls: AtomicUsize,
    enumerations: AtomicUsize,
    submitted: Mutex<Vec<VersionedTransaction>>,
    events: Mutex<Vec<&'static str>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            balances: Ok(Vec::new()),
            decimals: HashMap::new(),
            decimals_delay: Duration::ZERO,
            checkpoint: Ok(Checkpoint {
                blockhash: Hash::new_unique(),
                last_valid_block_height: 1_000,
            }),
            submit_error: None,
            states: Mutex::new(VecDeque::new()),
            default_state: SignatureState::Confirmed,
            block_height: AtomicU64::new(900),
            block_height_step: 0,
            decimals_calls: AtomicUsize::new(0),
            enumerations: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_balance(mut self, mint: Pubkey, raw_amount: u64) -> Self {
        if let Ok(balances) = &mut self.balances {
            balances.push(TokenBalance {
                account: Pubkey::new_unique(),
                mint,
                raw_amount,
            });
        }
        self
    }

    pub fn with_enumeration_error(mut self, err: LedgerError) -> Self {
        self.balances = Err(err);
        self
    }

    pub fn with_decimals(mut self, mint: Pubkey, decimals: u8) -> Self {
        self.decimals.insert(mint, Ok(decimals));
        self
    }

    pub fn with_decimals_error(mut self, mint: Pubkey, err: LedgerError) -> Self {
        self.decimals.insert(mint, Err(err));
        self
    }

    pub fn with_decimals_delay(mut self, delay: Duration) -> Self {
        self.decimals_delay = delay;
        self
    }

    pub fn with_checkpoint_error(mut self, err: LedgerError) -> Self {
        self.checkpoint = Err(err);
        self
    }

    pub fn with_last_valid_block_height(mut self, height: u64) -> Self {
        if let Ok(checkpoint) = &mut self.checkpoint {
            checkpoint.last_valid_block_height = height;
        }
        self
    }

    pub fn with_submit_error(mut self, err: LedgerError) -> Self {
        self.submit_error = Some(err);
        self
    }

    /// States returned in order; `default_state` once exhausted
    pub fn with_signature_states(self, states: Vec<Result<SignatureState, LedgerError>>) -> Self {
        *self.states.lock().unwrap() = states.into();
        self
    }

    pub fn with_default_state(mut self, state: SignatureState) -> Self {
        self.default_state = state;
        self
    }

    pub fn with_block_height(mut self, start: u64, step: u64) -> Self {
        self.block_height = AtomicU64::new(start);
        self.block_height_step = step;
        self
    }

    pub fn decimals_calls(&self) -> usize {
        self.decimals_calls.load(Ordering::SeqCst)
    }

    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<VersionedTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn token_balances(&self, _owner: &Pubkey) -> Result<Vec<TokenBalance>, LedgerError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push("enumerate");
        self.balances.clone()
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, LedgerError> {
        self.decimals_calls.fetch_add(1, Ordering::SeqCst);
        if !self.decimals_delay.is_zero() {
            tokio::time::sleep(self.decimals_delay).await;
        }
        self.decimals
            .get(mint)
            .cloned()
            .unwrap_or(Err(LedgerError::AccountNotFound(*mint)))
    }

    async fn latest_checkpoint(&self) -> Result<Checkpoint, LedgerError> {
        self.checkpoint.clone()
    }

    async fn submit_transaction(
        &self,
        transaction: &VersionedTransaction,
        _max_retries: usize,
    ) -> Result<Signature, LedgerError> {
        if let Some(err) = &self.submit_error {
            return Err(err.clone());
        }
        self.submitted.lock().unwrap().push(transaction.clone());
        self.events.lock().unwrap().push("submit");
        Ok(transaction.signatures[0])
    }

    async fn signature_state(&self, _signature: &Signature) -> Result<SignatureState, LedgerError> {
        let next = self.states.lock().unwrap().pop_front();
        let state = next.unwrap_or_else(|| Ok(self.default_state.clone()));
        if let Ok(SignatureState::Confirmed) = &state {
            self.events.lock().unwrap().push("confirmed");
        }
        state
    }

    async fn block_height(&self) -> Result<u64, LedgerError> {
        Ok(self
            .block_height
            .fetch_add(self.block_height_step, Ordering::SeqCst))
    }
}

pub struct MockAggregator {
    routes: Vec<(u64, u64)>,
    quote_error: Option<RouteError>,
    swap_result: Result<SwapTransaction, AggregatorError>,
    swap_delay: Duration,
    quote_requests: Mutex<Vec<QuoteRequest>>,
    swap_calls: AtomicUsize,
}

impl MockAggregator {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            quote_error: None,
            swap_result: Err(AggregatorError::Malformed("no swap scripted".to_string())),
            swap_delay: Duration::ZERO,
            quote_requests: Mutex::new(Vec::new()),
            swap_calls: AtomicUsize::new(0),
        }
    }

    /// `(in_amount, out_amount)` per candidate, best first
    pub fn with_routes(mut self, routes: Vec<(u64, u64)>) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_quote_error(mut self, err: RouteError) -> Self {
        self.quote_error = Some(err);
        self
    }

    pub fn with_swap_transaction(mut self, encoded: String) -> Self {
        self.swap_result = Ok(SwapTransaction {
            transaction: encoded,
            last_valid_block_height: None,
        });
        self
    }

    /// Expiry reported alongside the scripted swap transaction
    pub fn with_swap_last_valid_block_height(mut self, height: u64) -> Self {
        if let Ok(swap) = &mut self.swap_result {
            swap.last_valid_block_height = Some(height);
        }
        self
    }

    pub fn with_swap_error(mut self, err: AggregatorError) -> Self {
        self.swap_result = Err(err);
        self
    }

    pub fn with_swap_delay(mut self, delay: Duration) -> Self {
        self.swap_delay = delay;
        self
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.quote_requests.lock().unwrap().clone()
    }

    pub fn swap_calls(&self) -> usize {
        self.swap_calls.load(Ordering::SeqCst)
    }

    /// Build a route outside the quote flow
    pub fn route(&self, request: &QuoteRequest, in_amount: u64, out_amount: u64) -> Route {
        let value = serde_json::json!({
            "inAmount": in_amount.to_string(),
            "outAmount": out_amount.to_string(),
        });
        Route::from_value(value, request, RouteFormat::Quote).unwrap()
    }
}

#[async_trait]
impl SwapAggregator for MockAggregator {
    async fn quote(&self, request: &QuoteRequest) -> Result<Vec<Route>, RouteError> {
        self.quote_requests.lock().unwrap().push(request.clone());
        if let Some(err) = &self.quote_error {
            return Err(err.clone());
        }
        Ok(self
            .routes
            .iter()
            .map(|(in_amount, out_amount)| self.route(request, *in_amount, *out_amount))
            .collect())
    }

    async fn swap_transaction(
        &self,
        _route: &Route,
        _user: &Pubkey,
        _wrap_unwrap_sol: bool,
    ) -> Result<SwapTransaction, AggregatorError> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        if !self.swap_delay.is_zero() {
            tokio::time::sleep(self.swap_delay).await;
        }
        self.swap_result.clone()
    }
}

use serde_json::Value;
use solana_sdk::pubkey::Pubkey;

use crate::shared::errors::RouteError;

/// Parameters of one quote request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    /// Smallest units of `input_mint`
    pub amount: u64,
    pub slippage_bps: u16,
    pub only_direct_routes: bool,
}

/// Shape the aggregator returned the route in; decides the `/swap` body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFormat {
    /// One entry of a ranked `data` list
    Ranked,
    /// A single quote object
    Quote,
}

/// A quoted conversion path. Not `Clone`: the executor takes it by value,
/// so a route is consumed by at most one swap.
#[derive(Debug)]
pub struct Route {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub in_amount: u64,
    pub out_amount: u64,
    pub slippage_bps: u16,
    pub price_impact_pct: Option<f64>,
    pub format: RouteFormat,
    raw: Value,
}

impl Route {
    pub fn from_value(value: Value, request: &QuoteRequest, format: RouteFormat) -> Result<Self, RouteError> {
        let in_amount = amount_field(&value, "inAmount")
            .ok_or_else(|| RouteError::Malformed("route has no inAmount".to_string()))?;
        let out_amount = amount_field(&value, "outAmount")
            .ok_or_else(|| RouteError::Malformed("route has no outAmount".to_string()))?;
        let price_impact_pct = match value.get("priceImpactPct") {
            Some(Value::String(s)) => s.parse::<f64>().ok(),
            Some(v) => v.as_f64(),
            None => None,
        };

        Ok(Self {
            input_mint: request.input_mint,
            output_mint: request.output_mint,
            in_amount,
            out_amount,
            slippage_bps: request.slippage_bps,
            price_impact_pct,
            format,
            raw: value,
        })
    }

    /// The aggregator's JSON, forwarded verbatim to `/swap`
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Unsigned swap transaction as returned by the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTransaction {
    /// Base64 bincode `VersionedTransaction`
    pub transaction: String,
    /// Expiry of the blockhash the aggregator built the transaction with
    pub last_valid_block_height: Option<u64>,
}

/// Amounts arrive as strings in the quote API and as numbers in the legacy one
fn amount_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

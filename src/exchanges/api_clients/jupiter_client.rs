use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tracing::debug;

use super::SwapAggregator;
use crate::exchanges::types::{QuoteRequest, Route, RouteFormat, SwapTransaction};
use crate::shared::errors::{AggregatorError, AppError, RouteError};

pub const DEFAULT_JUPITER_URL: &str = "https://quote-api.jup.ag/v6";

/// Error codes the aggregator uses when a pair simply has no route
const NO_ROUTE_CODES: &[&str] = &[
    "COULD_NOT_FIND_ANY_ROUTE",
    "NO_ROUTES_FOUND",
    "TOKEN_NOT_TRADABLE",
];

#[derive(Debug, Deserialize)]
struct SwapResponse {
    #[serde(rename = "swapTransaction")]
    swap_transaction: String,
    #[serde(rename = "lastValidBlockHeight", default)]
    last_valid_block_height: Option<u64>,
}

/// Jupiter HTTP API client
pub struct JupiterApiClient {
    http_client: Client,
    base_url: String,
}

impl JupiterApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SwapAggregator for JupiterApiClient {
    async fn quote(&self, request: &QuoteRequest) -> Result<Vec<Route>, RouteError> {
        let url = format!("{}/quote", self.base_url);
        debug!("Requesting quote from {} for {} units of {}", url, request.amount, request.input_mint);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("inputMint", request.input_mint.to_string()),
                ("outputMint", request.output_mint.to_string()),
                ("amount", request.amount.to_string()),
                ("slippageBps", request.slippage_bps.to_string()),
                ("onlyDirectRoutes", request.only_direct_routes.to_string()),
            ])
            .send()
            .await
            .map_err(route_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(route_transport_error)?;

        if !status.is_success() {
            if NO_ROUTE_CODES.iter().any(|code| body.contains(code)) {
                return Err(RouteError::NoRoute);
            }
            return Err(RouteError::Aggregator {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| RouteError::Malformed(format!("invalid JSON: {}", e)))?;
        parse_quote_response(value, request)
    }

    async fn swap_transaction(
        &self,
        route: &Route,
        user: &Pubkey,
        wrap_unwrap_sol: bool,
    ) -> Result<SwapTransaction, AggregatorError> {
        let url = format!("{}/swap", self.base_url);
        let body = swap_request_body(route, user, wrap_unwrap_sol);

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(swap_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AggregatorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let swap: SwapResponse = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AggregatorError::Timeout
                } else {
                    AggregatorError::Malformed(e.to_string())
                }
            })?;

        Ok(SwapTransaction {
            transaction: swap.swap_transaction,
            last_valid_block_height: swap.last_valid_block_height,
        })
    }
}

/// Accept a ranked `data` list or a single quote object
fn parse_quote_response(value: Value, request: &QuoteRequest) -> Result<Vec<Route>, RouteError> {
    if let Some(entries) = value.get("data").and_then(Value::as_array) {
        return entries
            .iter()
            .cloned()
            .map(|entry| Route::from_value(entry, request, RouteFormat::Ranked))
            .collect();
    }

    if value.get("inAmount").is_some() {
        return Ok(vec![Route::from_value(value, request, RouteFormat::Quote)?]);
    }

    Err(RouteError::Malformed(
        "response holds neither a route list nor a quote".to_string(),
    ))
}

fn swap_request_body(route: &Route, user: &Pubkey, wrap_unwrap_sol: bool) -> Value {
    match route.format {
        RouteFormat::Quote => json!({
            "quoteResponse": route.raw(),
            "userPublicKey": user.to_string(),
            "wrapAndUnwrapSol": wrap_unwrap_sol,
        }),
        RouteFormat::Ranked => json!({
            "route": route.raw(),
            "userPublicKey": user.to_string(),
            "wrapUnwrapSOL": wrap_unwrap_sol,
        }),
    }
}

fn route_transport_error(e: reqwest::Error) -> RouteError {
    if e.is_timeout() {
        RouteError::Timeout
    } else {
        RouteError::Transport(e.to_string())
    }
}

fn swap_transport_error(e: reqwest::Error) -> AggregatorError {
    if e.is_timeout() {
        AggregatorError::Timeout
    } else {
        AggregatorError::Transport(e.to_string())
    }
}

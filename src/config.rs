use serde::Deserialize;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{keypair_from_seed, read_keypair_file, Keypair},
};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use std::{fs, path::Path};

use crate::application::context::TradeSettings;
use crate::exchanges::api_clients::jupiter_client::DEFAULT_JUPITER_URL;
use crate::infrastructure::blockchain::transaction_executor::ExecutionConfig;
use crate::shared::errors::AppError;

/// Environment variable holding the base58 wallet secret
pub const PRIVATE_KEY_ENV: &str = "SWEEPER_PRIVATE_KEY";
/// Environment variable overriding `rpc.url`
pub const RPC_URL_ENV: &str = "SWEEPER_RPC_URL";

const MAX_SLIPPAGE_BPS: u16 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    MainnetBeta,
    Devnet,
    Testnet,
}

impl Network {
    pub fn default_url(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    #[serde(default = "default_network")]
    pub network: Network,
    pub url: Option<String>,
    #[serde(default = "default_commitment")]
    pub commitment: String,
    #[serde(default = "default_rpc_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Default, Deserialize)]
pub struct WalletCfg {
    pub private_key: Option<String>,
    pub keypair: Option<String>,
}

// Never print key material
impl std::fmt::Debug for WalletCfg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletCfg")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("keypair", &self.keypair)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    pub target_mint: String,
    pub watch_list: Vec<String>,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JupiterCfg {
    #[serde(default = "default_jupiter_url")]
    pub base_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub only_direct_routes: bool,
    #[serde(default = "default_true")]
    pub wrap_unwrap_sol: bool,
}

impl Default for JupiterCfg {
    fn default() -> Self {
        Self {
            base_url: default_jupiter_url(),
            timeout_secs: default_http_timeout_secs(),
            only_direct_routes: true,
            wrap_unwrap_sol: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionCfg {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub decimals_timeout_secs: u64,
}

impl Default for ExecutionCfg {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            confirm_timeout_secs: default_confirm_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            decimals_timeout_secs: default_http_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcCfg,
    #[serde(default)]
    pub wallet: WalletCfg,
    pub trade: TradeCfg,
    #[serde(default)]
    pub jupiter: JupiterCfg,
    #[serde(default)]
    pub execution: ExecutionCfg,
}

fn default_network() -> Network {
    Network::MainnetBeta
}
fn default_commitment() -> String {
    "confirmed".to_string()
}
fn default_rpc_timeout_secs() -> u64 {
    30
}
fn default_slippage_bps() -> u16 {
    50
}
fn default_interval_ms() -> u64 {
    60_000
}
fn default_jupiter_url() -> String {
    DEFAULT_JUPITER_URL.to_string()
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_max_retries() -> usize {
    2
}
fn default_confirm_timeout_secs() -> u64 {
    90
}
fn default_poll_interval_ms() -> u64 {
    500
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let s = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::ConfigError(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self, AppError> {
        toml::from_str(s).map_err(|e| AppError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Apply `SWEEPER_*` environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(PRIVATE_KEY_ENV) {
            if !key.trim().is_empty() {
                self.wallet.private_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            if !url.trim().is_empty() {
                self.rpc.url = Some(url);
            }
        }
    }

    /// Custom endpoint if set, else the network's public endpoint
    pub fn rpc_url(&self) -> String {
        self.rpc
            .url
            .clone()
            .unwrap_or_else(|| self.rpc.network.default_url().to_string())
    }

    pub fn commitment(&self) -> Result<CommitmentConfig, AppError> {
        CommitmentConfig::from_str(&self.rpc.commitment).map_err(|_| {
            AppError::ConfigError(format!("Unknown commitment level: {}", self.rpc.commitment))
        })
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.timeout_secs)
    }

    pub fn jupiter_timeout(&self) -> Duration {
        Duration::from_secs(self.jupiter.timeout_secs)
    }

    /// Validate and convert the trade section
    pub fn trade_settings(&self) -> Result<TradeSettings, AppError> {
        let target_mint = parse_mint(&self.trade.target_mint)?;

        let mut watch_list = HashSet::new();
        for mint in &self.trade.watch_list {
            watch_list.insert(parse_mint(mint)?);
        }
        if watch_list.is_empty() {
            return Err(AppError::ConfigError("trade.watch_list is empty".to_string()));
        }
        if watch_list.contains(&target_mint) {
            return Err(AppError::ConfigError(
                "trade.watch_list must not contain the target mint".to_string(),
            ));
        }
        if self.trade.slippage_bps > MAX_SLIPPAGE_BPS {
            return Err(AppError::ConfigError(format!(
                "trade.slippage_bps {} exceeds {}",
                self.trade.slippage_bps, MAX_SLIPPAGE_BPS
            )));
        }
        if self.trade.interval_ms == 0 {
            return Err(AppError::ConfigError("trade.interval_ms must be positive".to_string()));
        }

        Ok(TradeSettings {
            target_mint,
            watch_list,
            slippage_bps: self.trade.slippage_bps,
            interval: Duration::from_millis(self.trade.interval_ms),
            only_direct_routes: self.jupiter.only_direct_routes,
            decimals_timeout: Duration::from_secs(self.execution.decimals_timeout_secs),
        })
    }

    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            max_retries: self.execution.max_retries,
            confirm_timeout: Duration::from_secs(self.execution.confirm_timeout_secs),
            poll_interval: Duration::from_millis(self.execution.poll_interval_ms),
            wrap_unwrap_sol: self.jupiter.wrap_unwrap_sol,
        }
    }

    /// Load the wallet from `private_key`, falling back to a keypair file
    pub fn load_wallet(&self) -> Result<Keypair, AppError> {
        if let Some(secret) = &self.wallet.private_key {
            return keypair_from_base58(secret);
        }
        if let Some(path) = &self.wallet.keypair {
            return read_keypair_file(path)
                .map_err(|e| AppError::WalletError(format!("Failed to load keypair {}: {}", path, e)));
        }
        Err(AppError::WalletError(format!(
            "no wallet configured: set wallet.private_key, wallet.keypair or {}",
            PRIVATE_KEY_ENV
        )))
    }
}

fn parse_mint(s: &str) -> Result<Pubkey, AppError> {
    Pubkey::from_str(s.trim()).map_err(|e| AppError::ConfigError(format!("Invalid mint {}: {}", s, e)))
}

/// Decode a base58 secret; the first 32 bytes are the ed25519 seed
pub fn keypair_from_base58(secret: &str) -> Result<Keypair, AppError> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .map_err(|e| AppError::WalletError(format!("private key is not base58: {}", e)))?;
    if bytes.len() < 32 {
        return Err(AppError::WalletError(format!(
            "private key is {} bytes, need at least 32",
            bytes.len()
        )));
    }
    keypair_from_seed(&bytes[..32])
        .map_err(|e| AppError::WalletError(format!("invalid key seed: {}", e)))
}

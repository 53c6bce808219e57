// src/app.rs
use anyhow::Result;
use solana_sdk::signature::Signer;
use std::sync::Arc;
use tracing::{error, info};

use crate::application::{AppContext, Monitor, WalletScanner};
use crate::config::Config;
use crate::exchanges::api_clients::JupiterApiClient;
use crate::infrastructure::blockchain::SolanaRpcClient;
use crate::shared::utils::short_pubkey;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub config: Config,
    pub rpc_url: String,
    pub once: bool,
}

impl AppCfg {
    /// Environment overrides are applied on top of the file; `rpc_url` from
    /// the command line wins over both.
    pub fn from_config(mut config: Config, rpc_url: Option<String>, once: bool) -> Self {
        config.apply_env();
        let rpc_url = rpc_url.unwrap_or_else(|| config.rpc_url());
        Self {
            config,
            rpc_url,
            once,
        }
    }

    /// Validate everything and build the collaborators shared by the pipeline
    pub fn build_context(&self) -> Result<AppContext> {
        let settings = self.config.trade_settings()?;
        let commitment = self.config.commitment()?;
        let wallet = Arc::new(self.config.load_wallet()?);

        let ledger = SolanaRpcClient::new(self.rpc_url.clone(), commitment, self.config.rpc_timeout());
        let aggregator =
            JupiterApiClient::new(self.config.jupiter.base_url.clone(), self.config.jupiter_timeout())?;

        Ok(AppContext {
            wallet,
            ledger: Arc::new(ledger),
            aggregator: Arc::new(aggregator),
            settings,
            execution: self.config.execution_config(),
        })
    }
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    info!("Starting token sweeper");

    let ctx = app_cfg.build_context()?;
    info!("RPC endpoint: {}", app_cfg.rpc_url);
    info!("Wallet: {}", ctx.wallet.pubkey());
    info!(
        "Target mint {}, watching {} mints, slippage {} bps",
        short_pubkey(&ctx.settings.target_mint),
        ctx.settings.watch_list.len(),
        ctx.settings.slippage_bps
    );

    let mut monitor = Monitor::new(WalletScanner::new(&ctx), ctx.settings.interval);

    if app_cfg.once {
        if let Some(report) = monitor.run_once().await {
            info!(
                "Single scan finished: {}/{} sells succeeded",
                report.sells_succeeded(),
                report.outcomes.len()
            );
        }
        return Ok(());
    }

    monitor
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Token sweeper stopped");
    Ok(())
}

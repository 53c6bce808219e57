use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use token_sweeper::app::{self, AppCfg};
use token_sweeper::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Sells watch-listed tokens from a Solana wallet via Jupiter")]
struct Args {
    /// Path to config file
    #[arg(long, default_value = "Config.toml")]
    config: String,

    /// RPC endpoint URL (overrides config and SWEEPER_RPC_URL)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Run a single scan and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let config = Config::from_file(&args.config)?;
    let app_cfg = AppCfg::from_config(config, args.rpc_url, args.once);

    app::run(app_cfg).await
}

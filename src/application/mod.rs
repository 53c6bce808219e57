//! Application layer - the monitor-and-swap pipeline

pub mod context;
pub mod monitor;
pub mod token_seller;
pub mod wallet_scanner;

pub use context::{AppContext, TradeSettings};
pub use monitor::{Monitor, MonitorStats};
pub use token_seller::TokenSeller;
pub use wallet_scanner::{ScanReport, WalletScanner};

/*
[INPUT]:  Public API exports for edgex-trader crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point for the demo binaries
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod market_data;
pub mod shutdown;
pub mod telemetry;
pub mod trader;

pub use config::AppConfig;
pub use market_data::MarketDataCache;
pub use shutdown::install_signal_handlers;
pub use telemetry::init_tracing;
pub use trader::{EdgexTrader, DEFAULT_STREAM_CONTRACT};

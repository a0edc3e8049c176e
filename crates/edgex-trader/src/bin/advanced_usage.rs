/*
[INPUT]:  EDGEX_* environment (optionally .env), CLI flags, OS shutdown signals
[OUTPUT]: Initialized EdgexTrader kept in sync with the streams for a listen window
[POS]:    Binary entry point - stateful trader walkthrough
[UPDATE]: When changing the demo flow or CLI flags
*/

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use edgex_sdk::{DepthLevel, KlineInterval};
use edgex_trader::{
    init_tracing, install_signal_handlers, AppConfig, EdgexTrader, DEFAULT_STREAM_CONTRACT,
};

#[derive(Parser, Debug)]
#[command(name = "advanced_usage", version, about = "edgeX stateful trader walkthrough")]
struct Cli {
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Seconds to keep both streams open
    #[arg(long = "listen-secs", value_name = "N", default_value_t = 60)]
    listen_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = AppConfig::load().context("load configuration")?;
    let mut trader = EdgexTrader::from_config(&config)?;

    if let Err(err) = trader.initialize().await {
        error!(error = %format!("{err:#}"), "failed to initialize trader");
        trader.close().await;
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    install_signal_handlers(shutdown.clone());

    let outcome = run(&mut trader, Duration::from_secs(args.listen_secs), shutdown).await;
    trader.close().await;
    outcome
}

async fn run(trader: &mut EdgexTrader, listen: Duration, shutdown: CancellationToken) -> Result<()> {
    let klines = trader
        .get_k_line(DEFAULT_STREAM_CONTRACT, KlineInterval::Minute1, 100, None)
        .await?;
    info!(entries = klines.len(), "retrieved k-line data");

    let depth = trader
        .get_order_book_depth(DEFAULT_STREAM_CONTRACT, DepthLevel::Fifteen)
        .await?;
    info!(books = depth.len(), "retrieved order book depth");

    info!(listen_secs = listen.as_secs(), "waiting for websocket updates");
    let handled = trader.run_for(listen, shutdown).await?;

    info!(
        handled,
        positions = trader.positions().len(),
        active_orders = trader.active_orders().len(),
        last_price = ?trader.market().last_price(DEFAULT_STREAM_CONTRACT),
        "listen window finished"
    );
    Ok(())
}

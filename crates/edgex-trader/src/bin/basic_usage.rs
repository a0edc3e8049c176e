/*
[INPUT]:  EDGEX_* environment (optionally .env), CLI flags, OS shutdown signals
[OUTPUT]: Logged server time, metadata, account, market data and stream updates
[POS]:    Binary entry point - basic SDK walkthrough
[UPDATE]: When changing the demo flow or CLI flags
*/

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use edgex_sdk::{
    CreateOrderParams, DepthLevel, EdgexClient, GetKLineParams, GetOrderBookDepthParams,
    KlineInterval, OrderSide, PriceType, WebSocketManager, WebSocketMessage,
};
use edgex_trader::{init_tracing, install_signal_handlers, AppConfig};

const QUOTE_CONTRACT: &str = "10000004";
const KLINE_CONTRACT: &str = "10000001";
const DEPTH_CONTRACT: &str = "10000002";

#[derive(Parser, Debug)]
#[command(name = "basic_usage", version, about = "edgeX SDK basic walkthrough")]
struct Cli {
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Seconds to keep the public stream open
    #[arg(long = "listen-secs", value_name = "N", default_value_t = 30)]
    listen_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = AppConfig::load().context("load configuration")?;
    info!(?config, "configuration loaded");

    let mut client = EdgexClient::new(&config.base_url).context("build REST client")?;
    if let Some(credentials) = config.credentials()? {
        client.set_credentials(credentials);
    }

    let server_time = client.get_server_time().await.context("get server time")?;
    info!(time_millis = %server_time.time_millis, "server time");

    let metadata = client.get_metadata().await.context("get metadata")?;
    info!(contracts = metadata.contract_list.len(), "available contracts");

    if config.public_only {
        info!("public-only mode; skipping account endpoints");
    } else {
        show_account(&client).await;
    }

    let quote = client
        .get_24_hour_quote(QUOTE_CONTRACT)
        .await
        .context("get 24h quote")?;
    if let Some(ticker) = quote.first() {
        info!(
            contract_id = QUOTE_CONTRACT,
            last_price = ?ticker.last_price,
            price_change_percent = ?ticker.price_change_percent,
            "BNBUSDT 24h quote"
        );
    }

    let klines = client
        .get_k_line(&GetKLineParams::new(KLINE_CONTRACT, KlineInterval::Minute1).with_size(10))
        .await
        .context("get k-lines")?;
    for kline in &klines.data_list {
        info!(
            kline_time = %kline.kline_time,
            open = %kline.open,
            close = %kline.close,
            "BTCUSDT 1m kline"
        );
    }

    let depth = client
        .get_order_book_depth(&GetOrderBookDepthParams::new(
            DEPTH_CONTRACT,
            DepthLevel::Fifteen,
        ))
        .await
        .context("get order book depth")?;
    if let Some(book) = depth.first() {
        info!(
            contract_id = DEPTH_CONTRACT,
            best_bid = ?book.best_bid().map(|level| level.price),
            best_ask = ?book.best_ask().map(|level| level.price),
            levels = book.asks.len() + book.bids.len(),
            "ETHUSDT order book"
        );
    }

    // shown, not sent
    let order = CreateOrderParams::limit(
        KLINE_CONTRACT,
        OrderSide::Buy,
        Decimal::new(1, 3),
        Decimal::from(30_000),
    );
    info!(?order, "example limit order (not submitted)");

    let shutdown = CancellationToken::new();
    install_signal_handlers(shutdown.clone());
    stream_public(&config, Duration::from_secs(args.listen_secs), shutdown).await?;

    Ok(())
}

async fn show_account(client: &EdgexClient) {
    match client.get_account_asset().await {
        Ok(assets) => {
            for collateral in &assets.collateral_asset_model_list {
                info!(
                    coin_id = %collateral.coin_id,
                    total_equity = %collateral.total_equity,
                    available = %collateral.available_amount,
                    "account asset"
                );
            }
        }
        Err(err) => warn!(error = %err, "get account asset failed"),
    }

    match client.get_account_positions().await {
        Ok(assets) => {
            info!(positions = assets.position_list.len(), "account positions");
            for position in &assets.position_list {
                info!(
                    contract_id = %position.contract_id,
                    open_size = %position.open_size,
                    open_value = %position.open_value,
                    "position"
                );
            }
        }
        Err(err) => warn!(error = %err, "get account positions failed"),
    }
}

async fn stream_public(
    config: &AppConfig,
    listen: Duration,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut ws = WebSocketManager::new(&config.ws_url, config.account_id, None);
    let mut receiver = ws.take_receiver().context("take websocket receiver")?;
    ws.connect_public().await.context("connect public websocket")?;
    ws.subscribe_ticker(QUOTE_CONTRACT).await?;
    ws.subscribe_kline(QUOTE_CONTRACT, KlineInterval::Minute1, PriceType::LastPrice)
        .await?;
    info!(listen_secs = listen.as_secs(), "listening for public updates");

    let deadline = tokio::time::sleep(listen);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = shutdown.cancelled() => break,
            message = receiver.recv() => match message {
                Some(WebSocketMessage::Ticker { contract_id, data }) => {
                    info!(%contract_id, %data, "ticker update");
                }
                Some(WebSocketMessage::Kline { contract_id, interval, data }) => {
                    info!(%contract_id, %interval, %data, "kline update");
                }
                Some(other) => info!(kind = other.kind(), "stream message"),
                None => break,
            },
        }
    }

    ws.disconnect_all().await;
    info!("websocket disconnected");
    Ok(())
}

/*
[INPUT]:  AppConfig, EdgexClient (REST) and WebSocketManager (streams)
[OUTPUT]: Local view of contracts, assets, positions, active orders and market data
[POS]:    Application layer - stateful trader used by the advanced demo
[UPDATE]: When changing startup flow, state reconciliation or order helpers
*/

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use edgex_sdk::{
    AccountAsset, CancelOrderParams, CancelOrderResult, ContractRegistry, CreateOrderParams,
    CreateOrderResult, DepthLevel, EdgexClient, GetActiveOrderParams, GetKLineParams,
    GetOrderBookDepthParams, Kline, KlineInterval, Order, OrderBookDepth, OrderFillTransaction,
    OrderFillTransactionParams, OrderSide, Page, Position, PriceType, TimeInForce,
    WebSocketManager, WebSocketMessage,
};

use crate::config::AppConfig;
use crate::market_data::MarketDataCache;

/// Contract the trader streams market data for (BTCUSDT)
pub const DEFAULT_STREAM_CONTRACT: &str = "10000001";

pub struct EdgexTrader {
    client: EdgexClient,
    ws: WebSocketManager,
    receiver: Option<mpsc::Receiver<WebSocketMessage>>,
    contracts: ContractRegistry,
    assets: Option<AccountAsset>,
    positions: HashMap<String, Position>,
    active_orders: HashMap<String, Order>,
    market: MarketDataCache,
}

impl EdgexTrader {
    pub fn new(client: EdgexClient, mut ws: WebSocketManager) -> Self {
        let receiver = ws.take_receiver();
        Self {
            client,
            ws,
            receiver,
            contracts: ContractRegistry::default(),
            assets: None,
            positions: HashMap::new(),
            active_orders: HashMap::new(),
            market: MarketDataCache::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut client = EdgexClient::new(&config.base_url).context("build REST client")?;
        let ws = match config.credentials()? {
            Some(credentials) => {
                let ws = WebSocketManager::with_credentials(&config.ws_url, &credentials);
                client.set_credentials(credentials);
                ws
            }
            None => WebSocketManager::new(&config.ws_url, config.account_id, None),
        };
        Ok(Self::new(client, ws))
    }

    fn has_credentials(&self) -> bool {
        self.client.credentials().is_some()
    }

    /// Load REST state, then connect and subscribe both streams
    pub async fn initialize(&mut self) -> Result<()> {
        info!("initializing trader");
        let result = match self.load_state().await {
            Ok(()) => self.connect_streams().await,
            Err(err) => Err(err),
        };

        match &result {
            Ok(()) => info!("trader initialized"),
            Err(err) => error!(error = %format!("{err:#}"), "trader initialization failed"),
        }
        result
    }

    /// Metadata, assets, positions and active orders
    pub async fn load_state(&mut self) -> Result<()> {
        let metadata = self.client.get_metadata().await.context("get metadata")?;
        self.contracts = ContractRegistry::from_metadata(&metadata);
        info!(contracts = self.contracts.len(), "metadata loaded");

        if !self.has_credentials() {
            info!("no credentials; skipping account state");
            return Ok(());
        }

        let assets = self
            .client
            .get_account_asset()
            .await
            .context("get account asset")?;
        self.positions = assets
            .position_list
            .iter()
            .filter(|position| !position.contract_id.is_empty())
            .map(|position| (position.contract_id.clone(), position.clone()))
            .collect();
        self.assets = Some(assets);
        info!(positions = self.positions.len(), "account state loaded");

        self.update_active_orders().await
    }

    pub async fn connect_streams(&mut self) -> Result<()> {
        self.ws
            .connect_public()
            .await
            .context("connect public websocket")?;

        if self.has_credentials() {
            self.ws
                .connect_private()
                .await
                .context("connect private websocket")?;
            self.ws.subscribe_account_update().await?;
            self.ws.subscribe_order_update().await?;
            self.ws.subscribe_position_update().await?;
        }

        self.ws.subscribe_ticker(DEFAULT_STREAM_CONTRACT).await?;
        self.ws
            .subscribe_kline(
                DEFAULT_STREAM_CONTRACT,
                KlineInterval::Minute1,
                PriceType::LastPrice,
            )
            .await?;
        self.ws
            .subscribe_depth(DEFAULT_STREAM_CONTRACT, DepthLevel::Fifteen)
            .await?;
        info!(contract_id = DEFAULT_STREAM_CONTRACT, "market data subscribed");
        Ok(())
    }

    /// Replace the active order map with the venue's first page
    pub async fn update_active_orders(&mut self) -> Result<()> {
        let page = self
            .client
            .get_active_orders(&GetActiveOrderParams::default())
            .await
            .context("get active orders")?;
        self.active_orders = page
            .data_list
            .into_iter()
            .filter(|order| !order.id.is_empty())
            .map(|order| (order.id.clone(), order))
            .collect();
        info!(active_orders = self.active_orders.len(), "active orders refreshed");
        Ok(())
    }

    /// Fold one stream message into local state
    pub async fn handle_message(&mut self, message: WebSocketMessage) -> Result<()> {
        match message {
            WebSocketMessage::AccountUpdate(data) => {
                if data.is_object() {
                    let assets: AccountAsset =
                        serde_json::from_value(data).context("decode account update")?;
                    self.assets = Some(assets);
                    info!("account update applied");
                }
            }
            WebSocketMessage::OrderUpdate(_) => {
                debug!("order update received");
                self.update_active_orders().await?;
            }
            WebSocketMessage::PositionUpdate(data) => {
                for position in positions_in(&data) {
                    info!(
                        contract_id = %position.contract_id,
                        open_size = %position.open_size,
                        "position update"
                    );
                    self.positions.insert(position.contract_id.clone(), position);
                }
            }
            WebSocketMessage::Error { message } => warn!(%message, "ws error frame"),
            WebSocketMessage::Subscribed { channel } => debug!(%channel, "subscribed"),
            other => {
                if self.market.apply(&other)
                    && let Some(contract_id) = other.contract_id()
                {
                    debug!(kind = other.kind(), contract_id, "market data updated");
                }
            }
        }
        Ok(())
    }

    pub async fn create_limit_order(
        &mut self,
        contract_id: &str,
        size: Decimal,
        price: Decimal,
        side: OrderSide,
        time_in_force: TimeInForce,
        reduce_only: bool,
    ) -> Result<CreateOrderResult> {
        let params = CreateOrderParams::limit(contract_id, side, size, price)
            .with_time_in_force(time_in_force)
            .with_reduce_only(reduce_only);
        let result = self
            .client
            .create_order(&params)
            .await
            .context("create limit order")?;
        info!(order_id = %result.order_id, contract_id, "limit order created");
        self.update_active_orders().await?;
        Ok(result)
    }

    pub async fn cancel_order(&mut self, order_id: &str) -> Result<CancelOrderResult> {
        let result = self
            .client
            .cancel_order(&CancelOrderParams::by_order_id(order_id))
            .await
            .context("cancel order")?;
        info!(order_id, "order cancelled");
        self.update_active_orders().await?;
        Ok(result)
    }

    /// Cancel every open order, or only those on `contract_id`
    pub async fn cancel_all_orders(&mut self, contract_id: Option<&str>) -> Result<CancelOrderResult> {
        let result = self
            .client
            .cancel_order(&CancelOrderParams::all(contract_id))
            .await
            .context("cancel all orders")?;
        info!(contract_id = contract_id.unwrap_or("all"), "orders cancelled");
        self.update_active_orders().await?;
        Ok(result)
    }

    pub async fn get_order_fill_transactions(
        &self,
        contract_id: Option<&str>,
        size: u32,
        offset_data: Option<&str>,
    ) -> Result<Page<OrderFillTransaction>> {
        let params = OrderFillTransactionParams {
            size: Some(size),
            offset_data: offset_data.map(str::to_string),
            filter_contract_id_list: contract_id.map(str::to_string).into_iter().collect(),
            ..Default::default()
        };
        let page = self
            .client
            .get_order_fill_transactions(&params)
            .await
            .context("get order fill transactions")?;
        info!(fills = page.len(), "order fill transactions fetched");
        Ok(page)
    }

    pub async fn get_k_line(
        &self,
        contract_id: &str,
        interval: KlineInterval,
        size: u32,
        offset_data: Option<&str>,
    ) -> Result<Page<Kline>> {
        let mut params = GetKLineParams::new(contract_id, interval).with_size(size);
        if let Some(offset) = offset_data {
            params = params.with_offset_data(offset);
        }
        let page = self.client.get_k_line(&params).await.context("get k-line")?;
        info!(contract_id, %interval, klines = page.len(), "k-line fetched");
        Ok(page)
    }

    pub async fn get_order_book_depth(
        &self,
        contract_id: &str,
        level: DepthLevel,
    ) -> Result<Vec<OrderBookDepth>> {
        let depth = self
            .client
            .get_order_book_depth(&GetOrderBookDepthParams::new(contract_id, level))
            .await
            .context("get order book depth")?;
        info!(contract_id, %level, "order book depth fetched");
        Ok(depth)
    }

    /// Drain stream messages into state until `duration` elapses or `shutdown` fires
    ///
    /// Returns how many messages were handled.
    pub async fn run_for(&mut self, duration: Duration, shutdown: CancellationToken) -> Result<usize> {
        let mut receiver = self
            .receiver
            .take()
            .context("message receiver already in use")?;
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        let mut handled = 0usize;
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = shutdown.cancelled() => {
                    info!("listen window cancelled");
                    break;
                }
                message = receiver.recv() => {
                    let Some(message) = message else {
                        warn!("websocket streams closed");
                        break;
                    };
                    if let Err(err) = self.handle_message(message).await {
                        warn!(error = %format!("{err:#}"), "message handling failed");
                    }
                    handled += 1;
                }
            }
        }

        self.receiver = Some(receiver);
        Ok(handled)
    }

    pub async fn close(&mut self) {
        self.ws.disconnect_all().await;
        info!("trader closed");
    }

    pub fn client(&self) -> &EdgexClient {
        &self.client
    }

    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    pub fn assets(&self) -> Option<&AccountAsset> {
        self.assets.as_ref()
    }

    pub fn positions(&self) -> &HashMap<String, Position> {
        &self.positions
    }

    pub fn active_orders(&self) -> &HashMap<String, Order> {
        &self.active_orders
    }

    pub fn market(&self) -> &MarketDataCache {
        &self.market
    }
}

/// Position payloads come as `{position: [..]}`, a bare list, or one object
fn positions_in(data: &Value) -> Vec<Position> {
    let items: Vec<&Value> = match data {
        Value::Object(map) => match map.get("position") {
            Some(Value::Array(list)) => list.iter().collect(),
            _ => vec![data],
        },
        Value::Array(list) => list.iter().collect(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Position>(item.clone()) {
            Ok(position) if !position.contract_id.is_empty() => Some(position),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "position decode failed");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positions_in_shapes() {
        let wrapped = json!({"position": [{"contractId": "10000001", "openSize": "0.5"}]});
        let bare = json!([{"contractId": "10000002", "openSize": "-1"}]);
        let single = json!({"contractId": "10000003", "openSize": "2"});

        assert_eq!(positions_in(&wrapped)[0].contract_id, "10000001");
        assert_eq!(positions_in(&bare)[0].open_size, Decimal::from(-1));
        assert_eq!(positions_in(&single)[0].contract_id, "10000003");
        assert!(positions_in(&json!({"openSize": "1"})).is_empty());
        assert!(positions_in(&Value::Null).is_empty());
    }
}

/*
[INPUT]:  WebSocket base URL, account id and signing adapter
[OUTPUT]: One merged stream of public and private WebSocketMessage values
[POS]:    WebSocket layer - public/private connection management
[UPDATE]: When adding channels or changing private stream auth
*/

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use crate::auth::{Credentials, SigningAdapter};
use crate::http::signature::RequestSigner;
use crate::http::{EdgexError, Result};
use crate::types::{DepthLevel, KlineInterval, PriceType};
use crate::ws::client::EdgexWebSocket;
use crate::ws::message::{
    depth_channel, kline_channel, ticker_channel, trades_channel, PrivateEvent, WebSocketMessage,
};

const PUBLIC_PATH: &str = "/api/v1/public/ws";
const PRIVATE_PATH: &str = "/api/v1/private/ws";
const MERGED_CAPACITY: usize = 256;

/// Owns the public quote stream and the private trade stream
#[derive(Debug)]
pub struct WebSocketManager {
    base_url: String,
    account_id: u64,
    signer: Option<Arc<dyn SigningAdapter>>,
    public: Option<EdgexWebSocket>,
    private: Option<EdgexWebSocket>,
    merged_tx: mpsc::Sender<WebSocketMessage>,
    merged_rx: Option<mpsc::Receiver<WebSocketMessage>>,
    private_events: Arc<RwLock<HashSet<PrivateEvent>>>,
}

impl WebSocketManager {
    pub fn new(base_url: &str, account_id: u64, signer: Option<Arc<dyn SigningAdapter>>) -> Self {
        let (merged_tx, merged_rx) = mpsc::channel(MERGED_CAPACITY);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id,
            signer,
            public: None,
            private: None,
            merged_tx,
            merged_rx: Some(merged_rx),
            private_events: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn with_credentials(base_url: &str, credentials: &Credentials) -> Self {
        Self::new(base_url, credentials.account_id, Some(credentials.signer.clone()))
    }

    /// Merged receiver for both streams; only the first call returns it
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<WebSocketMessage>> {
        self.merged_rx.take()
    }

    pub fn public_url(&self) -> String {
        format!("{}{PUBLIC_PATH}", self.base_url)
    }

    pub fn private_url(&self) -> String {
        format!("{}{PRIVATE_PATH}?accountId={}", self.base_url, self.account_id)
    }

    pub async fn connect_public(&mut self) -> Result<()> {
        let mut socket = EdgexWebSocket::new();
        socket.connect(&self.public_url()).await?;
        let receiver = socket
            .take_receiver()
            .ok_or_else(|| EdgexError::WebSocket("public receiver already taken".to_string()))?;
        spawn_forwarder(receiver, self.merged_tx.clone(), None);
        self.public = Some(socket);
        Ok(())
    }

    /// Connect the private stream with signed handshake headers
    pub async fn connect_private(&mut self) -> Result<()> {
        let signer = self.signer.clone().ok_or_else(|| EdgexError::Authentication {
            message: "private websocket requires a signer".to_string(),
        })?;
        let params = format!("accountId={}", self.account_id);
        let timestamp = chrono::Utc::now().timestamp_millis();
        let headers = RequestSigner::new(signer)
            .headers(timestamp, "GET", PRIVATE_PATH, &params)
            .await?;

        let mut socket = EdgexWebSocket::new();
        socket
            .connect_with_headers(&self.private_url(), &headers)
            .await?;
        let receiver = socket
            .take_receiver()
            .ok_or_else(|| EdgexError::WebSocket("private receiver already taken".to_string()))?;
        spawn_forwarder(
            receiver,
            self.merged_tx.clone(),
            Some(self.private_events.clone()),
        );
        self.private = Some(socket);
        info!(account_id = self.account_id, "private ws connected");
        Ok(())
    }

    fn public_socket(&self) -> Result<&EdgexWebSocket> {
        self.public
            .as_ref()
            .ok_or_else(|| EdgexError::NotConnected("public websocket".to_string()))
    }

    pub async fn subscribe_ticker(&self, contract_id: &str) -> Result<()> {
        self.public_socket()?
            .subscribe(&ticker_channel(contract_id))
            .await
    }

    pub async fn subscribe_kline(
        &self,
        contract_id: &str,
        interval: KlineInterval,
        price_type: PriceType,
    ) -> Result<()> {
        self.public_socket()?
            .subscribe(&kline_channel(contract_id, price_type, interval))
            .await
    }

    pub async fn subscribe_depth(&self, contract_id: &str, level: DepthLevel) -> Result<()> {
        self.public_socket()?
            .subscribe(&depth_channel(contract_id, level))
            .await
    }

    pub async fn subscribe_trades(&self, contract_id: &str) -> Result<()> {
        self.public_socket()?
            .subscribe(&trades_channel(contract_id))
            .await
    }

    pub async fn unsubscribe(&self, channel: &str) -> Result<()> {
        self.public_socket()?.unsubscribe(channel).await
    }

    /// The trade stream pushes every event kind; enabling one lets it through
    async fn enable_private_event(&self, event: PrivateEvent) -> Result<()> {
        if self.private.is_none() {
            return Err(EdgexError::NotConnected("private websocket".to_string()));
        }
        self.private_events.write().await.insert(event);
        debug!(?event, "private event enabled");
        Ok(())
    }

    pub async fn subscribe_account_update(&self) -> Result<()> {
        self.enable_private_event(PrivateEvent::Account).await
    }

    pub async fn subscribe_order_update(&self) -> Result<()> {
        self.enable_private_event(PrivateEvent::Order).await
    }

    pub async fn subscribe_position_update(&self) -> Result<()> {
        self.enable_private_event(PrivateEvent::Position).await
    }

    pub async fn disconnect_public(&mut self) {
        if let Some(socket) = self.public.take() {
            socket.disconnect().await;
            info!("public ws disconnected");
        }
    }

    pub async fn disconnect_private(&mut self) {
        if let Some(socket) = self.private.take() {
            socket.disconnect().await;
            self.private_events.write().await.clear();
            info!("private ws disconnected");
        }
    }

    pub async fn disconnect_all(&mut self) {
        self.disconnect_public().await;
        self.disconnect_private().await;
    }
}

/// Copy one connection's messages into the merged channel
///
/// With a filter, private events pass only when enabled; everything else
/// passes unchanged.
fn spawn_forwarder(
    mut receiver: mpsc::Receiver<WebSocketMessage>,
    merged_tx: mpsc::Sender<WebSocketMessage>,
    filter: Option<Arc<RwLock<HashSet<PrivateEvent>>>>,
) {
    tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            if let (Some(filter), Some(event)) = (&filter, message.private_event())
                && !filter.read().await.contains(&event)
            {
                continue;
            }
            if merged_tx.send(message).await.is_err() {
                break;
            }
        }
    });
}

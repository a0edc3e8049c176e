/*
[INPUT]:  WebSocket URL, optional auth headers and subscription frames
[OUTPUT]: Parsed WebSocketMessage values via an mpsc channel
[POS]:    WebSocket layer - single connection with heartbeat handling
[UPDATE]: When changing connection logic, heartbeat or log sampling
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use crate::http::{EdgexError, Result};
use crate::ws::message::{
    parse_frame, pong_for, subscribe_frame, unsubscribe_frame, InboundFrame, WebSocketMessage,
};

const CHANNEL_CAPACITY: usize = 100;
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
const MESSAGE_SAMPLE_LIMIT: usize = 3;
const SUBSCRIPTION_LOG_LIMIT: usize = 10;
const OTHER_LOG_LIMIT: usize = 3;
const PARSE_FAIL_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

static MESSAGE_SAMPLE_COUNT: AtomicUsize = AtomicUsize::new(0);
static SUBSCRIBE_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static OTHER_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static PARSE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

fn ws_error(err: impl std::fmt::Display) -> EdgexError {
    EdgexError::WebSocket(err.to_string())
}

/// One WebSocket connection to the edgeX quote or trade stream
#[derive(Debug)]
pub struct EdgexWebSocket {
    message_tx: mpsc::Sender<WebSocketMessage>,
    message_rx: Option<mpsc::Receiver<WebSocketMessage>>,
    outbound_tx: Arc<Mutex<Option<mpsc::Sender<WsMessage>>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EdgexWebSocket {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            message_tx: tx,
            message_rx: Some(rx),
            outbound_tx: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
        }
    }

    /// Get the message receiver; only the first call returns it
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<WebSocketMessage>> {
        self.message_rx.take()
    }

    pub async fn connect(&self, url: &str) -> Result<()> {
        self.connect_with_headers(url, &[]).await
    }

    /// Connect, attaching extra handshake headers (used for auth)
    pub async fn connect_with_headers(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
    ) -> Result<()> {
        let mut request = url.into_client_request().map_err(ws_error)?;
        for (name, value) in headers {
            let value = HeaderValue::from_str(value).map_err(|err| {
                EdgexError::InvalidParameter(format!("invalid header {name}: {err}"))
            })?;
            request.headers_mut().insert(*name, value);
        }

        let mut guard = self.outbound_tx.lock().await;
        if guard.is_some() {
            return Err(EdgexError::WebSocket("already connected".to_string()));
        }

        let (ws_stream, _response) = connect_async(request).await.map_err(ws_error)?;
        let (mut write, mut read) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<WsMessage>(CHANNEL_CAPACITY);
        *guard = Some(outbound_tx);
        drop(guard);
        info!(url, "ws connected");

        let message_tx = self.message_tx.clone();
        let outbound_state = self.outbound_tx.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    outbound = outbound_rx.recv() => {
                        match outbound {
                            Some(message) => {
                                if write.send(message).await.is_err() {
                                    break;
                                }
                            }
                            None => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                        }
                    }
                    incoming = read.next() => {
                        match incoming {
                            Some(Ok(WsMessage::Close(_))) => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                            Some(Ok(WsMessage::Ping(payload))) => {
                                if write.send(WsMessage::Pong(payload)).await.is_err() {
                                    break;
                                }
                            }
                            Some(Ok(WsMessage::Pong(_))) | Some(Ok(WsMessage::Frame(_))) => {}
                            Some(Ok(message)) => {
                                let Some(text) = frame_text(message) else {
                                    continue;
                                };
                                match decode_frame(&text) {
                                    Some(InboundFrame::Ping { time }) => {
                                        let pong = pong_for(&time).to_string();
                                        if write.send(WsMessage::Text(pong.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                    Some(InboundFrame::Message(parsed)) => {
                                        if message_tx.send(parsed).await.is_err() {
                                            break;
                                        }
                                    }
                                    None => {}
                                }
                            }
                            Some(Err(err)) => {
                                warn!(error = %err, "ws read failed");
                                break;
                            }
                            None => break,
                        }
                    }
                }
            }

            let mut guard = outbound_state.lock().await;
            *guard = None;
            debug!("ws connection task finished");
        });

        *self.task.lock().await = Some(handle);
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.outbound_tx.lock().await.is_some()
    }

    /// Queue a raw JSON frame
    pub async fn send_subscription(&self, message: serde_json::Value) -> Result<()> {
        let sender = {
            let guard = self.outbound_tx.lock().await;
            guard
                .clone()
                .ok_or_else(|| EdgexError::NotConnected("websocket not connected".to_string()))?
        };

        sender
            .send(WsMessage::Text(message.to_string().into()))
            .await
            .map_err(|_| EdgexError::WebSocket("send channel closed".to_string()))?;

        log_subscription_sent(&message);
        Ok(())
    }

    pub async fn subscribe(&self, channel: &str) -> Result<()> {
        self.send_subscription(subscribe_frame(channel)).await
    }

    pub async fn unsubscribe(&self, channel: &str) -> Result<()> {
        self.send_subscription(unsubscribe_frame(channel)).await
    }

    /// Close the connection and wait briefly for the task to exit
    ///
    /// Calling this on a closed connection is a no-op.
    pub async fn disconnect(&self) {
        let sender = self.outbound_tx.lock().await.take();
        drop(sender);

        if let Some(handle) = self.task.lock().await.take()
            && tokio::time::timeout(CLOSE_TIMEOUT, handle).await.is_err()
        {
            warn!("ws task did not stop within close timeout");
        }
    }
}

impl Default for EdgexWebSocket {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_text(message: WsMessage) -> Option<String> {
    match message {
        WsMessage::Text(text) => Some(text.to_string()),
        WsMessage::Binary(bytes) => String::from_utf8(bytes.to_vec()).ok(),
        _ => None,
    }
}

fn decode_frame(text: &str) -> Option<InboundFrame> {
    match parse_frame(text) {
        Ok(InboundFrame::Message(WebSocketMessage::Other)) => {
            log_other_message_once(text);
            Some(InboundFrame::Message(WebSocketMessage::Other))
        }
        Ok(InboundFrame::Message(parsed)) => {
            log_message_sample_once(&parsed);
            Some(InboundFrame::Message(parsed))
        }
        Ok(ping) => Some(ping),
        Err(err) => {
            log_parse_fail_once(&err, text);
            None
        }
    }
}

fn log_subscription_sent(message: &serde_json::Value) {
    let count = SUBSCRIBE_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count >= SUBSCRIPTION_LOG_LIMIT {
        return;
    }

    let action = message.get("type").and_then(|value| value.as_str());
    let channel = message.get("channel").and_then(|value| value.as_str());
    if let (Some(action), Some(channel)) = (action, channel) {
        info!(
            sample_index = count + 1,
            sample_limit = SUBSCRIPTION_LOG_LIMIT,
            action,
            channel,
            "ws subscription sent"
        );
        return;
    }

    let preview = truncate_for_log(&message.to_string(), RAW_LOG_MAX_BYTES);
    info!(
        sample_index = count + 1,
        sample_limit = SUBSCRIPTION_LOG_LIMIT,
        message = %preview,
        "ws subscription sent"
    );
}

fn log_message_sample_once(message: &WebSocketMessage) {
    let count = MESSAGE_SAMPLE_COUNT.fetch_add(1, Ordering::Relaxed);
    if count >= MESSAGE_SAMPLE_LIMIT {
        return;
    }

    match message.contract_id() {
        Some(contract_id) => info!(
            sample_index = count + 1,
            sample_limit = MESSAGE_SAMPLE_LIMIT,
            kind = message.kind(),
            contract_id,
            "ws message sample"
        ),
        None => info!(
            sample_index = count + 1,
            sample_limit = MESSAGE_SAMPLE_LIMIT,
            kind = message.kind(),
            "ws message sample"
        ),
    }
}

fn log_other_message_once(raw: &str) {
    let count = OTHER_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < OTHER_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = OTHER_LOG_LIMIT,
            bytes = raw.len(),
            "ws message type unrecognized"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = OTHER_LOG_LIMIT,
            message = %preview,
            "ws message type unrecognized"
        );
    }
}

fn log_parse_fail_once(err: &serde_json::Error, raw: &str) {
    let count = PARSE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < PARSE_FAIL_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            bytes = raw.len(),
            "ws message parse failed"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            message = %preview,
            "ws message parse failed"
        );
    }
}

/// Cut at the last char boundary at or below `max_len`
fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}

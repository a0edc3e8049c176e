/*
[INPUT]:  Raw WebSocket text frames from the quote and trade streams
[OUTPUT]: Parsed WebSocketMessage values, heartbeat pings, channel names
[POS]:    WebSocket layer - message parsing and classification
[UPDATE]: When adding new channels, event kinds or changing frame format
*/

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{DepthLevel, KlineInterval, PriceType};

/// Typed view of a frame received from either stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WebSocketMessage {
    Ticker { contract_id: String, data: Value },
    Kline { contract_id: String, interval: String, data: Value },
    Depth { contract_id: String, data: Value },
    Trade { contract_id: String, data: Value },
    AccountUpdate(Value),
    OrderUpdate(Value),
    PositionUpdate(Value),
    Subscribed { channel: String },
    Error { message: String },
    Other,
}

/// Private event kinds a caller can opt into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivateEvent {
    Account,
    Order,
    Position,
}

impl WebSocketMessage {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            WebSocketMessage::Ticker { .. } => "ticker",
            WebSocketMessage::Kline { .. } => "kline",
            WebSocketMessage::Depth { .. } => "depth",
            WebSocketMessage::Trade { .. } => "trades",
            WebSocketMessage::AccountUpdate(_) => "account",
            WebSocketMessage::OrderUpdate(_) => "order",
            WebSocketMessage::PositionUpdate(_) => "position",
            WebSocketMessage::Subscribed { .. } => "subscribed",
            WebSocketMessage::Error { .. } => "error",
            WebSocketMessage::Other => "other",
        }
    }

    pub fn contract_id(&self) -> Option<&str> {
        match self {
            WebSocketMessage::Ticker { contract_id, .. }
            | WebSocketMessage::Kline { contract_id, .. }
            | WebSocketMessage::Depth { contract_id, .. }
            | WebSocketMessage::Trade { contract_id, .. } => Some(contract_id),
            _ => None,
        }
    }

    pub fn private_event(&self) -> Option<PrivateEvent> {
        match self {
            WebSocketMessage::AccountUpdate(_) => Some(PrivateEvent::Account),
            WebSocketMessage::OrderUpdate(_) => Some(PrivateEvent::Order),
            WebSocketMessage::PositionUpdate(_) => Some(PrivateEvent::Position),
            _ => None,
        }
    }
}

/// Result of decoding one text frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Venue heartbeat; must be answered with [`pong_for`]
    Ping { time: Value },
    Message(WebSocketMessage),
}

/// Decode a text frame
///
/// Unknown frame types decode to `WebSocketMessage::Other`; only invalid
/// JSON is an error.
pub fn parse_frame(text: &str) -> Result<InboundFrame, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    let frame_type = value.get("type").and_then(Value::as_str).unwrap_or_default();

    let message = match frame_type {
        "ping" => {
            let time = value.get("time").cloned().unwrap_or(Value::Null);
            return Ok(InboundFrame::Ping { time });
        }
        "quote-event" | "payload" => classify_quote(&value),
        "trade-event" => classify_trade(&value),
        "subscribed" => WebSocketMessage::Subscribed {
            channel: value
                .get("channel")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        "error" => WebSocketMessage::Error {
            message: error_text(&value),
        },
        _ => WebSocketMessage::Other,
    };
    Ok(InboundFrame::Message(message))
}

/// Heartbeat reply echoing the ping time
pub fn pong_for(time: &Value) -> Value {
    serde_json::json!({ "type": "pong", "time": time })
}

pub fn subscribe_frame(channel: &str) -> Value {
    serde_json::json!({ "type": "subscribe", "channel": channel })
}

pub fn unsubscribe_frame(channel: &str) -> Value {
    serde_json::json!({ "type": "unsubscribe", "channel": channel })
}

pub fn ticker_channel(contract_id: &str) -> String {
    format!("ticker.{contract_id}")
}

pub fn kline_channel(contract_id: &str, price_type: PriceType, interval: KlineInterval) -> String {
    format!("kline.{}.{contract_id}.{}", price_type.as_str(), interval.as_str())
}

pub fn depth_channel(contract_id: &str, level: DepthLevel) -> String {
    format!("depth.{contract_id}.{}", level.as_u32())
}

pub fn trades_channel(contract_id: &str) -> String {
    format!("trades.{contract_id}")
}

fn classify_quote(value: &Value) -> WebSocketMessage {
    let content = value.get("content").unwrap_or(&Value::Null);
    let channel = value
        .get("channel")
        .or_else(|| content.get("channel"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let data = content.get("data").cloned().unwrap_or(Value::Null);
    let parts: Vec<&str> = channel.split('.').collect();

    match parts.as_slice() {
        ["ticker", contract_id, ..] => WebSocketMessage::Ticker {
            contract_id: contract_id.to_string(),
            data,
        },
        ["kline", _price_type, contract_id, interval, ..] => WebSocketMessage::Kline {
            contract_id: contract_id.to_string(),
            interval: interval.to_string(),
            data,
        },
        ["depth", contract_id, ..] => WebSocketMessage::Depth {
            contract_id: contract_id.to_string(),
            data,
        },
        ["trades", contract_id, ..] => WebSocketMessage::Trade {
            contract_id: contract_id.to_string(),
            data,
        },
        _ => WebSocketMessage::Other,
    }
}

fn classify_trade(value: &Value) -> WebSocketMessage {
    let content = value.get("content").unwrap_or(&Value::Null);
    let data = content.get("data").cloned().unwrap_or(Value::Null);

    match content.get("event").and_then(Value::as_str).unwrap_or_default() {
        "ACCOUNT_UPDATE" => WebSocketMessage::AccountUpdate(data),
        "ORDER_UPDATE" | "ORDER_FILL" => WebSocketMessage::OrderUpdate(data),
        "POSITION_UPDATE" => WebSocketMessage::PositionUpdate(data),
        _ => WebSocketMessage::Other,
    }
}

fn error_text(value: &Value) -> String {
    let content = value.get("content").unwrap_or(value);
    content
        .get("msg")
        .or_else(|| content.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| content.to_string())
}

/*
[INPUT]:  Public WebSocketMessage frames (ticker, kline, depth)
[OUTPUT]: Latest typed snapshot per contract (and per kline interval)
[POS]:    Data layer - market data cache (no trading logic)
[UPDATE]: When adding cached channels or changing snapshot decoding
*/

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use edgex_sdk::{Kline, OrderBookDepth, Ticker, WebSocketMessage};

/// Latest market snapshots keyed by contract id
#[derive(Debug, Default)]
pub struct MarketDataCache {
    tickers: HashMap<String, Ticker>,
    klines: HashMap<(String, String), Kline>,
    depths: HashMap<String, OrderBookDepth>,
}

impl MarketDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame into the cache; returns whether anything changed
    ///
    /// Non-market frames and payloads that fail to decode are ignored.
    pub fn apply(&mut self, message: &WebSocketMessage) -> bool {
        match message {
            WebSocketMessage::Ticker { contract_id, data } => {
                match decode_snapshot::<Ticker>(data, Snapshot::First) {
                    Some(ticker) => {
                        self.tickers.insert(contract_id.clone(), ticker);
                        true
                    }
                    None => false,
                }
            }
            WebSocketMessage::Kline {
                contract_id,
                interval,
                data,
            } => match decode_snapshot::<Kline>(data, Snapshot::Last) {
                Some(kline) => {
                    self.klines
                        .insert((contract_id.clone(), interval.clone()), kline);
                    true
                }
                None => false,
            },
            WebSocketMessage::Depth { contract_id, data } => {
                match decode_snapshot::<OrderBookDepth>(data, Snapshot::First) {
                    Some(depth) => {
                        self.depths.insert(contract_id.clone(), depth);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    pub fn ticker(&self, contract_id: &str) -> Option<&Ticker> {
        self.tickers.get(contract_id)
    }

    /// `interval` is the wire name, e.g. `MINUTE_1`
    pub fn kline(&self, contract_id: &str, interval: &str) -> Option<&Kline> {
        self.klines
            .get(&(contract_id.to_string(), interval.to_string()))
    }

    pub fn depth(&self, contract_id: &str) -> Option<&OrderBookDepth> {
        self.depths.get(contract_id)
    }

    pub fn last_price(&self, contract_id: &str) -> Option<Decimal> {
        self.ticker(contract_id)
            .and_then(|ticker| ticker.last_price)
    }
}

#[derive(Clone, Copy)]
enum Snapshot {
    First,
    Last,
}

/// Payloads arrive either as a list of snapshots or a single object
fn decode_snapshot<T: DeserializeOwned>(data: &Value, pick: Snapshot) -> Option<T> {
    let item = match data {
        Value::Array(items) => match pick {
            Snapshot::First => items.first(),
            Snapshot::Last => items.last(),
        },
        Value::Object(_) => Some(data),
        _ => None,
    }?;

    match serde_json::from_value(item.clone()) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            debug!(error = %err, "market snapshot decode failed");
            None
        }
    }
}

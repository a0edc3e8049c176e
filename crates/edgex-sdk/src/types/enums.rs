/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::http::EdgexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLimit,
    StopMarket,
    TakeProfitLimit,
    TakeProfitMarket,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    GoodTilCancel,
    ImmediateOrCancel,
    FillOrKill,
    PostOnly,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Open,
    Filled,
    Canceling,
    Canceled,
    Untriggered,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether the order can still trade
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Open | OrderStatus::Untriggered
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceType {
    #[default]
    LastPrice,
    MarkPrice,
    IndexPrice,
    OraclePrice,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::LastPrice => "LAST_PRICE",
            PriceType::MarkPrice => "MARK_PRICE",
            PriceType::IndexPrice => "INDEX_PRICE",
            PriceType::OraclePrice => "ORACLE_PRICE",
        }
    }
}

/// K-line bucket width.
///
/// Accepts both the short form (`1m`, `4h`, `1M`) and the wire form
/// (`MINUTE_1`, `HOUR_4`, `MONTH_1`); always serialises to the wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KlineInterval {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
    Week1,
    Month1,
}

const KLINE_INTERVALS: [(KlineInterval, &str, &str); 13] = [
    (KlineInterval::Minute1, "1m", "MINUTE_1"),
    (KlineInterval::Minute5, "5m", "MINUTE_5"),
    (KlineInterval::Minute15, "15m", "MINUTE_15"),
    (KlineInterval::Minute30, "30m", "MINUTE_30"),
    (KlineInterval::Hour1, "1h", "HOUR_1"),
    (KlineInterval::Hour2, "2h", "HOUR_2"),
    (KlineInterval::Hour4, "4h", "HOUR_4"),
    (KlineInterval::Hour6, "6h", "HOUR_6"),
    (KlineInterval::Hour8, "8h", "HOUR_8"),
    (KlineInterval::Hour12, "12h", "HOUR_12"),
    (KlineInterval::Day1, "1d", "DAY_1"),
    (KlineInterval::Week1, "1w", "WEEK_1"),
    (KlineInterval::Month1, "1M", "MONTH_1"),
];

impl KlineInterval {
    /// Wire name used in REST queries and WebSocket channels
    pub fn as_str(&self) -> &'static str {
        KLINE_INTERVALS
            .iter()
            .find(|(interval, _, _)| interval == self)
            .map(|(_, _, wire)| *wire)
            .unwrap_or("MINUTE_1")
    }

    /// Short human form (`1m`, `1h`, ...)
    pub fn short_name(&self) -> &'static str {
        KLINE_INTERVALS
            .iter()
            .find(|(interval, _, _)| interval == self)
            .map(|(_, short, _)| *short)
            .unwrap_or("1m")
    }
}

impl FromStr for KlineInterval {
    type Err = EdgexError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        KLINE_INTERVALS
            .iter()
            .find(|(_, short, wire)| *short == value || wire.eq_ignore_ascii_case(value))
            .map(|(interval, _, _)| *interval)
            .ok_or_else(|| EdgexError::InvalidParameter(format!("unknown kline interval: {value}")))
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for KlineInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KlineInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Order book depth the venue serves; only 15 and 200 levels exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthLevel {
    #[default]
    Fifteen,
    TwoHundred,
}

impl DepthLevel {
    pub fn as_u32(&self) -> u32 {
        match self {
            DepthLevel::Fifteen => 15,
            DepthLevel::TwoHundred => 200,
        }
    }
}

impl TryFrom<u32> for DepthLevel {
    type Error = EdgexError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            15 => Ok(DepthLevel::Fifteen),
            200 => Ok(DepthLevel::TwoHundred),
            other => Err(EdgexError::InvalidParameter(format!(
                "depth level must be 15 or 200, got {other}"
            ))),
        }
    }
}

impl fmt::Display for DepthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{OrderSide, OrderStatus, OrderType, TimeInForce};
use super::serde_helpers::{decimal_opt, decimal_or_zero, string_lenient};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerTime {
    #[serde(with = "string_lenient")]
    pub time_millis: String,
}

impl ServerTime {
    pub fn as_millis(&self) -> Option<i64> {
        self.time_millis.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub global: serde_json::Value,
    pub coin_list: Vec<Coin>,
    pub contract_list: Vec<ContractInfo>,
}

impl Metadata {
    pub fn contract(&self, contract_id: &str) -> Option<&ContractInfo> {
        self.contract_list
            .iter()
            .find(|contract| contract.contract_id == contract_id)
    }

    pub fn coin(&self, coin_id: &str) -> Option<&Coin> {
        self.coin_list.iter().find(|coin| coin.coin_id == coin_id)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Coin {
    #[serde(with = "string_lenient")]
    pub coin_id: String,
    pub coin_name: String,
    #[serde(with = "decimal_or_zero")]
    pub step_size: Decimal,
    pub stark_ex_asset_id: String,
    #[serde(with = "string_lenient")]
    pub stark_ex_resolution: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractInfo {
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    pub contract_name: String,
    #[serde(with = "string_lenient")]
    pub base_coin_id: String,
    #[serde(with = "string_lenient")]
    pub quote_coin_id: String,
    #[serde(with = "decimal_or_zero")]
    pub tick_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub step_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub min_order_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub max_order_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub default_maker_fee_rate: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub default_taker_fee_rate: Decimal,
    pub enable_trade: bool,
    pub enable_display: bool,
    pub enable_open_position: bool,
    pub stark_ex_synthetic_asset_id: String,
    #[serde(with = "string_lenient")]
    pub stark_ex_resolution: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ticker {
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    pub contract_name: String,
    #[serde(with = "decimal_opt")]
    pub price_change: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub price_change_percent: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub trades: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub size: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub value: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub high: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub low: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub open: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub close: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub last_price: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub index_price: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub oracle_price: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub mark_price: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub open_interest: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub funding_rate: Option<Decimal>,
    #[serde(with = "string_lenient")]
    pub funding_time: String,
    #[serde(with = "string_lenient")]
    pub next_funding_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Kline {
    #[serde(with = "string_lenient")]
    pub kline_id: String,
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    pub contract_name: String,
    pub kline_type: String,
    #[serde(with = "string_lenient")]
    pub kline_time: String,
    pub price_type: String,
    #[serde(with = "decimal_or_zero")]
    pub trades: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub high: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub low: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub open: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub close: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceLevel {
    #[serde(with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub size: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderBookDepth {
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    pub contract_name: String,
    #[serde(with = "string_lenient")]
    pub level: String,
    #[serde(with = "string_lenient")]
    pub start_version: String,
    #[serde(with = "string_lenient")]
    pub end_version: String,
    pub depth_type: String,
    pub asks: Vec<PriceLevel>,
    pub bids: Vec<PriceLevel>,
}

impl OrderBookDepth {
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    #[serde(with = "string_lenient")]
    pub id: String,
    #[serde(with = "string_lenient")]
    pub user_id: String,
    pub eth_address: String,
    pub l2_key: String,
    #[serde(with = "string_lenient")]
    pub client_account_id: String,
    pub status: String,
    pub contract_id_to_trade_setting: serde_json::Value,
    #[serde(with = "string_lenient")]
    pub created_time: String,
    #[serde(with = "string_lenient")]
    pub updated_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Collateral {
    #[serde(with = "string_lenient")]
    pub coin_id: String,
    #[serde(with = "decimal_or_zero")]
    pub amount: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_deposit_amount: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_withdraw_amount: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_transfer_in_amount: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_transfer_out_amount: Decimal,
    #[serde(with = "string_lenient")]
    pub updated_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    #[serde(with = "string_lenient")]
    pub account_id: String,
    #[serde(with = "string_lenient")]
    pub coin_id: String,
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    #[serde(with = "decimal_or_zero")]
    pub open_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub open_value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub open_fee: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub funding_fee: Decimal,
    #[serde(with = "string_lenient")]
    pub updated_time: String,
}

impl Position {
    /// Side implied by the sign of the open size; `None` when flat
    pub fn side(&self) -> Option<OrderSide> {
        if self.open_size > Decimal::ZERO {
            Some(OrderSide::Buy)
        } else if self.open_size < Decimal::ZERO {
            Some(OrderSide::Sell)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionAsset {
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    #[serde(with = "decimal_or_zero")]
    pub position_value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub max_leverage: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub initial_margin_requirement: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub avg_entry_price: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub liquidate_price: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub bankrupt_price: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub unrealize_pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollateralAsset {
    #[serde(with = "string_lenient")]
    pub coin_id: String,
    #[serde(with = "decimal_or_zero")]
    pub total_equity: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub total_position_value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub initial_margin_requirement: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub available_amount: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub pending_withdraw_amount: Decimal,
}

/// Account asset response; also the source of position data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountAsset {
    pub account: Account,
    pub collateral_list: Vec<Collateral>,
    pub position_list: Vec<Position>,
    pub position_asset_list: Vec<PositionAsset>,
    pub collateral_asset_model_list: Vec<CollateralAsset>,
    #[serde(with = "string_lenient")]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    #[serde(with = "string_lenient")]
    pub id: String,
    #[serde(with = "string_lenient")]
    pub account_id: String,
    #[serde(with = "string_lenient")]
    pub coin_id: String,
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    pub side: Option<OrderSide>,
    #[serde(with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub size: Decimal,
    pub client_order_id: String,
    #[serde(rename = "type")]
    pub order_type: Option<OrderType>,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: bool,
    #[serde(with = "decimal_opt")]
    pub trigger_price: Option<Decimal>,
    #[serde(with = "string_lenient")]
    pub expire_time: String,
    pub status: Option<OrderStatus>,
    #[serde(with = "decimal_or_zero")]
    pub cum_fill_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_fill_value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_fill_fee: Decimal,
    #[serde(with = "string_lenient")]
    pub created_time: String,
    #[serde(with = "string_lenient")]
    pub updated_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderFillTransaction {
    #[serde(with = "string_lenient")]
    pub id: String,
    #[serde(with = "string_lenient")]
    pub account_id: String,
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    #[serde(with = "string_lenient")]
    pub order_id: String,
    pub order_side: Option<OrderSide>,
    #[serde(with = "decimal_or_zero")]
    pub fill_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub fill_value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub fill_fee: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub fill_price: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub realize_pnl: Decimal,
    pub direction: String,
    #[serde(with = "string_lenient")]
    pub created_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionTransaction {
    #[serde(with = "string_lenient")]
    pub id: String,
    #[serde(with = "string_lenient")]
    pub account_id: String,
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(with = "decimal_or_zero")]
    pub delta_open_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub delta_open_value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub delta_open_fee: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub delta_funding_fee: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub before_open_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub after_open_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub fill_price: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub realize_pnl: Decimal,
    #[serde(with = "string_lenient")]
    pub created_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollateralTransaction {
    #[serde(with = "string_lenient")]
    pub id: String,
    #[serde(with = "string_lenient")]
    pub account_id: String,
    #[serde(with = "string_lenient")]
    pub coin_id: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(with = "decimal_or_zero")]
    pub delta_amount: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub before_amount: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub after_amount: Decimal,
    #[serde(with = "string_lenient")]
    pub created_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionTerm {
    #[serde(with = "string_lenient")]
    pub account_id: String,
    #[serde(with = "string_lenient")]
    pub contract_id: String,
    #[serde(with = "string_lenient")]
    pub term_count: String,
    #[serde(with = "decimal_or_zero")]
    pub cum_open_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_open_value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_close_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_close_value: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub cum_funding_fee: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub current_leverage: Decimal,
    #[serde(with = "string_lenient")]
    pub created_time: String,
    #[serde(with = "string_lenient")]
    pub updated_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountAssetSnapshot {
    #[serde(with = "string_lenient")]
    pub account_id: String,
    #[serde(with = "string_lenient")]
    pub coin_id: String,
    #[serde(with = "string_lenient")]
    pub time_tag: String,
    #[serde(with = "decimal_or_zero")]
    pub total_equity: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub term_realize_pnl: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub unrealize_pnl: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub total_realize_pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleverageLight {
    pub position_contract_id_to_light_number_map: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderResult {
    #[serde(with = "string_lenient")]
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelOrderResult {
    pub cancel_result_map: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaxOrderSize {
    #[serde(with = "decimal_or_zero")]
    pub max_buy_size: Decimal,
    #[serde(with = "decimal_or_zero")]
    pub max_sell_size: Decimal,
    #[serde(with = "decimal_opt")]
    pub ask1_price: Option<Decimal>,
    #[serde(with = "decimal_opt")]
    pub bid1_price: Option<Decimal>,
}

/*
[INPUT]:  Caller-supplied query/order parameters
[OUTPUT]: Typed request structs and their query-string renderings
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use rust_decimal::Decimal;

use super::enums::{DepthLevel, KlineInterval, OrderSide, OrderType, PriceType, TimeInForce};

/// Ordered `key=value` pairs for a GET query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs(Vec<(&'static str, String)>);

impl QueryPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        self.0.push((key, value.to_string()));
        self
    }

    /// Add the pair only when the value is present and non-empty
    pub fn push_non_empty(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.0.push((key, value.to_string()));
        }
        self
    }

    /// Add a comma-joined list, skipped when empty
    pub fn push_list(&mut self, key: &'static str, values: &[String]) -> &mut Self {
        if !values.is_empty() {
            self.0.push((key, values.join(",")));
        }
        self
    }

    /// Add a timestamp filter, skipped unless strictly positive
    pub fn push_positive(&mut self, key: &'static str, value: i64) -> &mut Self {
        if value > 0 {
            self.0.push((key, value.to_string()));
        }
        self
    }

    /// Append every pair of `other`, keeping order
    pub fn extend(&mut self, other: QueryPairs) -> &mut Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn as_slice(&self) -> &[(&'static str, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn push_page(pairs: &mut QueryPairs, size: Option<u32>, offset_data: Option<&str>) {
    if let Some(size) = size.filter(|size| *size > 0) {
        pairs.push("size", size);
    }
    pairs.push_non_empty("offsetData", offset_data);
}

fn push_created_window(pairs: &mut QueryPairs, start: i64, end: i64) {
    pairs
        .push_positive("filterStartCreatedTimeInclusive", start)
        .push_positive("filterEndCreatedTimeExclusive", end);
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetKLineParams {
    pub contract_id: String,
    pub interval: KlineInterval,
    pub price_type: PriceType,
    pub size: Option<u32>,
    pub offset_data: Option<String>,
    pub filter_begin_kline_time_inclusive: i64,
    pub filter_end_kline_time_exclusive: i64,
}

impl GetKLineParams {
    pub fn new(contract_id: impl Into<String>, interval: KlineInterval) -> Self {
        Self {
            contract_id: contract_id.into(),
            interval,
            price_type: PriceType::LastPrice,
            size: None,
            offset_data: None,
            filter_begin_kline_time_inclusive: 0,
            filter_end_kline_time_exclusive: 0,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_offset_data(mut self, offset_data: impl Into<String>) -> Self {
        self.offset_data = Some(offset_data.into());
        self
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        pairs
            .push("contractId", &self.contract_id)
            .push("priceType", self.price_type.as_str())
            .push("klineType", self.interval.as_str());
        push_page(&mut pairs, self.size, self.offset_data.as_deref());
        pairs
            .push_positive(
                "filterBeginKlineTimeInclusive",
                self.filter_begin_kline_time_inclusive,
            )
            .push_positive(
                "filterEndKlineTimeExclusive",
                self.filter_end_kline_time_exclusive,
            );
        pairs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetOrderBookDepthParams {
    pub contract_id: String,
    pub level: DepthLevel,
}

impl GetOrderBookDepthParams {
    pub fn new(contract_id: impl Into<String>, level: DepthLevel) -> Self {
        Self {
            contract_id: contract_id.into(),
            level,
        }
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        pairs
            .push("contractId", &self.contract_id)
            .push("level", self.level.as_u32());
        pairs
    }
}

/// Parameters for a new order; the l2 fields are derived by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderParams {
    pub contract_id: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub size: Decimal,
    pub price: Decimal,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: bool,
    pub client_order_id: Option<String>,
    /// Milliseconds since epoch; defaults to now + 14 days
    pub expire_time: Option<i64>,
    pub trigger_price: Option<Decimal>,
    pub trigger_price_type: Option<PriceType>,
}

impl CreateOrderParams {
    pub fn limit(
        contract_id: impl Into<String>,
        side: OrderSide,
        size: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            side,
            order_type: OrderType::Limit,
            size,
            price,
            time_in_force: Some(TimeInForce::GoodTilCancel),
            reduce_only: false,
            client_order_id: None,
            expire_time: None,
            trigger_price: None,
            trigger_price_type: None,
        }
    }

    pub fn market(contract_id: impl Into<String>, side: OrderSide, size: Decimal) -> Self {
        Self {
            order_type: OrderType::Market,
            price: Decimal::ZERO,
            time_in_force: Some(TimeInForce::ImmediateOrCancel),
            ..Self::limit(contract_id, side, size, Decimal::ZERO)
        }
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.client_order_id = Some(client_order_id.into());
        self
    }

    pub fn is_market(&self) -> bool {
        matches!(
            self.order_type,
            OrderType::Market | OrderType::StopMarket | OrderType::TakeProfitMarket
        )
    }
}

/// What to cancel
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOrderParams {
    ByOrderIds(Vec<String>),
    ByClientOrderIds(Vec<String>),
    /// Every open order, optionally restricted to one contract
    All { contract_id: Option<String> },
}

impl CancelOrderParams {
    pub fn by_order_id(order_id: impl Into<String>) -> Self {
        CancelOrderParams::ByOrderIds(vec![order_id.into()])
    }

    pub fn all(contract_id: Option<&str>) -> Self {
        CancelOrderParams::All {
            contract_id: contract_id
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetActiveOrderParams {
    pub size: Option<u32>,
    pub offset_data: Option<String>,
    pub filter_contract_id_list: Vec<String>,
    pub filter_type_list: Vec<OrderType>,
    pub filter_start_created_time_inclusive: i64,
    pub filter_end_created_time_exclusive: i64,
}

impl GetActiveOrderParams {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push_page(&mut pairs, self.size, self.offset_data.as_deref());
        pairs.push_list("filterContractIdList", &self.filter_contract_id_list);
        let types: Vec<String> = self
            .filter_type_list
            .iter()
            .filter_map(|order_type| serde_json::to_value(order_type).ok())
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect();
        pairs.push_list("filterTypeList", &types);
        push_created_window(
            &mut pairs,
            self.filter_start_created_time_inclusive,
            self.filter_end_created_time_exclusive,
        );
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFillTransactionParams {
    pub size: Option<u32>,
    pub offset_data: Option<String>,
    pub filter_contract_id_list: Vec<String>,
    pub filter_order_id_list: Vec<String>,
    pub filter_start_created_time_inclusive: i64,
    pub filter_end_created_time_exclusive: i64,
}

impl OrderFillTransactionParams {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push_page(&mut pairs, self.size, self.offset_data.as_deref());
        pairs
            .push_list("filterContractIdList", &self.filter_contract_id_list)
            .push_list("filterOrderIdList", &self.filter_order_id_list);
        push_created_window(
            &mut pairs,
            self.filter_start_created_time_inclusive,
            self.filter_end_created_time_exclusive,
        );
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetPositionTransactionPageParams {
    pub size: Option<u32>,
    pub offset_data: Option<String>,
    pub filter_contract_id_list: Vec<String>,
    pub filter_start_created_time_inclusive: i64,
    pub filter_end_created_time_exclusive: i64,
}

impl GetPositionTransactionPageParams {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push_page(&mut pairs, self.size, self.offset_data.as_deref());
        pairs.push_list("filterContractIdList", &self.filter_contract_id_list);
        push_created_window(
            &mut pairs,
            self.filter_start_created_time_inclusive,
            self.filter_end_created_time_exclusive,
        );
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetCollateralTransactionPageParams {
    pub size: Option<u32>,
    pub offset_data: Option<String>,
    pub filter_start_created_time_inclusive: i64,
    pub filter_end_created_time_exclusive: i64,
}

impl GetCollateralTransactionPageParams {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push_page(&mut pairs, self.size, self.offset_data.as_deref());
        push_created_window(
            &mut pairs,
            self.filter_start_created_time_inclusive,
            self.filter_end_created_time_exclusive,
        );
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetPositionTermPageParams {
    pub size: Option<u32>,
    pub offset_data: Option<String>,
    pub filter_contract_id_list: Vec<String>,
    pub filter_start_created_time_inclusive: i64,
    pub filter_end_created_time_exclusive: i64,
}

impl GetPositionTermPageParams {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push_page(&mut pairs, self.size, self.offset_data.as_deref());
        pairs.push_list("filterContractIdList", &self.filter_contract_id_list);
        push_created_window(
            &mut pairs,
            self.filter_start_created_time_inclusive,
            self.filter_end_created_time_exclusive,
        );
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetAccountAssetSnapshotPageParams {
    pub size: Option<u32>,
    pub offset_data: Option<String>,
    pub filter_start_created_time_inclusive: i64,
    pub filter_end_created_time_exclusive: i64,
}

impl GetAccountAssetSnapshotPageParams {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push_page(&mut pairs, self.size, self.offset_data.as_deref());
        push_created_window(
            &mut pairs,
            self.filter_start_created_time_inclusive,
            self.filter_end_created_time_exclusive,
        );
        pairs
    }
}

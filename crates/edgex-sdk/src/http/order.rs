/*
[INPUT]:  Order parameters, cached metadata and the signing adapter
[OUTPUT]: Created/cancelled orders, active orders, fills, max order size
[POS]:    HTTP layer - private order endpoints (signed)
[UPDATE]: When changing order fields, l2 derivation or cancel routing
*/

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::http::signature::canonical_body;
use crate::http::{EdgexClient, EdgexError, Result};
use crate::types::{
    CancelOrderParams, CancelOrderResult, ContractInfo, CreateOrderParams, CreateOrderResult,
    GetActiveOrderParams, MaxOrderSize, Metadata, Order, OrderFillTransaction,
    OrderFillTransactionParams, OrderSide, Page, TimeInForce,
};

const ORDER_EXPIRY_MS: i64 = 14 * 24 * 60 * 60 * 1000;
const L2_EXPIRY_EXTRA_MS: i64 = 9 * 24 * 60 * 60 * 1000;
/// Quote precision used for the l2 fee bound
const FEE_DECIMALS: u32 = 6;

/// Derived l2 fields that are signed alongside an order
#[derive(Debug, Clone, PartialEq)]
pub struct L2OrderFields {
    pub nonce: u32,
    pub value: Decimal,
    pub size: Decimal,
    pub limit_fee: Decimal,
    pub expire_time: i64,
}

impl L2OrderFields {
    /// Compute l2 fields for `size` at `reference_price`
    ///
    /// Fails with `InvalidParameter` when the order value or fee bound
    /// does not fit in a `Decimal`.
    pub fn derive(
        contract: &ContractInfo,
        client_order_id: &str,
        size: Decimal,
        reference_price: Decimal,
        expire_time: i64,
    ) -> Result<Self> {
        let value = size.checked_mul(reference_price).ok_or_else(|| {
            EdgexError::InvalidParameter(format!(
                "order value overflows: size {size} * price {reference_price}"
            ))
        })?;
        let limit_fee = value
            .checked_mul(contract.default_taker_fee_rate)
            .ok_or_else(|| {
                EdgexError::InvalidParameter(format!("order fee overflows for value {value}"))
            })?
            .round_dp_with_strategy(FEE_DECIMALS, RoundingStrategy::ToPositiveInfinity);
        let expire_time = expire_time.checked_add(L2_EXPIRY_EXTRA_MS).ok_or_else(|| {
            EdgexError::InvalidParameter(format!("expire time {expire_time} out of range"))
        })?;
        Ok(Self {
            nonce: nonce_for(client_order_id),
            value,
            size,
            limit_fee,
            expire_time,
        })
    }

    /// Canonical text handed to the signing adapter
    pub fn sign_payload(&self, contract: &ContractInfo, side: OrderSide) -> String {
        canonical_body(&json!({
            "contractId": contract.contract_id,
            "syntheticAssetId": contract.stark_ex_synthetic_asset_id,
            "side": side.as_str(),
            "l2Nonce": self.nonce.to_string(),
            "l2Value": self.value.normalize().to_string(),
            "l2Size": self.size.normalize().to_string(),
            "l2LimitFee": self.limit_fee.normalize().to_string(),
            "l2ExpireTime": self.expire_time.to_string(),
        }))
    }
}

/// First four bytes of sha256(client order id)
fn nonce_for(client_order_id: &str) -> u32 {
    let digest = Sha256::digest(client_order_id.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

fn is_tick_multiple(value: Decimal, tick: Decimal) -> bool {
    tick <= Decimal::ZERO || (value % tick).is_zero()
}

/// Reject orders the venue would refuse anyway
fn validate_order(contract: &ContractInfo, params: &CreateOrderParams) -> Result<()> {
    if params.size <= Decimal::ZERO {
        return Err(EdgexError::InvalidParameter(format!(
            "order size must be positive, got {}",
            params.size
        )));
    }
    if contract.min_order_size > Decimal::ZERO && params.size < contract.min_order_size {
        return Err(EdgexError::InvalidParameter(format!(
            "order size {} below minimum {} for contract {}",
            params.size, contract.min_order_size, contract.contract_id
        )));
    }
    if !is_tick_multiple(params.size, contract.step_size) {
        return Err(EdgexError::InvalidParameter(format!(
            "order size {} is not a multiple of step size {}",
            params.size, contract.step_size
        )));
    }
    if !params.is_market() {
        if params.price <= Decimal::ZERO {
            return Err(EdgexError::InvalidParameter(format!(
                "limit price must be positive, got {}",
                params.price
            )));
        }
        if !is_tick_multiple(params.price, contract.tick_size) {
            return Err(EdgexError::InvalidParameter(format!(
                "price {} is not a multiple of tick size {}",
                params.price, contract.tick_size
            )));
        }
    }
    Ok(())
}

impl EdgexClient {
    /// Metadata from the cache, fetched once on first use
    async fn order_metadata(&self) -> Result<Metadata> {
        match self.cached_metadata().await {
            Some(metadata) => Ok(metadata),
            None => self.get_metadata().await,
        }
    }

    /// Reference price for l2 value of a market order
    async fn market_reference_price(&self, contract_id: &str) -> Result<Decimal> {
        let tickers = self.get_24_hour_quote(contract_id).await?;
        tickers
            .first()
            .and_then(|ticker| ticker.oracle_price.or(ticker.last_price))
            .filter(|price| *price > Decimal::ZERO)
            .ok_or_else(|| {
                EdgexError::InvalidResponse(format!("no reference price for contract {contract_id}"))
            })
    }

    /// Create an order
    ///
    /// POST /api/v1/private/order/createOrder
    ///
    /// Validates size and price against contract metadata, derives and signs
    /// the l2 fields, then submits.
    pub async fn create_order(&self, params: &CreateOrderParams) -> Result<CreateOrderResult> {
        let account_id = self.account_id()?;
        let signer = self
            .credentials()
            .map(|credentials| credentials.signer.clone())
            .ok_or_else(|| EdgexError::Authentication {
                message: "no signer configured for order creation".to_string(),
            })?;

        let metadata = self.order_metadata().await?;
        let contract = metadata.contract(&params.contract_id).ok_or_else(|| {
            EdgexError::InvalidParameter(format!("unknown contract id {}", params.contract_id))
        })?;
        validate_order(contract, params)?;

        let reference_price = if params.is_market() {
            self.market_reference_price(&params.contract_id).await?
        } else {
            params.price
        };

        let client_order_id = params
            .client_order_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let expire_time = params
            .expire_time
            .unwrap_or_else(|| Utc::now().timestamp_millis() + ORDER_EXPIRY_MS);
        let l2 = L2OrderFields::derive(
            contract,
            &client_order_id,
            params.size,
            reference_price,
            expire_time,
        )?;
        let signature = signer
            .sign(l2.sign_payload(contract, params.side).as_bytes())
            .await?;

        let time_in_force = params
            .time_in_force
            .unwrap_or(TimeInForce::GoodTilCancel);
        let mut body = json!({
            "accountId": account_id.to_string(),
            "contractId": params.contract_id,
            "side": params.side,
            "size": params.size.normalize().to_string(),
            "price": params.price.normalize().to_string(),
            "clientOrderId": client_order_id,
            "type": params.order_type,
            "timeInForce": time_in_force,
            "reduceOnly": params.reduce_only,
            "expireTime": expire_time.to_string(),
            "l2Nonce": l2.nonce.to_string(),
            "l2Value": l2.value.normalize().to_string(),
            "l2Size": l2.size.normalize().to_string(),
            "l2LimitFee": l2.limit_fee.normalize().to_string(),
            "l2ExpireTime": l2.expire_time.to_string(),
            "l2Signature": signature.to_hex(),
        });
        if let (Some(trigger), Value::Object(fields)) = (params.trigger_price, &mut body) {
            fields.insert(
                "triggerPrice".to_string(),
                Value::String(trigger.normalize().to_string()),
            );
            if let Some(price_type) = params.trigger_price_type {
                fields.insert(
                    "triggerPriceType".to_string(),
                    Value::String(price_type.as_str().to_string()),
                );
            }
        }

        debug!(client_order_id = %client_order_id, nonce = l2.nonce, "submitting order");
        let result: CreateOrderResult = self
            .post_private("/api/v1/private/order/createOrder", &body)
            .await?;
        info!(
            order_id = %result.order_id,
            contract_id = %params.contract_id,
            side = params.side.as_str(),
            size = %params.size,
            price = %params.price,
            "order created"
        );
        Ok(result)
    }

    /// Good-til-cancel limit order
    pub async fn create_limit_order(
        &self,
        contract_id: &str,
        side: OrderSide,
        size: Decimal,
        price: Decimal,
    ) -> Result<CreateOrderResult> {
        self.create_order(&CreateOrderParams::limit(contract_id, side, size, price))
            .await
    }

    /// Immediate-or-cancel market order
    pub async fn create_market_order(
        &self,
        contract_id: &str,
        side: OrderSide,
        size: Decimal,
    ) -> Result<CreateOrderResult> {
        self.create_order(&CreateOrderParams::market(contract_id, side, size))
            .await
    }

    /// Cancel by order ids, by client order ids, or everything
    pub async fn cancel_order(&self, params: &CancelOrderParams) -> Result<CancelOrderResult> {
        let account_id = self.account_id()?.to_string();
        let (endpoint, body) = match params {
            CancelOrderParams::ByOrderIds(ids) => (
                "/api/v1/private/order/cancelOrderById",
                json!({ "accountId": account_id, "orderIdList": ids }),
            ),
            CancelOrderParams::ByClientOrderIds(ids) => (
                "/api/v1/private/order/cancelOrderByClientOrderId",
                json!({ "accountId": account_id, "clientOrderIdList": ids }),
            ),
            CancelOrderParams::All { contract_id } => {
                let filter: Vec<&str> = contract_id.iter().map(String::as_str).collect();
                (
                    "/api/v1/private/order/cancelAllOrder",
                    json!({ "accountId": account_id, "filterContractIdList": filter }),
                )
            }
        };

        let result: CancelOrderResult = self.post_private_or_default(endpoint, &body).await?;
        info!(endpoint, cancelled = result.cancel_result_map.len(), "cancel request accepted");
        Ok(result)
    }

    /// GET /api/v1/private/order/getActiveOrderPage
    pub async fn get_active_orders(&self, params: &GetActiveOrderParams) -> Result<Page<Order>> {
        let mut query = self.account_query()?;
        query.extend(params.to_query());
        self.get_private("/api/v1/private/order/getActiveOrderPage", &query)
            .await
    }

    /// GET /api/v1/private/order/getHistoryOrderFillTransactionPage
    pub async fn get_order_fill_transactions(
        &self,
        params: &OrderFillTransactionParams,
    ) -> Result<Page<OrderFillTransaction>> {
        let mut query = self.account_query()?;
        query.extend(params.to_query());
        self.get_private(
            "/api/v1/private/order/getHistoryOrderFillTransactionPage",
            &query,
        )
        .await
    }

    /// POST /api/v1/private/order/getMaxCreateOrderSize
    pub async fn get_max_order_size(&self, contract_id: &str, price: Decimal) -> Result<MaxOrderSize> {
        let body = json!({
            "accountId": self.account_id()?.to_string(),
            "contractId": contract_id,
            "price": price.normalize().to_string(),
        });
        self.post_private("/api/v1/private/order/getMaxCreateOrderSize", &body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{Credentials, MockSigningAdapter};
    use crate::types::OrderType;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const METADATA: &str = r#"{
        "code": "SUCCESS",
        "data": {
            "coinList": [],
            "contractList": [{
                "contractId": "10000001",
                "contractName": "BTCUSDT",
                "tickSize": "0.1",
                "stepSize": "0.001",
                "minOrderSize": "0.001",
                "defaultTakerFeeRate": "0.0005",
                "starkExSyntheticAssetId": "0x4254432d3130000000000000000000",
                "enableTrade": true
            }]
        }
    }"#;

    fn btc_contract() -> ContractInfo {
        ContractInfo {
            contract_id: "10000001".to_string(),
            tick_size: dec!(0.1),
            step_size: dec!(0.001),
            min_order_size: dec!(0.001),
            default_taker_fee_rate: dec!(0.0005),
            ..Default::default()
        }
    }

    fn signed_client(uri: &str) -> EdgexClient {
        let signer = MockSigningAdapter::new("0xabc123").unwrap();
        EdgexClient::new(uri)
            .unwrap()
            .with_credentials(Credentials::new(12345, Arc::new(signer)))
    }

    async fn mount_metadata(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v1/public/meta/getMetaData"))
            .respond_with(ResponseTemplate::new(200).set_body_string(METADATA))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_l2_fee_rounds_up() {
        let l2 = L2OrderFields::derive(&btc_contract(), "cid", dec!(0.003), dec!(33333.3), 0)
            .unwrap();
        assert_eq!(l2.value, dec!(99.9999));
        // 99.9999 * 0.0005 = 0.04999995
        assert_eq!(l2.limit_fee, dec!(0.05));
        assert_eq!(l2.expire_time, L2_EXPIRY_EXTRA_MS);
    }

    #[test]
    fn test_l2_derive_rejects_overflowing_value() {
        let huge = Decimal::from(10u64.pow(17));
        match L2OrderFields::derive(&btc_contract(), "cid", huge, huge, 0) {
            Err(EdgexError::InvalidParameter(message)) => assert!(message.contains("overflows")),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }

        let late = L2OrderFields::derive(&btc_contract(), "cid", dec!(1), dec!(1), i64::MAX);
        assert!(matches!(late, Err(EdgexError::InvalidParameter(_))));
    }

    #[test]
    fn test_nonce_is_stable_per_client_order_id() {
        assert_eq!(nonce_for("order-1"), nonce_for("order-1"));
        assert_ne!(nonce_for("order-1"), nonce_for("order-2"));
    }

    #[test]
    fn test_validate_rejects_bad_orders() {
        let contract = btc_contract();
        let ok = CreateOrderParams::limit("10000001", OrderSide::Buy, dec!(0.01), dec!(30000.1));
        assert!(validate_order(&contract, &ok).is_ok());

        let zero_size = CreateOrderParams::limit("10000001", OrderSide::Buy, dec!(0), dec!(30000));
        assert!(validate_order(&contract, &zero_size).is_err());

        let off_tick = CreateOrderParams::limit("10000001", OrderSide::Buy, dec!(0.01), dec!(30000.05));
        assert!(validate_order(&contract, &off_tick).is_err());

        let off_step = CreateOrderParams::limit("10000001", OrderSide::Buy, dec!(0.0015), dec!(30000));
        assert!(validate_order(&contract, &off_step).is_err());

        let market = CreateOrderParams::market("10000001", OrderSide::Sell, dec!(0.01));
        assert!(validate_order(&contract, &market).is_ok());
    }

    #[tokio::test]
    async fn test_create_limit_order_posts_signed_l2_fields() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v1/private/order/createOrder"))
            .and(body_partial_json(serde_json::json!({
                "accountId": "12345",
                "contractId": "10000001",
                "side": "BUY",
                "type": "LIMIT",
                "timeInForce": "GOOD_TIL_CANCEL",
                "size": "0.01",
                "price": "30000",
                "l2Value": "300",
                "l2Size": "0.01",
                "l2LimitFee": "0.15",
                "reduceOnly": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code": "SUCCESS", "data": {"orderId": "5551"}}"#,
            ))
            .expect(2)
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        let first = client
            .create_limit_order("10000001", OrderSide::Buy, dec!(0.01), dec!(30000))
            .await
            .unwrap();
        assert_eq!(first.order_id, "5551");

        // metadata is served from cache the second time
        client
            .create_limit_order("10000001", OrderSide::Buy, dec!(0.01), dec!(30000))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_order_unknown_contract() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;

        let client = signed_client(&server.uri());
        let err = client
            .create_limit_order("99999999", OrderSide::Sell, dec!(1), dec!(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EdgexError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_market_order_uses_oracle_price_for_l2_value() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/v1/public/quote/getTicker"))
            .and(query_param("contractId", "10000001"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code": "SUCCESS", "data": [{"contractId": "10000001", "oraclePrice": "20000", "lastPrice": "20010"}]}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v1/private/order/createOrder"))
            .and(body_partial_json(serde_json::json!({
                "type": "MARKET",
                "timeInForce": "IMMEDIATE_OR_CANCEL",
                "price": "0",
                "l2Value": "200"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code": "SUCCESS", "data": {"orderId": "5552"}}"#,
            ))
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        let result = client
            .create_market_order("10000001", OrderSide::Sell, dec!(0.01))
            .await
            .unwrap();
        assert_eq!(result.order_id, "5552");
    }

    #[tokio::test]
    async fn test_cancel_routes_by_variant() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/private/order/cancelOrderById"))
            .and(body_partial_json(serde_json::json!({"orderIdList": ["5551"]})))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code": "SUCCESS", "data": {"cancelResultMap": {"5551": "SUCCESS"}}}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v1/private/order/cancelAllOrder"))
            .and(body_partial_json(serde_json::json!({"filterContractIdList": []})))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"code": "SUCCESS", "data": null}"#),
            )
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        let by_id = client
            .cancel_order(&CancelOrderParams::by_order_id("5551"))
            .await
            .unwrap();
        assert_eq!(by_id.cancel_result_map["5551"], "SUCCESS");

        let all = client.cancel_order(&CancelOrderParams::all(None)).await.unwrap();
        assert!(all.cancel_result_map.is_empty());
    }

    #[tokio::test]
    async fn test_get_active_orders() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/private/order/getActiveOrderPage"))
            .and(query_param("accountId", "12345"))
            .and(query_param("filterTypeList", "LIMIT"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code": "SUCCESS", "data": {"dataList": [
                    {"id": "5551", "contractId": "10000001", "side": "BUY", "type": "LIMIT",
                     "price": "30000", "size": "0.01", "status": "OPEN"}
                ], "nextPageOffsetData": ""}}"#,
            ))
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        let params = GetActiveOrderParams {
            filter_type_list: vec![OrderType::Limit],
            ..Default::default()
        };
        let page = client.get_active_orders(&params).await.unwrap();
        assert_eq!(page.data_list[0].id, "5551");
        assert_eq!(page.data_list[0].order_type, Some(OrderType::Limit));
    }

    #[tokio::test]
    async fn test_get_max_order_size() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/private/order/getMaxCreateOrderSize"))
            .and(body_partial_json(serde_json::json!({"contractId": "10000001", "price": "30000"})))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code": "SUCCESS", "data": {"maxBuySize": "1.5", "maxSellSize": "2"}}"#,
            ))
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        let max = client
            .get_max_order_size("10000001", dec!(30000))
            .await
            .unwrap();
        assert_eq!(max.max_buy_size, dec!(1.5));
        assert_eq!(max.max_sell_size, dec!(2));
    }
}

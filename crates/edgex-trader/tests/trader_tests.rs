/*
[INPUT]:  EdgexTrader scenarios against a wiremock REST server
[OUTPUT]: Test results for trader state loading, reconciliation and order helpers
[POS]:    Integration tests - trader
[UPDATE]: When trader state handling or order helpers change
*/

mod common;

use std::time::Duration;

use common::{mount_account_state, mount_get, mount_post, success, trader_for};
use edgex_sdk::{DepthLevel, KlineInterval, OrderSide, TimeInForce, WebSocketMessage};
use rust_decimal::Decimal;
use serde_json::json;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_load_state_populates_local_view() {
    let server = MockServer::start().await;
    mount_account_state(&server).await;

    let mut trader = trader_for(&server);
    assert_ok!(trader.load_state().await);

    assert_eq!(trader.contracts().len(), 2);
    assert_eq!(trader.contracts().tick_size("10000002"), Some(Decimal::new(1, 2)));
    let assets = trader.assets().expect("assets loaded");
    assert_eq!(assets.collateral_list[0].amount, Decimal::new(15005, 1));
    assert_eq!(
        trader.positions()["10000001"].open_size,
        Decimal::new(2, 3)
    );
    assert!(trader.active_orders().contains_key("7001"));
}

#[tokio::test]
async fn test_load_state_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/public/meta/getMetaData"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "SYSTEM_BUSY",
            "data": null,
            "msg": "busy",
            "errorParam": null
        })))
        .mount(&server)
        .await;

    let mut trader = trader_for(&server);
    let err = trader.load_state().await.unwrap_err();
    assert!(format!("{err:#}").contains("get metadata"));
    assert!(trader.contracts().is_empty());
}

#[tokio::test]
async fn test_initialize_fails_when_stream_connect_fails() {
    let server = MockServer::start().await;
    mount_account_state(&server).await;

    let mut trader = trader_for(&server);
    let err = trader.initialize().await.unwrap_err();
    assert!(format!("{err:#}").contains("connect public websocket"));
    // REST state loaded before the stream step stays in place
    assert_eq!(trader.contracts().len(), 2);
    trader.close().await;
}

#[tokio::test]
async fn test_stream_messages_update_state() {
    let server = MockServer::start().await;
    mount_account_state(&server).await;
    let mut trader = trader_for(&server);
    assert_ok!(trader.load_state().await);

    assert_ok!(
        trader
            .handle_message(WebSocketMessage::PositionUpdate(json!({
                "position": [{"contractId": "10000002", "openSize": "-0.5"}]
            })))
            .await
    );
    assert_eq!(trader.positions().len(), 2);
    assert_eq!(trader.positions()["10000002"].open_size, Decimal::new(-5, 1));

    assert_ok!(
        trader
            .handle_message(WebSocketMessage::AccountUpdate(json!({
                "collateralList": [{"coinId": "1000", "amount": "1200"}]
            })))
            .await
    );
    let assets = trader.assets().expect("assets");
    assert_eq!(assets.collateral_list[0].amount, Decimal::from(1200));

    assert_ok!(
        trader
            .handle_message(WebSocketMessage::Ticker {
                contract_id: "10000001".to_string(),
                data: json!([{"contractId": "10000001", "lastPrice": "30100.5"}]),
            })
            .await
    );
    assert_eq!(
        trader.market().last_price("10000001"),
        Some(Decimal::new(301005, 1))
    );
}

#[tokio::test]
async fn test_order_update_refreshes_active_orders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/private/order/getActiveOrderPage"))
        .and(query_param("accountId", "12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "dataList": [{"id": "9001", "contractId": "10000001", "status": "OPEN"}],
            "nextPageOffsetData": ""
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let mut trader = trader_for(&server);
    assert_ok!(
        trader
            .handle_message(WebSocketMessage::OrderUpdate(json!({"order": []})))
            .await
    );
    assert_eq!(trader.active_orders().len(), 1);
    assert!(trader.active_orders().contains_key("9001"));
}

#[tokio::test]
async fn test_create_limit_order_refreshes_orders() {
    let server = MockServer::start().await;
    mount_account_state(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/private/order/createOrder"))
        .and(body_partial_json(json!({
            "contractId": "10000001",
            "side": "BUY",
            "type": "LIMIT",
            "timeInForce": "POST_ONLY",
            "reduceOnly": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({"orderId": "8001"}))))
        .expect(1)
        .mount(&server)
        .await;

    let mut trader = trader_for(&server);
    assert_ok!(trader.load_state().await);

    let result = trader
        .create_limit_order(
            "10000001",
            Decimal::new(1, 3),
            Decimal::from(30_000),
            OrderSide::Buy,
            TimeInForce::PostOnly,
            true,
        )
        .await
        .unwrap();
    assert_eq!(result.order_id, "8001");
    assert!(trader.active_orders().contains_key("7001"));
}

#[tokio::test]
async fn test_cancel_helpers_route_to_endpoints() {
    let server = MockServer::start().await;
    mount_account_state(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/private/order/cancelOrderById"))
        .and(body_partial_json(json!({"accountId": "12345", "orderIdList": ["7001"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "cancelResultMap": {"7001": "SUCCESS"}
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/private/order/cancelAllOrder"))
        .and(body_partial_json(json!({"filterContractIdList": ["10000001"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let mut trader = trader_for(&server);
    let cancelled = trader.cancel_order("7001").await.unwrap();
    assert_eq!(cancelled.cancel_result_map["7001"], "SUCCESS");

    let all = trader.cancel_all_orders(Some("10000001")).await.unwrap();
    assert!(all.cancel_result_map.is_empty());
}

#[tokio::test]
async fn test_market_queries_pass_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/public/quote/getKline"))
        .and(query_param("contractId", "10000001"))
        .and(query_param("klineType", "MINUTE_1"))
        .and(query_param("size", "10"))
        .and(query_param("offsetData", "cursor-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "dataList": [{"klineTime": "1700000000000", "close": "30000"}],
            "nextPageOffsetData": "cursor-2"
        }))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/public/quote/getDepth"))
        .and(query_param("level", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([
            {"contractId": "10000002", "asks": [], "bids": [{"price": "1999.5", "size": "3"}]}
        ]))))
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/api/v1/private/order/getHistoryOrderFillTransactionPage",
        json!({"dataList": [{"id": "f1", "fillPrice": "30000"}], "nextPageOffsetData": ""}),
    )
    .await;

    let trader = trader_for(&server);
    let klines = trader
        .get_k_line("10000001", KlineInterval::Minute1, 10, Some("cursor-1"))
        .await
        .unwrap();
    assert_eq!(klines.len(), 1);
    assert_eq!(klines.next_page_offset_data, "cursor-2");

    let depth = trader
        .get_order_book_depth("10000002", DepthLevel::TwoHundred)
        .await
        .unwrap();
    assert_eq!(
        depth[0].best_bid().map(|level| level.price),
        Some(Decimal::new(19995, 1))
    );

    let fills = trader
        .get_order_fill_transactions(Some("10000001"), 5, None)
        .await
        .unwrap();
    assert_eq!(fills.data_list[0].fill_price, Decimal::from(30_000));

    let requests = server.received_requests().await.expect("recording on");
    let fill_request = requests
        .iter()
        .find(|request| request.url.path().ends_with("getHistoryOrderFillTransactionPage"))
        .expect("fill request sent");
    let query = fill_request.url.query().unwrap_or_default();
    assert!(query.contains("filterContractIdList=10000001"));
    assert!(query.contains("size=5"));
}

#[tokio::test]
async fn test_run_for_stops_on_deadline_and_cancel() {
    let server = MockServer::start().await;
    let mut trader = trader_for(&server);

    let handled = trader
        .run_for(Duration::from_millis(50), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(handled, 0);

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let handled = tokio::time::timeout(
        Duration::from_secs(5),
        trader.run_for(Duration::from_secs(3600), shutdown),
    )
    .await
    .expect("cancelled run returns promptly")
    .unwrap();
    assert_eq!(handled, 0);

    trader.close().await;
}

#[tokio::test]
async fn test_leverage_update_uses_signed_post() {
    let server = MockServer::start().await;
    mount_post(&server, "/api/v1/private/account/updateLeverageSetting", json!(null)).await;

    let trader = trader_for(&server);
    assert_ok!(
        trader
            .client()
            .update_leverage_setting("10000001", Decimal::from(10))
            .await
    );
}

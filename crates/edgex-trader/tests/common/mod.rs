/*
[INPUT]:  Mock server and fixture requirements for trader tests
[OUTPUT]: Shared fixtures: envelopes, mounted REST mocks, configured trader
[POS]:    Test infrastructure - shared across trader test modules
[UPDATE]: When adding new trader scenarios or fixtures
*/

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use edgex_sdk::{Credentials, EdgexClient, WebSocketManager};
use edgex_trader::EdgexTrader;

pub const TEST_ACCOUNT_ID: u64 = 12345;
pub const TEST_PRIVATE_KEY: &str = "0x0123456789abcdef";

/// Wrap a payload in a SUCCESS envelope
pub fn success(data: Value) -> Value {
    json!({
        "code": "SUCCESS",
        "data": data,
        "msg": null,
        "errorParam": null,
        "requestTime": "1700000000000",
        "responseTime": "1700000000005",
        "traceId": "test-trace"
    })
}

/// Trader with mock credentials pointed at `server`; the stream URL is never dialled
pub fn trader_for(server: &MockServer) -> EdgexTrader {
    let credentials =
        Credentials::mock(TEST_ACCOUNT_ID, TEST_PRIVATE_KEY).expect("test key is valid");
    let ws = WebSocketManager::with_credentials("ws://127.0.0.1:1", &credentials);
    let client = EdgexClient::new(&server.uri())
        .expect("client")
        .with_credentials(credentials);
    EdgexTrader::new(client, ws)
}

pub async fn mount_get(server: &MockServer, endpoint: &str, data: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(data)))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub async fn mount_post(server: &MockServer, endpoint: &str, data: Value) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(data)))
        .mount(server)
        .await;
}

/// Metadata, account asset and active order mocks used by `load_state`
pub async fn mount_account_state(server: &MockServer) {
    mount_get(
        server,
        "/api/v1/public/meta/getMetaData",
        json!({
            "global": {},
            "coinList": [],
            "contractList": [
                {
                    "contractId": "10000001",
                    "contractName": "BTCUSDT",
                    "tickSize": "0.1",
                    "stepSize": "0.001",
                    "minOrderSize": "0.001",
                    "defaultTakerFeeRate": "0.0005",
                    "starkExSyntheticAssetId": "0x4254432d3130000000000000000000",
                    "enableTrade": true
                },
                {
                    "contractId": "10000002",
                    "contractName": "ETHUSDT",
                    "tickSize": "0.01",
                    "stepSize": "0.01",
                    "minOrderSize": "0.01",
                    "defaultTakerFeeRate": "0.0005",
                    "starkExSyntheticAssetId": "0x4554482d3900000000000000000000",
                    "enableTrade": true
                }
            ]
        }),
    )
    .await;

    mount_get(
        server,
        "/api/v1/private/account/getAccountAsset",
        json!({
            "account": {"id": "12345"},
            "collateralList": [{"coinId": "1000", "amount": "1500.5"}],
            "positionList": [
                {"accountId": "12345", "contractId": "10000001", "openSize": "0.002", "openValue": "60"}
            ],
            "collateralAssetModelList": [{"coinId": "1000", "totalEquity": "1500.5", "availableAmount": "1440"}]
        }),
    )
    .await;

    mount_get(
        server,
        "/api/v1/private/order/getActiveOrderPage",
        json!({
            "dataList": [
                {"id": "7001", "contractId": "10000001", "side": "BUY", "price": "29000", "size": "0.001", "status": "OPEN"}
            ],
            "nextPageOffsetData": ""
        }),
    )
    .await;
}

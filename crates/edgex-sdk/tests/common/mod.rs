/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for edgex-sdk tests

use std::sync::Arc;

use edgex_sdk::{Credentials, EdgexClient, MockSigningAdapter};
use wiremock::MockServer;

pub const TEST_ACCOUNT_ID: u64 = 12345;
pub const TEST_PRIVATE_KEY: &str = "0x0123456789abcdef0123456789abcdef";

/// Setup a mock HTTP server for testing
#[allow(dead_code)]
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

#[allow(dead_code)]
pub fn test_signer() -> Arc<MockSigningAdapter> {
    Arc::new(MockSigningAdapter::new(TEST_PRIVATE_KEY).expect("test key is valid"))
}

#[allow(dead_code)]
pub fn test_credentials() -> Credentials {
    Credentials::new(TEST_ACCOUNT_ID, test_signer())
}

/// Client pointed at the mock server with test credentials attached
#[allow(dead_code)]
pub fn signed_client(server: &MockServer) -> EdgexClient {
    EdgexClient::new(&server.uri())
        .expect("client")
        .with_credentials(test_credentials())
}

/// Wrap a payload in a SUCCESS envelope
#[allow(dead_code)]
pub fn success(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "code": "SUCCESS",
        "data": data,
        "msg": null,
        "errorParam": null,
        "requestTime": "1700000000000",
        "responseTime": "1700000000005",
        "traceId": "test-trace"
    })
}

/*
[INPUT]:  Request method, path, query/body and a signing adapter
[OUTPUT]: Signed request headers (X-edgeX-Api-Timestamp / X-edgeX-Api-Signature)
[POS]:    HTTP layer - request signing for authenticated endpoints
[UPDATE]: When changing the sign-content layout or header format
*/

use std::sync::Arc;

use serde_json::Value;

use crate::auth::SigningAdapter;
use crate::http::Result;

pub const TIMESTAMP_HEADER: &str = "X-edgeX-Api-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-edgeX-Api-Signature";

/// Signs HTTP requests for authenticated endpoints
#[derive(Debug, Clone)]
pub struct RequestSigner {
    signer: Arc<dyn SigningAdapter>,
}

impl RequestSigner {
    /// Create a new request signer around a signing adapter
    pub fn new(signer: Arc<dyn SigningAdapter>) -> Self {
        Self { signer }
    }

    /// Sign a request and return `(timestamp, signature_hex)` header values
    ///
    /// Format: "{timestamp}{METHOD}{path}{sorted params}"
    pub async fn sign_request(
        &self,
        timestamp: i64,
        method: &str,
        path: &str,
        params: &str,
    ) -> Result<(String, String)> {
        let content = request_sign_content(timestamp, method, path, params);
        let signature = self.signer.sign(content.as_bytes()).await?;
        Ok((timestamp.to_string(), signature.to_hex()))
    }

    /// Header pairs ready to attach to a request or WebSocket handshake
    pub async fn headers(
        &self,
        timestamp: i64,
        method: &str,
        path: &str,
        params: &str,
    ) -> Result<[(&'static str, String); 2]> {
        let (timestamp, signature) = self.sign_request(timestamp, method, path, params).await?;
        Ok([(TIMESTAMP_HEADER, timestamp), (SIGNATURE_HEADER, signature)])
    }
}

/// Concatenate the pieces the venue expects to be signed
pub fn request_sign_content(timestamp: i64, method: &str, path: &str, params: &str) -> String {
    format!("{timestamp}{}{path}{params}", method.to_ascii_uppercase())
}

/// Render query pairs as `k=v&k=v`, sorted by key
pub fn sorted_query(pairs: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = pairs.iter().collect();
    sorted.sort_by_key(|pair| pair.0);
    sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Params part of the signed content: sorted query, then canonical body,
/// joined by `&` when both are present
pub fn signing_params(pairs: &[(&str, String)], body: Option<&Value>) -> String {
    let query = sorted_query(pairs);
    match body.map(canonical_body) {
        Some(body) if query.is_empty() => body,
        Some(body) if !body.is_empty() => format!("{query}&{body}"),
        _ => query,
    }
}

/// Flatten a JSON body into sorted `k=v` pairs; arrays are comma-joined
pub fn canonical_body(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|key| format!("{key}={}", canonical_body(&map[key])))
                .collect::<Vec<_>>()
                .join("&")
        }
        Value::Array(items) => items
            .iter()
            .map(canonical_body)
            .collect::<Vec<_>>()
            .join(","),
        Value::String(raw) => raw.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MockSigningAdapter;
    use serde_json::json;

    #[test]
    fn test_sign_content_layout() {
        let content = request_sign_content(
            1_700_000_000_000,
            "get",
            "/api/v1/private/account/getAccountAsset",
            "accountId=12345",
        );
        assert_eq!(
            content,
            "1700000000000GET/api/v1/private/account/getAccountAssetaccountId=12345"
        );
    }

    #[test]
    fn test_sorted_query() {
        let pairs = vec![
            ("size", "10".to_string()),
            ("accountId", "1".to_string()),
            ("filterContractIdList", "10000001,10000002".to_string()),
        ];
        assert_eq!(
            sorted_query(&pairs),
            "accountId=1&filterContractIdList=10000001,10000002&size=10"
        );
    }

    #[test]
    fn test_canonical_body_sorts_and_flattens() {
        let body = json!({
            "orderIdList": ["2", "1"],
            "accountId": "12345",
            "reduceOnly": false,
            "nested": {"b": 1, "a": "x"},
            "empty": null
        });
        assert_eq!(
            canonical_body(&body),
            "accountId=12345&empty=&nested=a=x&b=1&orderIdList=2,1&reduceOnly=false"
        );
    }

    #[test]
    fn test_signing_params_combines_query_and_body() {
        let pairs = vec![("orderId", "5".to_string())];
        assert_eq!(signing_params(&pairs, None), "orderId=5");
        assert_eq!(signing_params(&[], Some(&json!({"b": 2, "a": 1}))), "a=1&b=2");
        assert_eq!(
            signing_params(&pairs, Some(&json!({"accountId": "1"}))),
            "orderId=5&accountId=1"
        );
        assert_eq!(signing_params(&pairs, Some(&json!({}))), "orderId=5");
        assert_eq!(signing_params(&[], None), "");
    }

    #[tokio::test]
    async fn test_headers_carry_timestamp_and_hex_signature() {
        let adapter = MockSigningAdapter::new("0x01").expect("adapter");
        let signer = RequestSigner::new(Arc::new(adapter));
        let headers = signer
            .headers(42, "POST", "/api/v1/private/order/createOrder", "a=1")
            .await
            .expect("headers");

        assert_eq!(headers[0], (TIMESTAMP_HEADER, "42".to_string()));
        assert_eq!(headers[1].0, SIGNATURE_HEADER);
        assert!(hex::decode(&headers[1].1).is_ok());
    }
}

/*
[INPUT]:  HTTP configuration (base URL, timeouts, credentials)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::Credentials;
use crate::http::signature::{signing_params, RequestSigner};
use crate::http::{EdgexError, Result};
use crate::types::{ApiResponse, Metadata, QueryPairs};

/// Production REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://pro.edgex.exchange";
/// Testnet REST endpoint
pub const TESTNET_BASE_URL: &str = "https://testnet.edgex.exchange";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Main HTTP client for the edgeX API
#[derive(Debug, Clone)]
pub struct EdgexClient {
    http_client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    metadata_cache: Arc<RwLock<Option<Metadata>>>,
}

impl EdgexClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            credentials: None,
            metadata_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Attach credentials, builder style
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Account id of the attached credentials
    pub fn account_id(&self) -> Result<u64> {
        self.require_credentials().map(|credentials| credentials.account_id)
    }

    fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| EdgexError::Authentication {
                message: "no credentials configured for private endpoint".to_string(),
            })
    }

    /// Query pairs seeded with `accountId`
    pub(crate) fn account_query(&self) -> Result<QueryPairs> {
        let mut pairs = QueryPairs::new();
        pairs.push("accountId", self.account_id()?);
        Ok(pairs)
    }

    pub(crate) async fn cached_metadata(&self) -> Option<Metadata> {
        self.metadata_cache.read().await.clone()
    }

    pub(crate) async fn store_metadata(&self, metadata: Metadata) {
        *self.metadata_cache.write().await = Some(metadata);
    }

    /// Build full URL for an endpoint path
    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint)?)
    }

    /// GET a public endpoint and return the envelope payload
    pub(crate) async fn get_public<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &QueryPairs,
    ) -> Result<T> {
        let builder = self
            .http_client
            .request(Method::GET, self.url(endpoint)?)
            .query(query.as_slice());
        self.send_json::<T>(builder).await?.into_data()
    }

    /// GET a private endpoint with signature headers and return the payload
    pub(crate) async fn get_private<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &QueryPairs,
    ) -> Result<T> {
        let builder = self.signed_get(endpoint, query).await?;
        self.send_json::<T>(builder).await?.into_data()
    }

    /// POST a JSON body to a private endpoint and return the payload
    pub(crate) async fn post_private<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let builder = self.signed_post(endpoint, body).await?;
        self.send_json::<T>(builder).await?.into_data()
    }

    /// POST where the venue may return no `data`; a missing payload decodes
    /// to `T::default()`
    pub(crate) async fn post_private_or_default<T: DeserializeOwned + Default>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let builder = self.signed_post(endpoint, body).await?;
        Ok(self.send_json::<T>(builder).await?.data.unwrap_or_default())
    }

    /// Issue any request and return the checked envelope untouched
    ///
    /// Escape hatch for endpoints without a typed wrapper.
    pub async fn request_raw(
        &self,
        method: Method,
        endpoint: &str,
        query: &QueryPairs,
        body: Option<&serde_json::Value>,
        authenticated: bool,
    ) -> Result<ApiResponse<serde_json::Value>> {
        let builder = if authenticated {
            self.signed_request(method, endpoint, query, body).await?
        } else {
            let builder = self
                .http_client
                .request(method, self.url(endpoint)?)
                .query(query.as_slice());
            match body {
                Some(body) => builder.json(body),
                None => builder,
            }
        };
        self.send_json(builder).await
    }

    async fn signed_get(&self, endpoint: &str, query: &QueryPairs) -> Result<RequestBuilder> {
        self.signed_request(Method::GET, endpoint, query, None).await
    }

    async fn signed_post(&self, endpoint: &str, body: &serde_json::Value) -> Result<RequestBuilder> {
        self.signed_request(Method::POST, endpoint, &QueryPairs::new(), Some(body))
            .await
    }

    /// Build a request carrying the timestamp and signature headers
    ///
    /// The signed content uses the same method, query and body that go on the wire.
    async fn signed_request(
        &self,
        method: Method,
        endpoint: &str,
        query: &QueryPairs,
        body: Option<&serde_json::Value>,
    ) -> Result<RequestBuilder> {
        let signer = RequestSigner::new(self.require_credentials()?.signer.clone());
        let timestamp = chrono::Utc::now().timestamp_millis();
        let params = signing_params(query.as_slice(), body);
        let headers = signer
            .headers(timestamp, method.as_str(), endpoint, &params)
            .await?;

        let mut builder = self.http_client.request(method, self.url(endpoint)?);
        if !query.is_empty() {
            builder = builder.query(query.as_slice());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        Ok(builder)
    }

    /// Send a request and decode the `{code, data}` envelope
    ///
    /// Non-200 replies and envelope codes other than SUCCESS become errors.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;
        debug!(path = %url, status = status.as_u16(), bytes = body.len(), "edgex response");

        if status != StatusCode::OK {
            return Err(EdgexError::status_error(status, body));
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
        envelope.check()
    }
}

/*
[INPUT]:  Contract identifiers and quote query parameters
[OUTPUT]: Market data (server time, metadata, tickers, klines, depth)
[POS]:    HTTP layer - public meta/quote endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use crate::http::{EdgexClient, Result};
use crate::types::{
    GetKLineParams, GetOrderBookDepthParams, Kline, Metadata, OrderBookDepth, Page, QueryPairs,
    ServerTime, Ticker,
};

impl EdgexClient {
    /// GET /api/v1/public/meta/getServerTime
    pub async fn get_server_time(&self) -> Result<ServerTime> {
        self.get_public("/api/v1/public/meta/getServerTime", &QueryPairs::new())
            .await
    }

    /// Exchange metadata: coins, contracts and global settings
    ///
    /// GET /api/v1/public/meta/getMetaData
    ///
    /// The result also refreshes the client's metadata cache used by order
    /// creation.
    pub async fn get_metadata(&self) -> Result<Metadata> {
        let metadata: Metadata = self
            .get_public("/api/v1/public/meta/getMetaData", &QueryPairs::new())
            .await?;
        self.store_metadata(metadata.clone()).await;
        Ok(metadata)
    }

    /// 24 hour ticker for one contract
    ///
    /// GET /api/v1/public/quote/getTicker?contractId={contract_id}
    pub async fn get_24_hour_quote(&self, contract_id: &str) -> Result<Vec<Ticker>> {
        let mut query = QueryPairs::new();
        query.push("contractId", contract_id);
        self.get_public("/api/v1/public/quote/getTicker", &query)
            .await
    }

    /// GET /api/v1/public/quote/getKline
    pub async fn get_k_line(&self, params: &GetKLineParams) -> Result<Page<Kline>> {
        self.get_public("/api/v1/public/quote/getKline", &params.to_query())
            .await
    }

    /// GET /api/v1/public/quote/getDepth?contractId={id}&level={15|200}
    pub async fn get_order_book_depth(
        &self,
        params: &GetOrderBookDepthParams,
    ) -> Result<Vec<OrderBookDepth>> {
        self.get_public("/api/v1/public/quote/getDepth", &params.to_query())
            .await
    }
}

/*
[INPUT]:  Credentials (account id + signer) and page filters
[OUTPUT]: Account assets, positions, transactions and snapshots
[POS]:    HTTP layer - private account endpoints (signed)
[UPDATE]: When adding account endpoints or changing pagination rules
*/

use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use crate::http::{EdgexClient, Result};
use crate::types::{
    Account, AccountAsset, AccountAssetSnapshot, CollateralTransaction, DeleverageLight,
    GetAccountAssetSnapshotPageParams, GetCollateralTransactionPageParams,
    GetPositionTermPageParams, GetPositionTransactionPageParams, Page, PositionTerm,
    PositionTransaction,
};

impl EdgexClient {
    /// GET /api/v1/private/account/getAccountAsset
    pub async fn get_account_asset(&self) -> Result<AccountAsset> {
        let query = self.account_query()?;
        self.get_private("/api/v1/private/account/getAccountAsset", &query)
            .await
    }

    /// Positions come from the account asset endpoint
    pub async fn get_account_positions(&self) -> Result<AccountAsset> {
        self.get_account_asset().await
    }

    /// GET /api/v1/private/account/getPositionTransactionPage
    pub async fn get_position_transaction_page(
        &self,
        params: &GetPositionTransactionPageParams,
    ) -> Result<Page<PositionTransaction>> {
        let mut query = self.account_query()?;
        query.extend(params.to_query());
        self.get_private("/api/v1/private/account/getPositionTransactionPage", &query)
            .await
    }

    /// GET /api/v1/private/account/getCollateralTransactionPage
    pub async fn get_collateral_transaction_page(
        &self,
        params: &GetCollateralTransactionPageParams,
    ) -> Result<Page<CollateralTransaction>> {
        let mut query = self.account_query()?;
        query.extend(params.to_query());
        self.get_private(
            "/api/v1/private/account/getCollateralTransactionPage",
            &query,
        )
        .await
    }

    /// GET /api/v1/private/account/getPositionTermPage
    pub async fn get_position_term_page(
        &self,
        params: &GetPositionTermPageParams,
    ) -> Result<Page<PositionTerm>> {
        let mut query = self.account_query()?;
        query.extend(params.to_query());
        self.get_private("/api/v1/private/account/getPositionTermPage", &query)
            .await
    }

    /// GET /api/v1/private/account/getAccountById
    pub async fn get_account_by_id(&self) -> Result<Account> {
        let query = self.account_query()?;
        self.get_private("/api/v1/private/account/getAccountById", &query)
            .await
    }

    /// GET /api/v1/private/account/getAccountDeleverageLight
    pub async fn get_account_deleverage_light(&self) -> Result<DeleverageLight> {
        let query = self.account_query()?;
        self.get_private("/api/v1/private/account/getAccountDeleverageLight", &query)
            .await
    }

    /// GET /api/v1/private/account/getAccountAssetSnapshotPage
    pub async fn get_account_asset_snapshot_page(
        &self,
        params: &GetAccountAssetSnapshotPageParams,
    ) -> Result<Page<AccountAssetSnapshot>> {
        let mut query = self.account_query()?;
        query.extend(params.to_query());
        self.get_private(
            "/api/v1/private/account/getAccountAssetSnapshotPage",
            &query,
        )
        .await
    }

    /// GET /api/v1/private/account/getPositionTransactionById
    pub async fn get_position_transaction_by_id(
        &self,
        transaction_ids: &[String],
    ) -> Result<Vec<PositionTransaction>> {
        let mut query = self.account_query()?;
        query.push_list("transactionIdList", transaction_ids);
        self.get_private("/api/v1/private/account/getPositionTransactionById", &query)
            .await
    }

    /// GET /api/v1/private/account/getCollateralTransactionById
    pub async fn get_collateral_transaction_by_id(
        &self,
        transaction_ids: &[String],
    ) -> Result<Vec<CollateralTransaction>> {
        let mut query = self.account_query()?;
        query.push_list("transactionIdList", transaction_ids);
        self.get_private(
            "/api/v1/private/account/getCollateralTransactionById",
            &query,
        )
        .await
    }

    /// POST /api/v1/private/account/updateLeverageSetting
    pub async fn update_leverage_setting(&self, contract_id: &str, leverage: Decimal) -> Result<()> {
        let account_id = self.account_id()?;
        let body = json!({
            "accountId": account_id.to_string(),
            "contractId": contract_id,
            "leverage": leverage.to_string(),
        });
        self.post_private_or_default::<serde_json::Value>(
            "/api/v1/private/account/updateLeverageSetting",
            &body,
        )
        .await?;
        info!(account_id, contract_id, %leverage, "leverage updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::auth::{Credentials, MockSigningAdapter};
    use crate::http::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
    use crate::http::{EdgexClient, EdgexError};
    use crate::types::GetPositionTransactionPageParams;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_json, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed_client(uri: &str) -> EdgexClient {
        let signer = MockSigningAdapter::new("0x1234").unwrap();
        EdgexClient::new(uri)
            .unwrap()
            .with_credentials(Credentials::new(12345, Arc::new(signer)))
    }

    #[tokio::test]
    async fn test_get_account_asset_is_signed() {
        let server = MockServer::start().await;
        let mock_response = r#"{
            "code": "SUCCESS",
            "data": {
                "account": {"id": "12345", "status": "NORMAL"},
                "collateralList": [{"coinId": "1000", "amount": "250.5"}],
                "positionList": [{"contractId": "10000001", "openSize": "-0.5"}],
                "positionAssetList": [],
                "collateralAssetModelList": [{"coinId": "1000", "totalEquity": "260"}]
            }
        }"#;

        Mock::given(method("GET"))
            .and(path("/api/v1/private/account/getAccountAsset"))
            .and(query_param("accountId", "12345"))
            .and(header_exists(TIMESTAMP_HEADER))
            .and(header_exists(SIGNATURE_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        let asset = client.get_account_asset().await.unwrap();
        assert_eq!(asset.account.id, "12345");
        assert_eq!(asset.collateral_list[0].amount, dec!(250.5));
        assert_eq!(asset.position_list[0].open_size, dec!(-0.5));
        assert_eq!(asset.collateral_asset_model_list[0].total_equity, dec!(260));
    }

    #[tokio::test]
    async fn test_private_call_without_credentials_fails_fast() {
        let server = MockServer::start().await;
        let client = EdgexClient::new(&server.uri()).unwrap();

        let err = client.get_account_positions().await.unwrap_err();
        assert!(matches!(err, EdgexError::Authentication { .. }));
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_position_transaction_page_query() {
        let server = MockServer::start().await;
        let mock_response = r#"{
            "code": "SUCCESS",
            "data": {
                "dataList": [{"id": "9", "contractId": "10000001", "type": "SELL_POSITION", "fillPrice": "30000"}],
                "nextPageOffsetData": ""
            }
        }"#;

        Mock::given(method("GET"))
            .and(path("/api/v1/private/account/getPositionTransactionPage"))
            .and(query_param("accountId", "12345"))
            .and(query_param("size", "5"))
            .and(query_param("filterContractIdList", "10000001,10000002"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        let params = GetPositionTransactionPageParams {
            size: Some(5),
            filter_contract_id_list: vec!["10000001".to_string(), "10000002".to_string()],
            ..Default::default()
        };
        let page = client.get_position_transaction_page(&params).await.unwrap();
        assert_eq!(page.len(), 1);
        assert!(!page.has_more());
        assert_eq!(page.data_list[0].transaction_type, "SELL_POSITION");
    }

    #[tokio::test]
    async fn test_collateral_transaction_by_id_joins_ids() {
        let server = MockServer::start().await;
        let mock_response = r#"{
            "code": "SUCCESS",
            "data": [{"id": "7", "coinId": "1000", "type": "DEPOSIT", "deltaAmount": "100"}]
        }"#;

        Mock::given(method("GET"))
            .and(path("/api/v1/private/account/getCollateralTransactionById"))
            .and(query_param("transactionIdList", "7,8"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        let ids = vec!["7".to_string(), "8".to_string()];
        let transactions = client.get_collateral_transaction_by_id(&ids).await.unwrap();
        assert_eq!(transactions[0].delta_amount, dec!(100));
    }

    #[tokio::test]
    async fn test_update_leverage_setting_posts_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/private/account/updateLeverageSetting"))
            .and(body_json(serde_json::json!({
                "accountId": "12345",
                "contractId": "10000001",
                "leverage": "20"
            })))
            .and(header_exists(SIGNATURE_HEADER))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"code": "SUCCESS", "data": null}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = signed_client(&server.uri());
        client
            .update_leverage_setting("10000001", dec!(20))
            .await
            .unwrap();
    }
}

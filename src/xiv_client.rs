use crate::error::{PricecheckError, Result};
use crate::xiv_model::{ItemId, MarketHistoryResponse, Realm, SearchResponse};
use async_trait::async_trait;
use mockall::automock;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "https://xivapi.com";

#[derive(Debug, Clone)]
pub struct XivClient {
    pub client: ClientWithMiddleware,
    pub base_url: String,
}

impl XivClient {
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>) -> Self {
        XivClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn make_api_call<T: DeserializeOwned>(url: &str, request: RequestBuilder) -> Result<T> {
        let resp = request
            .send()
            .await
            .map_err(|e| PricecheckError::transport(url, format!("Failed to send request: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PricecheckError::transport(url, format!("Failed to get response body: {e}")))?;

        if !status.is_success() {
            return Err(PricecheckError::transport(
                url,
                format!("API request failed. Status: {}, Body: {}", status, body),
            ));
        }

        decode_body(url, &body)
    }
}

pub(crate) fn decode_body<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    let deserializer = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(deserializer).map_err(|e| {
        PricecheckError::transport(
            url,
            format!("Error decoding response at '{}': {}. Response body was: '{}'", e.path(), e.inner(), body),
        )
    })
}

#[automock]
#[async_trait]
pub trait XivClientTrait: Send + Sync {
    /// Exact-match item search.
    async fn search_item(&self, name: &str) -> Result<SearchResponse>;

    async fn get_market_history(&self, realm: &Realm, item_id: ItemId) -> Result<MarketHistoryResponse>;
}

#[async_trait]
impl XivClientTrait for XivClient {
    async fn search_item(&self, name: &str) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let query_param_list = [("string", name), ("string_algo", "match")];
        Self::make_api_call(&url, self.client.get(&url).query(&query_param_list)).await
    }

    async fn get_market_history(&self, realm: &Realm, item_id: ItemId) -> Result<MarketHistoryResponse> {
        let url = format!("{}/market/{}/item/{}", self.base_url, realm.0, item_id.0);
        Self::make_api_call(&url, self.client.get(&url)).await
    }
}

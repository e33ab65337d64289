use crate::error::Result;
use crate::xiv_client::XivClientTrait;
use crate::xiv_model::{ItemId, Realm, TransactionRecord};
use std::sync::Arc;
use tracing::{event, Level};

pub const DEFAULT_REALM: &str = "Lich";

#[derive(Clone)]
pub struct MarketHistoryFetcher {
    client: Arc<dyn XivClientTrait>,
    realm: Realm,
}

impl MarketHistoryFetcher {
    pub fn new(client: Arc<dyn XivClientTrait>, realm: Realm) -> Self {
        Self { client, realm }
    }

    /// Single request, no pagination.
    pub async fn fetch_history(&self, item_id: ItemId) -> Result<Vec<TransactionRecord>> {
        let response = self.client.get_market_history(&self.realm, item_id).await?;
        event!(
            Level::DEBUG,
            "Fetched {} history entries for item {} on {}",
            response.history.len(),
            item_id,
            self.realm.0
        );
        Ok(response.history.into_iter().map(TransactionRecord::from).collect())
    }
}

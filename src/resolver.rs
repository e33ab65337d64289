use crate::error::{PricecheckError, Result};
use crate::id_cache::IdentifierStore;
use crate::xiv_client::XivClientTrait;
use crate::xiv_model::ItemId;
use std::sync::Arc;
use tracing::{event, Level};

#[derive(Clone)]
pub struct IdResolver {
    client: Arc<dyn XivClientTrait>,
}

impl IdResolver {
    pub fn new(client: Arc<dyn XivClientTrait>) -> Self {
        Self { client }
    }

    /// Resolves `name` through the cache, searching the remote catalog only on a miss.
    pub async fn resolve<S: IdentifierStore + ?Sized>(&self, store: &mut S, name: &str) -> Result<ItemId> {
        if let Some(id) = store.lookup(name) {
            event!(Level::TRACE, "Cache hit for '{}': {}", name, id);
            return Ok(id);
        }

        let response = self.client.search_item(name).await?;

        let top_match = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| PricecheckError::lookup(name, "search returned no results"))?;

        if top_match.name != name {
            return Err(PricecheckError::lookup(
                name,
                format!("best match is '{}' (id {})", top_match.name, top_match.id),
            ));
        }

        let id = u64::try_from(top_match.id)
            .ok()
            .filter(|id| *id > 0)
            .map(ItemId)
            .ok_or_else(|| PricecheckError::lookup(name, format!("invalid item id {}", top_match.id)))?;

        event!(Level::DEBUG, "Resolved '{}' to {}", name, id);
        store.remember(name, id)
    }
}

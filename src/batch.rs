use crate::aggregator::PriceAggregator;
use crate::error::{ErrorKind, PricecheckError, Result};
use crate::id_cache::IdentifierStore;
use crate::market::MarketHistoryFetcher;
use crate::resolver::IdResolver;
use crate::xiv_model::ItemRecord;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::{event, Level};

pub const DEFAULT_PACING_MS: u64 = 100;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub name: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ItemFailure {
    fn new(name: &str, error: &PricecheckError) -> Self {
        Self {
            name: name.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Sorted by nq price, most expensive first. Equal prices keep input order.
    pub items: Vec<ItemRecord>,
    pub failures: Vec<ItemFailure>,
}

impl BatchResult {
    pub fn failed_names(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.name.as_str()).collect()
    }
}

pub struct BatchRunner {
    resolver: IdResolver,
    fetcher: MarketHistoryFetcher,
    aggregator: PriceAggregator,
    pacing: Duration,
}

impl BatchRunner {
    pub fn new(resolver: IdResolver, fetcher: MarketHistoryFetcher, aggregator: PriceAggregator, pacing: Duration) -> Self {
        Self {
            resolver,
            fetcher,
            aggregator,
            pacing,
        }
    }

    /// Prices `names` one after another with a pause between items.
    ///
    /// Per-item errors end up in [`BatchResult::failures`]; only a failure to persist the
    /// identifier cache aborts the batch.
    pub async fn run_batch<S: IdentifierStore + ?Sized>(&self, names: &[String], store: &mut S) -> Result<BatchResult> {
        let mut result = BatchResult::default();
        let total = names.len();

        for (idx, name) in names.iter().enumerate() {
            if idx > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            match self.price_item(name, store).await {
                Ok(item) => result.items.push(item),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    event!(Level::WARN, "Failed to price '{}': {}", name, e);
                    result.failures.push(ItemFailure::new(name, &e));
                }
            }

            event!(Level::INFO, "progress: {} / {}", idx + 1, total);
        }

        // stable
        result.items.sort_by(|a, b| b.nq_price.cmp(&a.nq_price));

        Ok(result)
    }

    async fn price_item<S: IdentifierStore + ?Sized>(&self, name: &str, store: &mut S) -> Result<ItemRecord> {
        let id = self.resolver.resolve(store, name).await?;
        let history = self.fetcher.fetch_history(id).await?;
        Ok(self.aggregator.aggregate(id, name, &history, Utc::now()))
    }
}

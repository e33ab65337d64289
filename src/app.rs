use crate::batch::{BatchResult, BatchRunner};
use crate::category::Category;
use crate::configuration::PricecheckConfiguration;
use crate::id_cache::{CacheSession, IdCacheFile, IdentifierStore};
use crate::market::MarketHistoryFetcher;
use crate::report::{render_report, write_report};
use crate::reqwest_helpers::create_client;
use crate::resolver::IdResolver;
use crate::xiv_client::{XivClient, XivClientTrait};
use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tracing::{event, Level};

pub fn build_client(cfg: &PricecheckConfiguration) -> Result<Arc<dyn XivClientTrait>> {
    let client_with_middleware = create_client(&cfg.http_settings())?;
    Ok(Arc::new(XivClient::new(client_with_middleware, cfg.base_url.clone())))
}

pub fn build_runner(cfg: &PricecheckConfiguration, client: Arc<dyn XivClientTrait>) -> BatchRunner {
    BatchRunner::new(
        IdResolver::new(client.clone()),
        MarketHistoryFetcher::new(client, cfg.realm.clone()),
        cfg.aggregator(),
        cfg.pacing,
    )
}

pub fn open_cache(cfg: &PricecheckConfiguration) -> CacheSession {
    CacheSession::open(IdCacheFile::new(cfg.cache_file.clone()), cfg.write_through_cache)
}

/// Prices every item of `category`, then prints and stores the report.
pub async fn check_category<S: IdentifierStore + ?Sized>(
    cfg: &PricecheckConfiguration,
    runner: &BatchRunner,
    store: &mut S,
    category: &Category,
) -> Result<BatchResult> {
    let name = category.name();
    let item_names = category.read_item_names()?;
    event!(Level::INFO, "Checking category '{}' with {} items", name, item_names.len());

    let result = runner.run_batch(&item_names, store).await?;

    let report = render_report(&name, &result, Local::now());
    println!("{}", report);
    let path = write_report(&cfg.results_dir, &name, &report)?;
    event!(
        Level::INFO,
        "Category '{}': {} priced, {} failed. Report written to {:?}",
        name,
        result.items.len(),
        result.failures.len(),
        path
    );

    Ok(result)
}

pub async fn check_categories(cfg: &PricecheckConfiguration, client: Arc<dyn XivClientTrait>, categories: &[Category]) -> Result<()> {
    let runner = build_runner(cfg, client);
    let mut session = open_cache(cfg);

    for category in categories {
        check_category(cfg, &runner, &mut session, category).await?;
    }

    session.close()?;
    Ok(())
}

pub async fn resolve_names(cfg: &PricecheckConfiguration, client: Arc<dyn XivClientTrait>, names: &[String]) -> Result<()> {
    let resolver = IdResolver::new(client);
    let mut session = open_cache(cfg);

    for name in names {
        match resolver.resolve(&mut session, name).await {
            Ok(id) => println!("{} -> {}", name, id),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => println!("{} -> error: {}", name, e),
        }
    }

    session.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_args::Cli;
    use crate::xiv_client::MockXivClientTrait;
    use crate::xiv_model::{HistoryEntry, ItemId, MarketHistoryResponse, SearchResponse, SearchResult};
    use chrono::{TimeDelta, Utc};
    use clap::Parser;
    use std::fs;
    use test_log::test;

    fn configuration(dir: &std::path::Path) -> PricecheckConfiguration {
        let cli = Cli::try_parse_from([
            "pricecheck",
            "check",
            "--all",
            "--pacing-ms",
            "0",
            "--cache-file",
            dir.join(".cache/id.json").to_str().unwrap(),
            "--categories-dir",
            dir.join("categories").to_str().unwrap(),
            "--results-dir",
            dir.join("results").to_str().unwrap(),
        ])
        .unwrap();
        PricecheckConfiguration::new(cli.common).unwrap()
    }

    fn mock_client() -> MockXivClientTrait {
        let mut mock_client = MockXivClientTrait::new();
        mock_client.expect_search_item().returning(|name| {
            Ok(SearchResponse {
                results: match name {
                    "Iron Ore" => vec![SearchResult {
                        name: name.to_string(),
                        id: 5,
                    }],
                    _ => vec![],
                },
            })
        });
        mock_client.expect_get_market_history().returning(|_, _| {
            Ok(MarketHistoryResponse {
                history: vec![HistoryEntry {
                    price_per_unit: 1500,
                    is_hq: false,
                    purchase_date: Utc::now() - TimeDelta::hours(2),
                }],
            })
        });
        mock_client
    }

    #[test(tokio::test)]
    async fn checking_a_category_writes_report_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = configuration(dir.path());
        fs::create_dir_all(&cfg.categories_dir).unwrap();
        fs::write(cfg.categories_dir.join("ores"), "Iron Ore\n\nCobalt Ore\n").unwrap();
        let categories = crate::category::load_categories(&cfg.categories_dir).unwrap();

        check_categories(&cfg, Arc::new(mock_client()), &categories).await.unwrap();

        let report = fs::read_to_string(cfg.results_dir.join("ores")).unwrap();
        assert!(report.contains("1,500"));
        assert!(report.contains("errors for item names:\n    Cobalt Ore"));

        let cache = IdCacheFile::new(cfg.cache_file.clone()).read().unwrap();
        assert_eq!(cache.lookup("Iron Ore"), Some(ItemId(5)));
        assert_eq!(cache.len(), 1);
    }
}

use crate::aggregator::{DEFAULT_FLOOR_SAMPLE_SIZE, DEFAULT_RECENCY_WINDOW_HOURS};
use crate::batch::DEFAULT_PACING_MS;
use crate::id_cache::DEFAULT_CACHE_FILE;
use crate::market::DEFAULT_REALM;
use crate::xiv_client::DEFAULT_BASE_URL;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, Args)]
pub struct CommonArgs {
    #[arg(long, env("XIVAPI_BASE_URL"), default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,
    #[arg(long, env("XIVAPI_REALM"), default_value = DEFAULT_REALM, global = true)]
    pub realm: String,
    #[arg(long, env("PRICECHECK_CACHE_FILE"), default_value = DEFAULT_CACHE_FILE, global = true)]
    pub cache_file: PathBuf,
    #[arg(long, env("PRICECHECK_CATEGORIES_DIR"), default_value = "categories", global = true)]
    pub categories_dir: PathBuf,
    #[arg(long, env("PRICECHECK_RESULTS_DIR"), default_value = "results", global = true)]
    pub results_dir: PathBuf,
    /// only sales younger than this count towards the estimate
    #[arg(long, env("PRICECHECK_RECENCY_WINDOW_HOURS"), default_value_t = DEFAULT_RECENCY_WINDOW_HOURS, global = true)]
    pub recency_window_hours: u32,
    /// number of cheapest sales averaged per quality tier
    #[arg(long, default_value_t = DEFAULT_FLOOR_SAMPLE_SIZE, global = true)]
    pub floor_sample_size: usize,
    /// pause between two items
    #[arg(long, env("PRICECHECK_PACING_MS"), default_value_t = DEFAULT_PACING_MS, global = true)]
    pub pacing_ms: u64,
    #[arg(long, env("PRICECHECK_REQUEST_TIMEOUT_SECS"), default_value_t = 30, global = true)]
    pub request_timeout_secs: u64,
    #[arg(long, env("PRICECHECK_REQUESTS_PER_SECOND"), default_value_t = 5, global = true)]
    pub requests_per_second: u32,
    #[arg(long, default_value_t = 3, global = true)]
    pub max_retries: u32,
    /// save the id cache after every newly resolved name
    #[arg(long, global = true)]
    pub write_through_cache: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// prices the items of one or more categories
    Check {
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long, conflicts_with = "categories")]
        all: bool,
    },
    /// prints the available categories
    ListCategories,
    /// resolves item names to ids and stores them in the cache
    Resolve {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

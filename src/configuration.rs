use crate::aggregator::PriceAggregator;
use crate::cli_args::CommonArgs;
use crate::reqwest_helpers::HttpSettings;
use crate::xiv_model::Realm;
use anyhow::{bail, Context, Result};
use chrono::TimeDelta;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PricecheckConfiguration {
    pub base_url: String,
    pub realm: Realm,
    pub cache_file: PathBuf,
    pub categories_dir: PathBuf,
    pub results_dir: PathBuf,
    pub recency_window: TimeDelta,
    pub floor_sample_size: usize,
    pub pacing: Duration,
    pub request_timeout: Duration,
    pub requests_per_second: NonZeroU32,
    pub max_retries: u32,
    pub write_through_cache: bool,
}

impl PricecheckConfiguration {
    pub fn new(args: CommonArgs) -> Result<Self> {
        let CommonArgs {
            base_url,
            realm,
            cache_file,
            categories_dir,
            results_dir,
            recency_window_hours,
            floor_sample_size,
            pacing_ms,
            request_timeout_secs,
            requests_per_second,
            max_retries,
            write_through_cache,
        } = args;

        if realm.trim().is_empty() {
            bail!("realm must not be empty");
        }
        if recency_window_hours == 0 {
            bail!("recency window must be at least one hour");
        }
        if floor_sample_size == 0 {
            bail!("floor sample size must be at least 1");
        }
        if pacing_ms == 0 {
            bail!("pacing must be at least one millisecond");
        }
        if request_timeout_secs == 0 {
            bail!("request timeout must be at least one second");
        }

        Ok(Self {
            base_url,
            realm: Realm(realm.trim().to_string()),
            cache_file,
            categories_dir,
            results_dir,
            recency_window: TimeDelta::try_hours(recency_window_hours as i64).context("recency window out of range")?,
            floor_sample_size,
            pacing: Duration::from_millis(pacing_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            requests_per_second: NonZeroU32::new(requests_per_second).context("requests per second must be at least 1")?,
            max_retries,
            write_through_cache,
        })
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            request_timeout: self.request_timeout,
            requests_per_second: self.requests_per_second,
            max_retries: self.max_retries,
        }
    }

    pub fn aggregator(&self) -> PriceAggregator {
        PriceAggregator::new(self.recency_window, self.floor_sample_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{DEFAULT_FLOOR_SAMPLE_SIZE, DEFAULT_RECENCY_WINDOW_HOURS};
    use crate::batch::DEFAULT_PACING_MS;
    use crate::cli_args::Cli;
    use crate::id_cache::DEFAULT_CACHE_FILE;
    use crate::market::DEFAULT_REALM;
    use crate::xiv_client::DEFAULT_BASE_URL;
    use clap::Parser;

    fn common_args(extra: &[&str]) -> CommonArgs {
        let mut argv = vec!["pricecheck", "list-categories"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap().common
    }

    #[test]
    fn defaults_match_the_daily_market_floor() {
        let cfg = PricecheckConfiguration::new(common_args(&[])).unwrap();

        assert_eq!(cfg.recency_window, TimeDelta::hours(DEFAULT_RECENCY_WINDOW_HOURS as i64));
        assert_eq!(cfg.floor_sample_size, DEFAULT_FLOOR_SAMPLE_SIZE);
        assert_eq!(cfg.pacing, Duration::from_millis(DEFAULT_PACING_MS));
        assert_eq!(cfg.realm, Realm(DEFAULT_REALM.to_string()));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.cache_file, PathBuf::from(DEFAULT_CACHE_FILE));
        assert!(!cfg.pacing.is_zero());
        assert_eq!(cfg.aggregator(), PriceAggregator::default());
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(PricecheckConfiguration::new(common_args(&["--recency-window-hours", "0"])).is_err());
        assert!(PricecheckConfiguration::new(common_args(&["--requests-per-second", "0"])).is_err());
        assert!(PricecheckConfiguration::new(common_args(&["--floor-sample-size", "0"])).is_err());
        assert!(PricecheckConfiguration::new(common_args(&["--realm", " "])).is_err());
        assert!(PricecheckConfiguration::new(common_args(&["--pacing-ms", "0"])).is_err());
        assert!(PricecheckConfiguration::new(common_args(&["--request-timeout-secs", "0"])).is_err());
    }
}

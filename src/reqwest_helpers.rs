use anyhow::{Context, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use http::Extensions;
use log::{debug, error};
use reqwest::{Client, Request, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub requests_per_second: NonZeroU32,
    pub max_retries: u32,
}

pub fn create_client(settings: &HttpSettings) -> Result<ClientWithMiddleware> {
    let reqwest_client = Client::builder()
        .timeout(settings.request_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build http client")?;

    let limiter = RateLimiter::direct(Quota::per_second(settings.requests_per_second));
    let rate_limiting_middleware = RateLimitingMiddleware { limiter: Arc::new(limiter) };

    // transient failures only (connect, timeout, 5xx, 429). A non-matching search is a 200 and never retried.
    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(100), Duration::from_secs(10))
        .build_with_max_retries(settings.max_retries);

    Ok(ClientBuilder::new(reqwest_client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .with(ErrorLoggingMiddleware)
        .with(rate_limiting_middleware)
        .build())
}

struct RateLimitingMiddleware {
    limiter: Arc<DefaultDirectRateLimiter>,
}

#[async_trait::async_trait]
impl Middleware for RateLimitingMiddleware {
    async fn handle(&self, req: Request, extensions: &mut Extensions, next: Next<'_>) -> reqwest_middleware::Result<Response> {
        self.limiter.until_ready().await;
        next.run(req, extensions).await
    }
}

pub struct ErrorLoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for ErrorLoggingMiddleware {
    async fn handle(&self, req: Request, extensions: &mut Extensions, next: Next<'_>) -> reqwest_middleware::Result<Response> {
        let start = Instant::now();
        let method = req.method().clone();
        let url = req.url().clone();

        let result = next.run(req, extensions).await;

        let duration = start.elapsed();

        match &result {
            Ok(resp) if !resp.status().is_success() => {
                let status = resp.status();
                match rate_limit_hint(status) {
                    Some(hint) => debug!("{}: {} {} - Duration: {:?}", hint, method, url, duration),
                    None => error!("Request failed: {} {} - Status: {}, Duration: {:?}", method, url, status, duration),
                }
            }
            Err(e) => {
                error!("Request error: {} {} - Error: {}, Duration: {:?}", method, url, e, duration);
            }
            _ => {
                debug!("Request succeeded: {} {} - Duration: {:?}", method, url, duration);
            }
        }

        result
    }
}

// 429s are retried by the retry middleware, so they are not errors yet
fn rate_limit_hint(status: StatusCode) -> Option<&'static str> {
    (status == StatusCode::TOO_MANY_REQUESTS)
        .then_some("XIVAPI rate-limit hit, retrying with backoff (consider lowering --requests-per-second)")
}

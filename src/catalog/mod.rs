//! Featured catalog listings
//!
//! Reads trek and blog listings from the external catalog backend and picks
//! a featured subset. Orderings are derived from a request-scoped seed, so
//! no per-visitor state is kept anywhere.

use std::time::{Duration, Instant};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::cache::PersistentCache;
use crate::config::CatalogConfig;
use crate::error::{TrekPlanError, error_chain};
use crate::models::{FeaturedItems, ListingKind};

pub mod rotation;

/// Upper bound for a caller-supplied limit
pub const MAX_FEATURED: usize = 50;

/// HTTP client for the catalog backend. Transient failures are retried.
pub struct CatalogClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, config: &CatalogConfig) -> Result<Self, TrekPlanError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("trekplan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrekPlanError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the raw listing document
    #[instrument(skip(self))]
    pub async fn fetch_listing(&self, kind: ListingKind) -> Result<String, TrekPlanError> {
        let url = format!("{}/{}", self.base_url, kind.path());
        let start_time = Instant::now();
        debug!("Fetching catalog listing from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            TrekPlanError::api(format!("Catalog request to {url} failed: {}", error_chain(&e)))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrekPlanError::api(format!(
                "Catalog returned {status} for {url}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            TrekPlanError::api(format!("Failed to read catalog listing: {}", error_chain(&e)))
        })?;

        info!(
            "Fetched {} listing in {:.3}s",
            kind,
            start_time.elapsed().as_secs_f64()
        );
        Ok(body)
    }
}

/// Decode a listing document; it must be a JSON array
pub fn parse_listing(raw: &str) -> Result<Vec<Value>, TrekPlanError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(TrekPlanError::api("Catalog listing is not a JSON array")),
        Err(e) => Err(TrekPlanError::api(format!("Catalog listing is not valid JSON: {e}"))),
    }
}

/// Featured selections over cached catalog listings
pub struct FeaturedCatalog {
    client: CatalogClient,
    cache: Option<PersistentCache>,
    ttl: Duration,
    default_limit: usize,
}

impl FeaturedCatalog {
    pub fn new(client: CatalogClient, cache: Option<PersistentCache>, config: &CatalogConfig) -> Self {
        Self {
            client,
            cache,
            ttl: Duration::from_secs(config.cache_ttl_seconds),
            default_limit: config.featured_limit,
        }
    }

    /// Build from configuration. `None` when no catalog base URL is configured.
    pub fn from_config(config: &CatalogConfig) -> Result<Option<Self>, TrekPlanError> {
        let Some(base_url) = &config.base_url else {
            return Ok(None);
        };

        let client = CatalogClient::new(base_url, config)?;
        let cache = match &config.cache_path {
            Some(path) => Some(PersistentCache::open(path).map_err(|e| {
                TrekPlanError::cache(format!(
                    "Failed to open cache database at {}: {e}",
                    path.display()
                ))
            })?),
            None => None,
        };

        Ok(Some(Self::new(client, cache, config)))
    }

    /// Current listing, served from cache while fresh
    pub async fn listing(&self, kind: ListingKind) -> Result<Vec<Value>, TrekPlanError> {
        let key = kind.cache_key();

        if let Some(cache) = &self.cache {
            match cache.get::<String>(&key).await {
                Ok(Some(raw)) => match parse_listing(&raw) {
                    Ok(items) => return Ok(items),
                    Err(e) => warn!("Discarding cached {} listing: {}", kind, e),
                },
                Ok(None) => {}
                Err(e) => warn!("Cache lookup for {} failed: {}", kind, e),
            }
        }

        let raw = self.client.fetch_listing(kind).await?;
        let items = parse_listing(&raw)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, raw, self.ttl).await {
                warn!("Failed to cache {} listing: {}", kind, e);
            }
        }

        Ok(items)
    }

    /// Pick up to `limit` items ordered by `seed`. Treks rotate, blogs shuffle.
    #[instrument(skip(self))]
    pub async fn featured(
        &self,
        kind: ListingKind,
        seed: Option<u64>,
        limit: Option<usize>,
    ) -> Result<FeaturedItems, TrekPlanError> {
        let seed = seed.unwrap_or_else(rotation::fresh_seed);
        let limit = limit.unwrap_or(self.default_limit).clamp(1, MAX_FEATURED);

        let mut items = self.listing(kind).await?;
        match kind {
            ListingKind::Treks => rotation::rotate(&mut items, seed),
            ListingKind::Blogs => rotation::shuffle(&mut items, seed),
        }
        items.truncate(limit);

        debug!("Featuring {} {} with seed {}", items.len(), kind, seed);
        Ok(FeaturedItems { seed, items })
    }
}

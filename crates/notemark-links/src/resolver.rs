use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use notemark_engine::{Node, links};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::LinkMetadata;
use crate::canonical::canonicalize;
use crate::error::{FetchError, LinkError};
use crate::fetch::Fetcher;

/// Cache lifetimes and the per-fetch time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: Duration,
    /// Lifetime of a cached failure.
    pub negative_ttl: Duration,
    pub timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            negative_ttl: Duration::from_secs(60),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    result: Result<LinkMetadata, FetchError>,
}

impl CacheEntry {
    fn is_fresh(&self, settings: &CacheSettings, now: Instant) -> bool {
        let ttl = match self.result {
            Ok(_) => settings.ttl,
            Err(_) => settings.negative_ttl,
        };
        now.duration_since(self.fetched_at) < ttl
    }
}

/// One entry per canonical URL. Holding the slot lock across the fetch is
/// what coalesces concurrent requests.
type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Resolves link metadata through a TTL cache keyed by canonical URL.
///
/// At most one fetch per URL is in flight: concurrent callers for the same
/// URL wait on its slot and then read the entry the first caller stored.
/// Failures are cached for the shorter negative TTL. Expired entries that
/// no caller is using are evicted on the next lookup.
pub struct LinkResolver<F> {
    fetcher: F,
    settings: CacheSettings,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<F: Fetcher> LinkResolver<F> {
    pub fn new(fetcher: F, settings: CacheSettings) -> Self {
        Self {
            fetcher,
            settings,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, url: &str) -> Result<LinkMetadata, LinkError> {
        let canonical = canonicalize(url)?;
        let key = canonical.to_string();
        let slot = {
            let mut slots = self.slots.lock().await;
            self.evict_expired(&mut slots, Instant::now());
            slots.entry(key.clone()).or_default().clone()
        };

        let mut entry = slot.lock().await;
        let now = Instant::now();
        match entry.as_ref() {
            Some(cached) if cached.is_fresh(&self.settings, now) => {
                log::debug!("cache hit for {key}");
                return cached.result.clone().map_err(LinkError::from);
            }
            Some(_) => log::debug!("cache entry expired for {key}"),
            None => log::debug!("cache miss for {key}"),
        }

        let fetch = self.fetcher.fetch(&canonical);
        let result = match tokio::time::timeout(self.settings.timeout, fetch).await {
            Ok(fetched) => fetched.map(|page| page.metadata()),
            Err(_) => Err(FetchError::Timeout),
        };
        match &result {
            Ok(_) => log::info!("resolved metadata for {key}"),
            Err(e) => log::warn!("caching failed fetch of {key}: {e}"),
        }

        *entry = Some(CacheEntry {
            fetched_at: Instant::now(),
            result: result.clone(),
        });
        result.map_err(LinkError::from)
    }

    /// Number of URLs with a cache slot, fresh or in flight.
    pub async fn cached_entries(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Drops slots whose entry has expired. A slot another caller holds or
    /// is waiting on stays, so its fetch is still shared.
    fn evict_expired(&self, slots: &mut HashMap<String, Slot>, now: Instant) {
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry
                    .as_ref()
                    .is_some_and(|cached| cached.is_fresh(&self.settings, now)),
                Err(_) => true,
            }
        });
        if slots.len() < before {
            log::debug!("evicted {} expired cache entries", before - slots.len());
        }
    }

    /// Resolves every distinct link destination in a tree concurrently, in
    /// reading order of first appearance.
    pub async fn resolve_tree(
        &self,
        root: &Node,
    ) -> Vec<(String, Result<LinkMetadata, LinkError>)> {
        let mut urls: Vec<String> = vec![];
        for reference in links(root) {
            if !urls.contains(&reference.url) {
                urls.push(reference.url);
            }
        }
        let results = join_all(urls.iter().map(|url| self.resolve(url))).await;
        urls.into_iter().zip(results).collect()
    }
}



use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::debug;


/// Cache key for one search page. `page`/`per_page` are `None` for unpaginated entries.
/// `variant` carries whatever else shapes the result set (query text, radius, filters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub service_type: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub variant: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CacheKey {
    pub fn new(service_type: Option<String>, state: Option<String>, zip: Option<String>) -> Self {
        Self {
            service_type,
            state,
            city: None,
            zip,
            variant: None,
            page: None,
            per_page: None,
        }
    }

    pub fn in_city(mut self, city: Option<String>) -> Self {
        self.city = city;
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn paginated(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }
}


/// Partial key for invalidation. Every supplied field must match; `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    pub service_type: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
}

impl Invalidation {
    fn matches(&self, key: &CacheKey) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            match wanted {
                Some(w) => actual.as_deref() == Some(w.as_str()),
                None => true,
            }
        }
        field_matches(&self.service_type, &key.service_type)
            && field_matches(&self.state, &key.state)
            && field_matches(&self.city, &key.city)
            && field_matches(&self.zip, &key.zip)
    }
}


#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}


pub trait SearchCache<V>: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<V>;

    fn set(&self, key: CacheKey, value: V);

    /// Removes every entry matching the partial key, returning how many were dropped.
    fn invalidate(&self, partial: &Invalidation) -> usize;

    fn stats(&self) -> CacheStats;
}


struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}


/// TTL cache with bounded capacity. When full, the oldest-inserted entry is evicted
/// regardless of how recently it was read.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
    max_size: usize,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V> TtlCache<V> {

    pub fn new(max_size: usize, ttl_secs: u64) -> Self {
        Self::with_ttl(max_size, Duration::from_secs(ttl_secs))
    }

    pub fn with_ttl(max_size: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_size: max_size.max(1),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }


    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        let removed = before - entries.len();
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }
}

impl<V: Send + Sync + 'static> TtlCache<V> {
    /// Periodically purges expired entries. The task ends once the cache is dropped.
    pub fn spawn_eviction(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else { break };
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!("Cache eviction removed {} expired entries", removed);
                }
            }
        })
    }
}

impl<V: Clone + Send + Sync> SearchCache<V> for TtlCache<V> {
    fn get(&self, key: &CacheKey) -> Option<V> {
        let entries = self.entries.read();

        if let Some(entry) = entries.get(key) {
            if entry.created_at.elapsed() < self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn set(&self, key: CacheKey, value: V) {
        let mut entries = self.entries.write();

        if entries.len() >= self.max_size && !entries.contains_key(&key) {
            if let Some(oldest_key) = entries
                .iter()
                .min_by_key(|(_, v)| v.created_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest_key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    fn invalidate(&self, partial: &Invalidation) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !partial.matches(key));
        let removed = before - entries.len();
        debug!("Cache invalidation {:?} removed {} entries", partial, removed);
        removed
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.entries.read().len(),
            capacity: self.max_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(service: &str, state: &str, zip: &str) -> CacheKey {
        CacheKey::new(Some(service.into()), Some(state.into()), Some(zip.into()))
    }

    #[test]
    fn test_get_and_set() {
        let cache: TtlCache<u32> = TtlCache::new(10, 60);
        assert!(cache.get(&key("groomer", "IN", "46220")).is_none());
        cache.set(key("groomer", "IN", "46220"), 7);
        assert_eq!(cache.get(&key("groomer", "IN", "46220")), Some(7));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_paginated_keys_are_distinct() {
        let cache: TtlCache<u32> = TtlCache::new(10, 60);
        cache.set(key("vet", "IN", "46220").paginated(1, 20), 1);
        cache.set(key("vet", "IN", "46220").paginated(2, 20), 2);
        assert_eq!(cache.get(&key("vet", "IN", "46220").paginated(2, 20)), Some(2));
        assert!(cache.get(&key("vet", "IN", "46220")).is_none());
    }

    #[test]
    fn test_evicts_oldest_inserted_not_least_recent() {
        let cache: TtlCache<u32> = TtlCache::new(2, 60);
        cache.set(key("a", "IN", "1"), 1);
        std::thread::sleep(Duration::from_millis(2));
        cache.set(key("b", "IN", "2"), 2);
        // Reading "a" does not protect it.
        assert_eq!(cache.get(&key("a", "IN", "1")), Some(1));
        std::thread::sleep(Duration::from_millis(2));
        cache.set(key("c", "IN", "3"), 3);

        assert!(cache.get(&key("a", "IN", "1")).is_none());
        assert_eq!(cache.get(&key("b", "IN", "2")), Some(2));
        assert_eq!(cache.get(&key("c", "IN", "3")), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_expired_entries_miss() {
        let cache: TtlCache<u32> = TtlCache::with_ttl(10, Duration::from_millis(1));
        cache.set(key("a", "IN", "1"), 1);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key("a", "IN", "1")).is_none());
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_partial_invalidation() {
        let cache: TtlCache<u32> = TtlCache::new(10, 60);
        cache.set(key("groomer", "IN", "46220"), 1);
        cache.set(key("groomer", "IN", "46032").paginated(1, 20), 2);
        cache.set(key("vet", "IN", "46220"), 3);
        cache.set(key("vet", "OH", "43004"), 4);

        let removed = cache.invalidate(&Invalidation {
            service_type: Some("groomer".into()),
            ..Default::default()
        });
        assert_eq!(removed, 2);

        let removed = cache.invalidate(&Invalidation {
            state: Some("IN".into()),
            zip: Some("46220".into()),
            ..Default::default()
        });
        assert_eq!(removed, 1);
        assert_eq!(cache.get(&key("vet", "OH", "43004")), Some(4));
    }

    #[test]
    fn test_city_and_variant_split_keys() {
        let cache: TtlCache<u32> = TtlCache::new(10, 60);
        let indy = CacheKey::new(Some("groomer".into()), Some("IN".into()), None)
            .in_city(Some("Indianapolis".into()));
        let fort_wayne = CacheKey::new(Some("groomer".into()), Some("IN".into()), None)
            .in_city(Some("Fort Wayne".into()));
        cache.set(indy.clone(), 1);
        assert!(cache.get(&fort_wayne).is_none());
        assert!(cache.get(&indy.clone().with_variant("min_rating=4")).is_none());

        cache.set(fort_wayne, 2);
        let removed = cache.invalidate(&Invalidation {
            city: Some("Indianapolis".into()),
            ..Default::default()
        });
        assert_eq!(removed, 1);
        assert_eq!(cache.stats().size, 1);
    }

    #[tokio::test]
    async fn test_background_eviction() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::with_ttl(10, Duration::from_millis(5)));
        cache.set(key("a", "IN", "1"), 1);
        let handle = cache.spawn_eviction(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.stats().size, 0);
        drop(cache);
        handle.abort();
    }
}

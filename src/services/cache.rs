// IP Info Bar - Facts Cache
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Time-to-live memoization in front of the data provider.
//!
//! The entry lock is held for the whole provider call, so concurrent
//! refreshes coalesce onto one child process: the second caller waits and
//! then finds a fresh entry.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::models::{FetchError, NetworkFacts};

use super::provider::Provider;

/// Default time-to-live for cached facts.
pub const DEFAULT_TTL: Duration = Duration::from_millis(20_000);

/// Last successful provider result.
#[derive(Debug, Clone)]
struct CacheEntry {
    facts: Arc<NetworkFacts>,
    fetched_at: Instant,
}

/// TTL cache around a [`Provider`].
pub struct FactsCache {
    provider: Arc<dyn Provider>,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl FactsCache {
    pub fn new(provider: Arc<dyn Provider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return cached facts if younger than the TTL, otherwise fetch.
    ///
    /// A failed fetch leaves the previous entry in place.
    pub async fn get(&self, now: Instant) -> Result<Arc<NetworkFacts>, FetchError> {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if now.saturating_duration_since(cached.fetched_at) < self.ttl {
                debug!("Using cached network facts");
                return Ok(Arc::clone(&cached.facts));
            }
        }

        let facts = Arc::new(self.provider.fetch().await?);
        *entry = Some(CacheEntry {
            facts: Arc::clone(&facts),
            fetched_at: now,
        });
        Ok(facts)
    }

    /// Drop the stored entry.
    pub async fn clear(&self) {
        *self.entry.lock().await = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::provider::FetchFuture;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that replays scripted results and counts invocations.
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        calls: AtomicUsize,
        results: std::sync::Mutex<VecDeque<Result<NetworkFacts, FetchError>>>,
        fallback: Option<NetworkFacts>,
        delay: Option<Duration>,
    }

    impl FakeProvider {
        pub(crate) fn always(facts: NetworkFacts) -> Self {
            Self {
                fallback: Some(facts),
                ..Default::default()
            }
        }

        pub(crate) fn scripted(results: Vec<Result<NetworkFacts, FetchError>>) -> Self {
            Self {
                results: std::sync::Mutex::new(results.into()),
                ..Default::default()
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Provider for FakeProvider {
        fn fetch(&self) -> FetchFuture<'_> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                let scripted = self.results.lock().unwrap().pop_front();
                match scripted {
                    Some(result) => result,
                    None => self.fallback.clone().ok_or(FetchError::NoOutput),
                }
            })
        }
    }

    fn facts(wan: &str) -> NetworkFacts {
        NetworkFacts {
            wan_ip4: Some(wan.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let provider = Arc::new(FakeProvider::always(facts("1.2.3.4")));
        let cache = FactsCache::new(provider.clone(), DEFAULT_TTL);
        let t0 = Instant::now();

        let first = cache.get(t0).await.unwrap();
        let second = cache.get(t0 + Duration::from_secs(5)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let provider = Arc::new(FakeProvider::scripted(vec![
            Ok(facts("1.1.1.1")),
            Ok(facts("2.2.2.2")),
        ]));
        let cache = FactsCache::new(provider.clone(), DEFAULT_TTL);
        let t0 = Instant::now();

        assert_eq!(cache.get(t0).await.unwrap().wan_ip4.as_deref(), Some("1.1.1.1"));
        assert_eq!(
            cache.get(t0 + Duration::from_secs(5)).await.unwrap().wan_ip4.as_deref(),
            Some("1.1.1.1")
        );
        assert_eq!(
            cache.get(t0 + Duration::from_secs(21)).await.unwrap().wan_ip4.as_deref(),
            Some("2.2.2.2")
        );
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_exact_ttl_boundary_refetches() {
        let provider = Arc::new(FakeProvider::always(facts("1.2.3.4")));
        let cache = FactsCache::new(provider.clone(), DEFAULT_TTL);
        let t0 = Instant::now();

        cache.get(t0).await.unwrap();
        cache.get(t0 + DEFAULT_TTL).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached_and_keeps_prior_entry() {
        let provider = Arc::new(FakeProvider::scripted(vec![
            Ok(facts("1.1.1.1")),
            Err(FetchError::ProviderReportedError("no network".to_string())),
            Ok(facts("3.3.3.3")),
        ]));
        let cache = FactsCache::new(provider.clone(), DEFAULT_TTL);
        let t0 = Instant::now();

        cache.get(t0).await.unwrap();
        assert_eq!(
            cache.get(t0 + Duration::from_secs(25)).await,
            Err(FetchError::ProviderReportedError("no network".to_string()))
        );
        // The old entry is still there but expired, so the provider runs again.
        assert_eq!(
            cache.get(t0 + Duration::from_secs(26)).await.unwrap().wan_ip4.as_deref(),
            Some("3.3.3.3")
        );
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_error_without_prior_entry() {
        let provider = Arc::new(FakeProvider::scripted(vec![Err(
            FetchError::ProviderReportedError("no network".to_string()),
        )]));
        let cache = FactsCache::new(provider, DEFAULT_TTL);
        assert_eq!(
            cache.get(Instant::now()).await,
            Err(FetchError::ProviderReportedError("no network".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_gets_share_one_fetch() {
        let provider = Arc::new(
            FakeProvider::always(facts("1.2.3.4")).with_delay(Duration::from_secs(3)),
        );
        let cache = Arc::new(FactsCache::new(provider.clone(), DEFAULT_TTL));
        let now = Instant::now();

        let (a, b) = tokio::join!(cache.get(now), cache.get(now));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let provider = Arc::new(FakeProvider::always(facts("1.2.3.4")));
        let cache = FactsCache::new(provider.clone(), DEFAULT_TTL);
        let t0 = Instant::now();

        cache.get(t0).await.unwrap();
        cache.clear().await;
        cache.get(t0).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }
}

//! Time-boxed holder for the effective rate
//!
//! The cache keeps at most one value. Readers may observe a value up to the
//! TTL old; every rate mutation clears it through a [`RateEvent`].
//!
//! Each invalidation bumps a generation counter. A reader that misses records
//! the generation it saw and may only fill the cache if no invalidation has
//! happened since, so a slow storage read cannot re-populate the cache with a
//! rate that was already superseded.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use core_kernel::RateEntryId;

use crate::effective_rate::EffectiveRate;

/// Default time-to-live of a cached effective rate
pub const DEFAULT_RATE_CACHE_TTL: Duration = Duration::from_secs(60);

/// A change to the rate table that invalidates the cached effective rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateEvent {
    Created(RateEntryId),
    Updated(RateEntryId),
    Toggled(RateEntryId),
    Removed(RateEntryId),
    /// All active entries were replaced by a new flat rate
    Replaced,
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(EffectiveRate),
    /// Nothing usable is cached; `generation` must be passed back to `fill`
    Miss { generation: u64 },
}

#[derive(Debug, Default)]
struct CacheState {
    value: Option<(EffectiveRate, Instant)>,
    generation: u64,
}

/// In-process cache of the effective rate
#[derive(Debug)]
pub struct RateCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached rate if it is younger than the TTL
    pub async fn lookup(&self) -> CacheLookup {
        let state = self.state.read().await;
        match state.value {
            Some((rate, stored_at)) if stored_at.elapsed() < self.ttl => CacheLookup::Hit(rate),
            _ => CacheLookup::Miss {
                generation: state.generation,
            },
        }
    }

    /// Stores a freshly loaded rate
    ///
    /// Returns false and leaves the cache empty if an invalidation happened
    /// after the lookup that produced `generation`.
    pub async fn fill(&self, rate: EffectiveRate, generation: u64) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(
                seen = generation,
                current = state.generation,
                "Discarding stale effective rate"
            );
            return false;
        }
        state.value = Some((rate, Instant::now()));
        true
    }

    /// Drops the cached value in response to a rate mutation
    pub async fn invalidate(&self, event: RateEvent) {
        let mut state = self.state.write().await;
        state.value = None;
        state.generation = state.generation.wrapping_add(1);
        debug!(?event, generation = state.generation, "Rate cache invalidated");
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(price: rust_decimal::Decimal) -> EffectiveRate {
        EffectiveRate::new(price, dec!(15), dec!(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = RateCache::default();
        let CacheLookup::Miss { generation } = cache.lookup().await else {
            panic!("empty cache must miss");
        };
        assert!(cache.fill(rate(dec!(0.20)), generation).await);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.lookup().await, CacheLookup::Hit(rate(dec!(0.20))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_ttl() {
        let cache = RateCache::new(Duration::from_secs(60));
        assert!(cache.fill(rate(dec!(0.20)), 0).await);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(matches!(cache.lookup().await, CacheLookup::Miss { .. }));
    }

    #[tokio::test]
    async fn test_invalidate_clears_value() {
        let cache = RateCache::default();
        assert!(cache.fill(rate(dec!(0.20)), 0).await);

        cache.invalidate(RateEvent::Created(RateEntryId::new())).await;
        assert_eq!(cache.lookup().await, CacheLookup::Miss { generation: 1 });
    }

    #[tokio::test]
    async fn test_fill_after_invalidation_is_discarded() {
        let cache = RateCache::default();
        let CacheLookup::Miss { generation } = cache.lookup().await else {
            panic!("empty cache must miss");
        };

        // A writer lands between the reader's miss and its fill
        cache.invalidate(RateEvent::Replaced).await;

        assert!(!cache.fill(rate(dec!(0.10)), generation).await);
        assert!(matches!(cache.lookup().await, CacheLookup::Miss { .. }));
    }
}

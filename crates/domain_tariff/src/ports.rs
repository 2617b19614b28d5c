//! Tariff Domain Ports
//!
//! `RateEntryPort` is the storage boundary of the tariff domain. The
//! PostgreSQL adapter lives in `infra_db`; an in-memory adapter is available
//! behind the `mock` feature for tests of this and downstream crates.

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, HealthCheckable, PortError, RateEntryId};

use crate::rate_entry::{RateEntry, RateKind, RateScope};

/// Ordering of a rate entry listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateOrder {
    /// Most recently created first
    #[default]
    NewestFirst,
    /// Scope name, then tier lower bound
    ScopeThenTier,
    /// Tier lower bound ascending
    TierAscending,
}

/// Query parameters for listing rate entries
#[derive(Debug, Clone, Default)]
pub struct RateEntryQuery {
    /// Filter by active flag
    pub active: Option<bool>,
    /// Filter by entry kind
    pub kinds: Vec<RateKind>,
    /// Restrict to these scopes (empty means any)
    pub scopes: Vec<RateScope>,
    /// Only entries whose effective window contains this date
    pub effective_on: Option<NaiveDate>,
    pub order: RateOrder,
}

impl RateEntryQuery {
    /// Every entry, newest first
    pub fn all() -> Self {
        Self::default()
    }

    /// Active entries only
    pub fn active() -> Self {
        Self {
            active: Some(true),
            ..Default::default()
        }
    }

    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = RateKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = RateScope>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    pub fn effective_on(mut self, date: NaiveDate) -> Self {
        self.effective_on = Some(date);
        self
    }

    pub fn ordered_by(mut self, order: RateOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns true if the entry satisfies every filter of the query
    pub fn matches(&self, entry: &RateEntry) -> bool {
        if let Some(active) = self.active {
            if entry.is_active != active {
                return false;
            }
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&entry.kind) {
            return false;
        }
        if !self.scopes.is_empty() && !self.scopes.contains(&entry.scope) {
            return false;
        }
        if let Some(date) = self.effective_on {
            if entry.effective_from.is_none() || !entry.window().contains(date) {
                return false;
            }
        }
        true
    }
}

/// Storage port for rate entries
#[async_trait]
pub trait RateEntryPort: DomainPort + HealthCheckable {
    /// Persists a new entry
    async fn insert(&self, entry: &RateEntry) -> Result<(), PortError>;

    /// Retrieves an entry by ID, or `PortError::NotFound`
    async fn get(&self, id: RateEntryId) -> Result<RateEntry, PortError>;

    /// Overwrites an existing entry, or `PortError::NotFound`
    async fn save(&self, entry: &RateEntry) -> Result<(), PortError>;

    /// Deletes an entry, or `PortError::NotFound`
    async fn delete(&self, id: RateEntryId) -> Result<(), PortError>;

    /// Lists entries matching the query
    async fn list(&self, query: RateEntryQuery) -> Result<Vec<RateEntry>, PortError>;

    /// The most recently created active entry, if any
    async fn latest_active(&self) -> Result<Option<RateEntry>, PortError>;

    /// Deactivates every active entry and inserts `entry`, atomically
    async fn replace_active(&self, entry: &RateEntry) -> Result<(), PortError>;
}

/// Sorts entries in memory the way the storage adapters order them
pub fn sort_entries(entries: &mut [RateEntry], order: RateOrder) {
    match order {
        RateOrder::NewestFirst => {
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
        }
        RateOrder::ScopeThenTier => entries.sort_by(|a, b| {
            a.scope
                .as_str()
                .cmp(b.scope.as_str())
                .then(a.tier_min_units.cmp(&b.tier_min_units))
        }),
        RateOrder::TierAscending => entries.sort_by(|a, b| a.tier_min_units.cmp(&b.tier_min_units)),
    }
}

/// In-memory implementation of RateEntryPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    #[derive(Debug, Default)]
    pub struct MockRateEntryPort {
        entries: Arc<RwLock<HashMap<RateEntryId, RateEntry>>>,
        latest_active_calls: AtomicUsize,
        fail_writes: AtomicBool,
    }

    impl MockRateEntryPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with entries for testing
        pub async fn with_entries(entries: Vec<RateEntry>) -> Self {
            let port = Self::new();
            {
                let mut stored = port.entries.write().await;
                for entry in entries {
                    stored.insert(entry.id, entry);
                }
            }
            port
        }

        /// Number of times `latest_active` reached storage
        pub fn latest_active_calls(&self) -> usize {
            self.latest_active_calls.load(Ordering::SeqCst)
        }

        /// Makes every subsequent write fail with a connection error
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub async fn count(&self) -> usize {
            self.entries.read().await.len()
        }

        fn check_writable(&self) -> Result<(), PortError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(PortError::connection("mock storage unavailable"));
            }
            Ok(())
        }
    }

    impl DomainPort for MockRateEntryPort {}

    #[async_trait]
    impl HealthCheckable for MockRateEntryPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-rate-entry-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl RateEntryPort for MockRateEntryPort {
        async fn insert(&self, entry: &RateEntry) -> Result<(), PortError> {
            self.check_writable()?;
            let mut entries = self.entries.write().await;
            if entries.contains_key(&entry.id) {
                return Err(PortError::conflict(format!("Rate entry {} already exists", entry.id)));
            }
            entries.insert(entry.id, entry.clone());
            Ok(())
        }

        async fn get(&self, id: RateEntryId) -> Result<RateEntry, PortError> {
            self.entries
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("RateEntry", id))
        }

        async fn save(&self, entry: &RateEntry) -> Result<(), PortError> {
            self.check_writable()?;
            let mut entries = self.entries.write().await;
            match entries.get_mut(&entry.id) {
                Some(stored) => {
                    *stored = entry.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("RateEntry", entry.id)),
            }
        }

        async fn delete(&self, id: RateEntryId) -> Result<(), PortError> {
            self.check_writable()?;
            self.entries
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("RateEntry", id))
        }

        async fn list(&self, query: RateEntryQuery) -> Result<Vec<RateEntry>, PortError> {
            let entries = self.entries.read().await;
            let mut results: Vec<_> = entries.values().filter(|e| query.matches(e)).cloned().collect();
            sort_entries(&mut results, query.order);
            Ok(results)
        }

        async fn latest_active(&self) -> Result<Option<RateEntry>, PortError> {
            self.latest_active_calls.fetch_add(1, Ordering::SeqCst);
            let entries = self.entries.read().await;
            Ok(entries
                .values()
                .filter(|e| e.is_active)
                .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
                .cloned())
        }

        async fn replace_active(&self, entry: &RateEntry) -> Result<(), PortError> {
            self.check_writable()?;
            let mut entries = self.entries.write().await;
            let now = Utc::now();
            for existing in entries.values_mut().filter(|e| e.is_active) {
                existing.is_active = false;
                existing.updated_at = now;
            }
            entries.insert(entry.id, entry.clone());
            Ok(())
        }
    }
}

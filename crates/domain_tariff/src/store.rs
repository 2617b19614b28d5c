//! Rate configuration service
//!
//! `RateConfigStore` owns the rate cache and is the only writer of rate
//! entries, so every mutation passes through a single invalidation point.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use core_kernel::{AdminId, RateEntryId, Timezone};

use crate::cache::{CacheLookup, RateCache, RateEvent};
use crate::effective_rate::EffectiveRate;
use crate::error::TariffError;
use crate::ports::{RateEntryPort, RateEntryQuery, RateOrder};
use crate::rate_entry::{ConsumerType, NewRateEntry, RateEntry, RateEntryChanges, RateKind, RateScope};

/// Name given to entries created by a flat-rate replacement
pub const FLAT_RATE_NAME: &str = "Flat Rate";

/// Taxes and surcharges that apply to a consumer type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxesAndSurcharges {
    pub taxes: Vec<RateEntry>,
    pub surcharges: Vec<RateEntry>,
}

/// Rate configuration service
///
/// Owns the rate-entry port and the effective-rate cache. Every write
/// invalidates the cache, whether or not the port accepted it.
///
/// # Example
///
/// ```rust,ignore
/// let store = RateConfigStore::new(port)
///     .with_cache_ttl(Duration::from_secs(300))
///     .with_timezone(Timezone::default());
/// let rate = store.effective_rate().await?;
/// ```
pub struct RateConfigStore {
    port: Arc<dyn RateEntryPort>,
    cache: RateCache,
    timezone: Timezone,
}

impl RateConfigStore {
    /// Creates a store with the default cache TTL and timezone
    ///
    /// # Arguments
    ///
    /// * `port` - Storage for rate entries
    pub fn new(port: Arc<dyn RateEntryPort>) -> Self {
        Self {
            port,
            cache: RateCache::default(),
            timezone: Timezone::default(),
        }
    }

    /// Sets how long an effective rate may be served from memory
    ///
    /// # Arguments
    ///
    /// * `ttl` - Cache lifetime; a zero TTL disables caching
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = RateCache::new(ttl);
        self
    }

    /// Sets the timezone used to decide which entries are in effect today
    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// The flat rate that governs the next calculation
    ///
    /// This is the most recently created active entry, or
    /// [`EffectiveRate::DEFAULT`] when no entry is active.
    #[instrument(skip(self))]
    pub async fn effective_rate(&self) -> Result<EffectiveRate, TariffError> {
        let generation = match self.cache.lookup().await {
            CacheLookup::Hit(rate) => return Ok(rate),
            CacheLookup::Miss { generation } => generation,
        };

        let rate = match self.port.latest_active().await? {
            Some(entry) => EffectiveRate::from(&entry),
            None => {
                debug!("No active rate entry, using default rate");
                EffectiveRate::DEFAULT
            }
        };

        self.cache.fill(rate, generation).await;
        Ok(rate)
    }

    /// Creates a rate entry
    ///
    /// # Arguments
    ///
    /// * `request` - Entry fields; validated before anything is stored
    /// * `created_by` - Admin recorded as the author, if known
    ///
    /// # Errors
    ///
    /// * `TariffError::Validation` or `TariffError::Money` for invalid fields
    /// * `TariffError::Port` if storage fails
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: NewRateEntry,
        created_by: Option<AdminId>,
    ) -> Result<RateEntry, TariffError> {
        let entry = RateEntry::create(request, created_by, Utc::now())?;
        let result = self.port.insert(&entry).await;
        self.cache.invalidate(RateEvent::Created(entry.id)).await;
        result?;

        info!(rate_id = %entry.id, kind = ?entry.kind, "Rate entry created");
        Ok(entry)
    }

    /// Applies a partial update to an entry
    ///
    /// Absent fields keep their stored value; the merged entry is validated
    /// as a whole.
    ///
    /// # Errors
    ///
    /// * `TariffError::NotFound` if no entry has this ID
    /// * `TariffError::Validation` if the merged entry is invalid
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: RateEntryId, changes: RateEntryChanges) -> Result<RateEntry, TariffError> {
        let result = self.apply_update(id, changes).await;
        self.cache.invalidate(RateEvent::Updated(id)).await;
        let entry = result?;

        info!(rate_id = %id, "Rate entry updated");
        Ok(entry)
    }

    /// Flips the active flag of an entry
    #[instrument(skip(self))]
    pub async fn toggle_active(&self, id: RateEntryId) -> Result<RateEntry, TariffError> {
        let result = self.apply_toggle(id).await;
        self.cache.invalidate(RateEvent::Toggled(id)).await;
        let entry = result?;

        info!(rate_id = %id, active = entry.is_active, "Rate entry toggled");
        Ok(entry)
    }

    /// Deletes an entry
    #[instrument(skip(self))]
    pub async fn remove(&self, id: RateEntryId) -> Result<(), TariffError> {
        let result = self.port.delete(id).await;
        self.cache.invalidate(RateEvent::Removed(id)).await;
        result?;

        info!(rate_id = %id, "Rate entry removed");
        Ok(())
    }

    /// Deactivates every active entry and installs a new flat rate
    ///
    /// # Arguments
    ///
    /// * `unit_price` - Price per kWh
    /// * `vat_percentage` - VAT in whole points
    /// * `fixed_service_charge` - Charge added to every bill
    /// * `created_by` - Admin recorded as the author, if known
    ///
    /// # Returns
    ///
    /// The new entry, named [`FLAT_RATE_NAME`]
    #[instrument(skip(self))]
    pub async fn replace_flat_rate(
        &self,
        unit_price: Decimal,
        vat_percentage: Decimal,
        fixed_service_charge: Decimal,
        created_by: Option<AdminId>,
    ) -> Result<RateEntry, TariffError> {
        let result = self
            .install_flat_rate(unit_price, vat_percentage, fixed_service_charge, created_by)
            .await;
        self.cache.invalidate(RateEvent::Replaced).await;
        let entry = result?;

        info!(rate_id = %entry.id, %unit_price, "Flat rate replaced");
        Ok(entry)
    }

    /// Every entry, newest first
    pub async fn find_all(&self) -> Result<Vec<RateEntry>, TariffError> {
        Ok(self.port.list(RateEntryQuery::all()).await?)
    }

    /// A single entry by ID
    pub async fn find_one(&self, id: RateEntryId) -> Result<RateEntry, TariffError> {
        Ok(self.port.get(id).await?)
    }

    /// Active entries in effect today, ordered by scope then tier
    pub async fn find_active(&self) -> Result<Vec<RateEntry>, TariffError> {
        let today = self.timezone.today(Utc::now());
        self.find_active_on(today).await
    }

    /// Active entries in effect on the given date, ordered by scope then tier
    pub async fn find_active_on(&self, date: NaiveDate) -> Result<Vec<RateEntry>, TariffError> {
        let query = RateEntryQuery::active()
            .effective_on(date)
            .ordered_by(RateOrder::ScopeThenTier);
        Ok(self.port.list(query).await?)
    }

    /// Active entries that apply to a consumer type, ordered by tier
    pub async fn find_by_consumer_type(
        &self,
        consumer_type: ConsumerType,
    ) -> Result<Vec<RateEntry>, TariffError> {
        let query = RateEntryQuery::active()
            .with_scopes([consumer_type.scope(), RateScope::All])
            .ordered_by(RateOrder::TierAscending);
        Ok(self.port.list(query).await?)
    }

    /// Active tier bands scoped exactly to a consumer type, lowest band first
    pub async fn tier_rates(&self, consumer_type: ConsumerType) -> Result<Vec<RateEntry>, TariffError> {
        let query = RateEntryQuery::active()
            .with_kinds([RateKind::TierRate])
            .with_scopes([consumer_type.scope()])
            .ordered_by(RateOrder::TierAscending);
        Ok(self.port.list(query).await?)
    }

    /// Active taxes and surcharges that apply to a consumer type
    pub async fn taxes_and_surcharges(
        &self,
        consumer_type: ConsumerType,
    ) -> Result<TaxesAndSurcharges, TariffError> {
        let query = RateEntryQuery::active()
            .with_kinds([RateKind::Tax, RateKind::Surcharge])
            .with_scopes([consumer_type.scope(), RateScope::All]);
        let entries = self.port.list(query).await?;

        let (taxes, surcharges) = entries.into_iter().partition(|e| e.kind == RateKind::Tax);
        Ok(TaxesAndSurcharges { taxes, surcharges })
    }

    async fn apply_update(&self, id: RateEntryId, changes: RateEntryChanges) -> Result<RateEntry, TariffError> {
        let mut entry = self.port.get(id).await?;
        entry.apply(changes, Utc::now())?;
        self.port.save(&entry).await?;
        Ok(entry)
    }

    async fn apply_toggle(&self, id: RateEntryId) -> Result<RateEntry, TariffError> {
        let mut entry = self.port.get(id).await?;
        entry.toggle(Utc::now());
        self.port.save(&entry).await?;
        Ok(entry)
    }

    async fn install_flat_rate(
        &self,
        unit_price: Decimal,
        vat_percentage: Decimal,
        fixed_service_charge: Decimal,
        created_by: Option<AdminId>,
    ) -> Result<RateEntry, TariffError> {
        let request = NewRateEntry {
            name: FLAT_RATE_NAME.to_string(),
            kind: RateKind::TierRate,
            value: unit_price,
            scope: Some(RateScope::All),
            vat_percentage: Some(vat_percentage),
            fixed_service_charge: Some(fixed_service_charge),
            is_active: Some(true),
            effective_from: Some(self.timezone.today(Utc::now())),
            ..Default::default()
        };
        let entry = RateEntry::create(request, created_by, Utc::now())?;
        self.port.replace_active(&entry).await?;
        Ok(entry)
    }
}

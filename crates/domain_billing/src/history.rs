//! Bill history
//!
//! `HistoryRecorder` persists computed bills and serves paginated, per-consumer
//! and monthly views of them.

use std::sync::Arc;

use tracing::{info, instrument};

use core_kernel::{BillRecordId, BillingMonth};

use crate::breakdown::BillBreakdown;
use crate::error::BillingError;
use crate::ports::BillHistoryPort;
use crate::record::{BillRecord, HistoryPage, MonthlyAggregate};

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// A requested page of history; missing values take the recorder's defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

/// Persists and queries bill records
pub struct HistoryRecorder {
    port: Arc<dyn BillHistoryPort>,
    default_page_size: u32,
    max_page_size: u32,
}

impl HistoryRecorder {
    /// Creates a recorder with [`DEFAULT_PAGE_SIZE`] and [`MAX_PAGE_SIZE`]
    ///
    /// # Arguments
    ///
    /// * `port` - Storage for bill records
    pub fn new(port: Arc<dyn BillHistoryPort>) -> Self {
        Self {
            port,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Overrides the default and maximum page sizes
    ///
    /// # Arguments
    ///
    /// * `default_page_size` - Limit used when a request names none; clamped to `[1, max_page_size]`
    /// * `max_page_size` - Largest accepted limit; at least 1
    pub fn with_page_sizes(mut self, default_page_size: u32, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.max(1);
        self.default_page_size = default_page_size.clamp(1, self.max_page_size);
        self
    }

    /// Stores a breakdown as a new immutable record
    ///
    /// # Errors
    ///
    /// * `BillingError::Serialization` if the detail lines cannot be encoded
    /// * `BillingError::Port` if storage fails
    #[instrument(skip(self, breakdown), fields(consumer_type = %breakdown.consumer_type))]
    pub async fn record(&self, breakdown: &BillBreakdown) -> Result<BillRecord, BillingError> {
        let record = BillRecord::from_breakdown(breakdown)?;
        self.port.insert(&record).await?;

        info!(
            record_id = %record.id,
            month = %record.billing_month,
            total = %record.total_amount,
            "Bill recorded"
        );
        Ok(record)
    }

    /// Records newest first; `page` is 1-indexed
    ///
    /// A page below 1 is treated as 1 and the limit is clamped to
    /// `[1, max_page_size]`.
    pub async fn list_page(&self, request: PageRequest) -> Result<HistoryPage, BillingError> {
        let page = request.page.unwrap_or(1).max(1);
        let limit = request
            .limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);
        let offset = u64::from(page - 1) * u64::from(limit);

        let (items, total) = self.port.list_page(offset, limit).await?;
        Ok(HistoryPage {
            items,
            total,
            page,
            limit,
        })
    }

    /// Every record for a consumer, newest first
    pub async fn list_by_consumer(&self, consumer_id: &str) -> Result<Vec<BillRecord>, BillingError> {
        Ok(self.port.list_by_consumer(consumer_id).await?)
    }

    /// A single record, or `BillingError::RecordNotFound`
    pub async fn get_by_id(&self, id: BillRecordId) -> Result<BillRecord, BillingError> {
        Ok(self.port.get(id).await?)
    }

    /// Per-consumer-type totals for the month
    pub async fn monthly_aggregate(&self, month: BillingMonth) -> Result<Vec<MonthlyAggregate>, BillingError> {
        Ok(self.port.monthly_aggregate(month).await?)
    }
}

//! Bill calculation DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::BillingMonth;
use domain_billing::{BillRecord, BillRequest, HistoryPage, PageRequest};
use domain_tariff::ConsumerType;

/// Body of `POST /calculation` and `POST /calculation/pdf`
///
/// `unitsConsumed` accepts a JSON number or a decimal string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateBillRequest {
    pub consumer_name: Option<String>,
    pub consumer_id: Option<String>,
    pub consumer_type: ConsumerType,
    pub units_consumed: Decimal,
    /// `YYYY-MM`; the current month when absent
    pub calculation_month: Option<BillingMonth>,
}

impl From<CalculateBillRequest> for BillRequest {
    fn from(req: CalculateBillRequest) -> Self {
        let request = BillRequest::new(req.consumer_type, req.units_consumed)
            .with_consumer(req.consumer_name, req.consumer_id);
        match req.calculation_month {
            Some(month) => request.for_month(month),
            None => request,
        }
    }
}

/// `?page=&limit=` of the history listing; both optional
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<HistoryQuery> for PageRequest {
    fn from(query: HistoryQuery) -> Self {
        PageRequest {
            page: query.page,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub data: Vec<BillRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl From<HistoryPage> for HistoryResponse {
    fn from(page: HistoryPage) -> Self {
        Self {
            data: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculate_request_with_month() {
        let json = r#"{"consumerType": "commercial", "unitsConsumed": 250.5, "calculationMonth": "2024-03"}"#;
        let request = BillRequest::from(serde_json::from_str::<CalculateBillRequest>(json).unwrap());

        assert_eq!(request.consumer_type, ConsumerType::Commercial);
        assert_eq!(request.units_consumed, dec!(250.5));
        assert_eq!(request.billing_month, Some("2024-03".parse().unwrap()));
    }

    #[test]
    fn test_calculate_request_rejects_unknown_consumer_type() {
        let json = r#"{"consumerType": "agricultural", "unitsConsumed": 10}"#;
        assert!(serde_json::from_str::<CalculateBillRequest>(json).is_err());
    }
}

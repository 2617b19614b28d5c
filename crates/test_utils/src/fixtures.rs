//! Pre-built Test Fixtures
//!
//! Predictable rate schedules and accounts shared across test suites. Consumer
//! identities are randomized with `fake` where their value doesn't matter.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::{AdminId, BillingMonth};
use domain_admin::{hash_password, Admin, AdminRole, NewAdmin, Password};
use domain_tariff::{EffectiveRate, RateEntry, RateKind, RateScope, ValueKind};

use crate::builders::RateEntryBuilder;

/// Password used by every admin fixture
pub const FIXTURE_PASSWORD: &str = "secret123";

/// Fixed points in time
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// 2024-03-15 10:30 UTC
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    pub fn tariff_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    pub fn tariff_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    }

    pub fn march_2024() -> BillingMonth {
        BillingMonth::new(2024, 3).unwrap()
    }
}

/// Rate entries and schedules
pub struct RateFixtures;

impl RateFixtures {
    /// The built-in fallback rate: 0.12 per kWh, 15% VAT, 5.00 service charge
    pub fn default_rate() -> EffectiveRate {
        EffectiveRate::DEFAULT
    }

    /// An active flat entry carrying the given price, VAT and service charge
    pub fn flat_entry(unit_price: rust_decimal::Decimal) -> RateEntry {
        RateEntryBuilder::new()
            .named("Standard Rate")
            .value(unit_price)
            .vat(dec!(15))
            .service_charge(dec!(5))
            .build()
    }

    /// Three residential bands: 0-50 at 0.10, 50-150 at 0.15, 150+ at 0.20
    pub fn residential_tiers() -> Vec<RateEntry> {
        vec![
            Self::tier("Tier 1", RateScope::Residential, dec!(0), Some(dec!(50)), dec!(0.10)),
            Self::tier("Tier 2", RateScope::Residential, dec!(50), Some(dec!(150)), dec!(0.15)),
            Self::tier("Tier 3", RateScope::Residential, dec!(150), None, dec!(0.20)),
        ]
    }

    pub fn tier(
        name: &str,
        scope: RateScope,
        min: rust_decimal::Decimal,
        max: Option<rust_decimal::Decimal>,
        price: rust_decimal::Decimal,
    ) -> RateEntry {
        RateEntryBuilder::new()
            .named(name)
            .kind(RateKind::TierRate)
            .value(price)
            .value_kind(ValueKind::PerKwh)
            .scope(scope)
            .tier(min, max)
            .build()
    }

    /// VAT at 15% for all consumers
    pub fn vat() -> RateEntry {
        RateEntryBuilder::new()
            .named("VAT")
            .kind(RateKind::Tax)
            .value(dec!(15))
            .value_kind(ValueKind::Percentage)
            .build()
    }

    /// A fixed 5.00 service charge for all consumers
    pub fn service_charge() -> RateEntry {
        RateEntryBuilder::new()
            .named("Service Charge")
            .kind(RateKind::Surcharge)
            .value(dec!(5))
            .value_kind(ValueKind::Fixed)
            .build()
    }
}

/// Administrator accounts
pub struct AdminFixtures;

impl AdminFixtures {
    /// A stored, active admin whose password is [`FIXTURE_PASSWORD`]
    pub fn admin(username: &str, role: AdminRole) -> Admin {
        let now = TemporalFixtures::now();
        Admin {
            id: AdminId::new(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: hash_password(&Password::new(FIXTURE_PASSWORD)).unwrap(),
            full_name: Some(Name().fake()),
            role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A valid registration request with a random email
    pub fn registration(username: &str) -> NewAdmin {
        NewAdmin {
            username: username.to_string(),
            email: SafeEmail().fake(),
            password: FIXTURE_PASSWORD.to_string(),
            full_name: Some(Name().fake()),
            role: None,
        }
    }
}

/// Consumer identities for bill requests
pub struct ConsumerFixtures;

impl ConsumerFixtures {
    pub fn name() -> String {
        Name().fake()
    }

    pub fn id() -> String {
        format!("C-{}", (1000..9999).fake::<u32>())
    }
}

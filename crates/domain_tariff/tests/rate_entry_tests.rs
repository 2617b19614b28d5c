//! Tests for rate entry validation, query matching and ordering

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_tariff::ports::sort_entries;
use domain_tariff::{
    ConsumerType, EffectiveRate, NewRateEntry, RateEntry, RateEntryChanges, RateEntryQuery, RateKind,
    RateOrder, RateScope, TariffError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tier(name: &str, scope: RateScope, min: Decimal, max: Option<Decimal>) -> RateEntry {
    let request = NewRateEntry {
        name: name.to_string(),
        kind: RateKind::TierRate,
        value: dec!(0.10),
        scope: Some(scope),
        tier_min_units: Some(min),
        tier_max_units: max,
        effective_from: Some(date(2024, 1, 1)),
        ..Default::default()
    };
    RateEntry::create(request, None, Utc::now()).unwrap()
}

mod validation {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let request = NewRateEntry {
            name: "   ".to_string(),
            value: dec!(0.1),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(TariffError::Validation(_))));
    }

    #[test]
    fn test_inverted_tier_bounds_rejected() {
        let request = NewRateEntry {
            name: "Band".to_string(),
            value: dec!(0.1),
            tier_min_units: Some(dec!(200)),
            tier_max_units: Some(dec!(100)),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_inverted_effective_window_rejected() {
        let request = NewRateEntry {
            name: "Band".to_string(),
            value: dec!(0.1),
            effective_from: Some(date(2024, 6, 1)),
            effective_to: Some(date(2024, 5, 31)),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(TariffError::Temporal(_))));
    }

    #[test]
    fn test_negative_vat_rejected() {
        let request = NewRateEntry {
            name: "Standard".to_string(),
            value: dec!(0.1),
            vat_percentage: Some(dec!(-1)),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(TariffError::Money(_))));
    }

    #[test]
    fn test_update_can_clear_nullable_field() {
        let mut entry = tier("Band", RateScope::All, dec!(0), Some(dec!(100)));
        let changes = RateEntryChanges {
            tier_max_units: Some(None),
            description: Some(Some("open ended".to_string())),
            ..Default::default()
        };

        entry.apply(changes, Utc::now()).unwrap();
        assert_eq!(entry.tier_max_units, None);
        assert_eq!(entry.description.as_deref(), Some("open ended"));
    }
}

mod querying {
    use super::*;

    #[test]
    fn test_effective_on_excludes_entries_without_start() {
        let mut entry = tier("Band", RateScope::All, dec!(0), None);
        entry.effective_from = None;

        let query = RateEntryQuery::active().effective_on(date(2024, 3, 1));
        assert!(!query.matches(&entry));
    }

    #[test]
    fn test_effective_on_respects_inclusive_end() {
        let mut entry = tier("Band", RateScope::All, dec!(0), None);
        entry.effective_to = Some(date(2024, 3, 31));

        assert!(RateEntryQuery::active().effective_on(date(2024, 3, 31)).matches(&entry));
        assert!(!RateEntryQuery::active().effective_on(date(2024, 4, 1)).matches(&entry));
    }

    #[test]
    fn test_scope_filter() {
        let commercial = tier("Band", RateScope::Commercial, dec!(0), None);
        let query = RateEntryQuery::active().with_scopes([ConsumerType::Residential.scope(), RateScope::All]);
        assert!(!query.matches(&commercial));
    }

    #[test]
    fn test_scope_then_tier_ordering() {
        let mut entries = vec![
            tier("R2", RateScope::Residential, dec!(100), None),
            tier("A", RateScope::All, dec!(0), None),
            tier("R1", RateScope::Residential, dec!(0), Some(dec!(100))),
            tier("C1", RateScope::Commercial, dec!(0), None),
        ];
        sort_entries(&mut entries, RateOrder::ScopeThenTier);

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["A", "C1", "R1", "R2"]);
    }

    #[test]
    fn test_newest_first_ordering() {
        let mut old = tier("Old", RateScope::All, dec!(0), None);
        old.created_at = Utc::now() - Duration::days(1);
        let new = tier("New", RateScope::All, dec!(0), None);

        let mut entries = vec![old, new];
        sort_entries(&mut entries, RateOrder::NewestFirst);
        assert_eq!(entries[0].name, "New");
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_enums_use_snake_case() {
        assert_eq!(serde_json::to_string(&RateKind::TierRate).unwrap(), "\"tier_rate\"");
        assert_eq!(serde_json::to_string(&RateScope::All).unwrap(), "\"all\"");
        let parsed: ConsumerType = serde_json::from_str("\"industrial\"").unwrap();
        assert_eq!(parsed, ConsumerType::Industrial);
    }

    #[test]
    fn test_effective_rate_json_shape() {
        let json = serde_json::to_value(EffectiveRate::DEFAULT).unwrap();
        assert_eq!(json["unitPrice"], "0.12");
        assert_eq!(json["vatPercent"], "15");
        assert_eq!(json["fixedSurcharge"], "5");
    }

    #[test]
    fn test_unknown_consumer_type_rejected() {
        assert!("household".parse::<ConsumerType>().is_err());
    }
}

//! PostgreSQL adapter tests
//!
//! Each test starts its own container. Run with `cargo test -- --ignored`.

use chrono::Duration;
use rust_decimal_macros::dec;

use core_kernel::{BillingMonth, HealthCheckable, RateEntryId};
use domain_admin::{AdminPort, AdminRole};
use domain_billing::BillHistoryPort;
use domain_tariff::{ConsumerType, RateEntryPort, RateEntryQuery, RateKind, RateOrder, RateScope};
use infra_db::{PostgresAdminAdapter, PostgresBillHistoryAdapter, PostgresRateEntryAdapter};
use test_utils::{
    db_test, AdminFixtures, BillRecordBuilder, RateEntryBuilder, RateFixtures, TemporalFixtures,
};

db_test!(test_rate_entry_crud, |pool| {
    let adapter = PostgresRateEntryAdapter::new(pool);
    let entry = RateFixtures::flat_entry(dec!(0.12));

    adapter.insert(&entry).await.unwrap();
    assert_eq!(adapter.get(entry.id).await.unwrap(), entry);

    let mut changed = entry.clone();
    changed.value = dec!(0.18);
    changed.description = Some("winter".to_string());
    adapter.save(&changed).await.unwrap();
    assert_eq!(adapter.get(entry.id).await.unwrap().value, dec!(0.18));

    adapter.delete(entry.id).await.unwrap();
    assert!(adapter.get(entry.id).await.unwrap_err().is_not_found());
    assert!(adapter.delete(entry.id).await.unwrap_err().is_not_found());
});

db_test!(test_missing_entry_save_is_not_found, |pool| {
    let adapter = PostgresRateEntryAdapter::new(pool);
    let entry = RateEntryBuilder::new().build();
    assert!(adapter.save(&entry).await.unwrap_err().is_not_found());
    assert!(adapter.get(RateEntryId::new()).await.unwrap_err().is_not_found());
});

db_test!(test_list_filters_and_orders, |pool| {
    let adapter = PostgresRateEntryAdapter::new(pool);
    for tier in RateFixtures::residential_tiers().into_iter().rev() {
        adapter.insert(&tier).await.unwrap();
    }
    adapter
        .insert(&RateFixtures::tier("Commercial", RateScope::Commercial, dec!(0), None, dec!(0.30)))
        .await
        .unwrap();
    adapter.insert(&RateFixtures::vat()).await.unwrap();
    adapter
        .insert(&RateEntryBuilder::new().named("Old").inactive().build())
        .await
        .unwrap();

    let tiers = adapter
        .list(
            RateEntryQuery::active()
                .with_kinds([RateKind::TierRate])
                .with_scopes([RateScope::Residential, RateScope::All])
                .ordered_by(RateOrder::TierAscending),
        )
        .await
        .unwrap();
    let names: Vec<_> = tiers.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Tier 1", "Tier 2", "Tier 3"]);

    let active = adapter.list(RateEntryQuery::active()).await.unwrap();
    assert_eq!(active.len(), 5);

    let all = adapter.list(RateEntryQuery::all()).await.unwrap();
    assert_eq!(all.len(), 6);

    let by_scope = adapter
        .list(RateEntryQuery::active().ordered_by(RateOrder::ScopeThenTier))
        .await
        .unwrap();
    assert_eq!(by_scope.first().unwrap().scope, RateScope::All);
});

db_test!(test_effective_date_filter, |pool| {
    let adapter = PostgresRateEntryAdapter::new(pool);
    let start = TemporalFixtures::tariff_start();
    let end = TemporalFixtures::tariff_end();

    let bounded = RateEntryBuilder::new().named("2024").effective(Some(start), Some(end)).build();
    let undated = RateEntryBuilder::new().named("Undated").effective(None, None).build();
    adapter.insert(&bounded).await.unwrap();
    adapter.insert(&undated).await.unwrap();

    let inside = adapter
        .list(RateEntryQuery::active().effective_on(end))
        .await
        .unwrap();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].name, "2024");

    let after = adapter
        .list(RateEntryQuery::active().effective_on(end + Duration::days(1)))
        .await
        .unwrap();
    assert!(after.is_empty());
});

db_test!(test_replace_active_leaves_single_active_entry, |pool| {
    let adapter = PostgresRateEntryAdapter::new(pool);
    let now = TemporalFixtures::now();
    let first = RateFixtures::flat_entry(dec!(0.10));
    let second = RateEntryBuilder::new()
        .value(dec!(0.11))
        .created_at(now + Duration::minutes(1))
        .build();
    adapter.insert(&first).await.unwrap();
    adapter.insert(&second).await.unwrap();

    let replacement = RateEntryBuilder::new()
        .value(dec!(0.20))
        .vat(dec!(10))
        .created_at(now + Duration::minutes(2))
        .build();
    adapter.replace_active(&replacement).await.unwrap();

    let active = adapter.list(RateEntryQuery::active()).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, replacement.id);
    assert_eq!(adapter.latest_active().await.unwrap().unwrap().value, dec!(0.20));
});

db_test!(test_bill_history_pagination, |pool| {
    let adapter = PostgresBillHistoryAdapter::new(pool);
    let start = TemporalFixtures::now();
    for i in 0..12 {
        let record = BillRecordBuilder::new()
            .units(dec!(10) * rust_decimal::Decimal::from(i + 1))
            .calculated_at(start + Duration::minutes(i))
            .build();
        adapter.insert(&record).await.unwrap();
    }

    let (first, total) = adapter.list_page(0, 10).await.unwrap();
    assert_eq!(total, 12);
    assert_eq!(first.len(), 10);
    assert_eq!(first[0].units_consumed, dec!(120));

    let (second, _) = adapter.list_page(10, 10).await.unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[1].units_consumed, dec!(10));

    let stored = adapter.get(first[0].id).await.unwrap();
    assert_eq!(stored, first[0]);
    assert!(stored.breakdown().is_ok());
});

db_test!(test_bill_history_by_consumer_and_month, |pool| {
    let adapter = PostgresBillHistoryAdapter::new(pool);
    let march = TemporalFixtures::march_2024();
    let april = BillingMonth::new(2024, 4).unwrap();

    let records = [
        BillRecordBuilder::new().consumer(Some("Ann"), Some("C-1")).build(),
        BillRecordBuilder::new()
            .consumer(Some("Ann"), Some("C-1"))
            .consumer_type(ConsumerType::Commercial)
            .units(dec!(50))
            .build(),
        BillRecordBuilder::new().consumer(None, Some("C-2")).month(april).build(),
    ];
    for record in &records {
        adapter.insert(record).await.unwrap();
    }

    assert_eq!(adapter.list_by_consumer("C-1").await.unwrap().len(), 2);
    assert!(adapter.list_by_consumer("C-9").await.unwrap().is_empty());

    let aggregate = adapter.monthly_aggregate(march).await.unwrap();
    assert_eq!(aggregate.len(), 2);
    assert_eq!(aggregate[0].consumer_type, ConsumerType::Residential);
    assert_eq!(aggregate[0].count, 1);
    assert_eq!(aggregate[0].total_revenue, dec!(18.80));
    assert_eq!(aggregate[1].consumer_type, ConsumerType::Commercial);
    assert_eq!(aggregate[1].total_units, dec!(50));
});

db_test!(test_admin_storage, |pool| {
    let adapter = PostgresAdminAdapter::new(pool);
    let admin = AdminFixtures::admin("operator", AdminRole::SuperAdmin);

    assert_eq!(adapter.count().await.unwrap(), 0);
    adapter.insert(&admin).await.unwrap();
    assert_eq!(adapter.count().await.unwrap(), 1);

    let mut duplicate = AdminFixtures::admin("operator", AdminRole::Admin);
    duplicate.email = "someone-else@example.com".to_string();
    assert!(adapter.insert(&duplicate).await.unwrap_err().is_conflict());

    assert!(adapter.exists("nobody", &admin.email).await.unwrap());
    assert!(!adapter.exists("nobody", "nobody@example.com").await.unwrap());

    let found = adapter.find_by_username("operator").await.unwrap().unwrap();
    assert_eq!(found, admin);

    let login = TemporalFixtures::now() + Duration::hours(1);
    adapter.record_login(admin.id, login).await.unwrap();
    assert_eq!(adapter.get(admin.id).await.unwrap().last_login, Some(login));
});

db_test!(test_concurrent_first_admin_inserts_store_one, |pool| {
    let adapter = PostgresAdminAdapter::new(pool);
    let first = AdminFixtures::admin("first", AdminRole::Admin);
    let second = AdminFixtures::admin("second", AdminRole::Admin);

    let (a, b) = tokio::join!(adapter.insert_first(&first), adapter.insert_first(&second));
    assert_ne!(a.unwrap(), b.unwrap());
    assert_eq!(adapter.count().await.unwrap(), 1);

    let third = AdminFixtures::admin("third", AdminRole::Admin);
    assert!(!adapter.insert_first(&third).await.unwrap());
});

db_test!(test_adapters_report_healthy, |pool| {
    let adapter = PostgresRateEntryAdapter::new(pool);
    let result = adapter.health_check().await;
    assert!(result.is_operational());
    assert!(result.message.is_none());
});

//! Integration test: cleaning and feature engineering chained together

use chrono::{Duration, NaiveDate, NaiveDateTime};
use delivery_eta::preprocessing::{
    train_test_split, DataCleaner, FeatureEngineer, FeatureEngineerConfig, TARGET_COLUMN,
};
use polars::prelude::*;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn lcg(state: &mut u64) -> f64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    ((*state >> 33) as f64) / (u32::MAX as f64)
}

fn raw_records(n: usize) -> DataFrame {
    let base: NaiveDateTime = NaiveDate::from_ymd_opt(2015, 3, 1)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    let mut state = 0x5eed_cafeu64;

    let mut market_id = Vec::new();
    let mut created_at = Vec::new();
    let mut delivery_time = Vec::new();
    let mut store_id = Vec::new();
    let mut category = Vec::new();
    let mut protocol = Vec::new();
    let mut total_items = Vec::new();
    let mut subtotal = Vec::new();
    let mut distinct = Vec::new();
    let mut min_price = Vec::new();
    let mut max_price = Vec::new();
    let mut onshift = Vec::new();
    let mut busy = Vec::new();
    let mut outstanding = Vec::new();
    let mut order_place = Vec::new();
    let mut driving = Vec::new();

    for i in 0..n {
        let created = base + Duration::minutes((i * 23) as i64);
        let drive = (150.0 + 1500.0 * lcg(&mut state)).round();
        let place = (90.0 + 700.0 * lcg(&mut state)).round();
        let prep = (240.0 + 2400.0 * lcg(&mut state)).round();
        let delivered = created + Duration::seconds((drive + place + prep) as i64);

        market_id.push((i % 3 + 1) as i64);
        created_at.push(created.format(TS_FORMAT).to_string());
        delivery_time.push(delivered.format(TS_FORMAT).to_string());
        store_id.push((i % 6 + 1) as i64);
        category.push(match i % 3 {
            0 => "american",
            1 => "mexican",
            _ => "indonesian",
        });
        protocol.push((i % 4 + 1) as i64);
        total_items.push((i % 6 + 1) as i64);
        subtotal.push((600.0 + 4000.0 * lcg(&mut state)).round());
        distinct.push((i % 4 + 1) as i64);
        min_price.push((120.0 + 800.0 * lcg(&mut state)).round());
        max_price.push((1000.0 + 2200.0 * lcg(&mut state)).round());
        onshift.push((3.0 + 35.0 * lcg(&mut state)).round());
        busy.push((1.0 + 28.0 * lcg(&mut state)).round());
        outstanding.push((1.0 + 40.0 * lcg(&mut state)).round());
        order_place.push(place);
        driving.push(drive);
    }

    df!(
        "market_id" => &market_id,
        "created_at" => &created_at,
        "actual_delivery_time" => &delivery_time,
        "store_id" => &store_id,
        "store_primary_category" => &category,
        "order_protocol" => &protocol,
        "total_items" => &total_items,
        "subtotal" => &subtotal,
        "num_distinct_items" => &distinct,
        "min_item_price" => &min_price,
        "max_item_price" => &max_price,
        "total_onshift_dashers" => &onshift,
        "total_busy_dashers" => &busy,
        "total_outstanding_orders" => &outstanding,
        "estimated_order_place_duration" => &order_place,
        "estimated_store_to_consumer_driving_duration" => &driving
    )
    .unwrap()
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_clean_then_engineer_produces_complete_features() {
    let cleaned = DataCleaner::new().clean(&raw_records(60)).unwrap();
    let engineered = FeatureEngineer::new().engineer(&cleaned).unwrap();

    assert!(engineered.height() > 0);
    assert!(engineered.width() >= 3);
    assert!(column_names(&engineered).contains(&TARGET_COLUMN.to_string()));

    // no nulls anywhere in the finalized feature set
    for col in engineered.get_columns() {
        assert_eq!(col.as_materialized_series().null_count(), 0);
    }
}

#[test]
fn test_blacklist_and_identifiers_absent_after_engineering() {
    let cleaned = DataCleaner::new().clean(&raw_records(60)).unwrap();
    let engineered = FeatureEngineer::new().engineer(&cleaned).unwrap();

    let names = column_names(&engineered);
    let banned = [
        "created_at",
        "actual_delivery_time",
        "store_id",
        "market_id",
        "order_protocol",
        "store_primary_category",
        "total_onshift_dashers",
        "total_busy_dashers",
        "category_indonesian",
        "estimated_non_prep_duration",
        "subtotal",
        "num_distinct_items",
        "max_item_price",
        "min_item_price",
    ];
    for name in banned {
        assert!(!names.contains(&name.to_string()), "{name} survived");
    }
}

#[test]
fn test_engineered_features_split_cleanly() {
    let cleaned = DataCleaner::new().clean(&raw_records(50)).unwrap();
    let engineered = FeatureEngineer::new().engineer(&cleaned).unwrap();

    let split = train_test_split(&engineered, TARGET_COLUMN, 0.2, 42).unwrap();
    assert_eq!(
        split.x_train.height() + split.x_test.height(),
        engineered.height()
    );
    assert_eq!(column_names(&split.x_train), column_names(&split.x_test));

    for y in split.y_train.iter().chain(split.y_test.iter()) {
        assert!(*y > 0.0);
    }
}

#[test]
fn test_engineering_is_deterministic() {
    let cleaned = DataCleaner::new().clean(&raw_records(60)).unwrap();
    let a = FeatureEngineer::new().engineer(&cleaned).unwrap();
    let b = FeatureEngineer::new().engineer(&cleaned).unwrap();

    assert_eq!(column_names(&a), column_names(&b));
    assert_eq!(a.height(), b.height());
}

#[test]
fn test_vif_threshold_is_configurable() {
    let cleaned = DataCleaner::new().clean(&raw_records(60)).unwrap();

    // a permissive threshold retains at least as many features as a
    // strict one
    let strict = FeatureEngineer::with_config(FeatureEngineerConfig {
        vif_threshold: 2.0,
        ..Default::default()
    })
    .engineer(&cleaned)
    .unwrap();
    let permissive = FeatureEngineer::with_config(FeatureEngineerConfig {
        vif_threshold: 1e9,
        ..Default::default()
    })
    .engineer(&cleaned)
    .unwrap();

    assert!(permissive.width() >= strict.width());
}

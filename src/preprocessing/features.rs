//! Feature engineering: derived ratios, categorical handling, and
//! multicollinearity pruning

use super::{
    cleaner::TARGET_COLUMN, drop_if_present, drop_incomplete_rows, f64_column, has_column,
    replace_inf_with_null, vif, OneHotEncoder,
};
use crate::error::{EtaError, Result};
use crate::utils::dataframe_to_matrix;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// Identifier, timestamp, and raw categorical columns that must never
/// reach the feature matrix.
const LEAKY_COLUMNS: [&str; 4] = ["created_at", "actual_delivery_time", "store_id", "market_id"];

/// Configuration for feature engineering
#[derive(Debug, Clone)]
pub struct FeatureEngineerConfig {
    /// Maximum tolerated variance inflation factor
    pub vif_threshold: f64,
    /// Columns dropped unconditionally before VIF filtering. These are raw
    /// ingredients of the derived ratios (plus one dataset-specific
    /// indicator column), known linear combinations of retained features.
    pub collinear_drop: Vec<String>,
}

impl Default for FeatureEngineerConfig {
    fn default() -> Self {
        Self {
            vif_threshold: 20.0,
            collinear_drop: vec![
                "total_onshift_dashers".to_string(),
                "total_busy_dashers".to_string(),
                "category_indonesian".to_string(),
                "estimated_non_prep_duration".to_string(),
                "subtotal".to_string(),
                "num_distinct_items".to_string(),
                "max_item_price".to_string(),
                "min_item_price".to_string(),
            ],
        }
    }
}

/// Derives ratio/interaction features, encodes categoricals, and prunes
/// multicollinear features with an iterative VIF loop.
///
/// Output is the finalized feature set: retained numeric features plus the
/// target column, with no incomplete rows.
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: FeatureEngineerConfig,
}

impl FeatureEngineer {
    /// Create an engineer with default configuration
    pub fn new() -> Self {
        Self::with_config(FeatureEngineerConfig::default())
    }

    /// Create an engineer with custom configuration
    pub fn with_config(config: FeatureEngineerConfig) -> Self {
        Self { config }
    }

    pub fn engineer(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = add_derived_features(df)?;
        result = impute_store_category(&result)?;

        let mut encoder = OneHotEncoder::new();
        result = encoder.fit_transform(
            &result,
            &[
                ("order_protocol", "order_protocol"),
                ("store_primary_category", "category"),
            ],
        )?;

        for col in LEAKY_COLUMNS {
            result = drop_if_present(result, col)?;
        }

        for col in &self.config.collinear_drop {
            result = drop_if_present(result, col)?;
        }

        // VIF filtering over the numeric features, target excluded.
        let feature_names: Vec<String> = result
            .get_columns()
            .iter()
            .filter(|c| c.name().as_str() != TARGET_COLUMN && is_numeric_dtype(c.dtype()))
            .map(|c| c.name().to_string())
            .collect();

        let retained = if feature_names.len() >= 2 {
            let features = result.select(feature_names.clone())?;
            let filled = fill_nulls_with_zero(&features)?;
            let matrix = dataframe_to_matrix(&filled)?;

            let (retained_idx, dropped_idx) = vif::prune_by_vif(&matrix, self.config.vif_threshold);
            for &idx in &dropped_idx {
                debug!(feature = %feature_names[idx], "dropped high-VIF feature");
            }
            info!(
                dropped = dropped_idx.len(),
                retained = retained_idx.len(),
                "VIF filtering finished"
            );

            retained_idx
                .into_iter()
                .map(|i| feature_names[i].clone())
                .collect()
        } else {
            feature_names
        };

        if !has_column(&result, TARGET_COLUMN) {
            return Err(EtaError::MissingColumn(TARGET_COLUMN.to_string()));
        }

        let mut keep = retained;
        keep.push(TARGET_COLUMN.to_string());
        let mut final_df = result.select(keep)?;
        final_df = replace_inf_with_null(&final_df)?;
        final_df = drop_incomplete_rows(&final_df)?;

        info!(
            rows = final_df.height(),
            cols = final_df.width(),
            "feature engineering finished"
        );
        Ok(final_df)
    }
}

/// Ratio and interaction features derived from the raw signals.
fn add_derived_features(df: &DataFrame) -> Result<DataFrame> {
    let busy = f64_column(df, "total_busy_dashers")?;
    let onshift = f64_column(df, "total_onshift_dashers")?;
    let max_price = f64_column(df, "max_item_price")?;
    let min_price = f64_column(df, "min_item_price")?;
    let subtotal = f64_column(df, "subtotal")?;
    let total_items = f64_column(df, "total_items")?;
    let distinct_items = f64_column(df, "num_distinct_items")?;
    let driving = f64_column(df, "estimated_store_to_consumer_driving_duration")?;
    let order_place = f64_column(df, "estimated_order_place_duration")?;

    let mut result = df.clone();
    let derived: [(&str, Float64Chunked); 5] = [
        ("busy_dashers_ratio", zip_map(&busy, &onshift, |a, b| a / b)),
        (
            "price_range_of_items",
            zip_map(&max_price, &min_price, |a, b| a - b),
        ),
        (
            "avg_price_per_item",
            zip_map(&subtotal, &total_items, |a, b| a / b),
        ),
        (
            "percent_distinct_item_of_total",
            zip_map(&distinct_items, &total_items, |a, b| a / b),
        ),
        (
            "estimated_non_prep_duration",
            zip_map(&driving, &order_place, |a, b| a + b),
        ),
    ];

    for (name, ca) in derived {
        let series = ca.with_name(name.into()).into_series();
        result = result
            .with_column(series)
            .map_err(|e| EtaError::DataError(e.to_string()))?
            .clone();
    }
    Ok(result)
}

fn zip_map(
    a: &Float64Chunked,
    b: &Float64Chunked,
    f: impl Fn(f64, f64) -> f64,
) -> Float64Chunked {
    a.into_iter()
        .zip(b.into_iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(x, y)),
            _ => None,
        })
        .collect()
}

/// Impute missing store categories with the most frequent category
/// observed for the same store. Stores with no observed category stay
/// missing. Frequency ties break lexicographically.
fn impute_store_category(df: &DataFrame) -> Result<DataFrame> {
    let store_ids = df
        .column("store_id")
        .map_err(|_| EtaError::MissingColumn("store_id".to_string()))?
        .as_materialized_series()
        .cast(&DataType::Int64)
        .map_err(|e| EtaError::DataError(e.to_string()))?;
    let store_ids = store_ids
        .i64()
        .map_err(|e| EtaError::DataError(e.to_string()))?
        .clone();
    let categories = super::str_column(df, "store_primary_category")?;

    let mut counts: HashMap<i64, HashMap<String, usize>> = HashMap::new();
    for (store, category) in store_ids.into_iter().zip(categories.into_iter()) {
        if let (Some(store), Some(category)) = (store, category) {
            *counts
                .entry(store)
                .or_default()
                .entry(category.to_string())
                .or_insert(0) += 1;
        }
    }

    let modes: HashMap<i64, String> = counts
        .into_iter()
        .map(|(store, cats)| {
            let mode = cats
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
                .map(|(cat, _)| cat)
                .unwrap_or_default();
            (store, mode)
        })
        .collect();

    let imputed: StringChunked = store_ids
        .into_iter()
        .zip(categories.into_iter())
        .map(|(store, category)| match category {
            Some(c) => Some(c.to_string()),
            None => store.and_then(|s| modes.get(&s).cloned()),
        })
        .collect();
    let imputed = imputed
        .with_name("store_primary_category".into())
        .into_series();

    let mut result = df.clone();
    result = result
        .with_column(imputed)
        .map_err(|e| EtaError::DataError(e.to_string()))?
        .clone();
    Ok(result)
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn fill_nulls_with_zero(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for col in df.get_columns() {
        let name = col.name().to_string();
        let ca = f64_column(df, &name)?;
        let filled: Float64Chunked = ca.into_iter().map(|opt| Some(opt.unwrap_or(0.0))).collect();
        let filled = filled.with_name(name.as_str().into()).into_series();
        result = result
            .with_column(filled)
            .map_err(|e| EtaError::DataError(e.to_string()))?
            .clone();
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned_frame() -> DataFrame {
        let n = 24usize;
        let mut market_id = Vec::new();
        let mut store_id = Vec::new();
        let mut category: Vec<Option<&str>> = Vec::new();
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
        let mut created = Vec::new();
        let mut delivered = Vec::new();
        let mut target = Vec::new();

        // deterministic scramble so columns are not mutually collinear
        let mut state = 0x9e3779b97f4a7c15u64;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as f64) / (u32::MAX as f64)
        };

        for i in 0..n {
            market_id.push((i % 4 + 1) as i64);
            store_id.push((i % 5 + 1) as i64);
            category.push(match i % 3 {
                0 => Some("american"),
                1 => Some("indonesian"),
                _ => None,
            });
            protocol.push((i % 3 + 1) as i64);
            total_items.push((i % 5 + 1) as i64);
            subtotal.push(500.0 + 4200.0 * next());
            distinct.push((i % 3 + 1) as i64);
            min_price.push(100.0 + 700.0 * next());
            max_price.push(900.0 + 1800.0 * next());
            onshift.push(2.0 + 40.0 * next());
            busy.push(1.0 + 30.0 * next());
            outstanding.push(1.0 + 45.0 * next());
            order_place.push(60.0 + 800.0 * next());
            driving.push(120.0 + 1600.0 * next());
            created.push("2015-02-06 22:24:17");
            delivered.push("2015-02-06 23:27:16");
            target.push(1200.0 + 3600.0 * next());
        }

        df!(
            "market_id" => &market_id,
            "created_at" => &created,
            "actual_delivery_time" => &delivered,
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
            "estimated_store_to_consumer_driving_duration" => &driving,
            TARGET_COLUMN => &target
        )
        .unwrap()
    }

    #[test]
    fn test_blacklist_never_survives() {
        let engineer = FeatureEngineer::new();
        let out = engineer.engineer(&cleaned_frame()).unwrap();

        let names: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        for banned in FeatureEngineerConfig::default().collinear_drop {
            assert!(!names.contains(&banned), "{banned} leaked into features");
        }
    }

    #[test]
    fn test_identifiers_never_survive() {
        let engineer = FeatureEngineer::new();
        let out = engineer.engineer(&cleaned_frame()).unwrap();

        let names: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        for leaky in [
            "created_at",
            "actual_delivery_time",
            "store_id",
            "market_id",
            "order_protocol",
            "store_primary_category",
        ] {
            assert!(!names.contains(&leaky.to_string()));
        }
    }

    #[test]
    fn test_retained_features_satisfy_vif_threshold() {
        let engineer = FeatureEngineer::new();
        let out = engineer.engineer(&cleaned_frame()).unwrap();

        let features = out.drop(TARGET_COLUMN).unwrap();
        if features.width() >= 2 {
            let matrix = dataframe_to_matrix(&features).unwrap();
            let vifs = vif::compute_vif(&matrix);
            assert!(vifs.iter().all(|&v| v <= 20.0), "vifs: {vifs:?}");
        }
    }

    #[test]
    fn test_target_column_preserved() {
        let engineer = FeatureEngineer::new();
        let out = engineer.engineer(&cleaned_frame()).unwrap();
        assert!(has_column(&out, TARGET_COLUMN));
        assert!(out.height() > 0);
    }

    #[test]
    fn test_custom_blacklist_column() {
        let config = FeatureEngineerConfig {
            vif_threshold: 20.0,
            collinear_drop: vec![
                "total_onshift_dashers".to_string(),
                "total_busy_dashers".to_string(),
                "category_american".to_string(),
                "estimated_non_prep_duration".to_string(),
                "subtotal".to_string(),
                "num_distinct_items".to_string(),
                "max_item_price".to_string(),
                "min_item_price".to_string(),
            ],
        };
        let engineer = FeatureEngineer::with_config(config);
        let out = engineer.engineer(&cleaned_frame()).unwrap();

        let names: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(!names.contains(&"category_american".to_string()));
    }

    #[test]
    fn test_store_category_mode_imputation() {
        let df = df!(
            "store_id" => &[1i64, 1, 1, 2],
            "store_primary_category" => &[Some("pizza"), Some("pizza"), None, None]
        )
        .unwrap();

        let out = impute_store_category(&df).unwrap();
        let cats = out
            .column("store_primary_category")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        // store 1 mode fills the gap; store 2 has no observations
        assert_eq!(cats.get(2), Some("pizza"));
        assert_eq!(cats.get(3), None);
    }

    #[test]
    fn test_derived_ratio_values() {
        let df = cleaned_frame();
        let out = add_derived_features(&df).unwrap();

        let busy = f64_column(&df, "total_busy_dashers").unwrap();
        let onshift = f64_column(&df, "total_onshift_dashers").unwrap();
        let ratio = f64_column(&out, "busy_dashers_ratio").unwrap();
        let expected = busy.get(0).unwrap() / onshift.get(0).unwrap();
        assert!((ratio.get(0).unwrap() - expected).abs() < 1e-12);

        let driving = f64_column(&df, "estimated_store_to_consumer_driving_duration").unwrap();
        let order_place = f64_column(&df, "estimated_order_place_duration").unwrap();
        let non_prep = f64_column(&out, "estimated_non_prep_duration").unwrap();
        let expected = driving.get(0).unwrap() + order_place.get(0).unwrap();
        assert!((non_prep.get(0).unwrap() - expected).abs() < 1e-12);
    }
}

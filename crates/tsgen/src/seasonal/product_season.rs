//! Temperature-driven seasonality per product category.

use crate::{
    DATE_COLUMN, GeneratorError, Result, RowSkeleton,
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use chrono::Datelike;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// How a product category reacts to temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureSensitivity {
    /// Sells more when it is warm (e.g. sportswear)
    Warm,
    /// Sells more when it is cold (e.g. winter jackets)
    Cold,
    /// Unaffected by temperature
    #[default]
    Neutral,
}

/// Normalized northern-hemisphere temperature for a month (1-based):
/// -1 in January, +1 in July.
pub fn temperature_proxy(month: u32) -> f64 {
    -(2.0 * PI * f64::from(month.saturating_sub(1)) / 12.0).cos()
}

/// Configuration for [`ProductSeasonTrend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSeasonTrendConfig {
    /// Output column name
    pub name: String,
    /// Feature holding the product category
    pub feature: String,
    /// Maximum relative swing over the year
    pub amplitude: f64,
    /// Sensitivity per category; unlisted categories are neutral
    pub sensitivities: BTreeMap<String, TemperatureSensitivity>,
}

impl Default for ProductSeasonTrendConfig {
    fn default() -> Self {
        Self {
            name: "product_season_trend".to_string(),
            feature: "product".to_string(),
            amplitude: 0.3,
            sensitivities: BTreeMap::new(),
        }
    }
}

/// Seasonal demand of temperature-sensitive product categories.
///
/// ```text
/// warm:    1 + amplitude × proxy(month)
/// cold:    1 - amplitude × proxy(month)
/// neutral: 1
/// ```
///
/// where `proxy` is [`temperature_proxy`].
#[derive(Debug, Clone)]
pub struct ProductSeasonTrend {
    config: ProductSeasonTrendConfig,
}

impl ProductSeasonTrend {
    /// Factor over the `product` feature with the default amplitude.
    pub fn new(sensitivities: BTreeMap<String, TemperatureSensitivity>) -> Self {
        Self {
            config: ProductSeasonTrendConfig {
                sensitivities,
                ..Default::default()
            },
        }
    }

    fn value(&self, sensitivity: TemperatureSensitivity, month: u32) -> f64 {
        let swing = self.config.amplitude * temperature_proxy(month);
        match sensitivity {
            TemperatureSensitivity::Warm => 1.0 + swing,
            TemperatureSensitivity::Cold => 1.0 - swing,
            TemperatureSensitivity::Neutral => 1.0,
        }
    }
}

impl Factor for ProductSeasonTrend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "Product season trend - monthly temperature sensitivity per product category"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Seasonal
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![DATE_COLUMN, self.config.feature.as_str()]
    }

    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        skeleton.frame_by_date_and_feature(
            self.name(),
            &self.config.feature,
            self.name(),
            |date, label| {
                let sensitivity = self
                    .config
                    .sensitivities
                    .get(label)
                    .copied()
                    .unwrap_or_default();
                Ok(Some(self.value(sensitivity, date.month())))
            },
        )
    }
}

impl ConfigurableFactor for ProductSeasonTrend {
    type Config = ProductSeasonTrendConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        if !config.amplitude.is_finite() || config.amplitude < 0.0 {
            return Err(GeneratorError::config(format!(
                "product season amplitude must be non-negative, got {}",
                config.amplitude
            )));
        }
        Ok(Self { config })
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateRange, FeatureSpace};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn factor() -> ProductSeasonTrend {
        let mut sensitivities = BTreeMap::new();
        sensitivities.insert("winter jacket".to_string(), TemperatureSensitivity::Cold);
        sensitivities.insert("yoga mat".to_string(), TemperatureSensitivity::Warm);
        ProductSeasonTrend::new(sensitivities)
    }

    #[test]
    fn test_temperature_proxy() {
        assert_relative_eq!(temperature_proxy(1), -1.0);
        assert_relative_eq!(temperature_proxy(7), 1.0);
        assert_relative_eq!(temperature_proxy(4), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_product_season_values() {
        let dates = DateRange::from_dates(vec![
            NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2020, 7, 15).unwrap(),
        ])
        .unwrap();
        let features = FeatureSpace::new()
            .with_feature("product", ["winter jacket", "yoga mat", "socks"])
            .unwrap();
        let skeleton = RowSkeleton::build(&dates, &features).unwrap();

        let result = factor().compute(&skeleton).unwrap();
        let values: Vec<f64> = result
            .column("product_season_trend")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        // grouped by product, then date
        assert_eq!(values.len(), 6);
        assert_relative_eq!(values[0], 1.3);
        assert_relative_eq!(values[1], 0.7);
        assert_relative_eq!(values[2], 0.7);
        assert_relative_eq!(values[3], 1.3);
        assert_relative_eq!(values[4], 1.0);
        assert_relative_eq!(values[5], 1.0);
    }

    #[test]
    fn test_product_season_requires_feature() {
        let dates = DateRange::daily(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
        )
        .unwrap();
        let skeleton = RowSkeleton::build(&dates, &FeatureSpace::new()).unwrap();

        let err = factor().compute(&skeleton).unwrap_err();
        assert!(matches!(err, GeneratorError::MissingColumn { .. }));
    }
}

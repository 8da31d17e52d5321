//! Linear trend factor.

use crate::{
    DATE_COLUMN, GeneratorError, Result, RowSkeleton,
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slope and intercept of one linear trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficients {
    /// Change per elapsed day
    pub coef: f64,
    /// Value on the first date
    pub offset: f64,
}

/// Configuration for [`LinearTrend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearTrendConfig {
    /// Output column name
    pub name: String,
    /// Global slope, used when no feature is set
    pub coef: f64,
    /// Global intercept, used when no feature is set
    pub offset: f64,
    /// Feature whose values get their own trend
    pub feature: Option<String>,
    /// Per feature value coefficients; values not listed are neutral
    pub feature_values: BTreeMap<String, LinearCoefficients>,
}

impl Default for LinearTrendConfig {
    fn default() -> Self {
        Self {
            name: "linear_trend".to_string(),
            coef: 0.0,
            offset: 1.0,
            feature: None,
            feature_values: BTreeMap::new(),
        }
    }
}

/// Linear trend over elapsed time.
///
/// ```text
/// value(t) = offset + coef × t
/// ```
///
/// where `t` is the number of calendar days since the first date of the range.
/// Either one global trend, or one trend per value of a feature.
#[derive(Debug, Clone)]
pub struct LinearTrend {
    config: LinearTrendConfig,
}

impl LinearTrend {
    /// Global trend.
    pub fn new(coef: f64, offset: f64) -> Self {
        Self {
            config: LinearTrendConfig {
                coef,
                offset,
                ..Default::default()
            },
        }
    }

    /// One trend per value of `feature`.
    pub fn per_feature(
        feature: impl Into<String>,
        feature_values: BTreeMap<String, LinearCoefficients>,
    ) -> Result<Self> {
        Self::with_config(LinearTrendConfig {
            feature: Some(feature.into()),
            feature_values,
            ..Default::default()
        })
    }

    /// Rename the output column.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    fn value(coefficients: LinearCoefficients, elapsed_days: i64) -> f64 {
        coefficients.offset + coefficients.coef * elapsed_days as f64
    }
}

impl Factor for LinearTrend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "Linear trend - offset plus slope times elapsed days"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Trend
    }

    fn required_columns(&self) -> Vec<&str> {
        match &self.config.feature {
            Some(feature) => vec![DATE_COLUMN, feature.as_str()],
            None => vec![DATE_COLUMN],
        }
    }

    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        let range = skeleton.date_range();

        match &self.config.feature {
            None => {
                let global = LinearCoefficients {
                    coef: self.config.coef,
                    offset: self.config.offset,
                };
                skeleton.frame_by_date(self.name(), |date| {
                    Ok(Self::value(global, range.elapsed_days(date)))
                })
            }
            Some(feature) => skeleton.frame_by_date_and_feature(
                self.name(),
                feature,
                self.name(),
                |date, label| {
                    Ok(self
                        .config
                        .feature_values
                        .get(label)
                        .map(|c| Self::value(*c, range.elapsed_days(date))))
                },
            ),
        }
    }
}

impl ConfigurableFactor for LinearTrend {
    type Config = LinearTrendConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        match (&config.feature, config.feature_values.is_empty()) {
            (Some(feature), true) => Err(GeneratorError::config(format!(
                "linear trend on feature '{feature}' needs coefficients for at least one value"
            ))),
            (None, false) => Err(GeneratorError::config(
                "linear trend feature_values require a feature",
            )),
            _ => Ok(Self { config }),
        }
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

    fn skeleton(days: u32) -> RowSkeleton {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = DateRange::periods(start, days, Default::default()).unwrap();
        let features = FeatureSpace::new()
            .with_feature("store", ["A", "B"])
            .unwrap();
        RowSkeleton::build(&dates, &features).unwrap()
    }

    #[test]
    fn test_linear_trend_metadata() {
        let factor = LinearTrend::new(2.0, 1.0);
        assert_eq!(factor.name(), "linear_trend");
        assert_eq!(factor.kind(), FactorKind::Trend);
        assert_eq!(factor.required_columns(), vec!["date"]);
    }

    #[test]
    fn test_linear_trend_global() {
        let factor = LinearTrend::new(2.0, 1.0);
        let result = factor.compute(&skeleton(20)).unwrap();

        assert_eq!(result.shape(), (20, 2));
        let values = result.column("linear_trend").unwrap().f64().unwrap();
        for t in 0..20 {
            assert_relative_eq!(values.get(t).unwrap(), 1.0 + 2.0 * t as f64);
        }
    }

    #[test]
    fn test_linear_trend_per_feature() {
        let mut coefficients = BTreeMap::new();
        coefficients.insert("A".to_string(), LinearCoefficients { coef: 0.5, offset: 1.0 });

        let factor = LinearTrend::per_feature("store", coefficients)
            .unwrap()
            .with_name("store_trend");
        let result = factor.compute(&skeleton(4)).unwrap();

        // store B has no coefficients and is left to the neutral default
        assert_eq!(result.shape(), (4, 3));
        let values = result.column("store_trend").unwrap().f64().unwrap();
        assert_relative_eq!(values.get(3).unwrap(), 2.5);
    }

    #[test]
    fn test_linear_trend_config_validation() {
        let err = LinearTrend::with_config(LinearTrendConfig {
            feature: Some("store".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }
}

//! Sinusoidal seasonality factor.

use crate::{
    DATE_COLUMN, GeneratorError, Result, RowSkeleton,
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Shape of one sine wave, in days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sinusoid {
    /// Period in days
    pub wavelength: f64,
    /// Peak deviation from the mean
    pub amplitude: f64,
    /// Shift in days
    pub phase: f64,
    /// Value around which the wave oscillates
    pub mean: f64,
}

impl Default for Sinusoid {
    fn default() -> Self {
        Self {
            wavelength: 365.0,
            amplitude: 1.0,
            phase: 0.0,
            mean: 1.0,
        }
    }
}

impl Sinusoid {
    /// Value after `t` elapsed days.
    pub fn at(&self, t: f64) -> f64 {
        self.amplitude * (2.0 * PI * (t + self.phase) / self.wavelength).sin() + self.mean
    }

    fn validate(&self) -> Result<()> {
        if self.wavelength.is_finite() && self.wavelength > 0.0 {
            Ok(())
        } else {
            Err(GeneratorError::config(format!(
                "sinusoid wavelength must be positive, got {}",
                self.wavelength
            )))
        }
    }
}

/// Configuration for [`SinusoidalTrend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinusoidalTrendConfig {
    /// Output column name
    pub name: String,
    /// Global wave, used when no feature is set
    pub wave: Option<Sinusoid>,
    /// Feature whose values get their own wave
    pub feature: Option<String>,
    /// Per feature value waves; values not listed are neutral
    pub feature_values: BTreeMap<String, Sinusoid>,
}

impl Default for SinusoidalTrendConfig {
    fn default() -> Self {
        Self {
            name: "sinusoidal_trend".to_string(),
            wave: Some(Sinusoid::default()),
            feature: None,
            feature_values: BTreeMap::new(),
        }
    }
}

/// Periodic pattern over elapsed days.
///
/// ```text
/// value(t) = mean + amplitude × sin(2π (t + phase) / wavelength)
/// ```
///
/// A yearly wavelength with a quarter-year phase shift peaks in winter, which
/// is how seasonal products are usually modelled.
#[derive(Debug, Clone)]
pub struct SinusoidalTrend {
    config: SinusoidalTrendConfig,
}

impl SinusoidalTrend {
    /// One wave for every row.
    pub fn new(wave: Sinusoid) -> Result<Self> {
        Self::with_config(SinusoidalTrendConfig {
            wave: Some(wave),
            ..Default::default()
        })
    }

    /// One wave per value of `feature`.
    pub fn per_feature(
        feature: impl Into<String>,
        feature_values: BTreeMap<String, Sinusoid>,
    ) -> Result<Self> {
        Self::with_config(SinusoidalTrendConfig {
            wave: None,
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
}

impl Factor for SinusoidalTrend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "Sinusoidal seasonality - sine wave over elapsed days"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Seasonal
    }

    fn required_columns(&self) -> Vec<&str> {
        match &self.config.feature {
            Some(feature) => vec![DATE_COLUMN, feature.as_str()],
            None => vec![DATE_COLUMN],
        }
    }

    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        let range = skeleton.date_range();

        match (&self.config.feature, self.config.wave) {
            (Some(feature), _) => skeleton.frame_by_date_and_feature(
                self.name(),
                feature,
                self.name(),
                |date, label| {
                    Ok(self
                        .config
                        .feature_values
                        .get(label)
                        .map(|wave| wave.at(range.elapsed_days(date) as f64)))
                },
            ),
            (None, Some(wave)) => skeleton.frame_by_date(self.name(), |date| {
                Ok(wave.at(range.elapsed_days(date) as f64))
            }),
            (None, None) => Err(GeneratorError::config(format!(
                "sinusoidal factor '{}' has neither a wave nor a feature",
                self.name()
            ))),
        }
    }
}

impl ConfigurableFactor for SinusoidalTrend {
    type Config = SinusoidalTrendConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        match (&config.feature, &config.wave) {
            (Some(_), Some(_)) | (None, None) => {
                return Err(GeneratorError::config(
                    "set either a global wave or a feature with per-value waves",
                ));
            }
            (Some(feature), None) if config.feature_values.is_empty() => {
                return Err(GeneratorError::config(format!(
                    "sinusoidal factor on feature '{feature}' needs at least one wave"
                )));
            }
            _ => {}
        }

        for wave in config.wave.iter().chain(config.feature_values.values()) {
            wave.validate()?;
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

    fn skeleton() -> RowSkeleton {
        let dates = DateRange::daily(
            NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(),
        )
        .unwrap();
        let features = FeatureSpace::new()
            .with_feature("product", ["foo", "bar", "baz"])
            .unwrap();
        RowSkeleton::build(&dates, &features).unwrap()
    }

    #[test]
    fn test_sinusoidal_global() {
        let factor = SinusoidalTrend::new(Sinusoid::default()).unwrap();
        let result = factor.compute(&skeleton()).unwrap();

        let values = result.column("sinusoidal_trend").unwrap().f64().unwrap();
        assert_eq!(values.len(), 730);
        assert_relative_eq!(values.get(0).unwrap(), 1.0);
        assert_relative_eq!(values.get(91).unwrap(), 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sinusoidal_per_feature() {
        let mut waves = BTreeMap::new();
        waves.insert("foo".to_string(), Sinusoid::default());
        waves.insert(
            "bar".to_string(),
            Sinusoid {
                phase: 365.0 / 4.0,
                ..Default::default()
            },
        );

        let factor = SinusoidalTrend::per_feature("product", waves).unwrap();
        let result = factor.compute(&skeleton()).unwrap();

        // baz has no wave
        assert_eq!(result.height(), 2 * 730);
        let values = result.column("sinusoidal_trend").unwrap().f64().unwrap();
        assert_relative_eq!(values.get(0).unwrap(), 1.0);
        assert_relative_eq!(values.get(730).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sinusoidal_rejects_bad_wavelength() {
        let err = SinusoidalTrend::new(Sinusoid {
            wavelength: 0.0,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }
}

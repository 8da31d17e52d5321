//! Gaussian noise proportional to the combined value.

use crate::{
    GeneratorError, Result, RowSkeleton,
    traits::{ConfigurableFactor, Noiser},
};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for [`WhiteNoise`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteNoiseConfig {
    /// Output column name
    pub name: String,
    /// Standard deviation relative to the combined value
    pub stdev_factor: f64,
    /// Feature whose values get their own stdev factor
    pub feature: Option<String>,
    /// Stdev factor per feature value; unlisted values use `stdev_factor`
    pub feature_stdevs: BTreeMap<String, f64>,
    /// Seed for reproducible noise
    pub seed: Option<u64>,
}

impl Default for WhiteNoiseConfig {
    fn default() -> Self {
        Self {
            name: "white_noise".to_string(),
            stdev_factor: 0.05,
            feature: None,
            feature_stdevs: BTreeMap::new(),
            seed: None,
        }
    }
}

/// Independent normal perturbation per row.
///
/// ```text
/// noise ~ Normal(0, stdev_factor × combined)
/// ```
///
/// With a seed every call to [`Noiser::apply`] replays the same draws, so
/// regenerating an unchanged table reproduces it exactly.
#[derive(Debug, Clone, Default)]
pub struct WhiteNoise {
    config: WhiteNoiseConfig,
}

impl WhiteNoise {
    /// Noise with one stdev factor for every row.
    pub fn new(stdev_factor: f64) -> Result<Self> {
        Self::with_config(WhiteNoiseConfig {
            stdev_factor,
            ..Default::default()
        })
    }

    /// Seed the generator.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Use a stdev factor per value of `feature`.
    pub fn per_feature(
        feature: impl Into<String>,
        feature_stdevs: BTreeMap<String, f64>,
    ) -> Result<Self> {
        Self::with_config(WhiteNoiseConfig {
            feature: Some(feature.into()),
            feature_stdevs,
            ..Default::default()
        })
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Stdev factor of every skeleton row.
    fn row_stdevs(&self, skeleton: &RowSkeleton) -> Result<Vec<f64>> {
        let Some(feature) = &self.config.feature else {
            return Ok(vec![self.config.stdev_factor; skeleton.height()]);
        };
        skeleton.require(self.name(), feature)?;

        let labels = skeleton.frame().column(feature)?.str()?;
        Ok(labels
            .into_iter()
            .map(|label| {
                label
                    .and_then(|l| self.config.feature_stdevs.get(l))
                    .copied()
                    .unwrap_or(self.config.stdev_factor)
            })
            .collect())
    }
}

fn check_stdev(value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GeneratorError::config(format!(
            "noise stdev factor must be non-negative, got {value}"
        )))
    }
}

impl Noiser for WhiteNoise {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn required_columns(&self) -> Vec<&str> {
        self.config.feature.iter().map(String::as_str).collect()
    }

    fn apply(&self, skeleton: &RowSkeleton, combined: &Float64Chunked) -> Result<Vec<f64>> {
        if combined.len() != skeleton.height() {
            return Err(GeneratorError::Computation(format!(
                "noise over {} values for {} rows",
                combined.len(),
                skeleton.height()
            )));
        }

        let stdevs = self.row_stdevs(skeleton)?;
        let mut rng = self.rng();
        Ok(combined
            .into_iter()
            .zip(stdevs)
            .map(|(value, stdev)| {
                let z: f64 = rng.sample(StandardNormal);
                z * stdev * value.unwrap_or(0.0)
            })
            .collect())
    }
}

impl ConfigurableFactor for WhiteNoise {
    type Config = WhiteNoiseConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        check_stdev(config.stdev_factor)?;
        for stdev in config.feature_stdevs.values() {
            check_stdev(*stdev)?;
        }
        if config.feature.is_none() && !config.feature_stdevs.is_empty() {
            return Err(GeneratorError::config(
                "per-value noise needs a feature to key on",
            ));
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

    fn skeleton(days: u32) -> RowSkeleton {
        let dates = DateRange::periods(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            days,
            crate::Frequency::Daily,
        )
        .unwrap();
        let features = FeatureSpace::new()
            .with_feature("store", ["A", "B"])
            .unwrap();
        RowSkeleton::build(&dates, &features).unwrap()
    }

    fn combined(height: usize, value: f64) -> Float64Chunked {
        Float64Chunked::from_vec("combined".into(), vec![value; height])
    }

    #[test]
    fn test_seeded_noise_reproducible() {
        let skeleton = skeleton(50);
        let values = combined(skeleton.height(), 10.0);
        let noise = WhiteNoise::new(0.1).unwrap().with_seed(42);

        let first = noise.apply(&skeleton, &values).unwrap();
        let second = noise.apply(&skeleton, &values).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 100);
    }

    #[test]
    fn test_noise_scales_with_combined() {
        let skeleton = skeleton(2500);
        let values = combined(skeleton.height(), 100.0);
        let noise = WhiteNoise::new(0.05).unwrap().with_seed(1);

        let draws = noise.apply(&skeleton, &values).unwrap();
        let n = draws.len() as f64;
        let mean = draws.iter().sum::<f64>() / n;
        let sd = (draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n).sqrt();

        assert!(mean.abs() < 0.5);
        assert_relative_eq!(sd, 5.0, max_relative = 0.05);
    }

    #[test]
    fn test_per_feature_stdev() {
        let skeleton = skeleton(10);
        let mut stdevs = BTreeMap::new();
        stdevs.insert("A".to_string(), 0.0);
        stdevs.insert("B".to_string(), 0.2);
        let noise = WhiteNoise::per_feature("store", stdevs).unwrap().with_seed(3);

        let draws = noise.apply(&skeleton, &combined(skeleton.height(), 5.0)).unwrap();
        // rows alternate A, B
        assert!(draws.iter().step_by(2).all(|d| *d == 0.0));
        assert!(draws.iter().skip(1).step_by(2).any(|d| *d != 0.0));
    }

    #[test]
    fn test_invalid_noise_config() {
        let err = WhiteNoise::new(-0.1).unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));

        let mut stdevs = BTreeMap::new();
        stdevs.insert("A".to_string(), 0.1);
        let err = WhiteNoise::with_config(WhiteNoiseConfig {
            feature_stdevs: stdevs,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_missing_feature_column() {
        let noise = WhiteNoise::per_feature("region", BTreeMap::new()).unwrap();
        let err = noise
            .apply(&skeleton(3), &combined(6, 1.0))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::MissingColumn { .. }));
    }
}

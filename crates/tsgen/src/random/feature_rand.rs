//! Stable random multiplier per feature combination.

use crate::{
    GeneratorError, Result, RowSkeleton,
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Configuration for [`FeatureRandFactor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRandFactorConfig {
    /// Output column name
    pub name: String,
    /// Features whose combinations each get one draw
    pub features: Vec<String>,
    /// Lower bound of the uniform draw
    pub min: f64,
    /// Upper bound of the uniform draw
    pub max: f64,
    /// Seed for reproducible draws
    pub seed: Option<u64>,
}

impl Default for FeatureRandFactorConfig {
    fn default() -> Self {
        Self {
            name: "feature_rand_factor".to_string(),
            features: Vec::new(),
            min: 1.0,
            max: 10.0,
            seed: None,
        }
    }
}

#[derive(Debug)]
struct DrawState {
    rng: StdRng,
    draws: HashMap<Vec<String>, f64>,
}

/// Uniform random multiplier in `[min, max]`, drawn once per combination of
/// the configured features and reused for every date.
///
/// Draws are made lazily on first sight of a combination and cached for the
/// lifetime of the factor, so regenerating never changes them.
#[derive(Debug)]
pub struct FeatureRandFactor {
    config: FeatureRandFactorConfig,
    state: Mutex<DrawState>,
}

impl FeatureRandFactor {
    /// Draws per value of one feature in the default range.
    pub fn new(feature: impl Into<String>) -> Result<Self> {
        Self::with_config(FeatureRandFactorConfig {
            features: vec![feature.into()],
            ..Default::default()
        })
    }

    /// Draws per combination of several features within `[min, max]`.
    pub fn over<I, S>(features: I, min: f64, max: f64, seed: Option<u64>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(FeatureRandFactorConfig {
            features: features.into_iter().map(Into::into).collect(),
            min,
            max,
            seed,
            ..Default::default()
        })
    }

    /// Cached draws so far, keyed by combination joined with `/`.
    pub fn draws(&self) -> Result<BTreeMap<String, f64>> {
        let state = self.lock()?;
        Ok(state
            .draws
            .iter()
            .map(|(combo, value)| (combo.join("/"), *value))
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, DrawState>> {
        self.state.lock().map_err(|_| {
            GeneratorError::Computation(format!("{}: draw cache poisoned", self.name()))
        })
    }
}

impl Factor for FeatureRandFactor {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "Feature random factor - stable uniform draw per feature combination"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Random
    }

    fn required_columns(&self) -> Vec<&str> {
        self.config.features.iter().map(String::as_str).collect()
    }

    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        let features = self.required_columns();
        let (min, max) = (self.config.min, self.config.max);
        let mut state = self.lock()?;
        let DrawState { rng, draws } = &mut *state;

        skeleton.frame_by_features(self.name(), &features, self.name(), |combo| {
            let key: Vec<String> = combo.iter().map(|s| (*s).to_string()).collect();
            let value = *draws.entry(key).or_insert_with(|| rng.gen_range(min..=max));
            Ok(Some(value))
        })
    }
}

impl ConfigurableFactor for FeatureRandFactor {
    type Config = FeatureRandFactorConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        if config.features.is_empty() {
            return Err(GeneratorError::config(format!(
                "random factor '{}' needs at least one feature",
                config.name
            )));
        }
        if !(config.min.is_finite() && config.max.is_finite()) || config.min > config.max {
            return Err(GeneratorError::config(format!(
                "random factor range [{}, {}] is invalid",
                config.min, config.max
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            state: Mutex::new(DrawState {
                rng,
                draws: HashMap::new(),
            }),
        })
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateRange, FeatureSpace};
    use chrono::NaiveDate;

    fn skeleton() -> RowSkeleton {
        let dates = DateRange::daily(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
        .unwrap();
        let features = FeatureSpace::new()
            .with_feature("store", ["A", "B", "C"])
            .unwrap()
            .with_feature("product", ["jacket", "mat"])
            .unwrap();
        RowSkeleton::build(&dates, &features).unwrap()
    }

    fn values(frame: &DataFrame) -> Vec<f64> {
        frame
            .column("feature_rand_factor")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_one_draw_per_combination() {
        let factor = FeatureRandFactor::over(["store", "product"], 2.0, 3.0, None).unwrap();
        let result = factor.compute(&skeleton()).unwrap();

        // keyed on features only, the generator broadcasts over dates
        assert_eq!(result.height(), 6);
        assert!(values(&result).iter().all(|v| (2.0..=3.0).contains(v)));
        assert_eq!(factor.draws().unwrap().len(), 6);
        assert!(factor.draws().unwrap().contains_key("B/mat"));
    }

    #[test]
    fn test_draws_are_stable() {
        let factor = FeatureRandFactor::new("store").unwrap();
        let first = values(&factor.compute(&skeleton()).unwrap());
        let second = values(&factor.compute(&skeleton()).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_draws_reproducible() {
        let a = FeatureRandFactor::over(["store"], 1.0, 10.0, Some(7)).unwrap();
        let b = FeatureRandFactor::over(["store"], 1.0, 10.0, Some(7)).unwrap();
        assert_eq!(
            values(&a.compute(&skeleton()).unwrap()),
            values(&b.compute(&skeleton()).unwrap())
        );
    }

    #[test]
    fn test_invalid_config() {
        let err = FeatureRandFactor::over(["store"], 5.0, 1.0, None).unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));

        let err = FeatureRandFactor::over(Vec::<String>::new(), 1.0, 2.0, None).unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_missing_feature_column() {
        let factor = FeatureRandFactor::new("region").unwrap();
        let err = factor.compute(&skeleton()).unwrap_err();
        assert!(matches!(err, GeneratorError::MissingColumn { .. }));
    }
}

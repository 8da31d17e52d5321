//! Euro-area economic activity from the industrial production index.

use crate::{
    DATE_COLUMN, GeneratorError, Result, RowSkeleton,
    reference::{MissingReference, industry::industry_index},
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for [`EuEcoTrend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EuEcoTrendConfig {
    /// Output column name
    pub name: String,
    /// Multiplier on the normalized index
    pub intensity_scale: f64,
    /// Feature holding the country, when only some countries are affected
    pub country_feature: Option<String>,
    /// Affected countries; empty means all
    pub countries: Vec<String>,
    /// Policy for months without data
    pub on_missing: MissingReference,
}

impl Default for EuEcoTrendConfig {
    fn default() -> Self {
        Self {
            name: "eu_eco_trend".to_string(),
            intensity_scale: 1.0,
            country_feature: None,
            countries: Vec::new(),
            on_missing: MissingReference::default(),
        }
    }
}

/// Monthly euro-area industrial production, normalized to 2015.
///
/// ```text
/// value(date) = index(year, month) / 100 × intensity_scale
/// ```
///
/// With a country feature the value applies to the listed countries only;
/// other countries stay neutral.
#[derive(Debug, Clone, Default)]
pub struct EuEcoTrend {
    config: EuEcoTrendConfig,
}

impl EuEcoTrend {
    /// Index scaled by `intensity_scale` for every row.
    pub fn new(intensity_scale: f64) -> Result<Self> {
        Self::with_config(EuEcoTrendConfig {
            intensity_scale,
            ..Default::default()
        })
    }

    /// Restrict the effect to some countries.
    pub fn for_countries<I, S>(mut self, country_feature: impl Into<String>, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.country_feature = Some(country_feature.into());
        self.config.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    /// Set the policy for months without data.
    pub const fn with_missing_policy(mut self, policy: MissingReference) -> Self {
        self.config.on_missing = policy;
        self
    }

    fn applies_to(&self, country: &str) -> bool {
        self.config.countries.is_empty()
            || self
                .config
                .countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(country))
    }

    /// Scaled index per `(year, month)` touched by the skeleton.
    fn monthly_values(&self, skeleton: &RowSkeleton) -> Result<HashMap<(i32, u32), f64>> {
        let mut values = HashMap::new();
        for date in skeleton.date_range().dates() {
            let key = (date.year(), date.month());
            if values.contains_key(&key) {
                continue;
            }
            let scaled =
                industry_index(key.0, key.1).map(|i| i / 100.0 * self.config.intensity_scale);
            let value = self.config.on_missing.resolve(self.name(), scaled, || {
                format!("EU industry index for {}-{:02}", key.0, key.1)
            })?;
            values.insert(key, value);
        }
        Ok(values)
    }
}

impl Factor for EuEcoTrend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "EU economic trend - monthly industrial production index"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::External
    }

    fn required_columns(&self) -> Vec<&str> {
        match &self.config.country_feature {
            Some(feature) => vec![DATE_COLUMN, feature.as_str()],
            None => vec![DATE_COLUMN],
        }
    }

    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        if let Some(feature) = &self.config.country_feature {
            skeleton.require(self.name(), feature)?;
        }
        let monthly = self.monthly_values(skeleton)?;
        let lookup = |date: NaiveDate| {
            monthly.get(&(date.year(), date.month())).copied().unwrap_or(1.0)
        };

        match &self.config.country_feature {
            Some(feature) => skeleton.frame_by_date_and_feature(
                self.name(),
                feature,
                self.name(),
                |date, country| Ok(self.applies_to(country).then(|| lookup(date))),
            ),
            None => skeleton.frame_by_date(self.name(), |date| Ok(lookup(date))),
        }
    }
}

impl ConfigurableFactor for EuEcoTrend {
    type Config = EuEcoTrendConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        if !config.intensity_scale.is_finite() {
            return Err(GeneratorError::config(format!(
                "intensity scale must be finite, got {}",
                config.intensity_scale
            )));
        }
        if config.country_feature.is_none() && !config.countries.is_empty() {
            return Err(GeneratorError::config(
                "EU economic trend lists countries but no country feature",
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

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_eu_eco_global() {
        let dates = DateRange::daily(ymd(2018, 1, 30), ymd(2018, 2, 1)).unwrap();
        let skeleton = RowSkeleton::build(&dates, &FeatureSpace::new()).unwrap();

        let result = EuEcoTrend::new(2.0).unwrap().compute(&skeleton).unwrap();
        let values = result.column("eu_eco_trend").unwrap().f64().unwrap();

        assert_relative_eq!(values.get(0).unwrap(), 105.9 / 100.0 * 2.0);
        assert_relative_eq!(values.get(1).unwrap(), 105.9 / 100.0 * 2.0);
        assert_relative_eq!(values.get(2).unwrap(), 103.1 / 100.0 * 2.0);
    }

    #[test]
    fn test_eu_eco_selected_countries() {
        let dates = DateRange::daily(ymd(2018, 1, 1), ymd(2018, 1, 3)).unwrap();
        let features = FeatureSpace::new()
            .with_feature("country", ["Italy", "United States"])
            .unwrap();
        let skeleton = RowSkeleton::build(&dates, &features).unwrap();

        let factor = EuEcoTrend::default().for_countries("country", ["italy"]);
        let result = factor.compute(&skeleton).unwrap();

        // only Italy is covered, the US rows are filled in later as neutral
        assert_eq!(result.height(), 3);
        let countries = result.column("country").unwrap().str().unwrap();
        assert!(countries.into_iter().all(|c| c == Some("Italy")));
    }

    #[test]
    fn test_eu_eco_missing_month() {
        let dates = DateRange::daily(ymd(2020, 10, 31), ymd(2020, 11, 1)).unwrap();
        let skeleton = RowSkeleton::build(&dates, &FeatureSpace::new()).unwrap();

        let result = EuEcoTrend::default().compute(&skeleton).unwrap();
        let values = result.column("eu_eco_trend").unwrap().f64().unwrap();
        assert_relative_eq!(values.get(0).unwrap(), 107.3 / 100.0);
        assert_relative_eq!(values.get(1).unwrap(), 1.0);

        let err = EuEcoTrend::default()
            .with_missing_policy(MissingReference::Fail)
            .compute(&skeleton)
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Lookup { .. }));
    }

    #[test]
    fn test_eu_eco_countries_without_feature() {
        let err = EuEcoTrend::with_config(EuEcoTrendConfig {
            countries: vec!["Italy".to_string()],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }
}

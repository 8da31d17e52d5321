//! Country-level yearly scale from GDP per capita.

use crate::{
    DATE_COLUMN, GeneratorError, Result, RowSkeleton,
    reference::{MissingReference, gdp::gdp_per_capita},
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use chrono::Datelike;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for [`CountryYearlyTrend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryYearlyTrendConfig {
    /// Output column name
    pub name: String,
    /// Feature holding the country name
    pub country_feature: String,
    /// Country whose GDP per capita is the unit scale
    pub base_country: String,
    /// Year of the unit scale
    pub base_year: i32,
    /// Policy for countries or years without data
    pub on_missing: MissingReference,
}

impl Default for CountryYearlyTrendConfig {
    fn default() -> Self {
        Self {
            name: "country_yearly_trend".to_string(),
            country_feature: "country".to_string(),
            base_country: "Netherlands".to_string(),
            base_year: 2015,
            on_missing: MissingReference::default(),
        }
    }
}

/// GDP per capita of the row's country and year, relative to a base country
/// and year.
///
/// ```text
/// value(country, year) = gdp(country, year) / gdp(base_country, base_year)
/// ```
///
/// The same value is broadcast over every date of that year.
#[derive(Debug, Clone, Default)]
pub struct CountryYearlyTrend {
    config: CountryYearlyTrendConfig,
}

impl CountryYearlyTrend {
    /// Scale relative to the Netherlands in 2015.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale relative to another base country and year.
    pub fn with_base(country: impl Into<String>, year: i32) -> Result<Self> {
        Self::with_config(CountryYearlyTrendConfig {
            base_country: country.into(),
            base_year: year,
            ..Default::default()
        })
    }

    /// Set the policy for missing data.
    pub const fn with_missing_policy(mut self, policy: MissingReference) -> Self {
        self.config.on_missing = policy;
        self
    }

    /// GDP per capita used as the unit scale.
    pub fn base(&self) -> Result<f64> {
        base_gdp(&self.config)
    }
}

fn base_gdp(config: &CountryYearlyTrendConfig) -> Result<f64> {
    gdp_per_capita(&config.base_country, config.base_year)
        .filter(|gdp| *gdp > 0.0)
        .ok_or_else(|| GeneratorError::Lookup {
            factor: config.name.clone(),
            key: format!(
                "GDP per capita of base '{}' in {}",
                config.base_country, config.base_year
            ),
        })
}

impl Factor for CountryYearlyTrend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "Country yearly trend - GDP per capita relative to a base country and year"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::External
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![DATE_COLUMN, self.config.country_feature.as_str()]
    }

    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        skeleton.require(self.name(), &self.config.country_feature)?;
        let countries = skeleton
            .features()
            .values(&self.config.country_feature)
            .unwrap_or_default();

        let base = self.base()?;
        let mut scale: HashMap<(&str, i32), f64> = HashMap::new();
        for country in countries {
            for year in skeleton.date_range().years() {
                let relative = gdp_per_capita(country, year).map(|gdp| gdp / base);
                let value = self.config.on_missing.resolve(self.name(), relative, || {
                    format!("GDP per capita of '{country}' in {year}")
                })?;
                scale.insert((country.as_str(), year), value);
            }
        }

        skeleton.frame_by_date_and_feature(
            self.name(),
            &self.config.country_feature,
            self.name(),
            |date, country| Ok(scale.get(&(country, date.year())).copied()),
        )
    }
}

impl ConfigurableFactor for CountryYearlyTrend {
    type Config = CountryYearlyTrendConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        base_gdp(&config)?;
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

    fn skeleton(countries: &[&str]) -> RowSkeleton {
        let dates = DateRange::daily(
            NaiveDate::from_ymd_opt(2015, 12, 30).unwrap(),
            NaiveDate::from_ymd_opt(2016, 1, 2).unwrap(),
        )
        .unwrap();
        let features = FeatureSpace::new()
            .with_feature("country", countries.iter().copied())
            .unwrap();
        RowSkeleton::build(&dates, &features).unwrap()
    }

    #[test]
    fn test_default_base() {
        assert_relative_eq!(CountryYearlyTrend::new().base().unwrap(), 45193.0);
        let built = CountryYearlyTrend::with_base("Italy", 2016).unwrap();
        assert_relative_eq!(built.base().unwrap(), gdp_per_capita("Italy", 2016).unwrap());
    }

    #[test]
    fn test_country_yearly_values() {
        let result = CountryYearlyTrend::new()
            .compute(&skeleton(&["Netherlands", "Romania"]))
            .unwrap();
        let values = result.column("country_yearly_trend").unwrap().f64().unwrap();

        assert_eq!(values.len(), 8);
        // Netherlands 2015 is the unit
        assert_relative_eq!(values.get(0).unwrap(), 1.0);
        assert_relative_eq!(values.get(1).unwrap(), 1.0);
        assert_relative_eq!(values.get(2).unwrap(), 46039.0 / 45193.0);
        assert_relative_eq!(values.get(4).unwrap(), 8969.0 / 45193.0);
        assert_relative_eq!(values.get(7).unwrap(), 9548.0 / 45193.0);
    }

    #[test]
    fn test_country_yearly_missing_country() {
        let result = CountryYearlyTrend::new()
            .compute(&skeleton(&["Atlantis"]))
            .unwrap();
        let values = result.column("country_yearly_trend").unwrap().f64().unwrap();
        assert!(values.into_iter().all(|v| v == Some(1.0)));

        let err = CountryYearlyTrend::new()
            .with_missing_policy(MissingReference::Fail)
            .compute(&skeleton(&["Atlantis"]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Lookup { .. }));
    }

    #[test]
    fn test_country_yearly_unknown_base() {
        let err = CountryYearlyTrend::with_base("Atlantis", 2015).unwrap_err();
        assert!(matches!(err, GeneratorError::Lookup { .. }));
    }

    #[test]
    fn test_country_yearly_requires_country() {
        let dates = DateRange::daily(
            NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2016, 1, 2).unwrap(),
        )
        .unwrap();
        let skeleton = RowSkeleton::build(&dates, &FeatureSpace::new()).unwrap();
        let err = CountryYearlyTrend::new().compute(&skeleton).unwrap_err();
        assert!(matches!(err, GeneratorError::MissingColumn { .. }));
    }
}

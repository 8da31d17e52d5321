//! Serializable generator configuration.
//!
//! A [`GeneratorConfig`] describes a complete generator in JSON:
//!
//! ```json
//! {
//!   "start": "2020-01-01",
//!   "end": "2020-12-31",
//!   "features": [{ "name": "store", "values": ["A", "B"] }],
//!   "base_value": 100.0,
//!   "factors": [{ "type": "weekend_trend", "weekend_factor": 1.5 }],
//!   "noise": { "type": "white_noise", "stdev_factor": 0.05, "seed": 7 }
//! }
//! ```

use crate::{
    DateRange, Factor, FeatureSpace, Frequency, Noiser, Result,
    calendar::{
        BlackFridaySale, BlackFridaySaleConfig, DayFactor, GaussianSmoothing, HolidayTrend,
        HolidayTrendConfig, WeekendTrend, WeekendTrendConfig,
    },
    external::{CountryYearlyTrend, CountryYearlyTrendConfig, EuEcoTrend, EuEcoTrendConfig},
    noise::{WhiteNoise, WhiteNoiseConfig},
    random::{FeatureRandFactor, FeatureRandFactorConfig},
    seasonal::{
        ProductSeasonTrend, ProductSeasonTrendConfig, SinusoidalTrend, SinusoidalTrendConfig,
        TemperatureSensitivity,
    },
    traits::ConfigurableFactor,
    trend::{LinearTrend, LinearTrendConfig},
};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// One factor of a configuration, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FactorSpec {
    /// [`LinearTrend`]
    LinearTrend(LinearTrendConfig),
    /// [`SinusoidalTrend`]
    SinusoidalTrend(SinusoidalTrendConfig),
    /// [`ProductSeasonTrend`]
    ProductSeasonTrend(ProductSeasonTrendConfig),
    /// [`WeekendTrend`]
    WeekendTrend(WeekendTrendConfig),
    /// [`HolidayTrend`]
    HolidayTrend(HolidayTrendConfig),
    /// [`BlackFridaySale`]
    BlackFridaySale(BlackFridaySaleConfig),
    /// [`CountryYearlyTrend`]
    CountryYearlyTrend(CountryYearlyTrendConfig),
    /// [`EuEcoTrend`]
    EuEcoTrend(EuEcoTrendConfig),
    /// [`FeatureRandFactor`]
    FeatureRandFactor(FeatureRandFactorConfig),
}

impl FactorSpec {
    /// Validate the configuration and build the factor.
    pub fn build(&self) -> Result<Arc<dyn Factor>> {
        Ok(match self {
            Self::LinearTrend(c) => Arc::new(LinearTrend::with_config(c.clone())?),
            Self::SinusoidalTrend(c) => Arc::new(SinusoidalTrend::with_config(c.clone())?),
            Self::ProductSeasonTrend(c) => Arc::new(ProductSeasonTrend::with_config(c.clone())?),
            Self::WeekendTrend(c) => Arc::new(WeekendTrend::with_config(c.clone())?),
            Self::HolidayTrend(c) => Arc::new(HolidayTrend::with_config(c.clone())?),
            Self::BlackFridaySale(c) => Arc::new(BlackFridaySale::with_config(c.clone())?),
            Self::CountryYearlyTrend(c) => Arc::new(CountryYearlyTrend::with_config(c.clone())?),
            Self::EuEcoTrend(c) => Arc::new(EuEcoTrend::with_config(c.clone())?),
            Self::FeatureRandFactor(c) => Arc::new(FeatureRandFactor::with_config(c.clone())?),
        })
    }
}

/// Noise of a configuration, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoiseSpec {
    /// [`WhiteNoise`]
    WhiteNoise(WhiteNoiseConfig),
}

impl NoiseSpec {
    /// Validate the configuration and build the noiser.
    pub fn build(&self) -> Result<Arc<dyn Noiser>> {
        Ok(match self {
            Self::WhiteNoise(c) => Arc::new(WhiteNoise::with_config(c.clone())?),
        })
    }
}

const fn default_base_value() -> f64 {
    1.0
}

/// Complete description of a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// First date
    pub start: NaiveDate,
    /// Last date, inclusive
    pub end: NaiveDate,
    /// Date spacing
    #[serde(default)]
    pub frequency: Frequency,
    /// Features in declaration order
    #[serde(default)]
    pub features: FeatureSpace,
    /// Scalar every row starts from
    #[serde(default = "default_base_value")]
    pub base_value: f64,
    /// Factors
    #[serde(default)]
    pub factors: Vec<FactorSpec>,
    /// Optional noise
    #[serde(default)]
    pub noise: Option<NoiseSpec>,
}

impl GeneratorConfig {
    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The configured date axis.
    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::new(self.start, self.end, self.frequency)
    }

    /// The configured feature space, validated.
    pub fn feature_space(&self) -> Result<FeatureSpace> {
        self.features.validate()?;
        Ok(self.features.clone())
    }

    /// Build every configured factor.
    pub fn build_factors(&self) -> Result<Vec<Arc<dyn Factor>>> {
        self.factors.iter().map(FactorSpec::build).collect()
    }

    /// Build the configured noiser, if any.
    pub fn build_noiser(&self) -> Result<Option<Arc<dyn Noiser>>> {
        self.noise.as_ref().map(NoiseSpec::build).transpose()
    }

    /// Daily sales of three product categories in two stores per country,
    /// 2019 and 2020, around a base of 1000.
    pub fn store_sales_demo() -> Self {
        let features = [
            ("country", vec!["Netherlands", "Italy", "Romania"]),
            ("store", vec!["store_1", "store_2"]),
            ("product", vec!["winter jacket", "yoga mat", "socks"]),
        ];
        let features = FeatureSpace::from(
            features
                .into_iter()
                .map(|(name, values)| crate::Feature {
                    name: name.to_string(),
                    values: values.into_iter().map(String::from).collect(),
                })
                .collect::<Vec<_>>(),
        );

        let sensitivities = BTreeMap::from([
            ("winter jacket".to_string(), TemperatureSensitivity::Cold),
            ("yoga mat".to_string(), TemperatureSensitivity::Warm),
        ]);

        Self {
            start: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap_or_default(),
            frequency: Frequency::Daily,
            features,
            base_value: 1000.0,
            factors: vec![
                FactorSpec::LinearTrend(LinearTrendConfig {
                    coef: 0.0005,
                    ..Default::default()
                }),
                FactorSpec::CountryYearlyTrend(CountryYearlyTrendConfig::default()),
                FactorSpec::EuEcoTrend(EuEcoTrendConfig {
                    country_feature: Some("country".to_string()),
                    countries: vec!["Netherlands".to_string(), "Italy".to_string()],
                    ..Default::default()
                }),
                FactorSpec::HolidayTrend(HolidayTrendConfig {
                    holiday_factor: 1.5,
                    smoothing: Some(GaussianSmoothing::default()),
                    ..Default::default()
                }),
                FactorSpec::WeekendTrend(WeekendTrendConfig {
                    day_factors: vec![DayFactor {
                        day: Weekday::Fri,
                        factor: 1.15,
                    }],
                    ..Default::default()
                }),
                FactorSpec::BlackFridaySale(BlackFridaySaleConfig::default()),
                FactorSpec::ProductSeasonTrend(ProductSeasonTrendConfig {
                    sensitivities,
                    ..Default::default()
                }),
                FactorSpec::FeatureRandFactor(FeatureRandFactorConfig {
                    features: vec!["store".to_string()],
                    min: 1.0,
                    max: 3.0,
                    seed: Some(42),
                    ..Default::default()
                }),
            ],
            noise: Some(NoiseSpec::WhiteNoise(WhiteNoiseConfig {
                seed: Some(42),
                ..Default::default()
            })),
        }
    }
}

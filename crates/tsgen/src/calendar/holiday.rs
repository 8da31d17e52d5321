//! Public holiday peaks per country.

use crate::{
    DATE_COLUMN, GeneratorError, Result, RowSkeleton,
    reference::{Country, MissingReference},
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Trailing Gaussian-weighted moving average.
///
/// Each value is replaced by the weighted mean of itself and the `window - 1`
/// preceding values, with weights from a Gaussian window of standard
/// deviation `std`. At the start of a series only the available values count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianSmoothing {
    /// Window length in days
    pub window: usize,
    /// Standard deviation of the window, in days
    pub std: f64,
}

impl Default for GaussianSmoothing {
    fn default() -> Self {
        Self {
            window: 10,
            std: 2.0,
        }
    }
}

impl GaussianSmoothing {
    fn weights(&self) -> Vec<f64> {
        let center = (self.window as f64 - 1.0) / 2.0;
        (0..self.window)
            .map(|n| (-0.5 * ((n as f64 - center) / self.std).powi(2)).exp())
            .collect()
    }

    /// Smooth a series.
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        let weights = self.weights();
        (0..values.len())
            .map(|i| {
                let (mut sum, mut total) = (0.0, 0.0);
                for (k, w) in weights.iter().enumerate() {
                    if let Some(j) = (i + k + 1).checked_sub(self.window) {
                        sum += w * values[j];
                        total += w;
                    }
                }
                sum / total
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.window == 0 || !self.std.is_finite() || self.std <= 0.0 {
            return Err(GeneratorError::config(format!(
                "smoothing needs a positive window and std, got {} and {}",
                self.window, self.std
            )));
        }
        Ok(())
    }
}

/// Configuration for [`HolidayTrend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayTrendConfig {
    /// Output column name
    pub name: String,
    /// Feature holding the country name
    pub country_feature: String,
    /// Multiplier on every public holiday
    pub holiday_factor: f64,
    /// Multipliers for specific holidays, by holiday name
    pub special_holiday_factors: BTreeMap<String, f64>,
    /// Optional smoothing of the daily series
    pub smoothing: Option<GaussianSmoothing>,
    /// Policy for countries without a calendar
    pub on_missing: MissingReference,
}

impl Default for HolidayTrendConfig {
    fn default() -> Self {
        Self {
            name: "holiday_trend".to_string(),
            country_feature: "country".to_string(),
            holiday_factor: 3.0,
            special_holiday_factors: BTreeMap::new(),
            smoothing: None,
            on_missing: MissingReference::default(),
        }
    }
}

/// Elevated value on the public holidays of each row's country.
///
/// Calendars come from [`Country`]. Countries without a calendar follow the
/// configured [`MissingReference`] policy.
#[derive(Debug, Clone, Default)]
pub struct HolidayTrend {
    config: HolidayTrendConfig,
}

impl HolidayTrend {
    /// Holiday peaks with the given multiplier.
    pub fn new(holiday_factor: f64) -> Self {
        Self {
            config: HolidayTrendConfig {
                holiday_factor,
                ..Default::default()
            },
        }
    }

    /// Use a different multiplier for one named holiday.
    pub fn with_special(mut self, holiday: impl Into<String>, factor: f64) -> Self {
        self.config.special_holiday_factors.insert(holiday.into(), factor);
        self
    }

    /// Smooth the daily series.
    pub const fn with_smoothing(mut self, smoothing: GaussianSmoothing) -> Self {
        self.config.smoothing = Some(smoothing);
        self
    }

    /// Set the policy for unknown countries.
    pub const fn with_missing_policy(mut self, policy: MissingReference) -> Self {
        self.config.on_missing = policy;
        self
    }

    /// Daily values of one country over whole calendar years.
    fn country_series(
        &self,
        country: Country,
        years: impl Iterator<Item = i32>,
    ) -> HashMap<NaiveDate, f64> {
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for year in years {
            let holidays: HashMap<NaiveDate, &str> = country
                .holidays(year)
                .into_iter()
                .map(|h| (h.date, h.name))
                .collect();

            let Some(first) = NaiveDate::from_yo_opt(year, 1) else {
                continue;
            };
            for date in first.iter_days().take_while(|d| d.year() == year) {
                let value = match holidays.get(&date) {
                    Some(name) => self
                        .config
                        .special_holiday_factors
                        .get(*name)
                        .copied()
                        .unwrap_or(self.config.holiday_factor),
                    None => 1.0,
                };
                dates.push(date);
                values.push(value);
            }
        }

        if let Some(smoothing) = &self.config.smoothing {
            values = smoothing.apply(&values);
        }
        dates.into_iter().zip(values).collect()
    }
}

impl Factor for HolidayTrend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "Holiday trend - elevated values on public holidays of the row's country"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Calendar
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

        let mut series: HashMap<&str, HashMap<NaiveDate, f64>> = HashMap::new();
        let mut fallback: HashMap<&str, f64> = HashMap::new();
        for label in countries {
            match Country::from_name(label) {
                Some(country) => {
                    let years = skeleton.date_range().years();
                    series.insert(label.as_str(), self.country_series(country, years));
                }
                None => {
                    let value = self.config.on_missing.resolve(self.name(), None, || {
                        format!("holiday calendar of country '{label}'")
                    })?;
                    fallback.insert(label.as_str(), value);
                }
            }
        }

        skeleton.frame_by_date_and_feature(
            self.name(),
            &self.config.country_feature,
            self.name(),
            |date, label| {
                Ok(match series.get(label) {
                    Some(days) => days.get(&date).copied(),
                    None => fallback.get(label).copied(),
                })
            },
        )
    }
}

impl ConfigurableFactor for HolidayTrend {
    type Config = HolidayTrendConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        if let Some(smoothing) = &config.smoothing {
            smoothing.validate()?;
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

    fn skeleton(countries: &[&str]) -> RowSkeleton {
        let dates = DateRange::daily(ymd(2018, 1, 1), ymd(2019, 12, 31)).unwrap();
        let features = FeatureSpace::new()
            .with_feature("country", countries.iter().copied())
            .unwrap();
        RowSkeleton::build(&dates, &features).unwrap()
    }

    fn value_at(frame: &DataFrame, column: &str, row: usize) -> f64 {
        frame.column(column).unwrap().f64().unwrap().get(row).unwrap()
    }

    #[test]
    fn test_holiday_trend_peaks() {
        let factor = HolidayTrend::new(2.0).with_special("Thanksgiving Day", 10.0);
        let result = factor.compute(&skeleton(&["United States", "Netherlands"])).unwrap();

        assert_eq!(result.height(), 2 * 730);
        // New Year's Day 2018
        assert_relative_eq!(value_at(&result, "holiday_trend", 0), 2.0);
        // 2018-01-02 is an ordinary day
        assert_relative_eq!(value_at(&result, "holiday_trend", 1), 1.0);
        // Thanksgiving 2018-11-22 is day 325 of the range
        assert_relative_eq!(value_at(&result, "holiday_trend", 325), 10.0);
        // Dutch King's day 2018-04-27 is day 116
        assert_relative_eq!(value_at(&result, "holiday_trend", 730 + 116), 2.0);
    }

    #[test]
    fn test_holiday_trend_unknown_country() {
        let frame = HolidayTrend::default()
            .compute(&skeleton(&["Italy", "Atlantis"]))
            .unwrap();
        // Atlantis falls back to the baseline on every date
        let values = frame.column("holiday_trend").unwrap().f64().unwrap();
        assert!(values.into_iter().skip(730).all(|v| v == Some(1.0)));

        let err = HolidayTrend::default()
            .with_missing_policy(MissingReference::Fail)
            .compute(&skeleton(&["Italy", "Atlantis"]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Lookup { .. }));
    }

    #[test]
    fn test_gaussian_smoothing() {
        let smoothing = GaussianSmoothing::default();

        let flat = smoothing.apply(&[3.0; 20]);
        assert!(flat.iter().all(|v| (v - 3.0).abs() < 1e-12));

        let mut spike = vec![1.0; 20];
        spike[5] = 3.0;
        let smoothed = smoothing.apply(&spike);
        assert_relative_eq!(smoothed[4], 1.0);
        assert!(smoothed[5] > 1.0 && smoothed[5] < 3.0);
        assert!(smoothed[10] > smoothed[5]);
        assert_relative_eq!(smoothed[15], 1.0);
    }

    #[test]
    fn test_smoothing_validation() {
        let err = HolidayTrend::with_config(HolidayTrendConfig {
            smoothing: Some(GaussianSmoothing { window: 0, std: 2.0 }),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }
}

//! Day-of-week effect.

use crate::{
    DATE_COLUMN, GeneratorError, Result, RowSkeleton,
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use chrono::{Datelike, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Multiplier for one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayFactor {
    /// Day of the week
    pub day: Weekday,
    /// Multiplier on that day
    pub factor: f64,
}

/// Configuration for [`WeekendTrend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekendTrendConfig {
    /// Output column name
    pub name: String,
    /// Multiplier on Saturdays and Sundays
    pub weekend_factor: f64,
    /// Overrides for individual days, weekend days included
    pub day_factors: Vec<DayFactor>,
}

impl Default for WeekendTrendConfig {
    fn default() -> Self {
        Self {
            name: "weekend_trend".to_string(),
            weekend_factor: 1.3,
            day_factors: Vec::new(),
        }
    }
}

/// Elevated values on weekends, baseline on weekdays.
///
/// Individual days can be overridden, e.g. a Friday lift of 1.15.
#[derive(Debug, Clone, Default)]
pub struct WeekendTrend {
    config: WeekendTrendConfig,
}

impl WeekendTrend {
    /// Weekend lift with the given multiplier.
    pub fn new(weekend_factor: f64) -> Self {
        Self {
            config: WeekendTrendConfig {
                weekend_factor,
                ..Default::default()
            },
        }
    }

    /// Override the multiplier of one day.
    pub fn with_day(mut self, day: Weekday, factor: f64) -> Self {
        self.config.day_factors.retain(|d| d.day != day);
        self.config.day_factors.push(DayFactor { day, factor });
        self
    }

    /// Multiplier for a day of the week.
    pub fn factor_for(&self, day: Weekday) -> f64 {
        match self.config.day_factors.iter().find(|d| d.day == day) {
            Some(d) => d.factor,
            None if matches!(day, Weekday::Sat | Weekday::Sun) => self.config.weekend_factor,
            None => 1.0,
        }
    }
}

impl Factor for WeekendTrend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "Weekend trend - elevated values on Saturdays and Sundays"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Calendar
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![DATE_COLUMN]
    }

    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        skeleton.frame_by_date(self.name(), |date| Ok(self.factor_for(date.weekday())))
    }
}

impl ConfigurableFactor for WeekendTrend {
    type Config = WeekendTrendConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        for (i, day) in config.day_factors.iter().enumerate() {
            if config.day_factors[..i].iter().any(|d| d.day == day.day) {
                return Err(GeneratorError::config(format!(
                    "weekend trend lists {} more than once",
                    day.day
                )));
            }
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
    use chrono::NaiveDate;

    #[test]
    fn test_weekend_trend_values() {
        // 2024-01-01 is a Monday
        let dates = DateRange::daily(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        )
        .unwrap();
        let skeleton = RowSkeleton::build(&dates, &FeatureSpace::new()).unwrap();

        let factor = WeekendTrend::default().with_day(Weekday::Fri, 1.15);
        let result = factor.compute(&skeleton).unwrap();
        let values: Vec<f64> = result
            .column("weekend_trend")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(values, vec![1.0, 1.0, 1.0, 1.0, 1.15, 1.3, 1.3]);
    }

    #[test]
    fn test_weekend_trend_duplicate_day() {
        let err = WeekendTrend::with_config(WeekendTrendConfig {
            day_factors: vec![
                DayFactor { day: Weekday::Mon, factor: 1.1 },
                DayFactor { day: Weekday::Mon, factor: 1.2 },
            ],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }
}

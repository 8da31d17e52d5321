//! Black Friday sale peak.

use crate::{
    DATE_COLUMN, Result, RowSkeleton,
    reference::holidays::{nth_weekday, thanksgiving},
    registry::FactorKind,
    traits::{ConfigurableFactor, Factor},
};
use chrono::{NaiveDate, Weekday};
use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How the Black Friday date of a year is determined.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackFridayRule {
    /// The Friday after the fourth Thursday of November (US retail rule)
    #[default]
    DayAfterThanksgiving,
    /// The fourth Friday of November
    FourthFriday,
}

impl BlackFridayRule {
    /// Black Friday of `year` under this rule.
    pub fn date(self, year: i32) -> Option<NaiveDate> {
        match self {
            Self::DayAfterThanksgiving => thanksgiving(year)?.succ_opt(),
            Self::FourthFriday => nth_weekday(year, 11, Weekday::Fri, 4),
        }
    }
}

/// Configuration for [`BlackFridaySale`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackFridaySaleConfig {
    /// Output column name
    pub name: String,
    /// Multiplier on Black Friday
    pub sale_factor: f64,
    /// Date rule
    pub rule: BlackFridayRule,
}

impl Default for BlackFridaySaleConfig {
    fn default() -> Self {
        Self {
            name: "black_friday_sale".to_string(),
            sale_factor: 2.0,
            rule: BlackFridayRule::default(),
        }
    }
}

/// Elevated value on Black Friday of every year, baseline otherwise.
#[derive(Debug, Clone, Default)]
pub struct BlackFridaySale {
    config: BlackFridaySaleConfig,
}

impl BlackFridaySale {
    /// Sale peak with the given multiplier and the default date rule.
    pub fn new(sale_factor: f64) -> Self {
        Self {
            config: BlackFridaySaleConfig {
                sale_factor,
                ..Default::default()
            },
        }
    }

    /// Use another date rule.
    pub const fn with_rule(mut self, rule: BlackFridayRule) -> Self {
        self.config.rule = rule;
        self
    }
}

impl Factor for BlackFridaySale {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        "Black Friday sale - elevated value on Black Friday each year"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Calendar
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![DATE_COLUMN]
    }

    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        let sale_days: HashSet<NaiveDate> = skeleton
            .date_range()
            .years()
            .filter_map(|year| self.config.rule.date(year))
            .collect();

        skeleton.frame_by_date(self.name(), |date| {
            Ok(if sale_days.contains(&date) {
                self.config.sale_factor
            } else {
                1.0
            })
        })
    }
}

impl ConfigurableFactor for BlackFridaySale {
    type Config = BlackFridaySaleConfig;

    fn with_config(config: Self::Config) -> Result<Self> {
        Ok(Self { config })
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

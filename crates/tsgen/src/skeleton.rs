//! Date axis, feature space and the row grid built from them.
//!
//! Every factor and noiser is evaluated against the same [`RowSkeleton`]:
//! one row per `(date, feature-combination)` pair, date-major, with feature
//! combinations enumerated in declaration order.

use crate::{GeneratorError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use derive_more::{Display, From};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Name of the date column in the skeleton and in every output table.
pub const DATE_COLUMN: &str = "date";

/// Spacing between consecutive dates of a [`DateRange`].
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// One row per calendar day
    #[default]
    Daily,
    /// One row every seven days
    Weekly,
    /// One row per month, on the start date's day of month (clamped)
    Monthly,
}

impl Frequency {
    /// The `n`-th date after `start` at this frequency.
    fn nth(self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Self::Daily => start.checked_add_days(Days::new(u64::from(n))),
            Self::Weekly => start.checked_add_days(Days::new(7 * u64::from(n))),
            Self::Monthly => start.checked_add_months(Months::new(n)),
        }
    }
}

/// Ordered, duplicate-free sequence of dates: the temporal axis of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    dates: Vec<NaiveDate>,
}

impl DateRange {
    /// All dates from `start` to `end` (inclusive) at the given frequency.
    pub fn new(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Result<Self> {
        if start > end {
            return Err(GeneratorError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let mut dates = Vec::new();
        let mut n = 0u32;
        while let Some(date) = frequency.nth(start, n) {
            if date > end {
                break;
            }
            dates.push(date);
            n += 1;
        }

        Self::from_dates(dates)
    }

    /// Daily range from `start` to `end` inclusive.
    pub fn daily(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(start, end, Frequency::Daily)
    }

    /// `periods` dates starting at `start`.
    pub fn periods(start: NaiveDate, periods: u32, frequency: Frequency) -> Result<Self> {
        let dates = (0..periods)
            .map(|n| {
                frequency.nth(start, n).ok_or_else(|| {
                    GeneratorError::config(format!("date overflow after {start} at {frequency}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_dates(dates)
    }

    /// Range from an explicit list of dates.
    ///
    /// The list must be non-empty and strictly increasing.
    pub fn from_dates(dates: Vec<NaiveDate>) -> Result<Self> {
        if dates.is_empty() {
            return Err(GeneratorError::EmptyDateRange);
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(GeneratorError::UnsortedDateRange(pair[1].to_string()));
        }
        Ok(Self { dates })
    }

    /// Dates in increasing order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// First date.
    pub fn start(&self) -> NaiveDate {
        self.dates[0]
    }

    /// Last date.
    pub fn end(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false: a range holds at least one date.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Calendar years touched by the range.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start().year()..=self.end().year()
    }

    /// Calendar days elapsed between the first date and `date`.
    pub fn elapsed_days(&self, date: NaiveDate) -> i64 {
        (date - self.start()).num_days()
    }
}

/// One categorical feature column and its possible values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Column name
    pub name: String,
    /// Possible values, in output order
    pub values: Vec<String>,
}

/// Ordered set of categorical features whose cross-product, together with the
/// dates, defines the row granularity of a table.
///
/// Converting from a `Vec<Feature>` does not validate; call
/// [`FeatureSpace::validate`] or let the generator do it.
#[derive(Debug, Clone, Default, PartialEq, Eq, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSpace {
    features: Vec<Feature>,
}

impl FeatureSpace {
    /// Create an empty feature space.
    pub const fn new() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Add a feature, validating it against the ones already declared.
    pub fn with_feature<I, S>(mut self, name: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.push(Feature {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self.validate()?;
        Ok(self)
    }

    /// Check names are unique and every value set is non-empty and duplicate-free.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for feature in &self.features {
            if feature.name == DATE_COLUMN {
                return Err(GeneratorError::ColumnCollision(feature.name.clone()));
            }
            if !names.insert(feature.name.as_str()) {
                return Err(GeneratorError::DuplicateFeature(feature.name.clone()));
            }
            if feature.values.is_empty() {
                return Err(GeneratorError::EmptyFeature(feature.name.clone()));
            }
            let mut seen = HashSet::new();
            if let Some(value) = feature.values.iter().find(|v| !seen.insert(v.as_str())) {
                return Err(GeneratorError::DuplicateFeatureValue {
                    feature: feature.name.clone(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Feature names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// Values of one feature.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.values.as_slice())
    }

    /// Whether a feature with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.values(name).is_some()
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no feature is declared.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of feature combinations (1 for an empty space).
    pub fn combination_count(&self) -> usize {
        self.features.iter().map(|f| f.values.len()).product()
    }

    /// Cartesian product of the value sets of `names`, first name varying slowest.
    pub fn combinations(&self, names: &[&str]) -> Result<Vec<Vec<&str>>> {
        let mut combos: Vec<Vec<&str>> = vec![Vec::with_capacity(names.len())];
        for name in names {
            let values = self
                .values(name)
                .ok_or_else(|| GeneratorError::config(format!("unknown feature '{name}'")))?;
            combos = combos
                .into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |value| {
                        let mut combo = prefix.clone();
                        combo.push(value.as_str());
                        combo
                    })
                })
                .collect();
        }
        Ok(combos)
    }
}

/// Build a polars date column from chrono dates.
pub(crate) fn date_column(name: &str, dates: &[NaiveDate]) -> Column {
    DateChunked::from_naive_date(name.into(), dates.iter().copied())
        .into_series()
        .into()
}

/// Materialized `date × feature-combination` grid.
///
/// Built once per generation pass and only read afterwards.
#[derive(Debug, Clone)]
pub struct RowSkeleton {
    date_range: DateRange,
    features: FeatureSpace,
    frame: DataFrame,
}

impl RowSkeleton {
    /// Build the grid. Row count is `|dates| × Π |feature values|`.
    pub fn build(date_range: &DateRange, features: &FeatureSpace) -> Result<Self> {
        features.validate()?;

        let names: Vec<&str> = features.names().collect();
        let combos = features.combinations(&names)?;
        let height = date_range.len() * combos.len();

        let mut dates = Vec::with_capacity(height);
        let mut feature_columns: Vec<Vec<&str>> = vec![Vec::with_capacity(height); names.len()];
        for date in date_range.dates() {
            for combo in &combos {
                dates.push(*date);
                for (column, value) in feature_columns.iter_mut().zip(combo) {
                    column.push(*value);
                }
            }
        }

        let mut columns = Vec::with_capacity(names.len() + 1);
        columns.push(date_column(DATE_COLUMN, &dates));
        for (name, values) in names.iter().zip(feature_columns) {
            columns.push(Column::new((*name).into(), values));
        }

        Ok(Self {
            date_range: date_range.clone(),
            features: features.clone(),
            frame: DataFrame::new(columns)?,
        })
    }

    /// The date axis.
    pub const fn date_range(&self) -> &DateRange {
        &self.date_range
    }

    /// The feature space.
    pub const fn features(&self) -> &FeatureSpace {
        &self.features
    }

    /// The grid as a DataFrame with `date` and one column per feature.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the skeleton has a column with this name.
    pub fn has_column(&self, column: &str) -> bool {
        column == DATE_COLUMN || self.features.contains(column)
    }

    /// Fail with [`GeneratorError::MissingColumn`] unless `column` exists.
    pub fn require(&self, owner: &str, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(GeneratorError::MissingColumn {
                factor: owner.to_string(),
                column: column.to_string(),
            })
        }
    }

    /// Frame keyed on `date` with one value per date of the range.
    pub fn frame_by_date<F>(&self, value_column: &str, mut value: F) -> Result<DataFrame>
    where
        F: FnMut(NaiveDate) -> Result<f64>,
    {
        let dates = self.date_range.dates();
        let values = dates.iter().map(|d| value(*d)).collect::<Result<Vec<f64>>>()?;

        Ok(DataFrame::new(vec![
            date_column(DATE_COLUMN, dates),
            Column::new(value_column.into(), values),
        ])?)
    }

    /// Frame keyed on `(date, feature)`.
    ///
    /// `value` returning `None` leaves that key out of the frame.
    pub fn frame_by_date_and_feature<F>(
        &self,
        owner: &str,
        feature: &str,
        value_column: &str,
        mut value: F,
    ) -> Result<DataFrame>
    where
        F: FnMut(NaiveDate, &str) -> Result<Option<f64>>,
    {
        self.require(owner, feature)?;
        let labels = self.features.values(feature).unwrap_or_default();

        let mut dates = Vec::new();
        let mut keys = Vec::new();
        let mut values = Vec::new();
        for label in labels {
            for date in self.date_range.dates() {
                if let Some(v) = value(*date, label)? {
                    dates.push(*date);
                    keys.push(label.as_str());
                    values.push(v);
                }
            }
        }

        Ok(DataFrame::new(vec![
            date_column(DATE_COLUMN, &dates),
            Column::new(feature.into(), keys),
            Column::new(value_column.into(), values),
        ])?)
    }

    /// Frame keyed on a set of feature columns, independent of date.
    ///
    /// `value` returning `None` leaves that combination out of the frame.
    pub fn frame_by_features<F>(
        &self,
        owner: &str,
        features: &[&str],
        value_column: &str,
        mut value: F,
    ) -> Result<DataFrame>
    where
        F: FnMut(&[&str]) -> Result<Option<f64>>,
    {
        for feature in features {
            self.require(owner, feature)?;
        }

        let mut keys: Vec<Vec<&str>> = vec![Vec::new(); features.len()];
        let mut values = Vec::new();
        for combo in self.features.combinations(features)? {
            if let Some(v) = value(&combo)? {
                for (column, label) in keys.iter_mut().zip(&combo) {
                    column.push(*label);
                }
                values.push(v);
            }
        }

        let mut columns: Vec<Column> = features
            .iter()
            .zip(keys)
            .map(|(name, labels)| Column::new((*name).into(), labels))
            .collect();
        columns.push(Column::new(value_column.into(), values));
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_skeleton_row_count() {
        let dates = DateRange::daily(ymd(2024, 1, 1), ymd(2024, 1, 10)).unwrap();
        let features = FeatureSpace::new()
            .with_feature("store", ["A", "B", "C"])
            .unwrap()
            .with_feature("product", ["jacket", "mat"])
            .unwrap();

        let skeleton = RowSkeleton::build(&dates, &features).unwrap();

        assert_eq!(dates.len(), 10);
        assert_eq!(skeleton.height(), 60);
        assert_eq!(skeleton.frame().width(), 3);
    }

    #[test]
    fn test_skeleton_order_is_date_major() {
        let dates = DateRange::daily(ymd(2024, 1, 1), ymd(2024, 1, 2)).unwrap();
        let features = FeatureSpace::new()
            .with_feature("store", ["A", "B"])
            .unwrap();

        let skeleton = RowSkeleton::build(&dates, &features).unwrap();
        let stores: Vec<&str> = skeleton
            .frame()
            .column("store")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(stores, vec!["A", "B", "A", "B"]);
    }

    #[test]
    fn test_empty_feature_space_yields_one_row_per_date() {
        let dates = DateRange::daily(ymd(2024, 3, 1), ymd(2024, 3, 31)).unwrap();
        let skeleton = RowSkeleton::build(&dates, &FeatureSpace::new()).unwrap();

        assert_eq!(skeleton.height(), 31);
        assert_eq!(skeleton.frame().width(), 1);
        assert!(skeleton.frame().column(DATE_COLUMN).is_ok());
    }

    #[test]
    fn test_empty_feature_values_rejected() {
        let err = FeatureSpace::new()
            .with_feature("store", Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyFeature(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_duplicate_features_rejected() {
        let err = FeatureSpace::new()
            .with_feature("store", ["A"])
            .unwrap()
            .with_feature("store", ["B"])
            .unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateFeature(_)));

        let err = FeatureSpace::new().with_feature("store", ["A", "A"]).unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateFeatureValue { .. }));
    }

    #[test]
    fn test_date_range_validation() {
        assert!(matches!(
            DateRange::daily(ymd(2024, 2, 1), ymd(2024, 1, 1)),
            Err(GeneratorError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            DateRange::from_dates(vec![]),
            Err(GeneratorError::EmptyDateRange)
        ));
        assert!(matches!(
            DateRange::from_dates(vec![ymd(2024, 1, 2), ymd(2024, 1, 2)]),
            Err(GeneratorError::UnsortedDateRange(_))
        ));
    }

    #[test]
    fn test_date_range_frequencies() {
        let weekly = DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 31), Frequency::Weekly).unwrap();
        assert_eq!(weekly.len(), 5);
        assert_eq!(weekly.end(), ymd(2024, 1, 29));

        let monthly = DateRange::new(ymd(2024, 1, 31), ymd(2024, 4, 30), Frequency::Monthly).unwrap();
        assert_eq!(
            monthly.dates(),
            &[ymd(2024, 1, 31), ymd(2024, 2, 29), ymd(2024, 3, 31), ymd(2024, 4, 30)]
        );

        let periods = DateRange::periods(ymd(1970, 1, 1), 50, Frequency::Daily).unwrap();
        assert_eq!(periods.len(), 50);
        assert_eq!(periods.elapsed_days(periods.end()), 49);
    }

    #[test]
    fn test_combinations_subset() {
        let features = FeatureSpace::new()
            .with_feature("store", ["A", "B"])
            .unwrap()
            .with_feature("product", ["jacket", "mat", "top"])
            .unwrap();

        let combos = features.combinations(&["product", "store"]).unwrap();
        assert_eq!(combos.len(), 6);
        assert_eq!(combos[0], vec!["jacket", "A"]);
        assert_eq!(combos[5], vec!["top", "B"]);
        assert_eq!(features.combination_count(), 6);
    }

    #[test]
    fn test_missing_column_is_configuration_error() {
        let dates = DateRange::daily(ymd(2024, 1, 1), ymd(2024, 1, 3)).unwrap();
        let skeleton = RowSkeleton::build(&dates, &FeatureSpace::new()).unwrap();

        let err = skeleton
            .frame_by_date_and_feature("gdp", "country", "gdp", |_, _| Ok(Some(1.0)))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::MissingColumn { .. }));
    }
}

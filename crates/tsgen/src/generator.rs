//! Generator: composes factors and noise over the row skeleton.
//!
//! A generation pass builds the [`RowSkeleton`], computes every factor frame,
//! left-joins each one onto the skeleton by its key columns and multiplies the
//! factor columns together with the base value. Noise is added last.
//!
//! Output columns, in order: `date`, one column per feature, one column per
//! factor (name order), `total_factor`, `combined`, the noise column (when a
//! noiser is set) and `value`.

use crate::{
    DATE_COLUMN, DateRange, Factor, FactorRegistry, FeatureSpace, GeneratorConfig, GeneratorError,
    Noiser, Result, RowSkeleton,
};
use polars::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Product of all factor columns, without the base value.
pub const TOTAL_FACTOR_COLUMN: &str = "total_factor";

/// Base value times every factor, before noise.
pub const COMBINED_COLUMN: &str = "combined";

/// Final observed value.
pub const VALUE_COLUMN: &str = "value";

const ROW_INDEX_COLUMN: &str = "__row";

/// Composes factors and noise into a table.
#[derive(Debug, Clone)]
pub struct Generator {
    date_range: DateRange,
    features: FeatureSpace,
    base_value: f64,
    factors: FactorRegistry,
    noiser: Option<Arc<dyn Noiser>>,
    output: Option<DataFrame>,
}

impl Generator {
    /// Create a generator. Nothing is computed until [`Generator::generate`].
    ///
    /// Factors sharing a name replace each other, the last one wins.
    pub fn new(
        factors: impl IntoIterator<Item = Arc<dyn Factor>>,
        noiser: Option<Arc<dyn Noiser>>,
        features: FeatureSpace,
        date_range: DateRange,
        base_value: f64,
    ) -> Result<Self> {
        features.validate()?;
        check_base_value(base_value)?;

        Ok(Self {
            date_range,
            features,
            base_value,
            factors: FactorRegistry::from_factors(factors),
            noiser,
            output: None,
        })
    }

    /// Build a generator from a configuration.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Self::new(
            config.build_factors()?,
            config.build_noiser()?,
            config.feature_space()?,
            config.date_range()?,
            config.base_value,
        )
    }

    /// The date axis.
    pub const fn date_range(&self) -> &DateRange {
        &self.date_range
    }

    /// The feature space.
    pub const fn features(&self) -> &FeatureSpace {
        &self.features
    }

    /// Scalar every row starts from.
    pub const fn base_value(&self) -> f64 {
        self.base_value
    }

    /// The factor set.
    pub const fn factors(&self) -> &FactorRegistry {
        &self.factors
    }

    /// The active noiser, if any.
    pub fn noiser(&self) -> Option<&dyn Noiser> {
        self.noiser.as_deref()
    }

    /// Number of rows a generation pass produces.
    pub fn row_count(&self) -> usize {
        self.date_range.len() * self.features.combination_count()
    }

    /// Add a factor under a new name.
    ///
    /// Fails with [`GeneratorError::DuplicateFactor`] if the name is taken. The
    /// stored table is discarded on success.
    pub fn add_factor(&mut self, factor: Arc<dyn Factor>) -> Result<()> {
        if self.factors.contains(factor.name()) {
            return Err(GeneratorError::DuplicateFactor(factor.name().to_string()));
        }
        self.output = None;
        self.factors.register(factor);
        Ok(())
    }

    /// Insert a factor, replacing any factor with the same name.
    ///
    /// Returns the replaced factor. The stored table is discarded.
    pub fn update_factor(&mut self, factor: Arc<dyn Factor>) -> Option<Arc<dyn Factor>> {
        self.output = None;
        self.factors.register(factor)
    }

    /// Remove a factor by name.
    ///
    /// Fails with [`GeneratorError::NotFound`] if no factor has that name. The
    /// stored table is discarded on success.
    pub fn remove_factor(&mut self, name: &str) -> Result<Arc<dyn Factor>> {
        let removed = self.factors.remove(name)?;
        self.output = None;
        Ok(removed)
    }

    /// Replace or clear the noiser. The stored table is discarded.
    pub fn set_noiser(&mut self, noiser: Option<Arc<dyn Noiser>>) {
        self.output = None;
        self.noiser = noiser;
    }

    /// Change the base value. The stored table is discarded.
    pub fn set_base_value(&mut self, base_value: f64) -> Result<()> {
        check_base_value(base_value)?;
        self.output = None;
        self.base_value = base_value;
        Ok(())
    }

    /// The table of the last successful [`Generator::generate`].
    pub fn get_tabular_data(&self) -> Result<&DataFrame> {
        self.output.as_ref().ok_or(GeneratorError::NotGenerated)
    }

    /// Recompute the whole table and store it.
    ///
    /// On failure the previously stored table, if any, is kept.
    pub fn generate(&mut self) -> Result<&DataFrame> {
        let skeleton = RowSkeleton::build(&self.date_range, &self.features)?;
        self.check_columns(&skeleton)?;
        debug!(
            rows = skeleton.height(),
            factors = self.factors.len(),
            "starting generation pass"
        );

        let mut table = self.join_factors(&skeleton)?;
        let combined = table.column(COMBINED_COLUMN)?.f64()?.clone();

        let values: Vec<f64> = match &self.noiser {
            Some(noiser) => {
                let noise = noiser.apply(&skeleton, &combined)?;
                if noise.len() != skeleton.height() {
                    return Err(GeneratorError::Computation(format!(
                        "noiser '{}' returned {} values for {} rows",
                        noiser.name(),
                        noise.len(),
                        skeleton.height()
                    )));
                }
                let values = combined
                    .into_iter()
                    .zip(&noise)
                    .map(|(c, n)| c.unwrap_or(0.0) + n)
                    .collect();
                table.with_column(Column::new(noiser.name().into(), noise))?;
                values
            }
            None => combined.into_iter().map(|c| c.unwrap_or(0.0)).collect(),
        };
        table.with_column(Column::new(VALUE_COLUMN.into(), values))?;

        info!(
            rows = table.height(),
            factors = self.factors.len(),
            noise = self.noiser.is_some(),
            "generated table"
        );
        Ok(self.output.insert(table))
    }

    /// Check every factor and the noiser against the skeleton columns and
    /// the other output columns.
    fn check_columns(&self, skeleton: &RowSkeleton) -> Result<()> {
        let mut taken: Vec<&str> = vec![
            DATE_COLUMN,
            TOTAL_FACTOR_COLUMN,
            COMBINED_COLUMN,
            VALUE_COLUMN,
            ROW_INDEX_COLUMN,
        ];
        for feature in self.features.names() {
            if taken.contains(&feature) {
                return Err(GeneratorError::ColumnCollision(feature.to_string()));
            }
            taken.push(feature);
        }

        if let Some(noiser) = &self.noiser {
            for column in noiser.required_columns() {
                skeleton.require(noiser.name(), column)?;
            }
            if taken.contains(&noiser.name()) {
                return Err(GeneratorError::ColumnCollision(noiser.name().to_string()));
            }
            taken.push(noiser.name());
        }

        for factor in self.factors.iter() {
            if factor.required_columns().is_empty() {
                return Err(GeneratorError::config(format!(
                    "factor '{}' declares no key columns",
                    factor.name()
                )));
            }
            for column in factor.required_columns() {
                skeleton.require(factor.name(), column)?;
            }
            if taken.contains(&factor.name()) {
                return Err(GeneratorError::ColumnCollision(factor.name().to_string()));
            }
        }
        Ok(())
    }

    /// Skeleton with every factor column, `total_factor` and `combined`, in
    /// skeleton row order.
    fn join_factors(&self, skeleton: &RowSkeleton) -> Result<DataFrame> {
        let mut table = skeleton
            .frame()
            .clone()
            .lazy()
            .with_row_index(ROW_INDEX_COLUMN, None);

        for factor in self.factors.iter() {
            debug!(factor = factor.name(), kind = %factor.kind(), "computing factor");
            let frame = factor.compute(skeleton)?;
            if frame.column(factor.name()).is_err() {
                return Err(GeneratorError::Computation(format!(
                    "factor '{}' did not produce its value column",
                    factor.name()
                )));
            }

            // only the keys and the value column reach the output
            let mut keep = factor.required_columns();
            keep.push(factor.name());
            let frame = frame.select(keep)?;

            let keys: Vec<Expr> = factor.required_columns().into_iter().map(col).collect();
            table = table.join(
                frame.lazy(),
                keys.clone(),
                keys,
                JoinArgs::new(JoinType::Left),
            );
        }

        let names: Vec<&str> = self.factors.names();
        let total = names
            .iter()
            .fold(lit(1.0), |product, name| product * col(*name));

        let table = table
            .with_columns(
                names
                    .iter()
                    .map(|name| col(*name).fill_null(lit(1.0)))
                    .collect::<Vec<_>>(),
            )
            .with_column(total.alias(TOTAL_FACTOR_COLUMN))
            .with_column((col(TOTAL_FACTOR_COLUMN) * lit(self.base_value)).alias(COMBINED_COLUMN))
            .sort([ROW_INDEX_COLUMN], Default::default())
            .collect()?
            .drop(ROW_INDEX_COLUMN)?;

        if table.height() != skeleton.height() {
            return Err(GeneratorError::Computation(format!(
                "factor frames produced {} rows for a skeleton of {}, a factor repeats a key",
                table.height(),
                skeleton.height()
            )));
        }
        Ok(table)
    }
}

fn check_base_value(base_value: f64) -> Result<()> {
    if base_value.is_finite() {
        Ok(())
    } else {
        Err(GeneratorError::config(format!(
            "base value must be finite, got {base_value}"
        )))
    }
}

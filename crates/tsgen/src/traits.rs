//! Core trait definitions for factors and noisers.
//!
//! All multiplicative components implement [`Factor`]; the additive
//! perturbation applied after them implements [`Noiser`].

use crate::{FactorKind, Result, RowSkeleton};
use polars::prelude::*;
use serde::{Serialize, de::DeserializeOwned};

/// A multiplicative component of a generated series.
///
/// A factor reads the row skeleton and returns a *factor frame*: its key
/// columns (see [`Factor::required_columns`]) and one `f64` column named
/// [`Factor::name`]. The generator joins that frame onto the skeleton by key,
/// so rows sharing the same key values always receive the same multiplier.
/// Skeleton rows missing from the frame are treated as neutral (1.0).
pub trait Factor: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this factor, also its output column name.
    fn name(&self) -> &str;

    /// Human-readable description of what this factor models.
    fn description(&self) -> &str;

    /// Factor kind for grouping and introspection.
    fn kind(&self) -> FactorKind;

    /// Skeleton columns the factor frame is keyed on.
    ///
    /// The generator checks these exist before calling `compute`.
    fn required_columns(&self) -> Vec<&str>;

    /// Compute the factor frame for a skeleton.
    ///
    /// Returns a DataFrame with the required columns, unique per key, and the
    /// factor value column.
    fn compute(&self, skeleton: &RowSkeleton) -> Result<DataFrame>;
}

/// An additive perturbation applied after every factor.
pub trait Noiser: Send + Sync + std::fmt::Debug {
    /// Output column name of the perturbation.
    fn name(&self) -> &str;

    /// Skeleton columns the noiser reads.
    fn required_columns(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Compute one perturbation per skeleton row.
    ///
    /// `combined` holds the pre-noise value of every row, in skeleton row
    /// order; the returned vector must follow that same order.
    fn apply(&self, skeleton: &RowSkeleton, combined: &Float64Chunked) -> Result<Vec<f64>>;
}

/// Marker trait for factor configuration types.
///
/// Config types are plain serde structs with defaults, so they can be read
/// from a generator configuration file.
pub trait FactorConfig:
    Default + Clone + Send + Sync + std::fmt::Debug + Serialize + DeserializeOwned
{
}

/// A component built from a validated configuration.
pub trait ConfigurableFactor: Sized {
    /// Configuration type for this component.
    type Config: FactorConfig;

    /// Validate the configuration and build the component.
    fn with_config(config: Self::Config) -> Result<Self>;

    /// Returns the current configuration.
    fn config(&self) -> &Self::Config;
}

/// Blanket implementation for any type that satisfies the trait bounds.
impl<T> FactorConfig for T where
    T: Default + Clone + Send + Sync + std::fmt::Debug + Serialize + DeserializeOwned
{
}

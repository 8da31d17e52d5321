//! Static in-memory reference data used by the lookup-driven factors.
//!
//! All reference-dependent factors share the same [`MissingReference`] policy
//! type, so a gap in the data is handled identically everywhere.

pub mod gdp;
pub mod holidays;
pub mod industry;

pub use holidays::{Country, Holiday};

use crate::{GeneratorError, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// What a factor does when an observed key has no reference value.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReference {
    /// Use the neutral multiplier 1.0 and log a warning
    #[default]
    Baseline,
    /// Fail the generation with a lookup error
    Fail,
}

impl MissingReference {
    /// Resolve a lookup result under this policy.
    ///
    /// `key` describes the missing entry in the warning or error.
    pub fn resolve(self, factor: &str, value: Option<f64>, key: impl FnOnce() -> String) -> Result<f64> {
        match (value, self) {
            (Some(v), _) => Ok(v),
            (None, Self::Baseline) => {
                tracing::warn!(factor, key = %key(), "reference data missing, using baseline");
                Ok(1.0)
            }
            (None, Self::Fail) => Err(GeneratorError::Lookup {
                factor: factor.to_string(),
                key: key(),
            }),
        }
    }
}

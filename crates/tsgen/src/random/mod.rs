//! Random but stable factors.

pub mod feature_rand;

pub use feature_rand::{FeatureRandFactor, FeatureRandFactorConfig};

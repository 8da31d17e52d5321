//! Trend factors - smooth evolution over elapsed time.

pub mod linear;

pub use linear::{LinearCoefficients, LinearTrend, LinearTrendConfig};

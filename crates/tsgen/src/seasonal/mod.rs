//! Seasonal factors - periodic patterns over the year
//!
//! Seasonality is modelled either as a free-form sine wave over elapsed days
//! or as a monthly temperature response of product categories.

pub mod product_season;
pub mod sinusoidal;

pub use product_season::{
    ProductSeasonTrend, ProductSeasonTrendConfig, TemperatureSensitivity, temperature_proxy,
};
pub use sinusoidal::{Sinusoid, SinusoidalTrend, SinusoidalTrendConfig};

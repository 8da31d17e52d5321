//! Factors driven by external economic reference data.

pub mod country_gdp;
pub mod eu_eco;

pub use country_gdp::{CountryYearlyTrend, CountryYearlyTrendConfig};
pub use eu_eco::{EuEcoTrend, EuEcoTrendConfig};

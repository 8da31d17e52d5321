//! Calendar-driven factors: weekdays, public holidays and sale events.

pub mod black_friday;
pub mod holiday;
pub mod weekend;

pub use black_friday::{BlackFridayRule, BlackFridaySale, BlackFridaySaleConfig};
pub use holiday::{GaussianSmoothing, HolidayTrend, HolidayTrendConfig};
pub use weekend::{DayFactor, WeekendTrend, WeekendTrendConfig};

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tsgen/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod config;
pub mod error;
pub mod external;
pub mod generator;
pub mod noise;
pub mod random;
pub mod reference;
pub mod registry;
pub mod seasonal;
pub mod skeleton;
pub mod traits;
pub mod trend;

// Re-export core types
pub use config::{FactorSpec, GeneratorConfig, NoiseSpec};
pub use error::{ErrorKind, GeneratorError, Result};
pub use generator::{COMBINED_COLUMN, Generator, TOTAL_FACTOR_COLUMN, VALUE_COLUMN};
pub use reference::MissingReference;
pub use registry::{FactorInfo, FactorKind, FactorRegistry};
pub use skeleton::{DATE_COLUMN, DateRange, Feature, FeatureSpace, Frequency, RowSkeleton};
pub use traits::{ConfigurableFactor, Factor, FactorConfig, Noiser};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

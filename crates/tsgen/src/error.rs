//! Error types for series generation.

use derive_more::Display;
use thiserror::Error;

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Broad class of a [`GeneratorError`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid or missing configuration of a generator, factor or noiser
    Configuration,
    /// Reference data missing for an observed key
    Lookup,
    /// Output queried before a successful generation
    State,
    /// Named factor absent from the factor set
    NotFound,
    /// Failure inside the dataframe engine or the environment
    Internal,
}

/// Errors that can occur while configuring or generating a series.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Date range without any dates
    #[error("Date range is empty")]
    EmptyDateRange,

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Explicit date list that is not strictly increasing
    #[error("Date range is not strictly increasing at {0}")]
    UnsortedDateRange(String),

    /// Feature declared without any value
    #[error("Feature '{0}' has no values")]
    EmptyFeature(String),

    /// Feature declared twice
    #[error("Feature '{0}' is declared more than once")]
    DuplicateFeature(String),

    /// Value listed twice for the same feature
    #[error("Feature '{feature}' lists value '{value}' more than once")]
    DuplicateFeatureValue {
        /// Feature name
        feature: String,
        /// Repeated value
        value: String,
    },

    /// Missing required column in the row skeleton
    #[error("Factor '{factor}' requires column '{column}' which the row skeleton does not have")]
    MissingColumn {
        /// Factor or noiser name
        factor: String,
        /// Column it needs
        column: String,
    },

    /// Output column name used twice
    #[error("Column name '{0}' collides with another output column")]
    ColumnCollision(String),

    /// Invalid factor or generator parameters
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed JSON configuration
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Reference data missing for an observed key
    #[error("Factor '{factor}' has no reference data for {key}")]
    Lookup {
        /// Factor name
        factor: String,
        /// Description of the missing key
        key: String,
    },

    /// No generated table available
    #[error("No generated table available, call generate() first")]
    NotGenerated,

    /// Factor added under a name already in the factor set
    #[error("Factor '{0}' already exists")]
    DuplicateFactor(String),

    /// Factor not found in the factor set
    #[error("Factor not found: {0}")]
    NotFound(String),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeneratorError {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyDateRange
            | Self::InvalidDateRange { .. }
            | Self::UnsortedDateRange(_)
            | Self::EmptyFeature(_)
            | Self::DuplicateFeature(_)
            | Self::DuplicateFeatureValue { .. }
            | Self::DuplicateFactor(_)
            | Self::MissingColumn { .. }
            | Self::ColumnCollision(_)
            | Self::Configuration(_)
            | Self::Json(_) => ErrorKind::Configuration,
            Self::Lookup { .. } => ErrorKind::Lookup,
            Self::NotGenerated => ErrorKind::State,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Polars(_) | Self::Computation(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

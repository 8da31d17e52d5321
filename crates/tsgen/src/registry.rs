//! Named factor set with introspection.
//!
//! The registry is the factor set of a [`Generator`](crate::Generator): factors
//! are keyed by name, registering a factor under an existing name replaces the
//! previous one, and iteration follows name order.

use crate::{Factor, GeneratorError, Result};
use derive_more::Display;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Factor kind for grouping related factors.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FactorKind {
    /// Trend - smooth evolution over elapsed time
    Trend,
    /// Seasonal - periodic patterns over the year
    Seasonal,
    /// Calendar - effects tied to specific days
    Calendar,
    /// External - lookups into reference datasets
    External,
    /// Random - stable random draws per feature combination
    Random,
}

/// Metadata for factor introspection.
#[derive(Debug, Clone)]
pub struct FactorInfo {
    /// Factor name (unique identifier)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factor kind
    pub kind: FactorKind,
    /// Required skeleton columns
    pub required_columns: Vec<String>,
}

impl FactorInfo {
    fn of(factor: &dyn Factor) -> Self {
        Self {
            name: factor.name().to_string(),
            description: factor.description().to_string(),
            kind: factor.kind(),
            required_columns: factor
                .required_columns()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Factor set keyed by name.
#[derive(Debug, Default, Clone)]
pub struct FactorRegistry {
    factors: BTreeMap<String, Arc<dyn Factor>>,
}

impl FactorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factors: BTreeMap::new(),
        }
    }

    /// Registry holding the given factors; later duplicates replace earlier ones.
    pub fn from_factors(factors: impl IntoIterator<Item = Arc<dyn Factor>>) -> Self {
        let mut registry = Self::new();
        for factor in factors {
            registry.register(factor);
        }
        registry
    }

    /// Register a factor, returning the one it replaced, if any.
    pub fn register(&mut self, factor: Arc<dyn Factor>) -> Option<Arc<dyn Factor>> {
        self.factors.insert(factor.name().to_string(), factor)
    }

    /// Remove a factor by name.
    pub fn remove(&mut self, name: &str) -> Result<Arc<dyn Factor>> {
        self.factors
            .remove(name)
            .ok_or_else(|| GeneratorError::NotFound(name.to_string()))
    }

    /// Get a factor by name.
    pub fn get(&self, name: &str) -> Option<&dyn Factor> {
        self.factors.get(name).map(|f| f.as_ref())
    }

    /// Whether a factor with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factors.contains_key(name)
    }

    /// Get factors by kind.
    pub fn by_kind(&self, kind: FactorKind) -> Vec<&dyn Factor> {
        self.factors
            .values()
            .filter(|f| f.kind() == kind)
            .map(|f| f.as_ref())
            .collect()
    }

    /// Get all factor metadata.
    pub fn all_info(&self) -> Vec<FactorInfo> {
        self.factors.values().map(|f| FactorInfo::of(f.as_ref())).collect()
    }

    /// Get all factor names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.factors.keys().map(|s| s.as_str()).collect()
    }

    /// Iterate over the factors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Factor> {
        self.factors.values().map(|f| f.as_ref())
    }

    /// Number of registered factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekendTrend;
    use crate::trend::LinearTrend;

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = FactorRegistry::new();
        assert!(registry.register(Arc::new(LinearTrend::new(1.0, 1.0))).is_none());

        let replaced = registry.register(Arc::new(LinearTrend::new(2.0, 1.0)));
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_missing_factor() {
        let mut registry = FactorRegistry::from_factors([
            Arc::new(LinearTrend::new(1.0, 1.0)) as Arc<dyn Factor>,
            Arc::new(WeekendTrend::default()),
        ]);

        assert!(registry.remove("weekend_trend").is_ok());
        let err = registry.remove("weekend_trend").unwrap_err();
        assert!(matches!(err, GeneratorError::NotFound(_)));
        assert_eq!(registry.names(), vec!["linear_trend"]);
    }

    #[test]
    fn test_all_info_and_kinds() {
        let registry = FactorRegistry::from_factors([
            Arc::new(LinearTrend::new(1.0, 1.0)) as Arc<dyn Factor>,
            Arc::new(WeekendTrend::default()),
        ]);

        let info = registry.all_info();
        assert_eq!(info.len(), registry.len());
        for entry in info {
            assert!(!entry.name.is_empty());
            assert!(!entry.description.is_empty());
            assert!(entry.required_columns.contains(&"date".to_string()));
        }

        assert_eq!(registry.by_kind(FactorKind::Calendar).len(), 1);
        assert_eq!(registry.by_kind(FactorKind::Random).len(), 0);
    }
}

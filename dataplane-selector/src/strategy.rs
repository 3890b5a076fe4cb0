//! Selection strategies.

use dataplane_spi::DataPlaneInstance;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;

/// Strategy used when none is requested.
pub const DEFAULT_STRATEGY: &str = RandomSelectionStrategy::NAME;

/// Picks one instance among candidates that can all serve the request.
pub trait SelectionStrategy: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Chosen instance; `None` only for an empty slice.
    fn apply<'a>(&self, candidates: &'a [DataPlaneInstance]) -> Option<&'a DataPlaneInstance>;
}

/// Uniformly random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelectionStrategy;

impl RandomSelectionStrategy {
    /// Registry name.
    pub const NAME: &'static str = "random";
}

impl SelectionStrategy for RandomSelectionStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply<'a>(&self, candidates: &'a [DataPlaneInstance]) -> Option<&'a DataPlaneInstance> {
        candidates.choose(&mut rand::thread_rng())
    }
}

/// First candidate in store order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstSelectionStrategy;

impl FirstSelectionStrategy {
    /// Registry name.
    pub const NAME: &'static str = "first";
}

impl SelectionStrategy for FirstSelectionStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply<'a>(&self, candidates: &'a [DataPlaneInstance]) -> Option<&'a DataPlaneInstance> {
        candidates.first()
    }
}

/// Strategies by name.
#[derive(Clone, Default)]
pub struct SelectionStrategyRegistry {
    strategies: HashMap<String, Arc<dyn SelectionStrategy>>,
}

impl std::fmt::Debug for SelectionStrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

impl SelectionStrategyRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `random` and `first`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add(Arc::new(RandomSelectionStrategy));
        registry.add(Arc::new(FirstSelectionStrategy));
        registry
    }

    /// Register a strategy under its own name.
    pub fn add(&mut self, strategy: Arc<dyn SelectionStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    /// Strategy by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<dyn SelectionStrategy>> {
        self.strategies.get(name).cloned()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn candidates() -> Vec<DataPlaneInstance> {
        ["a", "b", "c"]
            .into_iter()
            .map(|id| DataPlaneInstance::new(id, Url::parse("http://dp").unwrap()))
            .collect()
    }

    #[test]
    fn test_first_strategy() {
        let candidates = candidates();
        let chosen = FirstSelectionStrategy.apply(&candidates).unwrap();
        assert_eq!(chosen.id, "a");
    }

    #[test]
    fn test_random_strategy_picks_a_candidate() {
        let candidates = candidates();
        for _ in 0..20 {
            let chosen = RandomSelectionStrategy.apply(&candidates).unwrap();
            assert!(candidates.iter().any(|c| c.id == chosen.id));
        }
        assert!(RandomSelectionStrategy.apply(&[]).is_none());
    }

    #[test]
    fn test_registry_defaults() {
        let registry = SelectionStrategyRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["first", "random"]);
        assert!(registry.find(DEFAULT_STRATEGY).is_some());
        assert!(registry.find("round-robin").is_none());
    }
}

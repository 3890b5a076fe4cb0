//! Selector service.

use crate::{
    DEFAULT_STRATEGY, DataPlaneInstanceStore, InMemoryDataPlaneInstanceStore, SelectionStrategyRegistry,
    SelectorError,
};
use dataplane_spi::{DataAddress, DataPlaneClientFactory, DataPlaneInstance, DataPlaneInstanceState};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Registers, checks and selects data-plane instances.
#[derive(Clone)]
pub struct DataPlaneSelectorService {
    store: Arc<dyn DataPlaneInstanceStore>,
    strategies: SelectionStrategyRegistry,
}

impl std::fmt::Debug for DataPlaneSelectorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataPlaneSelectorService")
            .field("strategies", &self.strategies)
            .finish_non_exhaustive()
    }
}

impl Default for DataPlaneSelectorService {
    fn default() -> Self {
        Self::new(
            Arc::new(InMemoryDataPlaneInstanceStore::new()),
            SelectionStrategyRegistry::with_defaults(),
        )
    }
}

impl DataPlaneSelectorService {
    /// Create a service over a store and strategy registry.
    #[must_use]
    pub fn new(store: Arc<dyn DataPlaneInstanceStore>, strategies: SelectionStrategyRegistry) -> Self {
        Self { store, strategies }
    }

    /// Register an instance as available.
    pub async fn add_instance(&self, mut instance: DataPlaneInstance) -> DataPlaneInstance {
        instance.transition_to(DataPlaneInstanceState::Available);
        info!(id = %instance.id, url = %instance.url, "Data plane instance registered");
        self.store.save(instance.clone()).await;
        instance
    }

    /// Mark an instance unregistered; it is kept but never selected.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnknownInstance`] if no instance has this id.
    pub async fn unregister(&self, id: &str) -> Result<DataPlaneInstance, SelectorError> {
        let mut instance = self
            .store
            .find_by_id(id)
            .await
            .ok_or_else(|| SelectorError::UnknownInstance(id.to_string()))?;
        instance.transition_to(DataPlaneInstanceState::Unregistered);
        self.store.save(instance.clone()).await;
        info!(id, "Data plane instance unregistered");
        Ok(instance)
    }

    /// Remove an instance.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnknownInstance`] if no instance has this id.
    pub async fn delete(&self, id: &str) -> Result<DataPlaneInstance, SelectorError> {
        let instance = self
            .store
            .delete(id)
            .await
            .ok_or_else(|| SelectorError::UnknownInstance(id.to_string()))?;
        info!(id, "Data plane instance deleted");
        Ok(instance)
    }

    /// All instances.
    pub async fn get_all(&self) -> Vec<DataPlaneInstance> {
        self.store.get_all().await
    }

    /// Instance by id.
    pub async fn find_by_id(&self, id: &str) -> Option<DataPlaneInstance> {
        self.store.find_by_id(id).await
    }

    /// Pick an available instance able to serve `source` with `transfer_type`.
    ///
    /// # Errors
    ///
    /// [`SelectorError::StrategyNotFound`] for an unknown strategy name,
    /// [`SelectorError::NotFound`] when no instance qualifies.
    #[instrument(skip(self, source), fields(source_type = source.address_type()))]
    pub async fn select(
        &self,
        source: &DataAddress,
        transfer_type: Option<&str>,
        strategy: Option<&str>,
    ) -> Result<DataPlaneInstance, SelectorError> {
        let name = strategy.unwrap_or(DEFAULT_STRATEGY);
        let strategy = self
            .strategies
            .find(name)
            .ok_or_else(|| SelectorError::StrategyNotFound(name.to_string()))?;

        let candidates: Vec<_> = self
            .store
            .get_all()
            .await
            .into_iter()
            .filter(|i| i.is_available() && i.can_handle(source, transfer_type))
            .collect();

        let selected = strategy
            .apply(&candidates)
            .cloned()
            .ok_or_else(|| SelectorError::NotFound {
                source_type: source.address_type().to_string(),
                transfer_type: transfer_type.map(str::to_string),
            })?;

        debug!(id = %selected.id, candidates = candidates.len(), "Data plane selected");
        Ok(selected)
    }

    /// Check every registered instance and record whether it answered.
    ///
    /// Returns the number of available instances afterwards.
    pub async fn refresh_availability(&self, factory: &dyn DataPlaneClientFactory) -> usize {
        let mut available = 0;

        for instance in self.store.get_all().await {
            if instance.state == DataPlaneInstanceState::Unregistered {
                continue;
            }

            let client = factory.create_client(&instance);
            let state = match client.check_availability().await {
                Ok(()) => DataPlaneInstanceState::Available,
                Err(failure) => {
                    warn!(id = %instance.id, error = %failure, "Data plane instance unavailable");
                    DataPlaneInstanceState::Unavailable
                }
            };

            // The instance may have been deleted or unregistered while the
            // check was awaited.
            let updated = self
                .store
                .update(
                    &instance.id,
                    Box::new(move |current| {
                        if current.state != DataPlaneInstanceState::Unregistered {
                            current.transition_to(state);
                        }
                    }),
                )
                .await;
            if updated.is_some_and(|i| i.is_available()) {
                available += 1;
            }
        }

        debug!(available, "Data plane availability refreshed");
        available
    }
}

//! Instance storage.

use async_trait::async_trait;
use dataplane_spi::DataPlaneInstance;
use tokio::sync::RwLock;

/// In-place change applied to a stored instance.
pub type InstanceUpdate = Box<dyn FnOnce(&mut DataPlaneInstance) + Send>;

/// Persistence for data-plane instances.
#[async_trait]
pub trait DataPlaneInstanceStore: Send + Sync {
    /// Insert or replace an instance by id.
    async fn save(&self, instance: DataPlaneInstance);

    /// Instance with the given id.
    async fn find_by_id(&self, id: &str) -> Option<DataPlaneInstance>;

    /// All instances, in insertion order.
    async fn get_all(&self) -> Vec<DataPlaneInstance>;

    /// Remove an instance, returning it.
    async fn delete(&self, id: &str) -> Option<DataPlaneInstance>;

    /// Apply `update` to the stored instance atomically, returning the result.
    ///
    /// `None` if no instance has this id; nothing is inserted.
    async fn update(&self, id: &str, update: InstanceUpdate) -> Option<DataPlaneInstance>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryDataPlaneInstanceStore {
    instances: RwLock<Vec<DataPlaneInstance>>,
}

impl InMemoryDataPlaneInstanceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataPlaneInstanceStore for InMemoryDataPlaneInstanceStore {
    async fn save(&self, instance: DataPlaneInstance) {
        let mut instances = self.instances.write().await;
        match instances.iter_mut().find(|i| i.id == instance.id) {
            Some(existing) => *existing = instance,
            None => instances.push(instance),
        }
    }

    async fn find_by_id(&self, id: &str) -> Option<DataPlaneInstance> {
        self.instances
            .read()
            .await
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    async fn get_all(&self) -> Vec<DataPlaneInstance> {
        self.instances.read().await.clone()
    }

    async fn delete(&self, id: &str) -> Option<DataPlaneInstance> {
        let mut instances = self.instances.write().await;
        let index = instances.iter().position(|i| i.id == id)?;
        Some(instances.remove(index))
    }

    async fn update(&self, id: &str, update: InstanceUpdate) -> Option<DataPlaneInstance> {
        let mut instances = self.instances.write().await;
        let instance = instances.iter_mut().find(|i| i.id == id)?;
        update(instance);
        Some(instance.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn instance(id: &str) -> DataPlaneInstance {
        DataPlaneInstance::new(id, Url::parse("http://dp/v1/dataflows").unwrap())
    }

    #[tokio::test]
    async fn test_save_replaces_by_id() {
        let store = InMemoryDataPlaneInstanceStore::new();
        store.save(instance("a")).await;
        store.save(instance("b")).await;
        store
            .save(instance("a").with_allowed_source_type("HttpData"))
            .await;

        let all = store.get_all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert!(all[0].allowed_source_types.contains("HttpData"));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryDataPlaneInstanceStore::new();
        store.save(instance("a")).await;

        assert_eq!(store.delete("a").await.map(|i| i.id), Some("a".to_string()));
        assert!(store.delete("a").await.is_none());
        assert!(store.find_by_id("a").await.is_none());
    }

    #[tokio::test]
    async fn test_update_never_inserts() {
        let store = InMemoryDataPlaneInstanceStore::new();
        store.save(instance("a")).await;

        let updated = store
            .update("a", Box::new(|i| i.url = Url::parse("http://other/v1").unwrap()))
            .await;
        assert_eq!(updated.map(|i| i.url.host_str().map(str::to_string)), Some(Some("other".into())));

        assert!(store.update("missing", Box::new(|_| {})).await.is_none());
        assert_eq!(store.get_all().await.len(), 1);
    }
}

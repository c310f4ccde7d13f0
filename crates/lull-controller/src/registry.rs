//! Workload registry — the name → controller directory.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use lull_backend::WorkloadBackend;

use crate::controller::IdleController;

/// Concurrency-safe directory of idle controllers, one per workload
/// name.
///
/// Controllers are created lazily on first touch and never evicted;
/// the directory lives for the life of the process.
pub struct WorkloadRegistry {
    backend: Arc<dyn WorkloadBackend>,
    controllers: RwLock<HashMap<String, Arc<IdleController>>>,
}

impl WorkloadRegistry {
    pub fn new(backend: Arc<dyn WorkloadBackend>) -> Self {
        Self {
            backend,
            controllers: RwLock::new(HashMap::new()),
        }
    }

    /// Return the controller for `name`, creating it if this is the
    /// first touch for that name.
    ///
    /// Exactly one controller ever exists per name, even when touches
    /// for a brand-new name race: creation happens under the write
    /// lock through the map entry.
    pub async fn resolve(&self, name: &str) -> Arc<IdleController> {
        if let Some(controller) = self.controllers.read().await.get(name) {
            return controller.clone();
        }

        let mut controllers = self.controllers.write().await;
        controllers
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(%name, "registering workload");
                Arc::new(IdleController::new(name, self.backend.clone()))
            })
            .clone()
    }

    /// Names with a registered controller.
    pub async fn names(&self) -> Vec<String> {
        self.controllers.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use lull_backend::{BackendError, BackendResult, WorkloadHandle};

    struct NullBackend;

    #[async_trait]
    impl WorkloadBackend for NullBackend {
        async fn locate(&self, name: &str) -> BackendResult<WorkloadHandle> {
            Err(BackendError::NotFound(name.to_string()))
        }

        async fn query_state(&self, handle: &WorkloadHandle) -> BackendResult<String> {
            Err(BackendError::NotFound(handle.name.clone()))
        }

        async fn start(&self, _handle: &WorkloadHandle) -> BackendResult<()> {
            Ok(())
        }

        async fn stop(&self, _handle: &WorkloadHandle) -> BackendResult<()> {
            Ok(())
        }
    }

    fn registry() -> Arc<WorkloadRegistry> {
        Arc::new(WorkloadRegistry::new(Arc::new(NullBackend)))
    }

    #[tokio::test]
    async fn resolve_returns_same_controller_for_same_name() {
        let registry = registry();

        let a = registry.resolve("web").await;
        let b = registry.resolve("web").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.names().await, vec!["web".to_string()]);
    }

    #[tokio::test]
    async fn distinct_names_get_distinct_controllers() {
        let registry = registry();

        let a = registry.resolve("web").await;
        let b = registry.resolve("db").await;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "web");
        assert_eq!(b.name(), "db");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn racing_touches_for_new_name_create_one_controller() {
        let registry = registry();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(
                async move { registry.resolve("fresh").await },
            ));
        }

        let mut resolved = Vec::new();
        for h in handles {
            resolved.push(h.await.unwrap());
        }
        for c in &resolved[1..] {
            assert!(Arc::ptr_eq(&resolved[0], c));
        }
        assert_eq!(registry.names().await.len(), 1);
    }
}

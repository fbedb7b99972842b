use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::{domain::ClusterId, error::StoreError, protocol::Cluster};
use tracing::debug;

use crate::{groups::GroupManager, store::ClusterStore};

/// Session-scoped cache of group managers, one per cluster id.
///
/// A manager is built from the cluster as it looks on first request and is
/// kept for the rest of the session; later refetches do not reseed it.
#[derive(Default)]
pub struct GroupRegistry {
    managers: Mutex<HashMap<ClusterId, Arc<GroupManager>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn managers(&self) -> MutexGuard<'_, HashMap<ClusterId, Arc<GroupManager>>> {
        self.managers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn manager_for(&self, cluster: &Cluster) -> Arc<GroupManager> {
        let mut managers = self.managers();
        if let Some(manager) = managers.get(&cluster.id) {
            return Arc::clone(manager);
        }
        debug!(cluster_id = %cluster.id, "creating group manager");
        let manager = Arc::new(GroupManager::new(cluster));
        managers.insert(cluster.id.clone(), Arc::clone(&manager));
        manager
    }

    /// Resolves the cluster through the store and returns its manager.
    pub fn manager_for_id(
        &self,
        store: &ClusterStore,
        id: &ClusterId,
    ) -> Result<Arc<GroupManager>, StoreError> {
        if let Some(manager) = self.get(id) {
            return Ok(manager);
        }
        let cluster = store.cluster(id)?;
        Ok(self.manager_for(&cluster))
    }

    pub fn get(&self, id: &ClusterId) -> Option<Arc<GroupManager>> {
        self.managers().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.managers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers().is_empty()
    }
}

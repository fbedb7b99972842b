use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::{domain::ClusterId, error::StoreError, protocol::Cluster};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{filters::Filter, sorting::Sorter, source::ClusterSource};

pub type ClusterSnapshot = Arc<Vec<Arc<Cluster>>>;

pub type ClusterLookup = Result<Arc<Cluster>, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { clusters: usize },
    /// A later `fetch` started before this one finished; its result was dropped.
    Superseded,
}

struct StoreState {
    raw: Vec<Arc<Cluster>>,
    filters: BTreeMap<String, Filter>,
    sorter: Option<Sorter>,
    lookups: HashMap<ClusterId, watch::Sender<ClusterLookup>>,
    latest_fetch: u64,
}

/// Filters and sorters run while the store is locked and must not call back
/// into it.
pub struct ClusterStore {
    source: Arc<dyn ClusterSource>,
    state: Mutex<StoreState>,
    derived: watch::Sender<ClusterSnapshot>,
}

impl ClusterStore {
    pub fn new(source: Arc<dyn ClusterSource>) -> Self {
        let (derived, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            source,
            state: Mutex::new(StoreState {
                raw: Vec::new(),
                filters: BTreeMap::new(),
                sorter: None,
                lookups: HashMap::new(),
                latest_fetch: 0,
            }),
            derived,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Only the most recently started call may apply its result.
    pub async fn fetch(&self) -> Result<FetchOutcome, StoreError> {
        let token = {
            let mut state = self.lock();
            state.latest_fetch += 1;
            state.latest_fetch
        };

        let clusters = match self.source.list_clusters().await {
            Ok(clusters) => clusters,
            Err(err) => {
                let message = format!("{err:#}");
                warn!(error = %message, "cluster fetch failed; keeping previous dataset");
                return Err(StoreError::Transport(message));
            }
        };

        let mut state = self.lock();
        if state.latest_fetch != token {
            warn!(token, latest = state.latest_fetch, "discarding superseded cluster fetch");
            return Ok(FetchOutcome::Superseded);
        }

        let count = clusters.len();
        state.raw = clusters.into_iter().map(Arc::new).collect();
        Self::refresh_lookups(&mut state);
        self.recompute(&state);
        info!(clusters = count, "cluster dataset replaced");
        Ok(FetchOutcome::Applied { clusters: count })
    }

    pub fn observe_all(&self) -> watch::Receiver<ClusterSnapshot> {
        self.derived.subscribe()
    }

    pub fn snapshot(&self) -> ClusterSnapshot {
        self.derived.borrow().clone()
    }

    pub fn cluster(&self, id: &ClusterId) -> ClusterLookup {
        resolve(&self.lock().raw, id)
    }

    pub fn observe_one(&self, id: &ClusterId) -> Result<watch::Receiver<ClusterLookup>, StoreError> {
        let mut state = self.lock();
        let current = resolve(&state.raw, id)?;

        // One channel per id so every view agrees.
        if let Some(sender) = state.lookups.get(id) {
            return Ok(sender.subscribe());
        }

        let (sender, receiver) = watch::channel(Ok(current));
        state.lookups.insert(id.clone(), sender);
        Ok(receiver)
    }

    pub fn add_filter(&self, name: impl Into<String>, filter: Filter) {
        let name = name.into();
        let mut state = self.lock();
        debug!(filter = %name, "installing cluster filter");
        state.filters.insert(name, filter);
        self.recompute(&state);
    }

    pub fn remove_filter(&self, name: &str) {
        let mut state = self.lock();
        if state.filters.remove(name).is_some() {
            debug!(filter = %name, "removed cluster filter");
        }
        self.recompute(&state);
    }

    pub fn filter_names(&self) -> Vec<String> {
        self.lock().filters.keys().cloned().collect()
    }

    pub fn set_sorter(&self, sorter: Sorter) {
        let mut state = self.lock();
        state.sorter = Some(sorter);
        self.recompute(&state);
    }

    pub fn clear_sorter(&self) {
        let mut state = self.lock();
        state.sorter = None;
        self.recompute(&state);
    }

    fn recompute(&self, state: &StoreState) {
        let mut view = state.raw.clone();
        for filter in state.filters.values() {
            view = filter(view);
        }
        if let Some(sorter) = &state.sorter {
            view = sorter(view);
        }
        debug!(
            raw = state.raw.len(),
            derived = view.len(),
            filters = state.filters.len(),
            "recomputed cluster view"
        );
        self.derived.send_replace(Arc::new(view));
    }

    fn refresh_lookups(state: &mut StoreState) {
        state.lookups.retain(|_, sender| sender.receiver_count() > 0);
        for (id, sender) in &state.lookups {
            let next = resolve(&state.raw, id);
            if let Err(err) = &next {
                warn!(cluster_id = %id, error = %err, "observed cluster no longer resolves");
            }
            sender.send_if_modified(|current| {
                let unchanged = match (&*current, &next) {
                    (Ok(previous), Ok(found)) => Arc::ptr_eq(previous, found),
                    (Err(previous), Err(failure)) => previous == failure,
                    _ => false,
                };
                if !unchanged {
                    *current = next.clone();
                }
                !unchanged
            });
        }
    }
}

fn resolve(raw: &[Arc<Cluster>], id: &ClusterId) -> ClusterLookup {
    let mut matches = raw.iter().filter(|cluster| &cluster.id == id);
    match (matches.next(), matches.count()) {
        (Some(cluster), 0) => Ok(Arc::clone(cluster)),
        (None, _) => Err(StoreError::ClusterNotFound { id: id.clone() }),
        (Some(_), others) => Err(StoreError::DuplicateCluster {
            id: id.clone(),
            matches: others + 1,
        }),
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;

use std::sync::Arc;

use shared::protocol::Cluster;

use crate::store::ClusterStore;

/// Pure narrowing step over a cluster collection.
pub type Filter = Arc<dyn Fn(Vec<Arc<Cluster>>) -> Vec<Arc<Cluster>> + Send + Sync>;

pub const PENDING_FILTER: &str = "pending";
pub const COMPLETED_FILTER: &str = "completed";

pub fn predicate<P>(keep: P) -> Filter
where
    P: Fn(&Cluster) -> bool + Send + Sync + 'static,
{
    Arc::new(move |clusters: Vec<Arc<Cluster>>| {
        clusters
            .into_iter()
            .filter(|cluster| keep(cluster))
            .collect()
    })
}

pub fn pending() -> Filter {
    predicate(|cluster| !cluster.is_reviewed())
}

pub fn completed() -> Filter {
    predicate(Cluster::is_reviewed)
}

pub fn min_articles(min: usize) -> Filter {
    predicate(move |cluster| cluster.articles.len() >= min)
}

pub fn name_contains(needle: &str) -> Filter {
    let needle = needle.to_lowercase();
    predicate(move |cluster| cluster.name.to_lowercase().contains(&needle))
}

/// Checkbox pair from the review-state filter dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewFilter {
    pub pending: bool,
    pub completed: bool,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            pending: true,
            completed: true,
        }
    }
}

/// Installs at most one of the review-state filters.
///
/// Both boxes ticked shows everything. An empty selection behaves like
/// pending-only.
pub fn apply_review_filter(store: &ClusterStore, selection: ReviewFilter) {
    match (selection.pending, selection.completed) {
        (true, true) => {
            store.remove_filter(PENDING_FILTER);
            store.remove_filter(COMPLETED_FILTER);
        }
        (false, true) => {
            store.remove_filter(PENDING_FILTER);
            store.add_filter(COMPLETED_FILTER, completed());
        }
        (_, false) => {
            store.remove_filter(COMPLETED_FILTER);
            store.add_filter(PENDING_FILTER, pending());
        }
    }
}

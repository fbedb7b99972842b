//! Client-side core of the cluster triage dashboard.
//!
//! [`ClusterStore`] holds the fetched dataset and publishes a filtered,
//! sorted view of it. [`GroupManager`] tracks how one cluster's articles are
//! split into review groups. Both hand out `tokio::sync::watch` receivers, so
//! a new subscriber sees the current value straight away.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

pub mod config;
pub mod filters;
pub mod groups;
pub mod registry;
pub mod sorting;
pub mod source;
pub mod store;

pub use config::{load_settings, Settings};
pub use filters::{Filter, ReviewFilter};
pub use groups::{Group, GroupManager, Groups};
pub use registry::GroupRegistry;
pub use sorting::{SortDirection, SortKey, SortSpec, Sorter};
pub use source::{ClusterSource, HttpClusterSource, StaticClusterSource};
pub use store::{ClusterLookup, ClusterSnapshot, ClusterStore, FetchOutcome};

/// Adapts a live view into a stream that yields the current value first,
/// then every later change.
pub fn view_stream<T>(view: watch::Receiver<T>) -> WatchStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    WatchStream::new(view)
}

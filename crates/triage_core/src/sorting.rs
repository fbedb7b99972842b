use std::{cmp::Ordering, str::FromStr, sync::Arc};

use shared::protocol::Cluster;
use thiserror::Error;

/// Total reordering of a cluster collection. Only one is active at a time.
pub type Sorter = Arc<dyn Fn(Vec<Arc<Cluster>>) -> Vec<Arc<Cluster>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    ArticleCount,
}

impl SortKey {
    pub fn compare(self, a: &Cluster, b: &Cluster) -> Ordering {
        match self {
            SortKey::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            SortKey::ArticleCount => a.articles.len().cmp(&b.articles.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }

    fn compare(&self, a: &Cluster, b: &Cluster) -> Ordering {
        let ordering = self.key.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseSortSpecError {
    #[error("unknown sort key '{0}' (expected 'name' or 'articles')")]
    UnknownKey(String),
    #[error("unknown sort direction '{0}' (expected 'asc' or 'desc')")]
    UnknownDirection(String),
}

/// Parses `key[:direction]`, e.g. `name`, `articles:desc`.
impl FromStr for SortSpec {
    type Err = ParseSortSpecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (key, direction) = match raw.trim().split_once(':') {
            Some((key, direction)) => (key.trim(), Some(direction.trim())),
            None => (raw.trim(), None),
        };
        let key = match key.to_ascii_lowercase().as_str() {
            "name" => SortKey::Name,
            "articles" | "article_count" | "count" => SortKey::ArticleCount,
            other => return Err(ParseSortSpecError::UnknownKey(other.to_string())),
        };
        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") | Some("ascending") => SortDirection::Ascending,
            Some("desc") | Some("descending") => SortDirection::Descending,
            Some(other) => return Err(ParseSortSpecError::UnknownDirection(other.to_string())),
        };
        Ok(Self { key, direction })
    }
}

/// Wraps a comparator in a stable sort.
pub fn comparator<F>(compare: F) -> Sorter
where
    F: Fn(&Cluster, &Cluster) -> Ordering + Send + Sync + 'static,
{
    Arc::new(move |mut clusters: Vec<Arc<Cluster>>| {
        clusters.sort_by(|a, b| compare(a, b));
        clusters
    })
}

/// Compares by the first key and falls through to the next one on ties.
pub fn sorter_from_specs(specs: &[SortSpec]) -> Sorter {
    let specs = specs.to_vec();
    comparator(move |a, b| {
        specs
            .iter()
            .map(|spec| spec.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ClusterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    NotFound,
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("failed to fetch clusters: {0}")]
    Transport(String),
    #[error("cluster {id} not found")]
    ClusterNotFound { id: ClusterId },
    #[error("cluster id {id} is ambiguous: {matches} clusters match")]
    DuplicateCluster { id: ClusterId, matches: usize },
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Transport(_) => ErrorCode::Transport,
            StoreError::ClusterNotFound { .. } => ErrorCode::NotFound,
            StoreError::DuplicateCluster { .. } => ErrorCode::Conflict,
        }
    }

    /// Transport failures leave stale data visible; lookup violations are faults in the view that raised them.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Transport(_))
    }
}

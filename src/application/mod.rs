//! Application Layer - Use cases
//!
//! - `collector`: full holder snapshots over the paged endpoint
//! - `queries`: basic info and top holders

pub mod collector;
pub mod queries;

use thiserror::Error;

use crate::domain::ValidationError;
use crate::ports::UpstreamError;

pub use collector::{Checkpoint, SnapshotCollector};
pub use queries::{TokenOverview, TokenQueries, BASIC_INFO_HOLDERS, DEFAULT_TOP_HOLDERS};

/// Errors surfaced by the use cases
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Rejected before any upstream call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Upstream failed before any holder page was collected
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Pagination stopped after at least one successful page
    #[error(
        "Pagination interrupted after {} pages ({} holders collected): {source}",
        .checkpoint.pages_fetched,
        .checkpoint.holder_count()
    )]
    PartialData {
        checkpoint: Checkpoint,
        source: UpstreamError,
    },
}

impl MonitorError {
    /// Holders collected before the failure, if any
    pub fn checkpoint(&self) -> Option<&Checkpoint> {
        match self {
            MonitorError::PartialData { checkpoint, .. } => Some(checkpoint),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, MonitorError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_data_display() {
        let err = MonitorError::PartialData {
            checkpoint: Checkpoint {
                holders: Vec::new(),
                next_page_token: Some("page-2".to_string()),
                decimals: Some(18),
                pages_fetched: 1,
            },
            source: UpstreamError::RateLimited,
        };

        let message = err.to_string();
        assert!(message.contains("after 1 pages"));
        assert!(message.contains("Rate limited"));
        assert_eq!(err.checkpoint().unwrap().next_page_token.as_deref(), Some("page-2"));
    }

    #[test]
    fn test_validation_passthrough() {
        let err = MonitorError::from(ValidationError::UnsupportedChain("tron".to_string()));
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Unsupported chain 'tron'");
        assert!(err.checkpoint().is_none());
    }
}

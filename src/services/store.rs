use async_trait::async_trait;
use thiserror::Error;
use crate::models::{FilterSpec, TripCandidate};

/// Errors that can occur when reading the trip catalog
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to the trip catalog
///
/// Implementations must tolerate concurrent queries; the recommender issues
/// at most two per request (strict, then optionally relaxed).
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Return every trip satisfying the hard constraints of `spec`, unordered
    async fn find_candidates(&self, spec: &FilterSpec) -> Result<Vec<TripCandidate>, StoreError>;

    /// Health check for the backing store
    async fn health_check(&self) -> Result<bool, StoreError>;
}

//! Storage layer for the feedback desk
//!
//! Provides the append-only record store abstraction and its implementations.

pub mod csv;
pub mod memory;

use crate::error::Result;
use crate::types::FeedbackRecord;
use async_trait::async_trait;

/// Append-only feedback record store
///
/// Implementations must make `append` atomic with respect to concurrent
/// `append` and `read_all` calls: readers never see a partial record and no
/// appended record is ever lost.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Durably add one record at the end of the store
    async fn append(&self, record: &FeedbackRecord) -> Result<()>;

    /// Every record in insertion order; empty when nothing was ever written
    async fn read_all(&self) -> Result<Vec<FeedbackRecord>>;

    /// Number of stored records
    async fn count(&self) -> Result<usize> {
        Ok(self.read_all().await?.len())
    }
}

pub use self::csv::CsvFeedbackStore;
pub use memory::MemoryFeedbackStore;

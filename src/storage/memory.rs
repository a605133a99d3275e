//! In-process feedback store
//!
//! Keeps records in a vector behind an async lock. Useful for tests and for
//! running the service without a backing file.

use crate::error::Result;
use crate::storage::FeedbackStore;
use crate::types::FeedbackRecord;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryFeedbackStore {
    records: RwLock<Vec<FeedbackRecord>>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records, kept in the given order
    pub fn with_records(records: Vec<FeedbackRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn append(&self, record: &FeedbackRecord) -> Result<()> {
        record.validate()?;
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}

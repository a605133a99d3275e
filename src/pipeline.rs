//! Feedback ingestion
//!
//! validate → stamp → enrich → build record → append → return.
//!
//! Recording the feedback matters more than enriching it: a field whose
//! generation failed is stored as the sentinel and the submission proceeds.

use crate::error::{FeedbackError, Result};
use crate::services::TextEnricher;
use crate::storage::FeedbackStore;
use crate::types::{EnrichmentField, FeedbackRecord, Rating, Timestamp, ENRICHMENT_UNAVAILABLE};
use std::sync::Arc;
use tracing::{info, warn};

pub struct IngestionPipeline {
    enricher: TextEnricher,
    store: Arc<dyn FeedbackStore>,
    sentinel: String,
}

impl IngestionPipeline {
    pub fn new(enricher: TextEnricher, store: Arc<dyn FeedbackStore>) -> Self {
        Self {
            enricher,
            store,
            sentinel: ENRICHMENT_UNAVAILABLE.to_string(),
        }
    }

    /// Replace the text stored for failed enrichment. Blank values are ignored.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        let sentinel = sentinel.into();
        if sentinel.trim().is_empty() {
            warn!("Ignoring blank enrichment sentinel, keeping {:?}", self.sentinel);
        } else {
            self.sentinel = sentinel;
        }
        self
    }

    pub fn store(&self) -> &Arc<dyn FeedbackStore> {
        &self.store
    }

    /// Validate, enrich, and durably record one submission
    ///
    /// Invalid input fails with `FeedbackError::Validation` before the
    /// enricher or the store is touched.
    pub async fn submit(&self, rating: i64, review: &str) -> Result<FeedbackRecord> {
        if review.trim().is_empty() {
            return Err(FeedbackError::validation("Please enter a review before submitting"));
        }
        let rating = Rating::new(rating)?;

        // Submission time, not enrichment completion time
        let timestamp = Timestamp::now();

        let enrichment = self.enricher.enrich(rating, review).await;
        let enriched = enrichment.is_complete();
        let record = FeedbackRecord {
            timestamp,
            rating,
            review: review.to_string(),
            ai_response: self.or_sentinel(EnrichmentField::Response, enrichment.response),
            ai_summary: self.or_sentinel(EnrichmentField::Summary, enrichment.summary),
            ai_recommended_action: self
                .or_sentinel(EnrichmentField::RecommendedAction, enrichment.recommended_action),
        };

        self.store.append(&record).await?;
        info!(
            rating = %record.rating,
            timestamp = %record.timestamp,
            enriched,
            "Feedback recorded"
        );

        Ok(record)
    }

    fn or_sentinel(&self, field: EnrichmentField, result: Result<String>) -> String {
        match result {
            Ok(text) => text,
            Err(e) => {
                warn!(field = %field, error = %e, "Enrichment unavailable, storing sentinel");
                self.sentinel.clone()
            }
        }
    }
}

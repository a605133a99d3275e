//! Common test utilities and helpers

#![allow(dead_code)]

use feedback_desk_core::{
    api::AppState, services::test_utils::ScriptedGenerator, AdminCredential, AdminView,
    CsvFeedbackStore, FeedbackRecord, FeedbackStore, IngestionPipeline, Rating, TextEnricher,
    Timestamp,
};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "correct horse";

/// A CSV store in a fresh temporary directory
///
/// Keep the `TempDir` alive for as long as the store is used.
pub fn create_test_store() -> (TempDir, Arc<CsvFeedbackStore>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(CsvFeedbackStore::new(dir.path().join("feedback.csv")));
    (dir, store)
}

/// Pipeline over `store` whose enrichment comes from `generator`
pub fn create_test_pipeline(
    generator: ScriptedGenerator,
    store: Arc<dyn FeedbackStore>,
) -> IngestionPipeline {
    let enricher = TextEnricher::new(Arc::new(generator), Duration::from_secs(5));
    IngestionPipeline::new(enricher, store)
}

/// Application state over `store` with a known admin password
pub fn create_test_state(
    generator: ScriptedGenerator,
    store: Arc<dyn FeedbackStore>,
) -> AppState {
    let pipeline = create_test_pipeline(generator, store.clone());
    let view = AdminView::new(store);
    let credential = AdminCredential::from_password(Some(ADMIN_PASSWORD.to_string()));
    AppState::new(pipeline, view, credential)
}

/// A fully enriched record submitted at noon on `date`
pub fn sample_record(rating: i64, review: &str, date: (i32, u32, u32)) -> FeedbackRecord {
    let (year, month, day) = date;
    FeedbackRecord {
        timestamp: Timestamp::from_datetime(
            NaiveDate::from_ymd_opt(year, month, day)
                .expect("valid date")
                .and_hms_opt(12, 0, 0)
                .expect("valid time"),
        ),
        rating: Rating::new(rating).expect("valid rating"),
        review: review.to_string(),
        ai_response: format!("Thanks for: {}", review),
        ai_summary: format!("Summary of: {}", review),
        ai_recommended_action: "Follow up".to_string(),
    }
}

//! Feedback Desk - AI-enriched customer feedback service
//!
//! Collects customer feedback, enriches each submission with LLM-generated
//! text, and keeps every submission in an append-only record store with an
//! admin view on top:
//! - Validated ingestion with best-effort enrichment
//! - Append-only CSV store that is safe under concurrent submissions
//! - Deterministic filtering by rating and date
//! - Aggregate analytics and CSV export
//!
//! # Architecture
//!
//! - **Types**: Core data structures (FeedbackRecord, Rating, Timestamp)
//! - **Services**: LLM client and the three-field enricher
//! - **Storage**: Record store trait and its CSV / in-memory backends
//! - **Pipeline**: validate → enrich → append
//! - **Query / Analytics / Admin**: the read side
//! - **API**: HTTP surface over all of the above
//!
//! # Example
//!
//! ```ignore
//! use feedback_desk_core::{CsvFeedbackStore, IngestionPipeline, LlmService, TextEnricher};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> feedback_desk_core::Result<()> {
//!     let llm = Arc::new(LlmService::with_default()?);
//!     let enricher = TextEnricher::new(llm, std::time::Duration::from_secs(30));
//!     let store = Arc::new(CsvFeedbackStore::new("feedback.csv"));
//!     let pipeline = IngestionPipeline::new(enricher, store);
//!
//!     let record = pipeline.submit(5, "Friendly staff, quick service").await?;
//!     println!("{}", record.ai_response);
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod services;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use admin::{AdminReport, AdminView, ViewCriteria};
pub use analytics::{summarize, FeedbackSummary};
pub use auth::{AdminCredential, AdminSession, SessionRegistry};
pub use config::AppConfig;
pub use error::{FeedbackError, Result};
pub use pipeline::IngestionPipeline;
pub use query::{filter, DateRange, RatingSet};
pub use services::{LlmConfig, LlmProvider, LlmService, TextEnricher, TextGenerator};
pub use storage::{CsvFeedbackStore, FeedbackStore, MemoryFeedbackStore};
pub use types::{
    EnrichmentField, FeedbackRecord, Rating, Timestamp, ENRICHMENT_UNAVAILABLE,
    LOW_RATING_THRESHOLD,
};

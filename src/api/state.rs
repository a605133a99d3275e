//! Shared state handed to every request handler

use crate::admin::AdminView;
use crate::auth::{AdminCredential, SessionRegistry};
use crate::config::AppConfig;
use crate::error::Result;
use crate::pipeline::IngestionPipeline;
use crate::services::{LlmService, TextEnricher};
use crate::storage::FeedbackStore;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IngestionPipeline>,
    pub view: Arc<AdminView>,
    pub credential: Arc<AdminCredential>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(pipeline: IngestionPipeline, view: AdminView, credential: AdminCredential) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            view: Arc::new(view),
            credential: Arc::new(credential),
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    /// Wire the CSV store, LLM client and admin credential from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn FeedbackStore> = Arc::new(config.open_store());
        let llm = Arc::new(LlmService::new(config.llm.clone())?);
        let enricher = TextEnricher::new(llm, config.llm.timeout());

        let pipeline = IngestionPipeline::new(enricher, store.clone())
            .with_sentinel(config.enrichment_sentinel.clone());
        let view = AdminView::new(store).with_threshold(config.low_rating_threshold);

        info!(
            "Feedback store at {}, model {}",
            config.data_file.display(),
            config.llm.model
        );

        Ok(Self::new(pipeline, view, config.admin_credential()))
    }
}

//! Feedback submission command

use feedback_desk_core::{error::Result, AppConfig, IngestionPipeline, LlmService, TextEnricher};
use std::sync::Arc;
use tracing::debug;

/// Handle feedback submission command
pub async fn handle(config: &AppConfig, rating: i64, review: String, format: String) -> Result<()> {
    debug!("Submitting feedback to {}", config.data_file.display());

    let store = Arc::new(config.open_store());
    let llm = Arc::new(LlmService::new(config.llm.clone())?);
    let enricher = TextEnricher::new(llm, config.llm.timeout());
    let pipeline =
        IngestionPipeline::new(enricher, store).with_sentinel(config.enrichment_sentinel.clone());

    let record = pipeline.submit(rating, &review).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Thank you for your feedback!");
        println!();
        println!("AI Response:");
        println!("{}", record.ai_response);
    }

    Ok(())
}

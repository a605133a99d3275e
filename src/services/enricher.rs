//! Feedback enrichment
//!
//! Turns a raw review into three derived texts: a reply for the customer, a
//! one-sentence summary for staff, and a recommended next action. Each text
//! comes from its own generation call. The calls run concurrently, are each
//! bounded by a timeout, and fail independently; deciding what to do with a
//! failed field is left to the caller.

use crate::error::{FeedbackError, Result};
use crate::services::llm::{Instruction, TextGenerator};
use crate::types::{EnrichmentField, Rating};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Outcome of one enrichment pass, one result per field
#[derive(Debug)]
pub struct Enrichment {
    pub response: Result<String>,
    pub summary: Result<String>,
    pub recommended_action: Result<String>,
}

impl Enrichment {
    pub fn get(&self, field: EnrichmentField) -> &Result<String> {
        match field {
            EnrichmentField::Response => &self.response,
            EnrichmentField::Summary => &self.summary,
            EnrichmentField::RecommendedAction => &self.recommended_action,
        }
    }

    /// True when every field produced text
    pub fn is_complete(&self) -> bool {
        EnrichmentField::ALL.iter().all(|f| self.get(*f).is_ok())
    }
}

/// Thin adapter between feedback and a text generator
pub struct TextEnricher {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl TextEnricher {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Run all three generations concurrently
    pub async fn enrich(&self, rating: Rating, review: &str) -> Enrichment {
        debug!(model = self.generator.model(), "Enriching feedback");

        let (response, summary, recommended_action) = tokio::join!(
            self.generate_response(rating, review),
            self.generate_summary(review),
            self.generate_recommended_action(review),
        );

        Enrichment {
            response,
            summary,
            recommended_action,
        }
    }

    /// Empathetic reply addressed to the customer
    pub async fn generate_response(&self, rating: Rating, review: &str) -> Result<String> {
        let instruction = Instruction::new(format!(
            "You are a customer support assistant.\n\
             Respond politely and empathetically to the customer review below.\n\n\
             Rating: {}/5\n\
             Review: {}",
            rating, review
        ))
        .with_system("You are a helpful customer support assistant.");

        self.run(EnrichmentField::Response, instruction).await
    }

    /// Neutral one-sentence summary for the admin view
    pub async fn generate_summary(&self, review: &str) -> Result<String> {
        let instruction = Instruction::new(format!(
            "Summarize the following customer review in one concise, neutral sentence:\n{}",
            review
        ));

        self.run(EnrichmentField::Summary, instruction).await
    }

    /// Suggested business follow-up
    pub async fn generate_recommended_action(&self, review: &str) -> Result<String> {
        let instruction = Instruction::new(format!(
            "Based on the customer review below, suggest the most appropriate \
             next action for the business.\n\n\
             Review: {}",
            review
        ));

        self.run(EnrichmentField::RecommendedAction, instruction).await
    }

    /// Phrase that only the instruction for `field` contains
    pub fn prompt_marker(field: EnrichmentField) -> &'static str {
        match field {
            EnrichmentField::Response => "Respond politely and empathetically",
            EnrichmentField::Summary => "Summarize the following customer review",
            EnrichmentField::RecommendedAction => "suggest the most appropriate",
        }
    }

    async fn run(&self, field: EnrichmentField, instruction: Instruction) -> Result<String> {
        let text = match tokio::time::timeout(self.timeout, self.generator.generate(&instruction))
            .await
        {
            Err(_) => {
                return Err(FeedbackError::enrichment(
                    field,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
            Ok(Err(e)) => return Err(FeedbackError::enrichment(field, e)),
            Ok(Ok(text)) => text,
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(FeedbackError::enrichment(field, "empty reply"));
        }
        Ok(trimmed.to_string())
    }
}

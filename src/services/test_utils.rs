//! Test utilities for enrichment
//!
//! A scripted `TextGenerator` that never touches the network. It can fail
//! every call, fail the calls for chosen fields, or stall long enough to trip
//! the enricher's timeout.

use crate::error::{FeedbackError, Result};
use crate::services::enricher::TextEnricher;
use crate::services::llm::{Instruction, TextGenerator};
use crate::types::EnrichmentField;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct ScriptedGenerator {
    reply: String,
    fail_all: bool,
    failing_fields: Vec<EnrichmentField>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    /// Answer every instruction with `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail_all: false,
            failing_fields: Vec::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every instruction, as an unreachable service would
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::replying("")
        }
    }

    /// Fail only the instruction for `field`
    pub fn fail_field(mut self, field: EnrichmentField) -> Self {
        self.failing_fields.push(field);
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of generate calls seen so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, instruction: &Instruction) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let targeted = self
            .failing_fields
            .iter()
            .any(|f| instruction.prompt.contains(TextEnricher::prompt_marker(*f)));

        if self.fail_all || targeted {
            return Err(FeedbackError::LlmApi("scripted failure".to_string()));
        }
        Ok(self.reply.clone())
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

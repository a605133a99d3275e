//! Services layer for the feedback desk
//!
//! Provides LLM integration and the enrichment adapter built on it.

pub mod enricher;
pub mod llm;
pub mod test_utils;

pub use enricher::{Enrichment, TextEnricher};
pub use llm::{Instruction, LlmConfig, LlmProvider, LlmService, TextGenerator};

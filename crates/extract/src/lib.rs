pub mod generate;
pub mod llm;
pub mod normalizer;
pub mod parser;
pub mod prompt;
pub mod question;
pub mod retry;
pub mod schema;

pub use generate::PairGenerator;
pub use llm::{GeneratorConfig, GeneratorProvider, OllamaClient, OpenAiClient, TextGenerator, build_generator};
pub use normalizer::{ActivityNormalizer, truncate_words};
pub use parser::{PairParser, ParseStrategy, ParsedPair};
pub use question::QuestionComposer;
pub use retry::{RetryConfig, RetryPolicy};
pub use schema::{ActivityLabel, Axis, OptionPair, RawPairText};

use anyhow::{Context, Result};
use std::sync::Arc;

/// Turns free-text survey responses into unique activity labels.
pub struct ActivityExtractor {
    generator: Arc<dyn TextGenerator>,
}

impl ActivityExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Extract activities in first-seen order. An empty list is a valid answer.
    pub async fn extract(&self, responses: &str) -> Result<Vec<ActivityLabel>> {
        let prompt = prompt::build_extraction_prompt(responses);

        let output = self
            .generator
            .complete(&prompt)
            .await
            .context("Failed to extract activities")?;

        let activities = ActivityNormalizer::new().normalize_lines(&output);
        tracing::debug!(count = activities.len(), "Extracted activities");

        Ok(activities)
    }
}

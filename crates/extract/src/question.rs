use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

use crate::llm::TextGenerator;
use crate::prompt;
use crate::schema::OptionPair;

/// Phrases a complete pair as a binary-choice question.
#[derive(Clone)]
pub struct QuestionComposer {
    generator: Arc<dyn TextGenerator>,
}

impl QuestionComposer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Callers filter out incomplete pairs first.
    pub async fn compose(&self, pair: &OptionPair) -> Result<String> {
        let prompt = prompt::build_question_prompt(&pair.option_a, &pair.option_b);

        let question = self
            .generator
            .complete(&prompt)
            .await
            .context("Failed to compose survey question")?;

        let question = question.trim();
        if question.is_empty() {
            warn!(
                option_a = %pair.option_a,
                option_b = %pair.option_b,
                "Empty question from generator, using fixed template"
            );
            return Ok(prompt::render_question_template(
                &pair.option_a,
                &pair.option_b,
            ));
        }

        Ok(question.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn trims_generator_output() {
        let composer = QuestionComposer::new(Arc::new(Fixed(
            "\n  Which of the following would you prefer?\nA) Solo run\nB) Running club \n\n",
        )));

        let question = composer
            .compose(&OptionPair::new("Solo run", "Running club"))
            .await
            .unwrap();

        assert_eq!(
            question,
            "Which of the following would you prefer?\nA) Solo run\nB) Running club"
        );
    }

    #[tokio::test]
    async fn imperfect_phrasing_passes_through() {
        let composer = QuestionComposer::new(Arc::new(Fixed("Run alone or with a club?")));

        let question = composer
            .compose(&OptionPair::new("Solo run", "Running club"))
            .await
            .unwrap();

        assert_eq!(question, "Run alone or with a club?");
    }

    #[tokio::test]
    async fn blank_output_falls_back_to_template() {
        let composer = QuestionComposer::new(Arc::new(Fixed("   ")));

        let question = composer
            .compose(&OptionPair::new("Solo run", "Running club"))
            .await
            .unwrap();

        assert!(question.contains("A) Solo run"));
        assert!(question.contains("B) Running club"));
    }
}

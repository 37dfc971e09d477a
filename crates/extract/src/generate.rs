use anyhow::{Context, Result};
use std::sync::Arc;

use crate::llm::TextGenerator;
use crate::prompt;
use crate::schema::{ActivityLabel, Axis, RawPairText};

/// Asks the generator for two variants of an activity along one axis.
///
/// The answer is returned untouched; structure is recovered by the parser.
#[derive(Clone)]
pub struct PairGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl PairGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn generate(&self, activity: &ActivityLabel, axis: Axis) -> Result<RawPairText> {
        let prompt = prompt::build_pair_prompt(activity.as_str(), axis);

        let text = self
            .generator
            .complete(&prompt)
            .await
            .with_context(|| format!("Failed to generate {} pair for '{}'", axis, activity))?;

        Ok(RawPairText(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoAxis;

    #[async_trait]
    impl TextGenerator for EchoAxis {
        async fn complete(&self, prompt: &str) -> Result<String> {
            if prompt.contains("more stressful") {
                Ok("Option_A: Cramming\nOption_B: Leisurely study".to_string())
            } else {
                Ok("Option_A: Solo study\nOption_B: Study group".to_string())
            }
        }
    }

    struct Offline;

    #[async_trait]
    impl TextGenerator for Offline {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn picks_prompt_by_axis() {
        let pairs = PairGenerator::new(Arc::new(EchoAxis));
        let activity = ActivityLabel::new("Studying");

        let stress = pairs.generate(&activity, Axis::StressRelax).await.unwrap();
        let social = pairs.generate(&activity, Axis::SolitarySocial).await.unwrap();

        assert!(stress.as_str().contains("Cramming"));
        assert!(social.as_str().contains("Study group"));
    }

    #[tokio::test]
    async fn generator_errors_name_the_unit() {
        let pairs = PairGenerator::new(Arc::new(Offline));

        let err = pairs
            .generate(&ActivityLabel::new("Hiking"), Axis::SolitarySocial)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("solitary/social"));
        assert!(err.to_string().contains("Hiking"));
    }
}

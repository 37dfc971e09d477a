use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

/// REST operations the publisher needs from a survey host.
#[async_trait]
pub trait SurveyHost: Send + Sync {
    /// Returns the new survey's id.
    async fn create_survey(&self, name: &str) -> Result<String>;

    async fn get_survey_definition(&self, survey_id: &str) -> Result<SurveyDefinition>;

    /// Returns the question id when the host reports one.
    async fn add_question(
        &self,
        survey_id: &str,
        block_id: &str,
        payload: &QuestionPayload,
    ) -> Result<Option<String>>;

    async fn activate_survey(&self, survey_id: &str) -> Result<bool>;

    /// Public anonymous link for a survey.
    fn distribution_link(&self, survey_id: &str) -> String;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyDefinition {
    /// Block ids in host order; the first one is the default block.
    pub block_ids: Vec<String>,
}

/// Single-choice question with two fixed choices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionPayload(serde_json::Value);

impl QuestionPayload {
    /// `position` is 1-based and becomes the export tag `Q{position}`.
    pub fn binary_choice(question_text: &str, position: usize) -> Self {
        Self(json!({
            "QuestionText": question_text,
            "DataExportTag": format!("Q{}", position),
            "QuestionType": "MC",
            "Selector": "SAVR",
            "SubSelector": "TX",
            "Configuration": {
                "QuestionDescriptionOption": "UseText"
            },
            "Choices": {
                "1": { "Display": "Option A" },
                "2": { "Display": "Option B" }
            },
            "Validation": {
                "Settings": {
                    "ForceResponse": "OFF",
                    "Type": "None"
                }
            }
        }))
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

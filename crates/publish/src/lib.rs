pub mod host;
pub mod qualtrics;

pub use host::{QuestionPayload, SurveyDefinition, SurveyHost};
pub use qualtrics::{QualtricsClient, QualtricsConfig};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const SURVEY_NAME: &str = "Personalized Activity Preference Survey";

/// Lifecycle of one published survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStage {
    Created,
    Configured,
    Activated,
    Distributed,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishStage::Created => write!(f, "create"),
            PublishStage::Configured => write!(f, "configure"),
            PublishStage::Activated => write!(f, "activate"),
            PublishStage::Distributed => write!(f, "distribute"),
        }
    }
}

/// Publishing aborted while trying to reach `stage`.
#[derive(Debug, Clone, Error)]
#[error("publishing failed at {stage}: {message}")]
pub struct PublishError {
    pub stage: PublishStage,
    /// Set once the remote survey exists; it is left as-is, not rolled back.
    pub survey_id: Option<String>,
    pub message: String,
}

impl PublishError {
    fn at(stage: PublishStage, survey_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            stage,
            survey_id: survey_id.map(str::to_string),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedSurvey {
    pub survey_id: String,
    pub link: String,
    pub questions_added: usize,
    pub questions_failed: usize,
}

/// Sink for finished questions.
#[async_trait]
pub trait SurveyPublisher: Send + Sync {
    async fn publish(&self, questions: &[String]) -> Result<PublishedSurvey, PublishError>;
}

/// Drives a survey host through create, configure, activate and distribute.
pub struct PublishingAdapter {
    host: Arc<dyn SurveyHost>,
    survey_name: String,
}

impl PublishingAdapter {
    pub fn new(host: Arc<dyn SurveyHost>) -> Self {
        Self {
            host,
            survey_name: SURVEY_NAME.to_string(),
        }
    }

    pub fn with_survey_name(mut self, name: impl Into<String>) -> Self {
        self.survey_name = name.into();
        self
    }

    async fn create(&self) -> Result<(String, String), PublishError> {
        let survey_id = self
            .host
            .create_survey(&self.survey_name)
            .await
            .map_err(|e| PublishError::at(PublishStage::Created, None, format!("{:#}", e)))?;

        let definition = self
            .host
            .get_survey_definition(&survey_id)
            .await
            .map_err(|e| {
                PublishError::at(PublishStage::Created, Some(&survey_id), format!("{:#}", e))
            })?;

        let block_id = definition.block_ids.into_iter().next().ok_or_else(|| {
            PublishError::at(
                PublishStage::Created,
                Some(&survey_id),
                "survey definition has no blocks",
            )
        })?;

        info!(survey_id = %survey_id, block_id = %block_id, "Survey created");
        Ok((survey_id, block_id))
    }

    /// Adds every question; individual failures are logged, not fatal.
    async fn configure(&self, survey_id: &str, block_id: &str, questions: &[String]) -> usize {
        let mut added = 0;

        for (idx, question_text) in questions.iter().enumerate() {
            let payload = QuestionPayload::binary_choice(question_text, idx + 1);

            match self.host.add_question(survey_id, block_id, &payload).await {
                Ok(Some(question_id)) => {
                    added += 1;
                    tracing::debug!(survey_id, question_id = %question_id, "Question added");
                }
                Ok(None) => {
                    added += 1;
                    warn!(
                        survey_id,
                        position = idx + 1,
                        "Question may not have been added properly: no QuestionID returned"
                    );
                }
                Err(e) => {
                    warn!(
                        survey_id,
                        position = idx + 1,
                        error = %e,
                        "Failed to add question, skipping"
                    );
                }
            }
        }

        added
    }
}

#[async_trait]
impl SurveyPublisher for PublishingAdapter {
    async fn publish(&self, questions: &[String]) -> Result<PublishedSurvey, PublishError> {
        let (survey_id, block_id) = self.create().await?;

        let questions_added = self.configure(&survey_id, &block_id, questions).await;
        if questions_added == 0 {
            return Err(PublishError::at(
                PublishStage::Configured,
                Some(&survey_id),
                "no questions could be added",
            ));
        }

        let activated = self.host.activate_survey(&survey_id).await.map_err(|e| {
            PublishError::at(PublishStage::Activated, Some(&survey_id), format!("{:#}", e))
        })?;
        if !activated {
            return Err(PublishError::at(
                PublishStage::Activated,
                Some(&survey_id),
                "host did not activate the survey",
            ));
        }
        info!(survey_id = %survey_id, "Survey activated");

        let link = self.host.distribution_link(&survey_id);
        if link.is_empty() {
            return Err(PublishError::at(
                PublishStage::Distributed,
                Some(&survey_id),
                "no distribution link could be built",
            ));
        }
        info!(survey_id = %survey_id, link = %link, "Survey distributed");

        Ok(PublishedSurvey {
            questions_failed: questions.len() - questions_added,
            survey_id,
            link,
            questions_added,
        })
    }
}

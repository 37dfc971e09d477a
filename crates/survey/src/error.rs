use publish::PublishError;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced to the caller of a survey run.
#[derive(Debug, Clone, Error)]
pub enum SurveyError {
    #[error("no activities could be extracted from the responses")]
    ExtractionEmpty,

    #[error("no survey questions could be generated")]
    NoQuestions,

    #[error("generator failure: {0}")]
    Generation(String),

    #[error(transparent)]
    Publishing(#[from] PublishError),
}

impl SurveyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SurveyError::ExtractionEmpty => "EXTRACTION_EMPTY",
            SurveyError::NoQuestions => "NO_QUESTIONS",
            SurveyError::Generation(_) => "GENERATION_FAILURE",
            SurveyError::Publishing(_) => "PUBLISHING_FAILURE",
        }
    }
}

/// Why a single (activity, axis) unit was dropped. Logged, never returned.
#[derive(Debug, Error)]
pub(crate) enum UnitFailure {
    #[error("generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("no usable Option_A/Option_B pair in generator output")]
    Unparseable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use publish::PublishStage;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SurveyError::ExtractionEmpty.to_string(),
            "no activities could be extracted from the responses"
        );

        let publishing = SurveyError::from(PublishError {
            stage: PublishStage::Activated,
            survey_id: Some("SV_1".to_string()),
            message: "host did not activate the survey".to_string(),
        });
        assert_eq!(
            publishing.to_string(),
            "publishing failed at activate: host did not activate the survey"
        );
        assert_eq!(publishing.error_code(), "PUBLISHING_FAILURE");
    }

    #[test]
    fn unit_failures_keep_context() {
        let err = anyhow::anyhow!("connection reset").context("Failed to generate pair");
        let failure = UnitFailure::Generation(err);

        assert_eq!(
            failure.to_string(),
            "generation failed: Failed to generate pair: connection reset"
        );
    }
}

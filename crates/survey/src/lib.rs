pub mod config;
pub mod error;
pub mod result;

pub use config::PipelineConfig;
pub use error::SurveyError;
pub use result::{RunReport, SurveyResult, SurveyRun};

use error::UnitFailure;
use extract::{
    ActivityExtractor, ActivityLabel, Axis, OptionPair, PairGenerator, PairParser,
    QuestionComposer, TextGenerator,
};
use futures::stream::{self, StreamExt};
use publish::SurveyPublisher;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Output of one (activity, axis) unit that made it through every stage.
struct UnitOutput {
    axis: Axis,
    pair: OptionPair,
    question: String,
}

/// Runs extraction, pair generation, parsing and question composition,
/// then optionally hands the questions to a publisher.
///
/// Without a publisher the assembler never fails: anything that goes wrong
/// shrinks the result instead. With one, empty or failed runs are errors.
pub struct SurveyAssembler {
    extractor: ActivityExtractor,
    pairs: PairGenerator,
    parser: PairParser,
    composer: QuestionComposer,
    publisher: Option<Arc<dyn SurveyPublisher>>,
    config: PipelineConfig,
}

impl SurveyAssembler {
    pub fn new(generator: Arc<dyn TextGenerator>, config: PipelineConfig) -> Self {
        Self {
            extractor: ActivityExtractor::new(generator.clone()),
            pairs: PairGenerator::new(generator.clone()),
            parser: PairParser::new(generator.clone(), config.max_option_words),
            composer: QuestionComposer::new(generator),
            publisher: None,
            config,
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn SurveyPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn is_hosting(&self) -> bool {
        self.publisher.is_some()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn generate_personalized_survey(
        &self,
        responses: &str,
        target_question_count: Option<usize>,
    ) -> Result<SurveyResult, SurveyError> {
        self.run(responses, target_question_count)
            .await
            .map(|run| run.result)
    }

    /// Like [`generate_personalized_survey`](Self::generate_personalized_survey),
    /// but also returns the run's bookkeeping.
    pub async fn run(
        &self,
        responses: &str,
        target_question_count: Option<usize>,
    ) -> Result<SurveyRun, SurveyError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("survey_run", run_id = %run_id, hosting = self.is_hosting());

        self.run_inner(responses, target_question_count)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        responses: &str,
        target_question_count: Option<usize>,
    ) -> Result<SurveyRun, SurveyError> {
        let start = Instant::now();
        let mut report = RunReport::default();
        let mut result = SurveyResult::default();

        // Zero means "no budget", same as leaving it out.
        let target = target_question_count.filter(|n| *n > 0);

        let mut activities = match self.extractor.extract(responses).await {
            Ok(activities) => activities,
            Err(e) if self.is_hosting() => {
                return Err(SurveyError::Generation(format!("{:#}", e)));
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Activity extraction failed");
                Vec::new()
            }
        };
        report.activities_extracted = activities.len();

        if activities.is_empty() {
            if self.is_hosting() {
                return Err(SurveyError::ExtractionEmpty);
            }
            info!("No activities extracted, returning empty survey");
            return Ok(SurveyRun { result, report });
        }

        if let Some(n) = target {
            activities.truncate(n / 2);
        }
        report.activities_processed = activities.len();

        info!(
            extracted = report.activities_extracted,
            processing = report.activities_processed,
            concurrency = self.config.concurrency(),
            "Processing activities"
        );

        let units: Vec<(&ActivityLabel, Axis)> = activities
            .iter()
            .flat_map(|activity| Axis::ALL.into_iter().map(move |axis| (activity, axis)))
            .collect();
        report.units_attempted = units.len();

        // `buffered` yields in submission order, so output stays activity-major.
        let unit_futures: Vec<_> = units
            .into_iter()
            .map(|(activity, axis)| self.run_unit(activity, axis))
            .collect();
        let outcomes: Vec<Option<UnitOutput>> = stream::iter(unit_futures)
            .buffered(self.config.concurrency())
            .collect()
            .await;

        for outcome in outcomes {
            let Some(output) = outcome else {
                report.units_dropped += 1;
                continue;
            };
            match output.axis {
                Axis::StressRelax => result.stress_relax_pairs.push(output.pair),
                Axis::SolitarySocial => result.social_solitary_pairs.push(output.pair),
            }
            result.survey_questions.push(output.question);
        }

        // Cannot fire while activities are capped at n / 2 with two questions each.
        if let Some(n) = target {
            if result.survey_questions.len() > n {
                report.questions_truncated = result.survey_questions.len() - n;
                result.survey_questions.truncate(n);
            }
        }

        info!(
            questions = result.survey_questions.len(),
            units_dropped = report.units_dropped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Survey questions assembled"
        );

        if let Some(publisher) = &self.publisher {
            if result.survey_questions.is_empty() {
                return Err(SurveyError::NoQuestions);
            }

            let published = publisher.publish(&result.survey_questions).await?;
            if published.questions_failed > 0 {
                warn!(
                    survey_id = %published.survey_id,
                    failed = published.questions_failed,
                    "Some questions were not added to the hosted survey"
                );
            }
            result.survey_link = Some(published.link);
            result.survey_id = Some(published.survey_id);
        }

        Ok(SurveyRun { result, report })
    }

    /// One unit under the per-unit timeout. Failures are logged and dropped.
    async fn run_unit(&self, activity: &ActivityLabel, axis: Axis) -> Option<UnitOutput> {
        let timeout = self.config.unit_timeout();

        let outcome = match tokio::time::timeout(timeout, self.process_unit(activity, axis)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(UnitFailure::Timeout(timeout)),
        };

        match outcome {
            Ok(output) => Some(output),
            Err(failure) => {
                warn!(
                    activity = %activity,
                    axis = %axis,
                    reason = %failure,
                    "Dropping activity pair"
                );
                None
            }
        }
    }

    async fn process_unit(
        &self,
        activity: &ActivityLabel,
        axis: Axis,
    ) -> Result<UnitOutput, UnitFailure> {
        let raw = self
            .pairs
            .generate(activity, axis)
            .await
            .map_err(UnitFailure::Generation)?;

        let parsed = self.parser.parse(&raw).await;
        if !parsed.pair.is_complete() {
            return Err(UnitFailure::Unparseable);
        }
        tracing::debug!(
            activity = %activity,
            axis = %axis,
            strategy = ?parsed.strategy,
            "Parsed activity pair"
        );

        // A pair is only kept together with its question.
        let question = self
            .composer
            .compose(&parsed.pair)
            .await
            .map_err(UnitFailure::Generation)?;

        Ok(UnitOutput {
            axis,
            pair: parsed.pair,
            question,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    /// Extraction works; every other call fails.
    struct ExtractOnly;

    #[async_trait]
    impl TextGenerator for ExtractOnly {
        async fn complete(&self, prompt: &str) -> Result<String> {
            if prompt.contains("### User Responses:") {
                Ok("- Reading\n- Yoga".to_string())
            } else {
                anyhow::bail!("rate limited")
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
    async fn standalone_swallows_extraction_failure() {
        let assembler = SurveyAssembler::new(Arc::new(Offline), PipelineConfig::default());

        let run = assembler.run("I like reading", None).await.unwrap();

        assert_eq!(run.result, SurveyResult::default());
        assert_eq!(run.report.activities_extracted, 0);
    }

    #[tokio::test]
    async fn failed_units_are_counted_not_fatal() {
        let assembler = SurveyAssembler::new(Arc::new(ExtractOnly), PipelineConfig::default());

        let run = assembler.run("anything", None).await.unwrap();

        assert!(run.result.survey_questions.is_empty());
        assert_eq!(run.report.activities_extracted, 2);
        assert_eq!(run.report.units_attempted, 4);
        assert_eq!(run.report.units_dropped, 4);
    }

    #[tokio::test]
    async fn small_budget_processes_nothing() {
        let assembler = SurveyAssembler::new(Arc::new(ExtractOnly), PipelineConfig::default());

        let run = assembler.run("anything", Some(1)).await.unwrap();

        assert_eq!(run.report.activities_extracted, 2);
        assert_eq!(run.report.activities_processed, 0);
        assert_eq!(run.report.units_attempted, 0);
    }
}

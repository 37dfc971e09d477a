use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use survey::{SurveyAssembler, SurveyError, SurveyResult};
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};

pub struct AppState {
    pub standalone: Arc<SurveyAssembler>,
    pub hosted: Option<Arc<SurveyAssembler>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(standalone: Arc<SurveyAssembler>, hosted: Option<Arc<SurveyAssembler>>) -> Self {
        Self {
            standalone,
            hosted,
            metrics: Metrics::new(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    hosting: bool,
}

#[derive(Debug, Deserialize)]
pub struct SurveyRequest {
    pub responses: String,
    pub target_question_count: Option<usize>,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("publishing was requested but no survey host is configured")]
    HostingDisabled,

    #[error(transparent)]
    Survey(#[from] SurveyError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::HostingDisabled => StatusCode::BAD_REQUEST,
            ApiError::Survey(SurveyError::ExtractionEmpty | SurveyError::NoQuestions) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Survey(SurveyError::Generation(_) | SurveyError::Publishing(_)) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::HostingDisabled => "HOSTING_DISABLED",
            ApiError::Survey(e) => e.error_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/survey", post(create_survey))
        .route("/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        hosting: state.hosted.is_some(),
    })
}

async fn create_survey(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SurveyRequest>,
) -> Result<Json<SurveyResult>, ApiError> {
    let assembler = if req.publish {
        state.hosted.as_ref().ok_or(ApiError::HostingDisabled)?
    } else {
        &state.standalone
    };

    let timer = TimedOperation::start();
    match assembler.run(&req.responses, req.target_question_count).await {
        Ok(run) => {
            state.metrics.record_success(
                timer.elapsed(),
                run.result.survey_questions.len(),
                &run.report,
            );
            Ok(Json(run.result))
        }
        Err(e) => {
            state.metrics.record_failure(timer.elapsed());
            tracing::error!(error = %e, code = e.error_code(), "Survey run failed");
            Err(e.into())
        }
    }
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use extract::TextGenerator;
    use publish::{PublishError, PublishedSurvey, SurveyPublisher};
    use serde_json::Value;
    use survey::PipelineConfig;
    use tower::ServiceExt;

    /// Answers every prompt like a cooperative model.
    struct HappyGenerator;

    #[async_trait]
    impl TextGenerator for HappyGenerator {
        async fn complete(&self, prompt: &str) -> Result<String> {
            if prompt.contains("valid JSON format") {
                Ok(r#"{"Option_A": "Solo walk", "Option_B": "Group walk"}"#.to_string())
            } else if prompt.contains("You are a survey designer") {
                Ok("Which of the following would you prefer?\nA) Solo walk\nB) Group walk".to_string())
            } else if prompt.contains("### User Responses:") {
                Ok("- Walking".to_string())
            } else {
                Ok("Option_A: Solo walk\nOption_B: Group walk".to_string())
            }
        }
    }

    /// Extracts nothing.
    struct SilentGenerator;

    #[async_trait]
    impl TextGenerator for SilentGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    struct StaticPublisher;

    #[async_trait]
    impl SurveyPublisher for StaticPublisher {
        async fn publish(&self, questions: &[String]) -> Result<PublishedSurvey, PublishError> {
            Ok(PublishedSurvey {
                survey_id: "SV_api".to_string(),
                link: "https://yul1.qualtrics.com/jfe/form/SV_api".to_string(),
                questions_added: questions.len(),
                questions_failed: 0,
            })
        }
    }

    fn state(generator: Arc<dyn TextGenerator>, hosting: bool) -> Arc<AppState> {
        let standalone = Arc::new(SurveyAssembler::new(
            generator.clone(),
            PipelineConfig::default(),
        ));
        let hosted = hosting.then(|| {
            Arc::new(
                SurveyAssembler::new(generator, PipelineConfig::default())
                    .with_publisher(Arc::new(StaticPublisher)),
            )
        });
        Arc::new(AppState::new(standalone, hosted))
    }

    async fn post_survey(state: Arc<AppState>, body: Value) -> (StatusCode, Value) {
        let request = Request::post("/survey")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_standalone_survey() {
        let state = state(Arc::new(HappyGenerator), false);

        let (status, body) =
            post_survey(state.clone(), serde_json::json!({"responses": "I like walks"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["survey_questions"].as_array().unwrap().len(), 2);
        assert_eq!(body["stress_relax_pairs"][0]["Option_A"], "Solo walk");
        assert!(body.get("survey_link").is_none());

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.successful_runs, 1);
        assert_eq!(snapshot.questions_produced, 2);
    }

    #[tokio::test]
    async fn test_hosted_survey_has_link() {
        let state = state(Arc::new(HappyGenerator), true);

        let (status, body) = post_survey(
            state,
            serde_json::json!({"responses": "I like walks", "publish": true}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["survey_id"], "SV_api");
        assert_eq!(body["survey_link"], "https://yul1.qualtrics.com/jfe/form/SV_api");
    }

    #[tokio::test]
    async fn test_publish_without_hosting_is_bad_request() {
        let state = state(Arc::new(HappyGenerator), false);

        let (status, body) = post_survey(
            state,
            serde_json::json!({"responses": "I like walks", "publish": true}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "HOSTING_DISABLED");
    }

    #[tokio::test]
    async fn test_hosted_empty_extraction_is_unprocessable() {
        let state = state(Arc::new(SilentGenerator), true);

        let (status, body) = post_survey(
            state.clone(),
            serde_json::json!({"responses": "", "publish": true}),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "EXTRACTION_EMPTY");
        assert_eq!(state.metrics.snapshot().failed_runs, 1);
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(state(Arc::new(SilentGenerator), true))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["hosting"], true);
    }
}

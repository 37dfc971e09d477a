use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::host::{QuestionPayload, SurveyDefinition, SurveyHost};

pub const DEFAULT_BASE_URL: &str = "https://yul1.qualtrics.com/API/v3";

#[derive(Debug, Clone)]
pub struct QualtricsConfig {
    pub api_token: SecretString,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl QualtricsConfig {
    pub fn new(api_token: SecretString) -> Self {
        Self {
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

pub struct QualtricsClient {
    base_url: String,
    api_token: SecretString,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateSurvey<'a> {
    survey_name: &'a str,
    language: &'a str,
    project_category: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivateSurvey {
    is_active: bool,
}

impl QualtricsClient {
    pub fn new(config: &QualtricsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build Qualtrics HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            client,
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("X-API-TOKEN", self.api_token.expose_secret())
    }
}

/// Survey id from a create response, honouring the host's own status block.
pub fn survey_id_from_create(body: &Value) -> Result<String> {
    if let Some(meta) = body.get("meta") {
        let status = meta.get("httpStatus").and_then(Value::as_str);
        if status.is_some_and(|s| s != "200 - OK") {
            let message = meta
                .pointer("/error/errorMessage")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            anyhow::bail!("Survey creation failed: {}", message);
        }
    }

    body.pointer("/result/SurveyID")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .context("Survey creation response has no SurveyID")
}

pub fn definition_from_body(body: &Value) -> SurveyDefinition {
    let block_ids = body
        .pointer("/result/Blocks")
        .and_then(Value::as_object)
        .map(|blocks| blocks.keys().cloned().collect())
        .unwrap_or_default();

    SurveyDefinition { block_ids }
}

pub fn question_id_from_body(body: &Value) -> Option<String> {
    body.pointer("/result/QuestionID")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Anonymous form link: the API root without its `/API/v3` suffix.
pub fn form_link(base_url: &str, survey_id: &str) -> String {
    if survey_id.is_empty() {
        return String::new();
    }
    let root = base_url.trim_end_matches('/').trim_end_matches("/API/v3");
    format!("{}/jfe/form/{}", root, survey_id)
}

#[async_trait]
impl SurveyHost for QualtricsClient {
    async fn create_survey(&self, name: &str) -> Result<String> {
        let url = format!("{}/survey-definitions", self.base_url);
        let request = CreateSurvey {
            survey_name: name,
            language: "EN",
            project_category: "CORE",
        };

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&request)
            .send()
            .await
            .context("Failed to send create survey request")?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Unreadable create survey response ({})", status))?;
        debug!(status = %status, "Create survey response");

        survey_id_from_create(&body)
    }

    async fn get_survey_definition(&self, survey_id: &str) -> Result<SurveyDefinition> {
        let url = format!("{}/survey-definitions/{}", self.base_url, survey_id);

        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .context("Failed to fetch survey definition")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch survey definition: {}", response.status());
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse survey definition")?;

        Ok(definition_from_body(&body))
    }

    async fn add_question(
        &self,
        survey_id: &str,
        block_id: &str,
        payload: &QuestionPayload,
    ) -> Result<Option<String>> {
        let url = format!("{}/survey-definitions/{}/questions", self.base_url, survey_id);

        let response = self
            .request(reqwest::Method::POST, &url)
            .query(&[("blockId", block_id)])
            .json(payload)
            .send()
            .await
            .context("Failed to send add question request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to add question ({}): {}", status, error_text);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse add question response")?;

        Ok(question_id_from_body(&body))
    }

    async fn activate_survey(&self, survey_id: &str) -> Result<bool> {
        let url = format!("{}/surveys/{}", self.base_url, survey_id);

        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(&ActivateSurvey { is_active: true })
            .send()
            .await
            .context("Failed to send activate survey request")?;

        debug!(status = %response.status(), "Activate survey response");
        Ok(response.status() == reqwest::StatusCode::OK)
    }

    fn distribution_link(&self, survey_id: &str) -> String {
        form_link(&self.base_url, survey_id)
    }
}

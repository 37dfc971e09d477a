use extract::OptionPair;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResult {
    pub stress_relax_pairs: Vec<OptionPair>,
    pub social_solitary_pairs: Vec<OptionPair>,
    pub survey_questions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey_id: Option<String>,
}

impl SurveyResult {
    pub fn is_empty(&self) -> bool {
        self.survey_questions.is_empty()
    }
}

/// Bookkeeping for one run, kept next to the result for logs and metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub activities_extracted: usize,
    pub activities_processed: usize,
    pub units_attempted: usize,
    pub units_dropped: usize,
    pub questions_truncated: usize,
}

#[derive(Debug, Clone)]
pub struct SurveyRun {
    pub result: SurveyResult,
    pub report: RunReport,
}

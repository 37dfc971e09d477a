use serde::{Deserialize, Serialize};
use std::fmt;

/// A short activity name pulled out of free-text responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLabel(String);

impl ActivityLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two axes every activity is varied along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Option_A is the more stressful variant, Option_B the more relaxed one.
    StressRelax,
    /// Option_A is the solitary variant, Option_B the social one.
    SolitarySocial,
}

impl Axis {
    /// Processing order within one activity.
    pub const ALL: [Axis; 2] = [Axis::StressRelax, Axis::SolitarySocial];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::StressRelax => write!(f, "stress/relax"),
            Axis::SolitarySocial => write!(f, "solitary/social"),
        }
    }
}

/// Unparsed generator output for one (activity, axis) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPairText(pub String);

impl RawPairText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionPair {
    #[serde(rename = "Option_A")]
    pub option_a: String,
    #[serde(rename = "Option_B")]
    pub option_b: String,
}

impl OptionPair {
    pub fn new(option_a: impl Into<String>, option_b: impl Into<String>) -> Self {
        Self {
            option_a: option_a.into(),
            option_b: option_b.into(),
        }
    }

    /// The parse-failure sentinel: both fields empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Only complete pairs become survey questions.
    pub fn is_complete(&self) -> bool {
        !self.option_a.trim().is_empty() && !self.option_b.trim().is_empty()
    }
}

//! Coerces free-form pair text from the generator into an [`OptionPair`].
//!
//! Strategies run from cheapest and most precise to most permissive:
//!
//! 1. [`ParseStrategy::DirectJson`]: the raw text is already a JSON object.
//! 2. [`ParseStrategy::ModelJson`]: a second generator call reformats the text;
//!    the widest `{...}` span of its answer is parsed as JSON.
//! 3. [`ParseStrategy::KeyValueLines`]: `Option_A: ...` lines in the
//!    conversion answer, then in the raw text.
//! 4. [`ParseStrategy::FirstLastLines`]: first and last non-empty raw lines.
//!
//! When every level fails the parser hands back [`OptionPair::empty`].

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::llm::TextGenerator;
use crate::normalizer::{strip_list_marker, truncate_words};
use crate::prompt;
use crate::schema::{OptionPair, RawPairText};

const KEY_A: &str = "Option_A";
const KEY_B: &str = "Option_B";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    DirectJson,
    ModelJson,
    KeyValueLines,
    FirstLastLines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPair {
    pub pair: OptionPair,
    /// `None` means every strategy failed and `pair` is the empty sentinel.
    pub strategy: Option<ParseStrategy>,
}

impl ParsedPair {
    fn failed() -> Self {
        Self {
            pair: OptionPair::empty(),
            strategy: None,
        }
    }
}

/// Both keys present as non-blank strings in a JSON object.
pub fn pair_from_json(text: &str) -> Option<OptionPair> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let object = value.as_object()?;
    let option_a = object.get(KEY_A)?.as_str()?;
    let option_b = object.get(KEY_B)?.as_str()?;
    let pair = OptionPair::new(option_a.trim(), option_b.trim());
    pair.is_complete().then_some(pair)
}

/// Greedy brace span: first `{` through last `}`.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn clean_key(key: &str) -> &str {
    strip_list_marker(key).trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c.is_whitespace())
}

fn clean_value(value: &str) -> &str {
    value
        .trim()
        .trim_end_matches(',')
        .trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
}

/// Scan `Key: value` lines for both option keys.
pub fn pair_from_key_values(text: &str) -> Option<OptionPair> {
    let mut option_a = None;
    let mut option_b = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = clean_value(value);
        if value.is_empty() {
            continue;
        }
        match clean_key(key) {
            KEY_A => option_a = Some(value.to_string()),
            KEY_B => option_b = Some(value.to_string()),
            _ => {}
        }
    }

    Some(OptionPair::new(option_a?, option_b?))
}

/// Best-effort guess from the first and last non-empty lines.
pub fn pair_from_first_last(text: &str) -> Option<OptionPair> {
    let mut lines = text
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty());

    let first = lines.next()?;
    let last = lines.last()?;
    (first != last).then(|| OptionPair::new(first, last))
}

pub struct PairParser {
    generator: Arc<dyn TextGenerator>,
    max_words: usize,
}

impl PairParser {
    pub fn new(generator: Arc<dyn TextGenerator>, max_words: usize) -> Self {
        Self {
            generator,
            max_words,
        }
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Run the cascade. Never fails; failure is the empty sentinel.
    pub async fn parse(&self, raw: &RawPairText) -> ParsedPair {
        let raw_text = raw.as_str();

        if let Some(pair) = pair_from_json(raw_text) {
            return self.finish(pair, ParseStrategy::DirectJson);
        }

        let conversion = match self
            .generator
            .complete(&prompt::build_pair_to_json_prompt(raw_text))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "JSON conversion call failed, continuing with text heuristics");
                String::new()
            }
        };

        if let Some(pair) = brace_span(&conversion).and_then(pair_from_json) {
            return self.finish(pair, ParseStrategy::ModelJson);
        }

        if let Some(pair) =
            pair_from_key_values(&conversion).or_else(|| pair_from_key_values(raw_text))
        {
            return self.finish(pair, ParseStrategy::KeyValueLines);
        }

        if let Some(pair) = pair_from_first_last(raw_text) {
            debug!(raw = raw_text, "Falling back to first/last line heuristic");
            return self.finish(pair, ParseStrategy::FirstLastLines);
        }

        warn!(raw = raw_text, "Every parse strategy failed, discarding pair");
        ParsedPair::failed()
    }

    fn finish(&self, pair: OptionPair, strategy: ParseStrategy) -> ParsedPair {
        ParsedPair {
            pair: OptionPair::new(
                truncate_words(&pair.option_a, self.max_words),
                truncate_words(&pair.option_b, self.max_words),
            ),
            strategy: Some(strategy),
        }
    }
}

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::schema::ActivityLabel;

/// Leading bullets ("-", "*", "•", "+") and enumeration ("1.", "2)").
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*•+]+\s*)*(?:\d+[.)]\s*)?").expect("list marker pattern is valid")
});

pub const ELLIPSIS: &str = "...";

/// Strip list decoration and surrounding whitespace from one line.
pub fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim();
    match LIST_MARKER.find(trimmed) {
        Some(m) => trimmed[m.end()..].trim(),
        None => trimmed,
    }
}

/// Keep at most `max_words` words, marking the cut with an ellipsis.
///
/// Text at or under the limit comes back unchanged, which makes the
/// operation idempotent.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        format!("{}{}", words[..max_words].join(" "), ELLIPSIS)
    } else {
        text.to_string()
    }
}

/// Deduplicates activity labels case-insensitively, first casing wins.
pub struct ActivityNormalizer {
    seen: HashSet<String>,
}

impl ActivityNormalizer {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Returns the cleaned label if it has not been seen before.
    pub fn accept(&mut self, line: &str) -> Option<ActivityLabel> {
        let cleaned = strip_list_marker(line);
        if cleaned.is_empty() {
            return None;
        }

        if self.seen.insert(cleaned.to_lowercase()) {
            Some(ActivityLabel::new(cleaned))
        } else {
            None
        }
    }

    /// Split generator output into ordered, unique labels.
    pub fn normalize_lines(&mut self, text: &str) -> Vec<ActivityLabel> {
        text.lines().filter_map(|line| self.accept(line)).collect()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl Default for ActivityNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_stripping() {
        assert_eq!(strip_list_marker("- Yoga"), "Yoga");
        assert_eq!(strip_list_marker("  * Painting  "), "Painting");
        assert_eq!(strip_list_marker("1. Cooking"), "Cooking");
        assert_eq!(strip_list_marker("2) Knitting"), "Knitting");
        assert_eq!(strip_list_marker("- 3. Meditation"), "Meditation");
        assert_eq!(strip_list_marker("• Gardening"), "Gardening");
        assert_eq!(strip_list_marker("Reading a novel"), "Reading a novel");
    }

    #[test]
    fn test_case_insensitive_dedup_keeps_first_casing() {
        let mut normalizer = ActivityNormalizer::new();
        let labels = normalizer.normalize_lines("- Reading\n- reading\n- READING");

        assert_eq!(labels, vec![ActivityLabel::new("Reading")]);
    }

    #[test]
    fn test_order_and_blank_lines() {
        let mut normalizer = ActivityNormalizer::new();
        let labels = normalizer.normalize_lines("\n- Yoga\n\n-   \n2. Cooking\n- yoga\n- Hiking\n");

        let names: Vec<&str> = labels.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, vec!["Yoga", "Cooking", "Hiking"]);
        assert_eq!(normalizer.seen_count(), 3);
    }

    #[test]
    fn test_truncation() {
        assert_eq!(truncate_words("one two three", 5), "one two three");
        assert_eq!(
            truncate_words("one two three four five six seven", 5),
            "one two three four five..."
        );
    }

    #[test]
    fn test_truncation_is_idempotent() {
        let samples = [
            "",
            "short",
            "exactly five words right here",
            "a much longer option text that keeps going and going",
            "  padded   text  with   odd    spacing and more words here  ",
        ];

        for sample in samples {
            for limit in [1, 3, 5, 10] {
                let once = truncate_words(sample, limit);
                assert_eq!(truncate_words(&once, limit), once);
            }
        }
    }
}

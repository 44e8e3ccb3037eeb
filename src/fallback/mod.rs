//! Answer-sufficiency policy deciding when to fall back to web search.
//!
//! The check is deliberately cheap: no model call, no index lookup, only
//! substring markers and a minimum length. It is a heuristic and it
//! over-triggers on short but complete answers ("Yes.").

use crate::core::config::FallbackConfig;

/// Phrases that conventionally signal the model did not find an answer.
pub const DEFAULT_MARKERS: [&str; 8] = [
    "i don't know",
    "not found",
    "not mentioned",
    "uncertain",
    "unable to find",
    "no relevant",
    "cannot",
    "don't have",
];

pub const DEFAULT_MIN_ANSWER_CHARS: usize = 30;

/// Classifies a candidate answer as sufficient or not.
///
/// Implementations must be pure: the same answer always yields the same
/// decision.
pub trait SufficiencyPolicy: Send + Sync {
    fn is_insufficient(&self, answer: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPolicy {
    markers: Vec<String>,
    min_answer_chars: usize,
}

impl MarkerPolicy {
    pub fn new<I, S>(markers: I, min_answer_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .collect(),
            min_answer_chars,
        }
    }

    pub fn from_config(config: &FallbackConfig) -> Self {
        Self::new(&config.markers, config.min_answer_chars)
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn min_answer_chars(&self) -> usize {
        self.min_answer_chars
    }

    fn matched_marker(&self, normalized: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|marker| normalized.contains(marker.as_str()))
            .map(String::as_str)
    }
}

impl Default for MarkerPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS, DEFAULT_MIN_ANSWER_CHARS)
    }
}

impl SufficiencyPolicy for MarkerPolicy {
    fn is_insufficient(&self, answer: &str) -> bool {
        let normalized = answer.to_lowercase();
        if let Some(marker) = self.matched_marker(&normalized) {
            tracing::debug!("Answer matched insufficiency marker {:?}", marker);
            return true;
        }

        // Unicode scalar count, not bytes
        let length = answer.chars().count();
        if length < self.min_answer_chars {
            tracing::debug!(
                "Answer shorter than {} chars ({})",
                self.min_answer_chars,
                length
            );
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_match_is_case_insensitive() {
        let policy = MarkerPolicy::default();
        assert!(policy.is_insufficient("I don't know the answer"));
        assert!(policy.is_insufficient(
            "THE DOCUMENT DOES NOT MENTION IT; IT IS NOT MENTIONED ANYWHERE."
        ));
    }

    #[test]
    fn long_answer_without_markers_is_sufficient() {
        let policy = MarkerPolicy::default();
        assert!(!policy.is_insufficient(
            "Paris is the capital of France and has a population of over two million"
        ));
    }

    #[test]
    fn short_complete_answer_still_triggers() {
        let policy = MarkerPolicy::default();
        assert!(policy.is_insufficient("Yes."));
    }

    #[test]
    fn empty_answer_is_insufficient() {
        assert!(MarkerPolicy::default().is_insufficient(""));
    }

    #[test]
    fn markers_match_as_substrings() {
        let policy = MarkerPolicy::default();
        // "uncertain" inside "uncertainty"
        assert!(policy.is_insufficient(
            "Measurement uncertainty in the 2019 survey was about four percent overall."
        ));
        assert!(policy.is_insufficient(
            "The committee cannot convene before the annual budget has been approved."
        ));
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let policy = MarkerPolicy::new(Vec::<String>::new(), 5);
        // 5 chars, 10 bytes
        assert!(!policy.is_insufficient("ééééé"));
        assert!(policy.is_insufficient("éééé"));
    }

    #[test]
    fn custom_markers_are_lowercased() {
        let policy = MarkerPolicy::new(["Beyond My Knowledge"], 0);
        assert_eq!(policy.markers(), ["beyond my knowledge".to_string()]);
        assert!(policy.is_insufficient("That is beyond my knowledge, sorry."));
        assert!(!policy.is_insufficient("I don't know"));
    }

    #[test]
    fn threshold_is_configurable() {
        let config = FallbackConfig {
            markers: Vec::new(),
            min_answer_chars: 3,
        };
        let policy = MarkerPolicy::from_config(&config);
        assert!(!policy.is_insufficient("Yes."));
        assert!(policy.is_insufficient("No"));
    }

    #[test]
    fn decision_is_stable_across_calls() {
        let policy = MarkerPolicy::default();
        for answer in ["", "Yes.", "I don't know", "A sufficiently long and specific answer."] {
            assert_eq!(policy.is_insufficient(answer), policy.is_insufficient(answer));
        }
    }
}

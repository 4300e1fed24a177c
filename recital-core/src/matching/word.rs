//! Recitation matcher: word-by-word with fuzzy similarity.
//!
//! Words are compared strictly by position. An inserted or dropped spoken
//! word shifts every later comparison; there is no re-alignment.

use serde::{Deserialize, Serialize};

use super::{levenshtein::similarity, MatchResult, Matcher, Verdict};
use crate::text::words::letter_words;

/// Similarity at or above which a non-exact word counts as `Partial`.
pub const DEFAULT_PARTIAL_THRESHOLD: f64 = 0.7;

/// Per-target-word result of a recitation comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAssessment {
    /// Lowercased target word (letters only).
    pub expected: String,
    /// Lowercased spoken word at the same position, if any.
    pub spoken: Option<String>,
    /// Similarity in `[0, 1]`; `0` when nothing was spoken here.
    pub similarity: f64,
    pub verdict: Verdict,
}

impl WordAssessment {
    /// Similarity rounded to a whole percentage for display.
    pub fn similarity_pct(&self) -> u8 {
        (self.similarity * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Positional fuzzy word matcher used for spoken recitation.
#[derive(Debug, Clone, Copy)]
pub struct WordMatcher {
    partial_threshold: f64,
}

impl Default for WordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PARTIAL_THRESHOLD)
    }
}

impl WordMatcher {
    pub fn new(partial_threshold: f64) -> Self {
        Self {
            partial_threshold: partial_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn partial_threshold(&self) -> f64 {
        self.partial_threshold
    }

    pub fn classify(&self, similarity: f64) -> Verdict {
        if similarity >= 1.0 {
            Verdict::Correct
        } else if similarity >= self.partial_threshold {
            Verdict::Partial
        } else {
            Verdict::Incorrect
        }
    }

    /// Compare every target word with the spoken word at the same index.
    pub fn assess(&self, target: &str, candidate: &str) -> Vec<WordAssessment> {
        let spoken = spoken_words(candidate);

        target_words(target)
            .into_iter()
            .enumerate()
            .map(|(i, expected)| match spoken.get(i) {
                Some(word) => {
                    let similarity = similarity(&expected, word);
                    WordAssessment {
                        verdict: self.classify(similarity),
                        expected,
                        spoken: Some(word.clone()),
                        similarity,
                    }
                }
                None => WordAssessment {
                    expected,
                    spoken: None,
                    similarity: 0.0,
                    verdict: Verdict::Incorrect,
                },
            })
            .collect()
    }
}

impl Matcher for WordMatcher {
    fn evaluate(&self, target: &str, candidate: &str) -> MatchResult {
        let assessments = self.assess(target, candidate);
        let spoken_count = spoken_words(candidate).len();
        let complete = !assessments.is_empty()
            && spoken_count == assessments.len()
            && assessments.iter().all(|a| a.verdict.is_correct());

        let per_unit_correct = assessments.iter().map(|a| a.verdict.is_correct()).collect();
        MatchResult::from_units(per_unit_correct, complete)
    }
}

/// Target reduced to lowercase alphabetic words.
pub fn target_words(target: &str) -> Vec<String> {
    letter_words(target)
        .into_iter()
        .map(|w| w.to_lowercase())
        .collect()
}

/// Candidate split on whitespace and lowercased. Punctuation is kept.
pub fn spoken_words(candidate: &str) -> Vec<String> {
    candidate
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

/// [`WordMatcher::assess`] with the default partial threshold.
pub fn assess_words(target: &str, candidate: &str) -> Vec<WordAssessment> {
    WordMatcher::default().assess(target, candidate)
}

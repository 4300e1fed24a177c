//! Candidate-input matching.
//!
//! Two matchers share the [`Matcher`] contract:
//!
//! | Mode | Matcher | Unit | Comparison |
//! |------|---------|------|------------|
//! | dictation | [`CharacterMatcher`] | letter | positional, case-insensitive |
//! | recitation | [`WordMatcher`] | word | positional, Levenshtein similarity |
//!
//! Both are pure and re-entrant: callers run them on every keystroke or
//! transcript update. Empty or malformed input never errors, it just
//! scores 0 and is not complete.

pub mod character;
pub mod levenshtein;
pub mod word;

pub use character::{check_completion, filter_dictation_input, should_auto_space, CharacterMatcher};
pub use levenshtein::{levenshtein, similarity};
pub use word::{assess_words, WordAssessment, WordMatcher, DEFAULT_PARTIAL_THRESHOLD};

use serde::{Deserialize, Serialize};

/// Outcome of comparing a candidate against a target sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// One entry per target unit, `true` where the candidate got it right.
    pub per_unit_correct: Vec<bool>,
    pub total_units: usize,
    pub correct_units: usize,
    /// Percentage in `[0, 100]`. `0` when the target has no units.
    pub accuracy: f64,
    /// Whether the candidate fully reproduces the target.
    pub complete: bool,
}

impl MatchResult {
    pub(crate) fn from_units(per_unit_correct: Vec<bool>, complete: bool) -> Self {
        let total_units = per_unit_correct.len();
        let correct_units = per_unit_correct.iter().filter(|c| **c).count();
        let accuracy = if total_units == 0 {
            0.0
        } else {
            correct_units as f64 / total_units as f64 * 100.0
        };
        Self {
            per_unit_correct,
            total_units,
            correct_units,
            accuracy,
            complete,
        }
    }
}

/// Classification of one compared unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    /// Close enough to count as an attempt (word mode only).
    Partial,
    Incorrect,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

/// Shared entry contract for both practice modes.
pub trait Matcher {
    fn evaluate(&self, target: &str, candidate: &str) -> MatchResult;

    fn is_complete(&self, target: &str, candidate: &str) -> bool {
        self.evaluate(target, candidate).complete
    }
}

/// Which granularity a practice mode compares at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Typed dictation, letter by letter.
    Character,
    /// Spoken recitation, word by word.
    Word,
}

impl MatchMode {
    /// Matcher for this mode. `partial_threshold` only affects word mode.
    pub fn matcher(self, partial_threshold: f64) -> Box<dyn Matcher + Send + Sync> {
        match self {
            MatchMode::Character => Box::new(CharacterMatcher),
            MatchMode::Word => Box::new(WordMatcher::new(partial_threshold)),
        }
    }
}

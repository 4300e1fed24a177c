//! Dictation matcher: letter-by-letter, case-insensitive.
//!
//! Only letters are compared. Target punctuation is ignored and the
//! candidate is expected to be pre-filtered to letters and spaces (see
//! [`filter_dictation_input`]); any other character is skipped rather than
//! treated as an error.

use super::{MatchResult, Matcher};
use crate::text::words::{chars_eq_ignore_case, eq_ignore_case, letter_words, letters_and_spaces};

/// Positional letter matcher used for typed dictation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterMatcher;

impl Matcher for CharacterMatcher {
    fn evaluate(&self, target: &str, candidate: &str) -> MatchResult {
        let typed = typed_letters(candidate);
        let per_unit_correct = target
            .chars()
            .filter(|c| c.is_alphabetic())
            .enumerate()
            .map(|(i, expected)| {
                typed
                    .get(i)
                    .is_some_and(|&got| chars_eq_ignore_case(expected, got))
            })
            .collect();

        MatchResult::from_units(per_unit_correct, check_completion(target, candidate))
    }
}

/// Letters of the candidate with whitespace (and anything non-alphabetic)
/// removed. Index `i` lines up with the `i`-th letter of the target.
pub fn typed_letters(candidate: &str) -> Vec<char> {
    candidate.chars().filter(|c| c.is_alphabetic()).collect()
}

fn typed_words(candidate: &str) -> Vec<String> {
    letters_and_spaces(candidate)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Whether `candidate` spells out every word of `target`.
///
/// Requires at least one target word, equal word counts, and
/// case-insensitive equality of every word pair.
pub fn check_completion(target: &str, candidate: &str) -> bool {
    let expected = letter_words(target);
    let typed = typed_words(candidate);

    !expected.is_empty()
        && expected.len() == typed.len()
        && expected
            .iter()
            .zip(&typed)
            .all(|(e, t)| eq_ignore_case(e, t))
}

/// Whether the caller should append a space after the latest keystroke.
///
/// True only when the candidate does not already end in whitespace, its
/// last word equals the target word at the same position, and more target
/// words remain.
pub fn should_auto_space(target: &str, candidate_so_far: &str) -> bool {
    if candidate_so_far.is_empty() || candidate_so_far.ends_with(char::is_whitespace) {
        return false;
    }

    let expected = letter_words(target);
    let typed = typed_words(candidate_so_far);
    let Some(last) = typed.last() else {
        return false;
    };
    let position = typed.len() - 1;

    position + 1 < expected.len() && eq_ignore_case(&expected[position], last)
}

/// Drop everything except letters and spaces from raw keyboard input.
pub fn filter_dictation_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic() || *c == ' ')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn completion_requires_every_word() {
        assert!(check_completion("The cat sat.", "the cat sat"));
        assert!(!check_completion("The cat sat.", "the cat"));
        assert!(!check_completion("The cat sat.", "the cat sat down"));
        assert!(!check_completion("The cat sat.", "the cat sit"));
    }

    #[test]
    fn completion_ignores_case_punctuation_and_extra_spaces() {
        assert!(check_completion("Don't stop!", "  DONT   stop "));
    }

    #[test]
    fn completion_is_false_for_targets_without_words() {
        assert!(!check_completion("...", ""));
        assert!(!check_completion("", ""));
    }

    #[test]
    fn auto_space_after_completed_word_with_more_remaining() {
        assert!(should_auto_space("The cat sat.", "the"));
        assert!(should_auto_space("The cat sat.", "the CAT"));
    }

    #[test]
    fn no_auto_space_when_already_spaced_incomplete_or_last() {
        assert!(!should_auto_space("The cat sat.", "the "));
        assert!(!should_auto_space("The cat sat.", "th"));
        assert!(!should_auto_space("The cat sat.", "the cat sat"));
        assert!(!should_auto_space("The cat sat.", "tha"));
        assert!(!should_auto_space("The cat sat.", ""));
    }

    #[test]
    fn evaluate_compares_letters_positionally() {
        let result = CharacterMatcher.evaluate("Hi yo.", "hx");
        assert_eq!(result.per_unit_correct, vec![true, false, false, false]);
        assert_eq!(result.total_units, 4);
        assert_eq!(result.correct_units, 1);
        assert_relative_eq!(result.accuracy, 25.0);
        assert!(!result.complete);
    }

    #[test]
    fn evaluate_skips_candidate_spaces_when_indexing() {
        let result = CharacterMatcher.evaluate("The cat.", "the ca");
        assert_eq!(result.correct_units, 5);
        assert!(!result.complete);

        let done = CharacterMatcher.evaluate("The cat.", "the cat");
        assert_relative_eq!(done.accuracy, 100.0);
        assert!(done.complete);
    }

    #[test]
    fn evaluate_empty_inputs_never_panic() {
        let result = CharacterMatcher.evaluate("", "");
        assert_eq!(result.total_units, 0);
        assert_relative_eq!(result.accuracy, 0.0);
        assert!(!result.complete);
    }

    #[test]
    fn filter_keeps_letters_and_plain_spaces() {
        assert_eq!(filter_dictation_input("it's 4 me!\t"), "its  me");
    }
}

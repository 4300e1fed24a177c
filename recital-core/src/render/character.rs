//! Character-mode rendering for dictation.

use super::{ProgressDisplay, RenderToken};
use crate::matching::{character::typed_letters, Verdict};
use crate::text::words::{chars_eq_ignore_case, has_letters, tokenize, Token};

/// Render `target` letter by letter against `candidate`.
///
/// A single letter index runs across the whole sentence; candidate
/// whitespace does not advance it and neither do non-letters inside a
/// target word (they render inline as literals). A correct letter shows the
/// target's own casing, a wrong one shows what was typed.
pub fn render_characters(target: &str, candidate: &str, cursor: Option<usize>) -> ProgressDisplay {
    let typed = typed_letters(candidate);
    let mut tokens = Vec::new();
    let mut letter_index = 0usize;

    for token in tokenize(target) {
        match token {
            Token::Space(_) => tokens.push(RenderToken::space()),
            Token::Word(word) if !has_letters(word) => tokens.push(RenderToken::literal(word)),
            Token::Word(word) => {
                for expected in word.chars() {
                    if !expected.is_alphabetic() {
                        tokens.push(RenderToken::literal(expected.to_string()));
                        continue;
                    }
                    let got = typed.get(letter_index).copied();
                    tokens.push(letter_token(expected, got, cursor == Some(letter_index)));
                    letter_index += 1;
                }
            }
        }
    }

    ProgressDisplay { tokens }
}

fn letter_token(expected: char, got: Option<char>, at_cursor: bool) -> RenderToken {
    if at_cursor {
        return RenderToken::Cursor { overlay: got };
    }
    match got {
        Some(got) if chars_eq_ignore_case(expected, got) => RenderToken::Revealed {
            text: expected.to_string(),
            verdict: Verdict::Correct,
            similarity_pct: None,
        },
        Some(got) => RenderToken::Revealed {
            text: got.to_string(),
            verdict: Verdict::Incorrect,
            similarity_pct: None,
        },
        None => RenderToken::HiddenSlot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Emphasis;

    fn revealed(text: &str, verdict: Verdict) -> RenderToken {
        RenderToken::Revealed {
            text: text.into(),
            verdict,
            similarity_pct: None,
        }
    }

    #[test]
    fn empty_candidate_hides_letters_and_passes_punctuation() {
        let display = render_characters("Hi.", "", None);
        assert_eq!(
            display.tokens,
            vec![
                RenderToken::HiddenSlot,
                RenderToken::HiddenSlot,
                RenderToken::literal("."),
            ]
        );
    }

    #[test]
    fn typed_letters_are_revealed_with_correctness() {
        let display = render_characters("Hi yo.", "hX y", None);
        assert_eq!(display.tokens[0], revealed("H", Verdict::Correct));
        assert_eq!(display.tokens[1], revealed("X", Verdict::Incorrect));
        assert_eq!(
            display.tokens[2],
            RenderToken::Literal {
                text: "\u{00A0}".into(),
                emphasis: Emphasis::Plain
            }
        );
        assert_eq!(display.tokens[3], revealed("y", Verdict::Correct));
        assert_eq!(display.tokens[4], RenderToken::HiddenSlot);
        assert_eq!(display.to_string(), "H[X] y_.");
    }

    #[test]
    fn cursor_replaces_slot_and_overlays_typed_letter() {
        let at_end = render_characters("cat", "ca", Some(2));
        assert_eq!(at_end.tokens[2], RenderToken::Cursor { overlay: None });

        let editing = render_characters("cat", "cat", Some(1));
        assert_eq!(editing.tokens[1], RenderToken::Cursor { overlay: Some('a') });
        assert_eq!(editing.tokens[2], revealed("t", Verdict::Correct));
    }

    #[test]
    fn inner_apostrophe_is_inline_and_takes_no_index() {
        let display = render_characters("Don't", "dont", None);
        assert_eq!(display.to_string(), "Don't");
        assert_eq!(display.tokens[3], RenderToken::literal("'"));
        assert_eq!(display.revealed_count(), 4);
    }

    #[test]
    fn standalone_punctuation_token_is_one_literal() {
        let display = render_characters("a -- b", "", None);
        assert_eq!(display.tokens[2], RenderToken::literal("--"));
        assert_eq!(display.hidden_count(), 2);
    }

    #[test]
    fn overlong_candidate_is_ignored_past_the_target() {
        let display = render_characters("ab", "abcdef", None);
        assert_eq!(display.len(), 2);
        assert_eq!(display.to_string(), "ab");
    }
}

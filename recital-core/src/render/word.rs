//! Word-mode rendering for recitation.

use super::{Emphasis, ProgressDisplay, RenderToken};
use crate::matching::WordMatcher;
use crate::text::words::{has_letters, tokenize, Token};

/// Render `target` word by word against a spoken `candidate`.
///
/// Spoken words replace their target word (with verdict and, when not
/// exact, the similarity percentage). Unspoken words stay visible but
/// dimmed, except the one at `cursor`.
pub fn render_words(
    matcher: &WordMatcher,
    target: &str,
    candidate: &str,
    cursor: Option<usize>,
) -> ProgressDisplay {
    let assessments = matcher.assess(target, candidate);
    let mut tokens = Vec::new();
    let mut word_index = 0usize;

    for token in tokenize(target) {
        match token {
            Token::Space(_) => tokens.push(RenderToken::space()),
            Token::Word(word) if !has_letters(word) => tokens.push(RenderToken::literal(word)),
            Token::Word(word) => {
                let spoken = assessments
                    .get(word_index)
                    .and_then(|a| a.spoken.as_deref().map(|s| (a, s)))
                    .filter(|(_, s)| !s.is_empty());

                let rendered = match spoken {
                    Some((assessment, spoken)) => RenderToken::Revealed {
                        text: spoken.to_string(),
                        verdict: assessment.verdict,
                        similarity_pct: (!assessment.verdict.is_correct())
                            .then(|| assessment.similarity_pct()),
                    },
                    None => RenderToken::Literal {
                        text: word.to_string(),
                        emphasis: if cursor == Some(word_index) {
                            Emphasis::Current
                        } else {
                            Emphasis::Dimmed
                        },
                    },
                };
                tokens.push(rendered);
                word_index += 1;
            }
        }
    }

    ProgressDisplay { tokens }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Verdict;

    fn render(target: &str, candidate: &str, cursor: Option<usize>) -> ProgressDisplay {
        render_words(&WordMatcher::default(), target, candidate, cursor)
    }

    fn dimmed(text: &str) -> RenderToken {
        RenderToken::Literal {
            text: text.into(),
            emphasis: Emphasis::Dimmed,
        }
    }

    #[test]
    fn spoken_words_are_revealed_with_verdicts() {
        let display = render("The cat sat.", "the car", Some(2));
        assert_eq!(
            display.tokens[0],
            RenderToken::Revealed {
                text: "the".into(),
                verdict: Verdict::Correct,
                similarity_pct: None,
            }
        );
        assert_eq!(
            display.tokens[2],
            RenderToken::Revealed {
                text: "car".into(),
                verdict: Verdict::Incorrect,
                similarity_pct: Some(67),
            }
        );
        assert_eq!(
            display.tokens[4],
            RenderToken::Literal {
                text: "sat.".into(),
                emphasis: Emphasis::Current
            }
        );
    }

    #[test]
    fn unspoken_words_are_dimmed_without_cursor() {
        let display = render("One two.", "", None);
        assert_eq!(
            display.tokens,
            vec![dimmed("One"), RenderToken::space(), dimmed("two.")]
        );
    }

    #[test]
    fn partial_words_carry_similarity() {
        let display = render("kitchen", "kitten", None);
        match &display.tokens[0] {
            RenderToken::Revealed {
                verdict,
                similarity_pct,
                ..
            } => {
                assert_eq!(*verdict, Verdict::Partial);
                assert_eq!(*similarity_pct, Some(71));
            }
            other => panic!("expected revealed token, got {other:?}"),
        }
    }

    #[test]
    fn punctuation_tokens_do_not_consume_word_positions() {
        let display = render("wait - now", "wait now", None);
        assert_eq!(display.tokens[2], RenderToken::literal("-"));
        assert_eq!(display.revealed_count(), 2);
        assert_eq!(display.to_string(), "wait - now");
    }
}

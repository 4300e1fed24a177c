//! Sentence segmentation.
//!
//! A document is loaded once and split into a flat, ordered list of
//! punctuation-terminated sentences. Paragraph structure is not kept;
//! [`layout_paragraphs`] recovers it for callers that want it.

pub mod words;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Characters that end a sentence.
const TERMINALS: [char; 3] = ['.', '!', '?'];

/// Number of leading characters of a sentence folded into its id.
const ID_PREFIX_CHARS: usize = 50;

/// One segmented sentence with its stable ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub index: usize,
    pub text: String,
}

impl Sentence {
    pub fn id(&self) -> SentenceId {
        SentenceId::new(self.index, &self.text)
    }

    /// True when there is nothing to speak or practise.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Deterministic key for correlating caller-side input with a sentence
/// across reloads: `"{index}-{first 50 chars of the trimmed text}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(String);

impl SentenceId {
    pub fn new(index: usize, text: &str) -> Self {
        let prefix: String = text.trim().chars().take(ID_PREFIX_CHARS).collect();
        Self(format!("{index}-{prefix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_terminal(c: char) -> bool {
    TERMINALS.contains(&c)
}

/// Split raw text into sentences.
///
/// Breaks on whitespace that directly follows `.`, `!` or `?`. Fragments
/// are trimmed with inner whitespace collapsed to single spaces; empty
/// fragments are dropped and a `.` is appended to any fragment lacking
/// terminal punctuation.
pub fn segment_sentences(raw: &str) -> Vec<Sentence> {
    split_fragments(raw)
        .into_iter()
        .enumerate()
        .map(|(index, text)| Sentence { index, text })
        .collect()
}

fn split_fragments(raw: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut pending_space = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            if current.chars().next_back().is_some_and(is_terminal) {
                push_fragment(&mut fragments, &mut current);
                pending_space = false;
            } else if !current.is_empty() {
                pending_space = true;
            }
            continue;
        }
        if pending_space {
            current.push(' ');
            pending_space = false;
        }
        current.push(c);
    }
    push_fragment(&mut fragments, &mut current);
    fragments
}

fn push_fragment(fragments: &mut Vec<String>, current: &mut String) {
    let mut fragment = std::mem::take(current);
    if fragment.is_empty() {
        return;
    }
    if !fragment.ends_with(is_terminal) {
        fragment.push('.');
    }
    fragments.push(fragment);
}

/// Group sentence indices by paragraph (blank-line separated).
///
/// Each paragraph is segmented on its own and its sentences are matched back
/// to `sentences` by exact text equality, searching forward from the last
/// match so a repeated sentence maps to its next occurrence. Sentences that
/// cannot be matched (e.g. a heading without punctuation that the flat
/// segmentation merged into the following line) are left out.
pub fn layout_paragraphs(raw: &str, sentences: &[Sentence]) -> Vec<Vec<usize>> {
    let mut layout = Vec::new();
    let mut from = 0usize;

    for paragraph in split_paragraphs(raw) {
        let mut indices = Vec::new();
        for local in split_fragments(paragraph) {
            match sentences[from.min(sentences.len())..]
                .iter()
                .position(|s| s.text == local)
            {
                Some(offset) => {
                    let index = from + offset;
                    indices.push(index);
                    from = index + 1;
                }
                None => debug!(sentence = %local, "paragraph sentence not found in document"),
            }
        }
        if !indices.is_empty() {
            layout.push(indices);
        }
    }
    layout
}

fn split_paragraphs(raw: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0usize;
    let mut offset = 0usize;

    for line in raw.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                paragraphs.push(&raw[s..end]);
            }
        } else {
            start.get_or_insert(offset);
            end = offset + line.len();
        }
        offset += line.len();
    }
    if let Some(s) = start {
        paragraphs.push(&raw[s..end]);
    }
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentences: &[Sentence]) -> Vec<&str> {
        sentences.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = segment_sentences("Hi. How are you? Great!  Bye.");
        assert_eq!(texts(&sentences), vec!["Hi.", "How are you?", "Great!", "Bye."]);
        assert_eq!(sentences[2].index, 2);
    }

    #[test]
    fn appends_period_to_unterminated_fragment() {
        let sentences = segment_sentences("First one. trailing words");
        assert_eq!(texts(&sentences), vec!["First one.", "trailing words."]);
    }

    #[test]
    fn punctuation_without_following_whitespace_does_not_split() {
        let sentences = segment_sentences("Version 1.5 is out. e.g.this");
        assert_eq!(texts(&sentences), vec!["Version 1.5 is out.", "e.g.this."]);
    }

    #[test]
    fn collapses_whitespace_and_discards_empty_input() {
        assert!(segment_sentences("   \n\t ").is_empty());
        let sentences = segment_sentences("  A line\nwrapped   here.\n\nNext.");
        assert_eq!(texts(&sentences), vec!["A line wrapped here.", "Next."]);
    }

    #[test]
    fn segmentation_is_deterministic() {
        let raw = "One. Two! Three?\n\nFour.";
        assert_eq!(segment_sentences(raw), segment_sentences(raw));
    }

    #[test]
    fn sentence_id_uses_index_and_trimmed_prefix() {
        let long = format!("  {}  ", "a".repeat(80));
        let id = SentenceId::new(3, &long);
        assert_eq!(id.as_str(), format!("3-{}", "a".repeat(50)));
        assert_eq!(SentenceId::new(0, "Hi."), SentenceId::new(0, " Hi. "));
        assert_ne!(SentenceId::new(0, "Hi."), SentenceId::new(1, "Hi."));
    }

    #[test]
    fn sentence_id_serializes_as_plain_string() {
        let json = serde_json::to_value(SentenceId::new(1, "Bye.")).expect("serialize id");
        assert_eq!(json, "1-Bye.");
    }

    #[test]
    fn layout_groups_sentences_by_paragraph() {
        let raw = "One. Two.\n\nThree.\n\n\nFour. Five.";
        let sentences = segment_sentences(raw);
        let layout = layout_paragraphs(raw, &sentences);
        assert_eq!(layout, vec![vec![0, 1], vec![2], vec![3, 4]]);
    }

    #[test]
    fn layout_maps_repeated_sentences_to_successive_indices() {
        let raw = "Again.\n\nAgain.";
        let sentences = segment_sentences(raw);
        assert_eq!(layout_paragraphs(raw, &sentences), vec![vec![0], vec![1]]);
    }

    #[test]
    fn layout_skips_sentences_merged_across_paragraphs() {
        let raw = "Heading\n\nBody text.";
        let sentences = segment_sentences(raw);
        assert_eq!(texts(&sentences), vec!["Heading Body text."]);
        assert!(layout_paragraphs(raw, &sentences).is_empty());
    }
}

//! Masked progress rendering.
//!
//! Turns `(target, candidate, cursor)` into a flat list of [`RenderToken`]s
//! the UI draws as-is. There is no retained state: every input change
//! re-renders from scratch.
//!
//! ```text
//! target "Hi there."   candidate "hx"   cursor Some(2)   (character mode)
//!
//!   H      i        ␣       t       h     e     r     e     .
//!   ✓      ✗     literal  cursor  slot  slot  slot  slot  literal
//! ```

pub mod character;
pub mod word;

pub use character::render_characters;
pub use word::render_words;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matching::{MatchMode, Verdict, WordMatcher};

/// Rendered in place of every whitespace run in the target.
pub const NON_BREAKING_SPACE: &str = "\u{00A0}";

/// How a literal should be emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    /// Whitespace and punctuation passthrough.
    Plain,
    /// A future word that has not been attempted yet.
    Dimmed,
    /// The word under the cursor.
    Current,
}

/// One drawable unit of the progress display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderToken {
    Literal {
        text: String,
        emphasis: Emphasis,
    },
    /// A target letter the learner has not reached yet.
    HiddenSlot,
    Revealed {
        text: String,
        verdict: Verdict,
        /// Similarity percentage, only for non-correct words.
        #[serde(rename = "similarityPct", skip_serializing_if = "Option::is_none")]
        similarity_pct: Option<u8>,
    },
    /// Insertion point, optionally showing the letter already typed there.
    Cursor {
        #[serde(skip_serializing_if = "Option::is_none")]
        overlay: Option<char>,
    },
}

impl RenderToken {
    pub fn literal(text: impl Into<String>) -> Self {
        RenderToken::Literal {
            text: text.into(),
            emphasis: Emphasis::Plain,
        }
    }

    pub fn space() -> Self {
        Self::literal(NON_BREAKING_SPACE)
    }
}

/// Ordered token list for one sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressDisplay {
    pub tokens: Vec<RenderToken>,
}

impl ProgressDisplay {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderToken> {
        self.tokens.iter()
    }

    pub fn hidden_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, RenderToken::HiddenSlot))
            .count()
    }

    pub fn revealed_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, RenderToken::Revealed { .. }))
            .count()
    }
}

/// Plain-text preview: `_` hidden, `|` cursor, `[x]` incorrect,
/// `{x}` partial.
impl fmt::Display for ProgressDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                RenderToken::Literal { text, .. } => f.write_str(&text.replace('\u{00A0}', " "))?,
                RenderToken::HiddenSlot => f.write_str("_")?,
                RenderToken::Revealed { text, verdict, .. } => match verdict {
                    Verdict::Correct => f.write_str(text)?,
                    Verdict::Partial => write!(f, "{{{text}}}")?,
                    Verdict::Incorrect => write!(f, "[{text}]")?,
                },
                RenderToken::Cursor { overlay } => {
                    f.write_str("|")?;
                    if let Some(c) = overlay {
                        write!(f, "{c}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Renders either mode with a configurable word-similarity threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressRenderer {
    matcher: WordMatcher,
}

impl ProgressRenderer {
    pub fn new(partial_threshold: f64) -> Self {
        Self {
            matcher: WordMatcher::new(partial_threshold),
        }
    }

    /// `cursor` is a letter index in character mode and a word index in
    /// word mode; `None` hides the cursor.
    pub fn render(
        &self,
        mode: MatchMode,
        target: &str,
        candidate: &str,
        cursor: Option<usize>,
    ) -> ProgressDisplay {
        match mode {
            MatchMode::Character => render_characters(target, candidate, cursor),
            MatchMode::Word => render_words(&self.matcher, target, candidate, cursor),
        }
    }
}

/// [`ProgressRenderer::render`] with the default word threshold.
pub fn render_progress(
    mode: MatchMode,
    target: &str,
    candidate: &str,
    cursor: Option<usize>,
) -> ProgressDisplay {
    ProgressRenderer::default().render(mode, target, candidate, cursor)
}

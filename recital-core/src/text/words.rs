//! Letter and word helpers shared by the matchers and the renderer.
//!
//! "Letter" means `char::is_alphabetic`. Everything else (digits,
//! punctuation, apostrophes) is passthrough and never takes part in a
//! comparison.

/// A run of whitespace or a run of non-whitespace from the target text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Space(&'a str),
    Word(&'a str),
}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Token::Space(s) | Token::Word(s) => s,
        }
    }
}

/// Split `text` into alternating whitespace / non-whitespace runs,
/// preserving every byte of the input.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(make_token(&text[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if let Some(space) = in_space {
        tokens.push(make_token(&text[start..], space));
    }
    tokens
}

fn make_token(run: &str, space: bool) -> Token<'_> {
    if space {
        Token::Space(run)
    } else {
        Token::Word(run)
    }
}

pub fn has_letters(s: &str) -> bool {
    s.chars().any(char::is_alphabetic)
}

pub fn letters_only(s: &str) -> String {
    s.chars().filter(|c| c.is_alphabetic()).collect()
}

/// Keep letters and whitespace; everything else is dropped.
pub fn letters_and_spaces(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect()
}

pub fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Target words reduced to their letters, empty ones dropped.
/// `"Don't stop!"` → `["Dont", "stop"]`.
pub fn letter_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(letters_only)
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_preserves_every_run() {
        let tokens = tokenize("Hi,  there.");
        assert_eq!(
            tokens,
            vec![Token::Word("Hi,"), Token::Space("  "), Token::Word("there.")]
        );
        let rebuilt: String = tokens.iter().map(Token::as_str).collect();
        assert_eq!(rebuilt, "Hi,  there.");
    }

    #[test]
    fn tokenize_handles_leading_whitespace_and_empty_input() {
        assert!(tokenize("").is_empty());
        assert_eq!(tokenize(" a"), vec![Token::Space(" "), Token::Word("a")]);
    }

    #[test]
    fn letter_words_strip_punctuation_and_drop_empties() {
        assert_eq!(letter_words("Don't stop — now!"), vec!["Dont", "stop", "now"]);
    }

    #[test]
    fn case_insensitive_comparisons() {
        assert!(chars_eq_ignore_case('A', 'a'));
        assert!(!chars_eq_ignore_case('a', 'b'));
        assert!(eq_ignore_case("The", "tHE"));
        assert!(!eq_ignore_case("the", "then"));
    }

    #[test]
    fn letters_and_spaces_drops_digits_and_marks() {
        assert_eq!(letters_and_spaces("a1 b-c!"), "a bc");
    }
}

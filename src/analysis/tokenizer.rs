//! Word-boundary tokenizer.
//!
//! Tokens are runs of ASCII alphanumerics; punctuation and whitespace are
//! separators. Each token records its position in the token sequence, and
//! the tokenizer can also report the character offset of every match in the
//! pre-tokenization text.

use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::token::Token;

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").expect("word pattern is valid"));

/// A tokenizer that extracts alphanumeric runs as tokens.
#[derive(Clone, Debug, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    /// Create a new word tokenizer.
    pub fn new() -> Self {
        WordTokenizer
    }

    /// Tokenize `text` into position-numbered tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        WORD_PATTERN
            .find_iter(text)
            .enumerate()
            .map(|(position, matched)| Token::new(matched.as_str(), position))
            .collect()
    }

    /// Tokenize `text`, additionally reporting each token's character offset
    /// in the input.
    pub fn tokenize_with_offsets(&self, text: &str) -> Vec<(Token, usize)> {
        WORD_PATTERN
            .find_iter(text)
            .enumerate()
            .map(|(position, matched)| (Token::new(matched.as_str(), position), matched.start()))
            .collect()
    }
}

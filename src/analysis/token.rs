//! Token types produced by the text analysis pipeline.
//!
//! A [`Token`] is the fundamental unit flowing through analysis: the surface
//! form as it appeared in the text, its position among the document's tokens,
//! and the stem used for matching. A [`ProcessedDocument`] bundles the tokens
//! for one document together with the derived statistics the index needs.
//!
//! # Examples
//!
//! ```
//! use threadfin::analysis::token::Token;
//!
//! let token = Token::new("running", 3);
//! assert_eq!(token.text, "running");
//! assert_eq!(token.position, 3);
//! assert_eq!(token.stem, "running"); // stem defaults to the surface form
//! ```

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// A single analyzed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The original surface form of the token.
    pub text: String,

    /// Position of the token among the document's tokens (0-based).
    ///
    /// Positions are assigned at tokenization time and survive stopword
    /// removal unchanged, so gaps in the sequence mark removed stopwords.
    pub position: usize,

    /// The normalized root form used for matching across inflections.
    pub stem: String,
}

impl Token {
    /// Create a new token with the stem initialized to the surface form.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        let text = text.into();
        let stem = text.clone();
        Token {
            text,
            position,
            stem,
        }
    }

    /// Replace the stem of this token.
    pub fn with_stem<S: Into<String>>(mut self, stem: S) -> Self {
        self.stem = stem.into();
        self
    }

    /// Check whether both the surface form and the stem are non-empty after
    /// trimming.
    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && !self.stem.trim().is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// The fully analyzed form of one document, ready for indexing.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedDocument {
    /// Identifier of the source document.
    pub doc_id: String,

    /// Tokens in document order.
    pub tokens: Vec<Token>,

    /// Number of tokens; always equals `tokens.len()`.
    pub token_count: usize,

    /// The distinct stems appearing in this document.
    pub unique_terms: AHashSet<String>,
}

impl ProcessedDocument {
    /// Build a processed document from its tokens, deriving the token count
    /// and unique-term set.
    pub fn new<S: Into<String>>(doc_id: S, tokens: Vec<Token>) -> Self {
        let token_count = tokens.len();
        let unique_terms = tokens.iter().map(|t| t.stem.clone()).collect();
        ProcessedDocument {
            doc_id: doc_id.into(),
            tokens,
            token_count,
            unique_terms,
        }
    }

    /// Check if the document produced no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 0);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 0);
        assert_eq!(token.stem, "hello");
        assert!(token.is_valid());
    }

    #[test]
    fn test_token_with_stem() {
        let token = Token::new("machines", 2).with_stem("machin");
        assert_eq!(token.text, "machines");
        assert_eq!(token.stem, "machin");
    }

    #[test]
    fn test_token_validity() {
        assert!(!Token::new("  ", 0).is_valid());
        assert!(!Token::new("word", 0).with_stem("").is_valid());
    }

    #[test]
    fn test_processed_document_derivation() {
        let tokens = vec![
            Token::new("rust", 0),
            Token::new("search", 1),
            Token::new("rust", 2),
        ];
        let doc = ProcessedDocument::new("doc-1", tokens);

        assert_eq!(doc.token_count, 3);
        assert_eq!(doc.tokens.len(), doc.token_count);
        assert_eq!(doc.unique_terms.len(), 2);
        assert!(doc.unique_terms.contains("rust"));
        assert!(doc.unique_terms.contains("search"));
    }

    #[test]
    fn test_empty_document() {
        let doc = ProcessedDocument::new("doc-1", Vec::new());
        assert!(doc.is_empty());
        assert_eq!(doc.token_count, 0);
        assert!(doc.unique_terms.is_empty());
    }
}

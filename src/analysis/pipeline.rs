//! The text processing pipeline.
//!
//! Documents and queries pass through the same five stages, in order: HTML
//! stripping, lowercasing, tokenization, stopword removal, and stemming.
//! Running the identical pipeline on both sides is what makes query terms
//! match indexed terms.
//!
//! # Examples
//!
//! ```
//! use threadfin::analysis::pipeline::TextProcessor;
//!
//! let processor = TextProcessor::new();
//! let doc = processor.process("p1", "Machine Learning", "<p>Learning about machines.</p>");
//!
//! assert!(doc.unique_terms.contains("machin"));
//! assert!(doc.unique_terms.contains("learn"));
//! ```

use crate::analysis::char_filter::strip_html;
use crate::analysis::stemmer::{PorterStemmer, Stemmer};
use crate::analysis::stop::StopFilter;
use crate::analysis::token::{ProcessedDocument, Token};
use crate::analysis::tokenizer::WordTokenizer;

/// The stateless analysis pipeline shared by indexing and query processing.
#[derive(Clone, Debug)]
pub struct TextProcessor {
    tokenizer: WordTokenizer,
    stop_filter: StopFilter,
    stemmer: PorterStemmer,
}

impl TextProcessor {
    /// Create a processor with the default English stopword set.
    pub fn new() -> Self {
        TextProcessor {
            tokenizer: WordTokenizer::new(),
            stop_filter: StopFilter::new(),
            stemmer: PorterStemmer::new(),
        }
    }

    /// Create a processor with a custom stop filter.
    pub fn with_stop_filter(stop_filter: StopFilter) -> Self {
        TextProcessor {
            tokenizer: WordTokenizer::new(),
            stop_filter,
            stemmer: PorterStemmer::new(),
        }
    }

    /// Analyze a document. Title and content are concatenated (title first)
    /// before tokenization so title terms and content terms share one
    /// position space. Empty input yields an empty document, never an error.
    pub fn process(&self, doc_id: &str, title: &str, content: &str) -> ProcessedDocument {
        let combined = join_title_content(title, content);
        let tokens = self.process_text(&combined);
        ProcessedDocument::new(doc_id, tokens)
    }

    /// Run the full pipeline over a piece of text. Used directly for query
    /// analysis.
    pub fn process_text(&self, text: &str) -> Vec<Token> {
        if text.is_empty() {
            return Vec::new();
        }

        let plain = strip_html(text);
        let lowered = plain.to_lowercase();
        let tokens = self.tokenizer.tokenize(&lowered);
        let tokens = self.stop_filter.filter(tokens);

        tokens
            .into_iter()
            .map(|token| {
                let stem = self.stemmer.stem(&token.text);
                token.with_stem(stem)
            })
            .filter(Token::is_valid)
            .collect()
    }
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenate title and content with a single separating space, tolerating
/// either side being empty.
pub fn join_title_content(title: &str, content: &str) -> String {
    match (title.is_empty(), content.is_empty()) {
        (true, true) => String::new(),
        (true, false) => content.to_string(),
        (false, true) => title.to_string(),
        (false, false) => format!("{title} {content}"),
    }
}

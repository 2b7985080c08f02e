//! Text analysis module for threadfin.
//!
//! Provides the processing pipeline applied to documents and queries alike:
//! HTML stripping, lowercasing, tokenization, stopword removal, and Porter
//! stemming.

pub mod char_filter;
pub mod pipeline;
pub mod stemmer;
pub mod stop;
pub mod token;
pub mod tokenizer;

// Re-export commonly used types
pub use char_filter::strip_html;
pub use pipeline::TextProcessor;
pub use stemmer::{PorterStemmer, Stemmer};
pub use stop::StopFilter;
pub use token::{ProcessedDocument, Token};
pub use tokenizer::WordTokenizer;

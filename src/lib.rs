//! # threadfin
//!
//! A self-hosted text search engine for short forum documents.
//!
//! ## Features
//!
//! - Text-processing pipeline: HTML stripping, tokenization, stopword
//!   removal, Porter stemming
//! - Positional inverted index with atomic JSON persistence
//! - TF-IDF and BM25 relevance, blended with freshness, popularity, and
//!   engagement signals
//! - LRU + TTL query result cache
//! - Prefix autocomplete trie weighted by live query usage
//! - Sliding-window rate limiting

pub mod analysis;
pub mod autocomplete;
pub mod error;
pub mod index;
pub mod limiter;
pub mod ranking;
pub mod search;
pub mod store;

pub use error::{Result, ThreadfinError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

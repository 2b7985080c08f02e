//! The in-memory inverted index.
//!
//! Maps each term (stem) to its postings list and tracks per-document token
//! counts plus the aggregate statistics the rankers need. Mutation is not
//! internally synchronized; the search engine serializes writers behind a
//! lock.

use ahash::AHashMap;

use crate::analysis::token::ProcessedDocument;
use crate::error::{Result, ThreadfinError};
use crate::index::posting::Posting;

/// Statistics about the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    /// Number of indexed documents.
    pub total_documents: usize,

    /// Number of distinct terms.
    pub term_count: usize,

    /// Mean document length in tokens.
    pub average_document_length: f64,
}

/// An inverted index over stemmed tokens.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    /// term → postings, one posting per document containing the term.
    postings: AHashMap<String, Vec<Posting>>,

    /// doc id → token count.
    document_lengths: AHashMap<String, usize>,

    total_documents: usize,
    average_document_length: f64,
}

impl InvertedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        InvertedIndex::default()
    }

    /// Index a processed document. Re-indexing an existing doc id first
    /// removes all of its old postings, so the operation is idempotent.
    pub fn index_document(&mut self, doc: &ProcessedDocument) {
        if self.document_lengths.contains_key(&doc.doc_id) {
            self.remove_document(&doc.doc_id);
        }

        let mut positions_by_term: AHashMap<&str, Vec<usize>> = AHashMap::new();
        for token in &doc.tokens {
            positions_by_term
                .entry(token.stem.as_str())
                .or_default()
                .push(token.position);
        }

        for (term, positions) in positions_by_term {
            let posting = Posting::from_positions(doc.doc_id.clone(), positions);
            self.postings.entry(term.to_string()).or_default().push(posting);
        }

        self.document_lengths
            .insert(doc.doc_id.clone(), doc.token_count);
        self.recompute_stats();
    }

    /// Remove a document from the index. Term keys whose postings lists
    /// become empty are deleted entirely, which keeps document-frequency
    /// counts honest. Returns whether the document was present.
    pub fn remove_document(&mut self, doc_id: &str) -> bool {
        if self.document_lengths.remove(doc_id).is_none() {
            return false;
        }

        self.postings.retain(|_, list| {
            list.retain(|posting| posting.doc_id != doc_id);
            !list.is_empty()
        });

        self.recompute_stats();
        true
    }

    /// Get the postings list for a term; empty if the term is absent.
    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct documents containing the term.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    /// Token count of a document, if indexed.
    pub fn document_length(&self, doc_id: &str) -> Option<usize> {
        self.document_lengths.get(doc_id).copied()
    }

    /// Mean document length in tokens; 0 for an empty index.
    pub fn average_document_length(&self) -> f64 {
        self.average_document_length
    }

    /// Number of indexed documents.
    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Iterate over all indexed terms.
    pub fn all_terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.total_documents,
            term_count: self.postings.len(),
            average_document_length: self.average_document_length,
        }
    }

    /// Validate the data-model invariants. Used when loading a persisted
    /// snapshot; violations are fatal, never silently repaired.
    pub fn validate(&self) -> Result<()> {
        if self.total_documents != self.document_lengths.len() {
            return Err(ThreadfinError::index(format!(
                "total_documents is {} but {} lengths are recorded",
                self.total_documents,
                self.document_lengths.len()
            )));
        }

        let mean = if self.document_lengths.is_empty() {
            0.0
        } else {
            self.document_lengths.values().sum::<usize>() as f64
                / self.document_lengths.len() as f64
        };
        if (mean - self.average_document_length).abs() > 1e-6 {
            return Err(ThreadfinError::index(format!(
                "average_document_length is {} but lengths imply {}",
                self.average_document_length, mean
            )));
        }

        for (doc_id, length) in &self.document_lengths {
            if *length == 0 {
                return Err(ThreadfinError::index(format!(
                    "document {doc_id} has zero length"
                )));
            }
        }

        for (term, list) in &self.postings {
            if list.is_empty() {
                return Err(ThreadfinError::index(format!(
                    "term {term:?} has an empty postings list"
                )));
            }
            for posting in list {
                if !posting.is_consistent() {
                    return Err(ThreadfinError::index(format!(
                        "inconsistent posting for term {term:?} in document {}",
                        posting.doc_id
                    )));
                }
                if !self.document_lengths.contains_key(&posting.doc_id) {
                    return Err(ThreadfinError::index(format!(
                        "posting for term {term:?} references unknown document {}",
                        posting.doc_id
                    )));
                }
            }
        }

        Ok(())
    }

    fn recompute_stats(&mut self) {
        self.total_documents = self.document_lengths.len();
        self.average_document_length = if self.document_lengths.is_empty() {
            0.0
        } else {
            self.document_lengths.values().sum::<usize>() as f64 / self.total_documents as f64
        };
    }

    pub(crate) fn into_parts(self) -> (AHashMap<String, Vec<Posting>>, AHashMap<String, usize>) {
        (self.postings, self.document_lengths)
    }

    pub(crate) fn from_parts(
        postings: AHashMap<String, Vec<Posting>>,
        document_lengths: AHashMap<String, usize>,
    ) -> Self {
        let mut index = InvertedIndex {
            postings,
            document_lengths,
            total_documents: 0,
            average_document_length: 0.0,
        };
        index.recompute_stats();
        index
    }
}

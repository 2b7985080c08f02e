//! Prefix autocomplete over a character trie.
//!
//! The trie holds two weights per term: a corpus `frequency` set when the
//! vocabulary is loaded, and a `query_count` incremented every time a user
//! actually searches the term. Suggestions rank by `frequency +
//! 2 * query_count`, so live usage outweighs static corpus presence.
//!
//! # Examples
//!
//! ```
//! use threadfin::autocomplete::SuggestionTrie;
//!
//! let mut trie = SuggestionTrie::new();
//! trie.add_term("rust", 10);
//! trie.add_term("ruby", 8);
//! trie.record_query("ruby");
//! trie.record_query("ruby");
//!
//! let suggestions = trie.suggestions("ru", 10);
//! assert_eq!(suggestions[0].term, "ruby"); // 8 + 2*2 beats 10
//! ```

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThreadfinError};
use crate::index::persist::write_atomic;

/// One ranked suggestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The completed term.
    pub term: String,

    /// Corpus weight (e.g. document frequency).
    pub frequency: u64,

    /// Number of times the term was searched.
    pub query_count: u64,
}

impl Suggestion {
    /// Ranking weight: live usage counts double.
    fn weight(&self) -> u64 {
        self.frequency + 2 * self.query_count
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: AHashMap<char, TrieNode>,
    terminal: bool,
    frequency: u64,
    query_count: u64,
}

/// A case-insensitive prefix trie of search terms.
#[derive(Debug, Default)]
pub struct SuggestionTrie {
    root: TrieNode,
    term_count: usize,
}

impl SuggestionTrie {
    /// Create an empty trie.
    pub fn new() -> Self {
        SuggestionTrie::default()
    }

    /// Insert a term with its corpus frequency, overwriting any previous
    /// frequency for the same term.
    pub fn add_term(&mut self, term: &str, frequency: u64) {
        let term = term.to_lowercase();
        if term.is_empty() {
            return;
        }
        let (node, created) = self.descend_or_create(&term);
        node.frequency = frequency;
        if created {
            self.term_count += 1;
        }
    }

    /// Record a live query for a term, incrementing its usage weight. The
    /// term is inserted if it was not already present.
    pub fn record_query(&mut self, term: &str) {
        let term = term.to_lowercase();
        if term.is_empty() {
            return;
        }
        let (node, created) = self.descend_or_create(&term);
        node.query_count += 1;
        if created {
            self.term_count += 1;
        }
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.term_count
    }

    /// Check if the trie holds no terms.
    pub fn is_empty(&self) -> bool {
        self.term_count == 0
    }

    /// Reset the whole structure. Individual nodes are never deleted.
    pub fn clear(&mut self) {
        self.root = TrieNode::default();
        self.term_count = 0;
    }

    /// Top `limit` completions of `prefix`, ranked by `frequency +
    /// 2 * query_count` descending. An empty or unknown prefix yields an
    /// empty list.
    pub fn suggestions(&self, prefix: &str, limit: usize) -> Vec<Suggestion> {
        let prefix = prefix.to_lowercase();
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut node = &self.root;
        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }

        let mut collected = self.collect_terminals(node, &prefix);
        collected.sort_by(|a, b| b.weight().cmp(&a.weight()).then_with(|| a.term.cmp(&b.term)));
        collected.truncate(limit);
        collected
    }

    /// Depth-first collection of every terminal under `node`, with an
    /// explicit stack instead of recursion.
    fn collect_terminals(&self, node: &TrieNode, prefix: &str) -> Vec<Suggestion> {
        let mut results = Vec::new();
        let mut stack: Vec<(&TrieNode, String)> = vec![(node, prefix.to_string())];

        while let Some((current, term)) = stack.pop() {
            if current.terminal {
                results.push(Suggestion {
                    term: term.clone(),
                    frequency: current.frequency,
                    query_count: current.query_count,
                });
            }
            for (ch, child) in &current.children {
                let mut next = term.clone();
                next.push(*ch);
                stack.push((child, next));
            }
        }

        results
    }

    /// Persist the trie atomically as a flat entry list.
    pub fn save(&self, path: &Path) -> Result<()> {
        let entries = self.collect_terminals(&self.root, "");
        let json = serde_json::to_string(&entries)?;
        write_atomic(path, json.as_bytes())
    }

    /// Load a trie persisted by [`save`](Self::save). A missing file yields
    /// an empty trie; corrupt content is a fatal storage error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(SuggestionTrie::new());
        }

        let json = fs::read_to_string(path)?;
        let entries: Vec<Suggestion> = serde_json::from_str(&json)
            .map_err(|e| ThreadfinError::storage(format!("malformed trie snapshot: {e}")))?;

        let mut trie = SuggestionTrie::new();
        for entry in entries {
            let (node, created) = trie.descend_or_create(&entry.term);
            node.frequency = entry.frequency;
            node.query_count = entry.query_count;
            if created {
                trie.term_count += 1;
            }
        }
        Ok(trie)
    }

    /// Walk to the node for `term` (already lowercased), creating nodes on
    /// demand. Returns the terminal node and whether the term is new.
    fn descend_or_create(&mut self, term: &str) -> (&mut TrieNode, bool) {
        let mut node = &mut self.root;
        for ch in term.chars() {
            node = node.children.entry(ch).or_default();
        }
        let created = !node.terminal;
        node.terminal = true;
        (node, created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trie() -> SuggestionTrie {
        let mut trie = SuggestionTrie::new();
        trie.add_term("rust", 10);
        trie.add_term("ruby", 4);
        trie.add_term("rules", 6);
        trie.add_term("python", 9);
        trie
    }

    #[test]
    fn test_prefix_matching() {
        let trie = sample_trie();
        let suggestions = trie.suggestions("ru", 10);

        assert_eq!(suggestions.len(), 3);
        assert!(suggestions.iter().all(|s| s.term.starts_with("ru")));
    }

    #[test]
    fn test_ranking_weight() {
        let mut trie = sample_trie();
        // ruby: 4 + 2*4 = 12 beats rust's 10.
        for _ in 0..4 {
            trie.record_query("ruby");
        }

        let suggestions = trie.suggestions("ru", 2);
        assert_eq!(suggestions[0].term, "ruby");
        assert_eq!(suggestions[1].term, "rust");
    }

    #[test]
    fn test_empty_prefix_yields_nothing() {
        let trie = sample_trie();
        assert!(trie.suggestions("", 10).is_empty());
    }

    #[test]
    fn test_unknown_prefix() {
        let trie = sample_trie();
        assert!(trie.suggestions("xyz", 10).is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let mut trie = SuggestionTrie::new();
        trie.add_term("Rust", 5);
        trie.record_query("RUST");

        let suggestions = trie.suggestions("Ru", 10);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].term, "rust");
        assert_eq!(suggestions[0].query_count, 1);
    }

    #[test]
    fn test_limit() {
        let trie = sample_trie();
        assert_eq!(trie.suggestions("ru", 1).len(), 1);
    }

    #[test]
    fn test_record_query_inserts_new_terms() {
        let mut trie = SuggestionTrie::new();
        trie.record_query("borrow");

        assert_eq!(trie.len(), 1);
        let suggestions = trie.suggestions("bor", 10);
        assert_eq!(suggestions[0].query_count, 1);
        assert_eq!(suggestions[0].frequency, 0);
    }

    #[test]
    fn test_clear() {
        let mut trie = sample_trie();
        trie.clear();
        assert!(trie.is_empty());
        assert!(trie.suggestions("ru", 10).is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trie.json");

        let mut trie = sample_trie();
        trie.record_query("rust");
        trie.save(&path).unwrap();

        let loaded = SuggestionTrie::load(&path).unwrap();
        assert_eq!(loaded.len(), 4);

        let suggestions = loaded.suggestions("rust", 1);
        assert_eq!(suggestions[0].frequency, 10);
        assert_eq!(suggestions[0].query_count, 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let trie = SuggestionTrie::load(&dir.path().join("absent.json")).unwrap();
        assert!(trie.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trie.json");
        fs::write(&path, "not json at all").unwrap();

        assert!(matches!(
            SuggestionTrie::load(&path),
            Err(ThreadfinError::Storage(_))
        ));
    }
}

//! Query processing orchestration.
//!
//! [`SearchEngine`] composes the text processor, inverted index, ranker,
//! query cache, and the external document store into the end-to-end query
//! path: cache probe, query analysis, candidate retrieval (OR semantics),
//! ranking, pagination, and snippet generation.
//!
//! The engine is also where the locking discipline lives: the index sits
//! behind a reader-writer lock and the cache behind a mutex (its LRU order
//! mutates even on reads). The component structs themselves stay lock-free.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ahash::AHashSet;
use chrono::Utc;
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::analysis::pipeline::join_title_content;
use crate::analysis::{TextProcessor, strip_html};
use crate::error::{Result, ThreadfinError};
use crate::index::{InvertedIndex, load_index, save_index};
use crate::ranking::{Ranker, RankingConfig};
use crate::search::cache::{CacheConfig, CacheStats, QueryCache};
use crate::search::results::{SearchFilters, SearchHit, SearchResults};
use crate::search::snippet::{DEFAULT_SNIPPET_CONTEXT, generate_snippet};
use crate::store::DocumentStore;

/// Engine configuration, validated once at construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound a requested page size is clamped to.
    pub max_page_size: usize,

    /// Page size used when the caller passes 0.
    pub default_page_size: usize,

    /// Characters of snippet context on each side of the first match.
    pub snippet_context: usize,

    /// Query cache settings.
    pub cache: CacheConfig,

    /// Ranking settings.
    pub ranking: RankingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_page_size: 50,
            default_page_size: 10,
            snippet_context: DEFAULT_SNIPPET_CONTEXT,
            cache: CacheConfig::default(),
            ranking: RankingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.ranking.validate()?;
        if self.max_page_size == 0 {
            return Err(ThreadfinError::config("max_page_size must be >= 1"));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ThreadfinError::config(
                "default_page_size must be within [1, max_page_size]",
            ));
        }
        if self.snippet_context == 0 {
            return Err(ThreadfinError::config("snippet_context must be >= 1"));
        }
        Ok(())
    }
}

/// The top-level query processor.
pub struct SearchEngine {
    processor: TextProcessor,
    index: RwLock<InvertedIndex>,
    cache: Mutex<QueryCache>,
    ranker: Ranker,
    store: Arc<dyn DocumentStore>,
    config: EngineConfig,
}

impl SearchEngine {
    /// Create an engine over an empty index.
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Result<Self> {
        Self::with_index(store, config, InvertedIndex::new())
    }

    /// Create an engine over an existing index.
    pub fn with_index(
        store: Arc<dyn DocumentStore>,
        config: EngineConfig,
        index: InvertedIndex,
    ) -> Result<Self> {
        config.validate()?;
        let ranker = Ranker::new(config.ranking.clone())?;
        let cache = QueryCache::new(&config.cache);
        Ok(SearchEngine {
            processor: TextProcessor::new(),
            index: RwLock::new(index),
            cache: Mutex::new(cache),
            ranker,
            store,
            config,
        })
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the shared text processor.
    pub fn processor(&self) -> &TextProcessor {
        &self.processor
    }

    /// Analyze and index one document, invalidating cached pages.
    pub fn index_document(&self, doc_id: &str, title: &str, content: &str) {
        let processed = self.processor.process(doc_id, title, content);
        self.index.write().index_document(&processed);
        self.cache.lock().invalidate();
    }

    /// Remove a document from the index, invalidating cached pages. Returns
    /// whether the document was indexed.
    pub fn remove_document(&self, doc_id: &str) -> bool {
        let removed = self.index.write().remove_document(doc_id);
        if removed {
            self.cache.lock().invalidate();
        }
        removed
    }

    /// Number of indexed documents.
    pub fn indexed_documents(&self) -> usize {
        self.index.read().total_documents()
    }

    /// Get cumulative cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Drop every cached result page.
    pub fn invalidate_cache(&self) {
        self.cache.lock().invalidate();
    }

    /// Persist the index snapshot atomically.
    pub fn save_index_to(&self, path: &Path) -> Result<()> {
        save_index(&self.index.read(), path)
    }

    /// Load an index snapshot, replacing the in-memory index. A missing file
    /// yields an empty index; a corrupt one is fatal.
    pub fn load_index_from(&self, path: &Path) -> Result<()> {
        let index = load_index(path)?;
        *self.index.write() = index;
        self.cache.lock().invalidate();
        Ok(())
    }

    /// All indexed terms, for seeding autocomplete.
    pub fn vocabulary(&self) -> Vec<(String, usize)> {
        let index = self.index.read();
        index
            .all_terms()
            .map(|term| (term.to_string(), index.document_frequency(term)))
            .collect()
    }

    /// Run the full query path and return one result page.
    pub fn process_query(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
        filters: &SearchFilters,
    ) -> Result<SearchResults> {
        let started = Instant::now();

        let page = page.max(1);
        let page_size = if page_size == 0 {
            self.config.default_page_size
        } else {
            page_size.min(self.config.max_page_size)
        };

        // Cache probe, filtered queries bypass the cache (the key does not
        // encode filters).
        if self.config.cache.enabled && filters.is_empty() {
            if let Some(cached) = self.cache.lock().get(query, page, page_size) {
                debug!("cache hit for query {query:?} page {page}");
                return Ok(cached);
            }
        }

        // Query analysis with the same pipeline documents go through.
        let query_tokens = self.processor.process_text(query);
        let mut query_stems: Vec<String> = Vec::new();
        let mut seen_stems = AHashSet::new();
        for token in &query_tokens {
            if seen_stems.insert(token.stem.clone()) {
                query_stems.push(token.stem.clone());
            }
        }

        let (candidates, ranked) = {
            let index = self.index.read();

            // OR semantics: a document matching any stem is a candidate.
            let mut candidates: Vec<String> = Vec::new();
            let mut seen_docs = AHashSet::new();
            for stem in &query_stems {
                for posting in index.postings(stem) {
                    if seen_docs.insert(posting.doc_id.clone()) {
                        candidates.push(posting.doc_id.clone());
                    }
                }
            }

            let candidates = self.apply_filters(candidates, filters);
            let ranked = self.ranker.rank_documents(
                &index,
                self.store.as_ref(),
                &query_stems,
                &candidates,
                Utc::now(),
            );
            (candidates, ranked)
        };
        debug!(
            "query {query:?}: {} candidates, {} ranked",
            candidates.len(),
            ranked.len()
        );

        let total_count = ranked.len();
        let page_start = (page - 1) * page_size;

        // Highlight both the stems and the surface forms, so verbatim
        // occurrences are emphasized even when stemming shortened the term.
        let mut highlight_terms = query_stems.clone();
        for token in &query_tokens {
            if !highlight_terms.contains(&token.text) {
                highlight_terms.push(token.text.clone());
            }
        }

        let mut hits = Vec::new();
        for scored in ranked.iter().skip(page_start).take(page_size) {
            // The index and the store are kept consistent by the caller; a
            // document that fell out of the store anyway degrades to a
            // skipped hit rather than failing the query.
            let Some(doc) = self.store.get(&scored.doc_id) else {
                warn!(
                    "document {} is indexed but missing from the store, skipping",
                    scored.doc_id
                );
                continue;
            };

            let plain = strip_html(&join_title_content(&doc.title, &doc.content));
            let processed = self.processor.process(&doc.id, &doc.title, &doc.content);
            let snippet = generate_snippet(
                &plain,
                &processed.tokens,
                &query_stems,
                &highlight_terms,
                self.config.snippet_context,
            );

            hits.push(SearchHit {
                doc_id: scored.doc_id.clone(),
                score: scored.score,
                components: scored.components,
                title: doc.title,
                url: doc.url,
                author: doc.author,
                subreddit: doc.subreddit,
                created_utc: doc.created_utc,
                snippet,
            });
        }

        let results = SearchResults {
            results: hits,
            total_count,
            page,
            page_size,
            query_time_ms: started.elapsed().as_millis() as u64,
            query: query.to_string(),
        };

        // Best-effort store; a cache problem must never fail the query.
        if self.config.cache.enabled && filters.is_empty() {
            self.cache.lock().set(query, page, page_size, results.clone());
        }

        Ok(results)
    }

    fn apply_filters(&self, candidates: Vec<String>, filters: &SearchFilters) -> Vec<String> {
        if filters.is_empty() {
            return candidates;
        }

        let documents = self.store.get_many(&candidates);
        candidates
            .into_iter()
            .filter(|doc_id| {
                let Some(doc) = documents.get(doc_id) else {
                    return false;
                };
                if let Some(subreddit) = &filters.subreddit
                    && !doc.subreddit.eq_ignore_ascii_case(subreddit)
                {
                    return false;
                }
                if let Some(author) = &filters.author
                    && !doc.author.eq_ignore_ascii_case(author)
                {
                    return false;
                }
                true
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};

    fn doc(id: &str, title: &str, content: &str, subreddit: &str) -> Document {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            url: format!("https://example.com/{id}"),
            author: "tester".to_string(),
            subreddit: subreddit.to_string(),
            score: 10,
            num_comments: 3,
            created_utc: Utc::now().timestamp(),
        }
    }

    fn engine_with(docs: Vec<Document>) -> SearchEngine {
        let store = Arc::new(MemoryStore::new());
        for d in &docs {
            store.insert(d.clone()).unwrap();
        }
        let engine = SearchEngine::new(store, EngineConfig::default()).unwrap();
        for d in &docs {
            engine.index_document(&d.id, &d.title, &d.content);
        }
        engine
    }

    #[test]
    fn test_basic_query() {
        let engine = engine_with(vec![
            doc("d1", "Rust search", "building a search engine", "rust"),
            doc("d2", "Cooking", "a recipe for bread", "cooking"),
        ]);

        let results = engine
            .process_query("search engine", 1, 10, &SearchFilters::default())
            .unwrap();

        assert_eq!(results.total_count, 1);
        assert_eq!(results.results[0].doc_id, "d1");
        assert!(results.results[0].snippet.contains("**search**"));
    }

    #[test]
    fn test_or_semantics_dedupes_candidates() {
        let engine = engine_with(vec![
            doc("d1", "", "alpha beta", "misc"),
            doc("d2", "", "alpha only", "misc"),
            doc("d3", "", "beta only", "misc"),
        ]);

        let results = engine
            .process_query("alpha beta", 1, 10, &SearchFilters::default())
            .unwrap();

        assert_eq!(results.total_count, 3);
    }

    #[test]
    fn test_page_clamping() {
        let engine = engine_with(vec![doc("d1", "", "alpha", "misc")]);

        let results = engine
            .process_query("alpha", 0, 9999, &SearchFilters::default())
            .unwrap();

        assert_eq!(results.page, 1);
        assert_eq!(results.page_size, 50);
    }

    #[test]
    fn test_cache_hit_path() {
        let engine = engine_with(vec![doc("d1", "", "alpha", "misc")]);

        let first = engine
            .process_query("alpha", 1, 10, &SearchFilters::default())
            .unwrap();
        let second = engine
            .process_query("alpha", 1, 10, &SearchFilters::default())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.cache_stats().hits, 1);
    }

    #[test]
    fn test_indexing_invalidates_cache() {
        let engine = engine_with(vec![doc("d1", "", "alpha", "misc")]);
        engine
            .process_query("alpha", 1, 10, &SearchFilters::default())
            .unwrap();

        engine.index_document("d2", "", "alpha again");

        assert_eq!(engine.cache_stats().size, 0);
    }

    #[test]
    fn test_subreddit_filter() {
        let engine = engine_with(vec![
            doc("d1", "", "alpha", "rust"),
            doc("d2", "", "alpha", "golang"),
        ]);

        let filters = SearchFilters {
            subreddit: Some("rust".to_string()),
            author: None,
        };
        let results = engine.process_query("alpha", 1, 10, &filters).unwrap();

        assert_eq!(results.total_count, 1);
        assert_eq!(results.results[0].doc_id, "d1");
    }

    #[test]
    fn test_missing_store_document_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.insert(doc("d1", "", "alpha", "misc")).unwrap();
        let engine = SearchEngine::new(store, EngineConfig::default()).unwrap();
        engine.index_document("d1", "", "alpha");
        engine.index_document("ghost", "", "alpha");

        let results = engine
            .process_query("alpha", 1, 10, &SearchFilters::default())
            .unwrap();

        // "ghost" never made it into the store; the query still succeeds.
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].doc_id, "d1");
    }

    #[test]
    fn test_empty_query() {
        let engine = engine_with(vec![doc("d1", "", "alpha", "misc")]);

        let results = engine
            .process_query("", 1, 10, &SearchFilters::default())
            .unwrap();

        assert_eq!(results.total_count, 0);
        assert!(results.results.is_empty());
    }
}

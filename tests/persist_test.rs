//! Persistence round-trips through the public API.

use std::fs;
use std::sync::Arc;

use chrono::Utc;

use threadfin::autocomplete::SuggestionTrie;
use threadfin::error::ThreadfinError;
use threadfin::search::{EngineConfig, SearchEngine, SearchFilters};
use threadfin::store::{Document, MemoryStore};

fn doc(id: &str, content: &str) -> Document {
    Document {
        id: id.to_string(),
        title: String::new(),
        content: content.to_string(),
        url: String::new(),
        author: "author".to_string(),
        subreddit: "programming".to_string(),
        score: 3,
        num_comments: 1,
        created_utc: Utc::now().timestamp(),
    }
}

#[test]
fn index_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let store = Arc::new(MemoryStore::new());
    store.insert(doc("d1", "persistent search data")).unwrap();
    store.insert(doc("d2", "other data")).unwrap();

    let engine = SearchEngine::new(store.clone(), EngineConfig::default()).unwrap();
    engine.index_document("d1", "", "persistent search data");
    engine.index_document("d2", "", "other data");
    engine.save_index_to(&path).unwrap();

    let reloaded = SearchEngine::new(store, EngineConfig::default()).unwrap();
    reloaded.load_index_from(&path).unwrap();

    assert_eq!(reloaded.indexed_documents(), 2);
    let results = reloaded
        .process_query("persistent", 1, 10, &SearchFilters::default())
        .unwrap();
    assert_eq!(results.total_count, 1);
    assert_eq!(results.results[0].doc_id, "d1");
}

#[test]
fn missing_index_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let engine = SearchEngine::new(store, EngineConfig::default()).unwrap();

    engine
        .load_index_from(&dir.path().join("absent.json"))
        .unwrap();

    assert_eq!(engine.indexed_documents(), 0);
}

#[test]
fn corrupt_index_file_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    fs::write(&path, "{\"version\": 1, \"postings\": 7}").unwrap();

    let store = Arc::new(MemoryStore::new());
    let engine = SearchEngine::new(store, EngineConfig::default()).unwrap();

    assert!(matches!(
        engine.load_index_from(&path),
        Err(ThreadfinError::Storage(_))
    ));
}

#[test]
fn trie_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trie.json");

    let mut trie = SuggestionTrie::new();
    trie.add_term("rust", 12);
    trie.add_term("ruby", 7);
    trie.record_query("ruby");
    trie.save(&path).unwrap();

    let loaded = SuggestionTrie::load(&path).unwrap();
    let suggestions = loaded.suggestions("ru", 10);

    assert_eq!(suggestions.len(), 2);
    assert!(suggestions.iter().all(|s| s.term.starts_with("ru")));
    let ruby = suggestions.iter().find(|s| s.term == "ruby").unwrap();
    assert_eq!(ruby.frequency, 7);
    assert_eq!(ruby.query_count, 1);
}

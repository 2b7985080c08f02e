//! Document metadata store.
//!
//! The engine treats document storage as an external collaborator and only
//! depends on the read-only [`DocumentStore`] boundary. [`MemoryStore`] is
//! the in-process implementation used by the CLI and tests.

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThreadfinError};

/// A forum post or comment with the metadata ranking and snippets need.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier.
    pub id: String,

    /// Post title. Empty for comments.
    #[serde(default)]
    pub title: String,

    /// Body text, possibly containing HTML.
    #[serde(default)]
    pub content: String,

    /// Link to the original post.
    #[serde(default)]
    pub url: String,

    /// Author name.
    #[serde(default)]
    pub author: String,

    /// Community the post belongs to.
    #[serde(default)]
    pub subreddit: String,

    /// Vote score; may be negative.
    #[serde(default)]
    pub score: i64,

    /// Number of comments on the post.
    #[serde(default)]
    pub num_comments: u32,

    /// Creation time, seconds since the Unix epoch.
    #[serde(default)]
    pub created_utc: i64,
}

/// Read-only access to document metadata.
pub trait DocumentStore: Send + Sync {
    /// Fetch one document; `None` when absent.
    fn get(&self, doc_id: &str) -> Option<Document>;

    /// Fetch several documents at once. Absent ids are simply missing from
    /// the returned map.
    fn get_many(&self, doc_ids: &[String]) -> AHashMap<String, Document> {
        doc_ids
            .iter()
            .filter_map(|id| self.get(id).map(|doc| (id.clone(), doc)))
            .collect()
    }
}

/// In-memory document store with an optional capacity bound.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<AHashMap<String, Document>>,
    max_documents: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Create a store that rejects inserts past `max_documents`.
    pub fn with_capacity_limit(max_documents: usize) -> Self {
        MemoryStore {
            documents: RwLock::new(AHashMap::new()),
            max_documents: Some(max_documents),
        }
    }

    /// Insert or replace a document. Inserting a new document into a full
    /// store fails that single write.
    pub fn insert(&self, doc: Document) -> Result<()> {
        let mut documents = self.documents.write();
        if let Some(max) = self.max_documents
            && documents.len() >= max
            && !documents.contains_key(&doc.id)
        {
            return Err(ThreadfinError::resource_exhausted(format!(
                "document store is at capacity ({max})"
            )));
        }
        documents.insert(doc.id.clone(), doc);
        Ok(())
    }

    /// Remove a document, returning it if present.
    pub fn remove(&self, doc_id: &str) -> Option<Document> {
        self.documents.write().remove(doc_id)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Collect the documents matching a predicate.
    pub fn filter<F>(&self, predicate: F) -> Vec<Document>
    where
        F: Fn(&Document) -> bool,
    {
        self.documents
            .read()
            .values()
            .filter(|doc| predicate(doc))
            .cloned()
            .collect()
    }

    /// Ids of every stored document.
    pub fn ids(&self) -> Vec<String> {
        self.documents.read().keys().cloned().collect()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, doc_id: &str) -> Option<Document> {
        self.documents.read().get(doc_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            title: format!("post {id}"),
            content: String::new(),
            url: String::new(),
            author: "tester".to_string(),
            subreddit: "rust".to_string(),
            score: 1,
            num_comments: 0,
            created_utc: 0,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = MemoryStore::new();
        store.insert(doc("a")).unwrap();

        assert_eq!(store.get("a").unwrap().title, "post a");
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_get_many_skips_absent() {
        let store = MemoryStore::new();
        store.insert(doc("a")).unwrap();
        store.insert(doc("b")).unwrap();

        let found = store.get_many(&["a".to_string(), "ghost".to_string()]);
        assert_eq!(found.len(), 1);
        assert!(found.contains_key("a"));
    }

    #[test]
    fn test_capacity_limit() {
        let store = MemoryStore::with_capacity_limit(1);
        store.insert(doc("a")).unwrap();

        // New id past capacity fails; replacing an existing id does not.
        assert!(matches!(
            store.insert(doc("b")),
            Err(ThreadfinError::ResourceExhausted(_))
        ));
        assert!(store.insert(doc("a")).is_ok());
    }

    #[test]
    fn test_filter() {
        let store = MemoryStore::new();
        store.insert(doc("a")).unwrap();
        let mut other = doc("b");
        other.subreddit = "golang".to_string();
        store.insert(other).unwrap();

        let rust_docs = store.filter(|d| d.subreddit == "rust");
        assert_eq!(rust_docs.len(), 1);
        assert_eq!(rust_docs[0].id, "a");
    }
}

//! Search result types.

use serde::{Deserialize, Serialize};

use crate::ranking::ScoreComponents;

/// One ranked, snippeted hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Identifier of the matched document.
    pub doc_id: String,

    /// Blended relevance score.
    pub score: f64,

    /// Per-signal score breakdown.
    pub components: ScoreComponents,

    /// Document title.
    pub title: String,

    /// Link to the original post.
    pub url: String,

    /// Author name.
    pub author: String,

    /// Community the post belongs to.
    pub subreddit: String,

    /// Creation time, seconds since the Unix epoch.
    pub created_utc: i64,

    /// Contextual snippet with query terms emphasized.
    pub snippet: String,
}

/// A complete result page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Hits for this page, ranked.
    pub results: Vec<SearchHit>,

    /// Total candidate count before pagination.
    pub total_count: usize,

    /// 1-based page number.
    pub page: usize,

    /// Page size after clamping.
    pub page_size: usize,

    /// Wall-clock processing time in milliseconds.
    pub query_time_ms: u64,

    /// The query as received.
    pub query: String,
}

/// Optional metadata predicates applied to candidates before ranking.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Keep only documents from this community.
    pub subreddit: Option<String>,

    /// Keep only documents by this author.
    pub author: Option<String>,
}

impl SearchFilters {
    /// Check if no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.subreddit.is_none() && self.author.is_none()
    }
}

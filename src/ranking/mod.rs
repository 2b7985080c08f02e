//! Relevance scoring and ranking.
//!
//! Text relevance (TF-IDF or BM25) is computed from the inverted index and
//! blended with the freshness, popularity, and engagement signals under
//! configurable weights. The scoring functions are pure over the index; only
//! [`Ranker::rank_documents`] touches document metadata.

pub mod signals;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThreadfinError};
use crate::index::InvertedIndex;
use crate::store::DocumentStore;

pub use signals::{engagement_score, popularity_score, recency_score};

/// The text-relevance algorithm to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceAlgorithm {
    /// Sum of TF·IDF over the query terms.
    TfIdf,
    /// Okapi BM25 with saturation and length normalization.
    #[default]
    Bm25,
}

/// Ranking configuration, validated once at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Which text-relevance algorithm scores the candidates.
    pub algorithm: RelevanceAlgorithm,

    /// BM25 term-frequency saturation parameter.
    pub k1: f64,

    /// BM25 length-normalization strength, 0 to 1.
    pub b: f64,

    /// Weight of text relevance in the final score.
    pub text_weight: f64,

    /// Weight of the freshness signal.
    pub recency_weight: f64,

    /// Weight of the popularity signal.
    pub popularity_weight: f64,

    /// Weight of the engagement signal.
    pub engagement_weight: f64,

    /// Freshness half-life control, in days.
    pub recency_decay_days: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            algorithm: RelevanceAlgorithm::Bm25,
            k1: 1.2,
            b: 0.75,
            text_weight: 0.6,
            recency_weight: 0.2,
            popularity_weight: 0.1,
            engagement_weight: 0.1,
            recency_decay_days: 7.0,
        }
    }
}

impl RankingConfig {
    /// Validate the configuration. The four weights must sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        let weight_sum =
            self.text_weight + self.recency_weight + self.popularity_weight + self.engagement_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(ThreadfinError::config(format!(
                "ranking weights must sum to 1.0, got {weight_sum}"
            )));
        }
        for (name, weight) in [
            ("text_weight", self.text_weight),
            ("recency_weight", self.recency_weight),
            ("popularity_weight", self.popularity_weight),
            ("engagement_weight", self.engagement_weight),
        ] {
            if weight < 0.0 {
                return Err(ThreadfinError::config(format!("{name} must be >= 0")));
            }
        }
        if self.k1 <= 0.0 {
            return Err(ThreadfinError::config("k1 must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(ThreadfinError::config("b must be within [0, 1]"));
        }
        if self.recency_decay_days <= 0.0 {
            return Err(ThreadfinError::config("recency_decay_days must be > 0"));
        }
        Ok(())
    }
}

/// The per-signal breakdown of a final score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub text_relevance: f64,
    pub recency: f64,
    pub popularity: f64,
    pub engagement: f64,
}

/// A candidate document with its blended score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub doc_id: String,
    pub score: f64,
    pub components: ScoreComponents,
}

/// Pure relevance scoring over an index plus blended candidate ranking.
#[derive(Clone, Debug, Default)]
pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    /// Create a ranker with a validated configuration.
    pub fn new(config: RankingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Ranker { config })
    }

    /// Get the ranking configuration.
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Term frequency of `term` in `doc_id`; 0 if absent.
    pub fn term_frequency(&self, index: &InvertedIndex, term: &str, doc_id: &str) -> f64 {
        index
            .postings(term)
            .iter()
            .find(|posting| posting.doc_id == doc_id)
            .map_or(0.0, |posting| posting.term_frequency as f64)
    }

    /// `ln(N / df)`; 0 for an absent term or an empty index, never negative
    /// infinity or NaN.
    pub fn inverse_document_frequency(&self, index: &InvertedIndex, term: &str) -> f64 {
        let total = index.total_documents();
        let df = index.document_frequency(term);
        if total == 0 || df == 0 {
            return 0.0;
        }
        (total as f64 / df as f64).ln()
    }

    /// TF·IDF for a single term.
    pub fn tf_idf(&self, index: &InvertedIndex, term: &str, doc_id: &str) -> f64 {
        self.term_frequency(index, term, doc_id) * self.inverse_document_frequency(index, term)
    }

    /// Sum of TF·IDF over the query terms.
    pub fn total_tf_idf(&self, index: &InvertedIndex, terms: &[String], doc_id: &str) -> f64 {
        terms
            .iter()
            .map(|term| self.tf_idf(index, term, doc_id))
            .sum()
    }

    /// Okapi BM25 over the query terms; 0 for an empty index.
    pub fn bm25(&self, index: &InvertedIndex, terms: &[String], doc_id: &str) -> f64 {
        let avg_len = index.average_document_length();
        if avg_len == 0.0 {
            return 0.0;
        }
        let doc_len = index.document_length(doc_id).unwrap_or(0) as f64;
        let k1 = self.config.k1;
        let b = self.config.b;

        terms
            .iter()
            .map(|term| {
                let tf = self.term_frequency(index, term, doc_id);
                if tf == 0.0 {
                    return 0.0;
                }
                let idf = self.inverse_document_frequency(index, term);
                let norm = 1.0 - b + b * doc_len / avg_len;
                idf * (tf * (k1 + 1.0)) / (tf + k1 * norm)
            })
            .sum()
    }

    /// Text relevance under the configured algorithm.
    pub fn text_relevance(&self, index: &InvertedIndex, terms: &[String], doc_id: &str) -> f64 {
        match self.config.algorithm {
            RelevanceAlgorithm::TfIdf => self.total_tf_idf(index, terms, doc_id),
            RelevanceAlgorithm::Bm25 => self.bm25(index, terms, doc_id),
        }
    }

    /// Score and sort candidates descending by blended score. Candidates
    /// missing from the store are silently skipped; ties keep their stable
    /// sort order.
    pub fn rank_documents(
        &self,
        index: &InvertedIndex,
        store: &dyn DocumentStore,
        query_terms: &[String],
        candidates: &[String],
        now: DateTime<Utc>,
    ) -> Vec<ScoredDocument> {
        let documents = store.get_many(candidates);

        let mut scored: Vec<ScoredDocument> = candidates
            .iter()
            .filter_map(|doc_id| {
                let doc = documents.get(doc_id)?;
                let components = ScoreComponents {
                    text_relevance: self.text_relevance(index, query_terms, doc_id),
                    recency: recency_score(doc.created_utc, now, self.config.recency_decay_days),
                    popularity: popularity_score(doc.score),
                    engagement: engagement_score(doc.num_comments),
                };
                let score = self.config.text_weight * components.text_relevance
                    + self.config.recency_weight * components.recency
                    + self.config.popularity_weight * components.popularity
                    + self.config.engagement_weight * components.engagement;
                Some(ScoredDocument {
                    doc_id: doc_id.clone(),
                    score,
                    components,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}

//! Query processing: orchestration, result cache, and snippets.

pub mod cache;
pub mod engine;
pub mod results;
pub mod snippet;

pub use cache::{CacheConfig, CacheStats, QueryCache};
pub use engine::{EngineConfig, SearchEngine};
pub use results::{SearchFilters, SearchHit, SearchResults};

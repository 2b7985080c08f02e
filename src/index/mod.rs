//! Inverted index module.
//!
//! Owns the postings lists, per-document length statistics, and the atomic
//! JSON persistence of both.

pub mod inverted;
pub mod persist;
pub mod posting;

pub use inverted::{IndexStats, InvertedIndex};
pub use persist::{load_index, save_index};
pub use posting::Posting;

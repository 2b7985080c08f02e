//! Postings list entries.

use serde::{Deserialize, Serialize};

/// One document's occurrences of a term.
///
/// Invariants: `term_frequency == positions.len()`, and `positions` is
/// strictly ascending. These are enforced by the index on insertion and
/// validated when a snapshot is loaded from disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Identifier of the document containing the term.
    pub doc_id: String,

    /// Number of occurrences of the term in the document.
    pub term_frequency: u32,

    /// Token positions of each occurrence, ascending.
    pub positions: Vec<usize>,
}

impl Posting {
    /// Build a posting from its occurrence positions, sorting them ascending
    /// and deriving the frequency.
    pub fn from_positions<S: Into<String>>(doc_id: S, mut positions: Vec<usize>) -> Self {
        positions.sort_unstable();
        Posting {
            doc_id: doc_id.into(),
            term_frequency: positions.len() as u32,
            positions,
        }
    }

    /// Check the posting's internal invariants.
    pub fn is_consistent(&self) -> bool {
        self.term_frequency as usize == self.positions.len()
            && self.term_frequency >= 1
            && self.positions.windows(2).all(|pair| pair[0] < pair[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_positions_sorts() {
        let posting = Posting::from_positions("doc-1", vec![7, 2, 4]);

        assert_eq!(posting.term_frequency, 3);
        assert_eq!(posting.positions, vec![2, 4, 7]);
        assert!(posting.is_consistent());
    }

    #[test]
    fn test_consistency_checks() {
        let mut posting = Posting::from_positions("doc-1", vec![1, 2]);
        posting.term_frequency = 5;
        assert!(!posting.is_consistent());

        let duplicate = Posting {
            doc_id: "doc-1".to_string(),
            term_frequency: 2,
            positions: vec![3, 3],
        };
        assert!(!duplicate.is_consistent());

        let empty = Posting {
            doc_id: "doc-1".to_string(),
            term_frequency: 0,
            positions: Vec::new(),
        };
        assert!(!empty.is_consistent());
    }
}

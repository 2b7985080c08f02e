//! Index persistence.
//!
//! The index serializes to a JSON snapshot (term → postings, doc id →
//! length). Writes are atomic: the snapshot goes to a temporary path first
//! and is renamed over the target, so a crash mid-write never leaves a
//! corrupt index behind. Loading validates every data-model invariant; a
//! snapshot that fails validation is a fatal storage error, while a missing
//! file simply yields an empty index.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThreadfinError};
use crate::index::inverted::InvertedIndex;
use crate::index::posting::Posting;

/// On-disk shape of the index. BTreeMaps keep the snapshot diffable.
#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    version: u32,
    postings: BTreeMap<String, Vec<Posting>>,
    document_lengths: BTreeMap<String, usize>,
}

const SNAPSHOT_VERSION: u32 = 1;

/// Write the index to `path` atomically.
pub fn save_index(index: &InvertedIndex, path: &Path) -> Result<()> {
    let (postings, lengths) = index.clone().into_parts();
    let snapshot = IndexSnapshot {
        version: SNAPSHOT_VERSION,
        postings: postings.into_iter().collect(),
        document_lengths: lengths.into_iter().collect(),
    };

    let json = serde_json::to_string(&snapshot)?;
    write_atomic(path, json.as_bytes())
}

/// Load an index from `path`. An absent file yields an empty index; a
/// present-but-invalid one is a fatal error.
pub fn load_index(path: &Path) -> Result<InvertedIndex> {
    if !path.exists() {
        return Ok(InvertedIndex::new());
    }

    let json = fs::read_to_string(path)?;
    let snapshot: IndexSnapshot = serde_json::from_str(&json)
        .map_err(|e| ThreadfinError::storage(format!("malformed index snapshot: {e}")))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(ThreadfinError::storage(format!(
            "unsupported index snapshot version {}",
            snapshot.version
        )));
    }

    let index = InvertedIndex::from_parts(
        snapshot.postings.into_iter().collect(),
        snapshot.document_lengths.into_iter().collect(),
    );
    index
        .validate()
        .map_err(|e| ThreadfinError::storage(format!("invalid index snapshot: {e}")))?;

    Ok(index)
}

/// Write `bytes` to `path` via a temporary sibling file and rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = Path::new(&tmp);

    fs::write(tmp_path, bytes)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TextProcessor;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let processor = TextProcessor::new();
        let mut index = InvertedIndex::new();
        index.index_document(&processor.process("d1", "Rust", "fast search engines"));
        index.index_document(&processor.process("d2", "Go", "fast compile"));

        save_index(&index, &path).unwrap();
        let loaded = load_index(&path).unwrap();

        assert_eq!(loaded.total_documents(), 2);
        assert_eq!(loaded.document_frequency("fast"), 2);
        assert_eq!(loaded.postings("fast"), index.postings("fast"));
        assert_eq!(
            loaded.average_document_length(),
            index.average_document_length()
        );
    }

    #[test]
    fn test_missing_file_yields_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = load_index(&dir.path().join("absent.json")).unwrap();
        assert_eq!(index.total_documents(), 0);
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_index(&path),
            Err(ThreadfinError::Storage(_))
        ));
    }

    #[test]
    fn test_inconsistent_snapshot_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        // A posting whose term_frequency disagrees with its positions.
        let json = r#"{
            "version": 1,
            "postings": {
                "rust": [{"doc_id": "d1", "term_frequency": 3, "positions": [0]}]
            },
            "document_lengths": {"d1": 1}
        }"#;
        fs::write(&path, json).unwrap();

        assert!(matches!(
            load_index(&path),
            Err(ThreadfinError::Storage(_))
        ));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        save_index(&InvertedIndex::new(), &path).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("index.json")]);
    }
}
